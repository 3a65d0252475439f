//! Distance between wordlists.
//!
//! For every unit in the union of the compared tables, the per-unit distance
//! is the sum of absolute differences between neighbouring columns
//! (table k against table k + 1), not a full pairwise matrix.

use std::collections::BTreeSet;

use crate::aggregate::FrequencyTable;

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRow {
    pub grapheme: String,
    /// One frequency per compared table, zero where the unit is absent.
    pub frequencies: Vec<f64>,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceReport {
    /// Wordlist names in column order.
    pub names: Vec<String>,
    /// Sorted by grapheme.
    pub rows: Vec<DistanceRow>,
    /// Sum of the distance column.
    pub total: f64,
    /// `total` divided by the number of tables.
    pub average: f64,
}

impl DistanceReport {
    /// Compare named tables in the given order.
    pub fn compute<S: AsRef<str>>(tables: &[(S, &FrequencyTable)]) -> Self {
        let names: Vec<String> = tables.iter().map(|(n, _)| n.as_ref().to_string()).collect();
        let universe: BTreeSet<&str> = tables.iter().flat_map(|(_, t)| t.units()).collect();

        let rows: Vec<DistanceRow> = universe
            .into_iter()
            .map(|grapheme| {
                let frequencies: Vec<f64> = tables.iter().map(|(_, t)| t.get(grapheme)).collect();
                let distance = sequential_distance(&frequencies);
                DistanceRow {
                    grapheme: grapheme.to_string(),
                    frequencies,
                    distance,
                }
            })
            .collect();

        let total: f64 = rows.iter().map(|r| r.distance).sum();
        let average = if tables.is_empty() {
            0.0
        } else {
            total / tables.len() as f64
        };

        Self {
            names,
            rows,
            total,
            average,
        }
    }

    pub fn row(&self, grapheme: &str) -> Option<&DistanceRow> {
        self.rows.iter().find(|r| r.grapheme == grapheme)
    }
}

/// Sum of `|x[k + 1] - x[k]|`.
pub fn sequential_distance(values: &[f64]) -> f64 {
    values.windows(2).map(|w| (w[1] - w[0]).abs()).sum()
}
