//! Length buckets: monographs through hexagraphs.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::aggregate::{FrequencyTable, normalize_key};
use crate::alphabet::letter_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LengthBucket {
    Monograph = 1,
    Digraph = 2,
    Trigraph = 3,
    Tetragraph = 4,
    Pentagraph = 5,
    Hexagraph = 6,
}

impl LengthBucket {
    pub const ALL: [LengthBucket; 6] = [
        LengthBucket::Monograph,
        LengthBucket::Digraph,
        LengthBucket::Trigraph,
        LengthBucket::Tetragraph,
        LengthBucket::Pentagraph,
        LengthBucket::Hexagraph,
    ];

    pub fn from_len(len: usize) -> Option<Self> {
        Self::ALL.get(len.checked_sub(1)?).copied()
    }

    pub fn len(self) -> usize {
        self as usize
    }

    /// Column heading used in exported tables.
    pub fn label(self) -> &'static str {
        match self {
            LengthBucket::Monograph => "Monographs",
            LengthBucket::Digraph => "Digraphs",
            LengthBucket::Trigraph => "Trigraphs",
            LengthBucket::Tetragraph => "Tetragraphs",
            LengthBucket::Pentagraph => "Pentagraphs",
            LengthBucket::Hexagraph => "Hexagraphs",
        }
    }

    fn index(self) -> usize {
        self.len() - 1
    }
}

/// Bucket of a unit by its letter count after normalization. Units longer
/// than six letters are unclassified.
pub fn classify(unit: &str) -> Option<LengthBucket> {
    LengthBucket::from_len(letter_count(&normalize_key(unit)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    Alphabetical,
    /// Highest frequency first, ties alphabetical.
    #[default]
    Frequency,
}

impl SortMode {
    pub fn sort(self, entries: &mut [(String, f64)]) {
        match self {
            SortMode::Alphabetical => entries.sort_by(|a, b| a.0.cmp(&b.0)),
            SortMode::Frequency => entries.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            }),
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alphabetical" | "alpha" => Ok(SortMode::Alphabetical),
            "frequency" | "count" => Ok(SortMode::Frequency),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

/// A frequency table partitioned by length bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketTable {
    buckets: [Vec<(String, f64)>; 6],
    unclassified: Vec<(String, f64)>,
}

impl BucketTable {
    /// Partition the normalized form of `table`; each bucket is sorted by `mode`.
    pub fn from_table(table: &FrequencyTable, mode: SortMode) -> Self {
        let mut out = BucketTable::default();
        for (unit, frequency) in table.normalized().iter() {
            let entry = (unit.to_string(), frequency);
            match classify(unit) {
                Some(bucket) => out.buckets[bucket.index()].push(entry),
                None => out.unclassified.push(entry),
            }
        }
        for bucket in out.buckets.iter_mut() {
            mode.sort(bucket);
        }
        mode.sort(&mut out.unclassified);
        out
    }

    pub fn bucket(&self, bucket: LengthBucket) -> &[(String, f64)] {
        &self.buckets[bucket.index()]
    }

    pub fn unclassified(&self) -> &[(String, f64)] {
        &self.unclassified
    }

    /// Length of the longest bucket.
    pub fn depth(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Rectangular view: `depth()` rows, one optional cell per bucket.
    pub fn padded_rows(&self) -> Vec<[Option<(&str, f64)>; 6]> {
        (0..self.depth())
            .map(|row| {
                std::array::from_fn(|col| {
                    self.buckets[col]
                        .get(row)
                        .map(|(unit, frequency)| (unit.as_str(), *frequency))
                })
            })
            .collect()
    }
}
