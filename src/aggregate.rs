//! Frequency aggregation.
//!
//! Every unit occurrence adds its token's full frequency to the unit's total;
//! a unit seen twice in one token counts twice. After a wordlist is folded in,
//! keys differing only by decoration (`(i)`, `‖i‖`, `i`) are merged.

use std::collections::BTreeMap;
use std::str::FromStr;

use rayon::prelude::*;

use crate::alphabet::is_decoration;
use crate::classify::SortMode;
use crate::config::TokenizerConfig;
use crate::error::{Anomalies, Anomaly};
use crate::tokenizer::{TokenStatus, Tokenizer, UnitClass};

/// Strip decoration characters from a unit key. A key made only of
/// decoration (a literal delimiter) is returned unchanged.
pub fn normalize_key(key: &str) -> String {
    let stripped: String = key.chars().filter(|c| !is_decoration(*c)).collect();
    if stripped.is_empty() {
        key.to_string()
    } else {
        stripped
    }
}

/// Which unit classes a count includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountView {
    /// Everything except `#` placeholders.
    #[default]
    All,
    Vowels,
    /// Consonants and explicit clusters. A glide absorbed into a vowel unit
    /// (`(i)h`) belongs to that unit and is not counted here.
    Consonants,
}

impl CountView {
    pub fn includes(self, class: UnitClass) -> bool {
        match self {
            CountView::All => class != UnitClass::Placeholder,
            CountView::Vowels => class == UnitClass::Vowel,
            CountView::Consonants => {
                matches!(class, UnitClass::Consonant | UnitClass::Cluster)
            }
        }
    }
}

impl FromStr for CountView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(CountView::All),
            "vowels" => Ok(CountView::Vowels),
            "consonants" => Ok(CountView::Consonants),
            other => Err(format!("unknown count view: {other}")),
        }
    }
}

/// Grapheme unit -> summed frequency. Keys iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    counts: BTreeMap<String, f64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, unit: &str, frequency: f64) {
        *self.counts.entry(unit.to_string()).or_insert(0.0) += frequency;
    }

    /// Key-wise sum of `other` into `self`.
    pub fn merge(&mut self, other: FrequencyTable) {
        for (unit, frequency) in other.counts {
            *self.counts.entry(unit).or_insert(0.0) += frequency;
        }
    }

    /// Copy with every key normalized and colliding totals summed.
    pub fn normalized(&self) -> FrequencyTable {
        let mut merged = FrequencyTable::new();
        for (unit, frequency) in &self.counts {
            merged.add(&normalize_key(unit), *frequency);
        }
        merged
    }

    /// Frequency of `unit`, zero when absent.
    pub fn get(&self, unit: &str) -> f64 {
        self.counts.get(unit).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.counts.contains_key(unit)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Entries ordered for display.
    pub fn sorted(&self, mode: SortMode) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> =
            self.counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        mode.sort(&mut entries);
        entries
    }

    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.counts
    }
}

impl FromIterator<(String, f64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (unit, frequency) in iter {
            table.add(&unit, frequency);
        }
        table
    }
}

/// One wordlist row as delivered by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct WordlistRow {
    /// `None` for a missing cell.
    pub token: Option<String>,
    pub frequency: f64,
}

impl WordlistRow {
    pub fn new(token: impl Into<String>, frequency: f64) -> Self {
        Self {
            token: Some(token.into()),
            frequency,
        }
    }
}

/// Result of counting one wordlist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordlistCount {
    /// Totals keyed by surface unit, before decoration merging.
    pub raw: FrequencyTable,
    /// Totals keyed by normalized unit.
    pub table: FrequencyTable,
    pub anomalies: Anomalies,
    /// Rows whose units were added.
    pub counted: usize,
    /// Empty, rejected or invalid rows.
    pub skipped: usize,
}

/// Folds tokens into a [`FrequencyTable`] for one count view.
#[derive(Debug, Clone)]
pub struct Aggregator {
    tokenizer: Tokenizer,
    view: CountView,
}

impl Aggregator {
    pub fn new(config: TokenizerConfig, view: CountView) -> Self {
        Self {
            tokenizer: Tokenizer::new(config),
            view,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Add one row to `table`. Returns whether the row was counted.
    pub fn add_row(
        &self,
        row_index: usize,
        row: &WordlistRow,
        table: &mut FrequencyTable,
        anomalies: &mut Anomalies,
    ) -> bool {
        let Some(token) = row.token.as_deref().filter(|t| !is_null_token(t)) else {
            anomalies.push(Anomaly::EmptyOrNullToken { row: row_index });
            return false;
        };
        if !row.frequency.is_finite() || row.frequency < 0.0 {
            anomalies.push(Anomaly::InvalidFrequency {
                row: row_index,
                value: row.frequency.to_string(),
            });
            return false;
        }

        let result = self.tokenizer.tokenize(token);
        anomalies.extend(result.anomalies);
        match result.status {
            TokenStatus::Scanned => {}
            TokenStatus::Empty => {
                anomalies.push(Anomaly::EmptyOrNullToken { row: row_index });
                return false;
            }
            TokenStatus::Rejected => return false,
        }

        for unit in result.units.iter().filter(|u| self.view.includes(u.class)) {
            table.add(&unit.text, row.frequency);
        }
        true
    }

    pub fn count(&self, rows: &[WordlistRow]) -> WordlistCount {
        let mut raw = FrequencyTable::new();
        let mut anomalies = Anomalies::new();
        let mut counted = 0;

        for (i, row) in rows.iter().enumerate() {
            if self.add_row(i, row, &mut raw, &mut anomalies) {
                counted += 1;
            }
        }

        finish(raw, anomalies, counted, rows.len())
    }

    /// Same result as [`Aggregator::count`], tokens processed in parallel.
    pub fn count_par(&self, rows: &[WordlistRow]) -> WordlistCount {
        let (raw, anomalies, counted) = rows
            .par_iter()
            .enumerate()
            .fold(
                || (FrequencyTable::new(), Anomalies::new(), 0usize),
                |(mut table, mut anomalies, mut counted), (i, row)| {
                    if self.add_row(i, row, &mut table, &mut anomalies) {
                        counted += 1;
                    }
                    (table, anomalies, counted)
                },
            )
            .reduce(
                || (FrequencyTable::new(), Anomalies::new(), 0usize),
                |(mut table, mut anomalies, counted), (other, other_anomalies, other_counted)| {
                    table.merge(other);
                    anomalies.extend(other_anomalies);
                    (table, anomalies, counted + other_counted)
                },
            );

        finish(raw, anomalies, counted, rows.len())
    }
}

fn finish(
    raw: FrequencyTable,
    anomalies: Anomalies,
    counted: usize,
    total: usize,
) -> WordlistCount {
    WordlistCount {
        table: raw.normalized(),
        raw,
        anomalies,
        counted,
        skipped: total - counted,
    }
}

/// Spreadsheet loaders hand over missing cells as empty strings or `nan`.
pub fn is_null_token(token: &str) -> bool {
    let trimmed = token.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Count a wordlist sequentially.
pub fn count_wordlist(
    rows: &[WordlistRow],
    config: &TokenizerConfig,
    view: CountView,
) -> WordlistCount {
    Aggregator::new(config.clone(), view).count(rows)
}

/// Count a wordlist with tokens spread across the rayon pool.
pub fn count_wordlist_par(
    rows: &[WordlistRow],
    config: &TokenizerConfig,
    view: CountView,
) -> WordlistCount {
    Aggregator::new(config.clone(), view).count_par(rows)
}
