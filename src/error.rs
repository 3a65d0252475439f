//! Fatal errors from the file-facing helpers, and the recoverable anomalies
//! collected while counting a wordlist.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a file operation. The counting core never returns these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse tokenizer config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Column '{column}' not found in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// A problem recovered from locally. Batch processing always continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// An opening marker with no matching close, or a nested marker.
    /// The delimiter was kept as a literal character.
    MalformedAnnotation {
        token: String,
        delimiter: char,
        position: usize,
    },
    /// Missing, empty or `nan` token cell.
    EmptyOrNullToken { row: usize },
    /// A character outside every registry set, passed through as its own unit.
    UnknownCharacter { token: String, letter: String },
    /// Token starting with `*` or `!`, skipped entirely.
    RejectedToken { token: String },
    /// Frequency cell that is not a non-negative number. The row is skipped.
    InvalidFrequency { row: usize, value: String },
}

impl Anomaly {
    pub fn kind(&self) -> &'static str {
        match self {
            Anomaly::MalformedAnnotation { .. } => "malformed_annotation",
            Anomaly::EmptyOrNullToken { .. } => "empty_or_null_token",
            Anomaly::UnknownCharacter { .. } => "unknown_character",
            Anomaly::RejectedToken { .. } => "rejected_token",
            Anomaly::InvalidFrequency { .. } => "invalid_frequency",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MalformedAnnotation {
                token,
                delimiter,
                position,
            } => write!(
                f,
                "unterminated or nested '{delimiter}' at {position} in {token:?}"
            ),
            Anomaly::EmptyOrNullToken { row } => write!(f, "empty token in row {row}"),
            Anomaly::UnknownCharacter { token, letter } => {
                write!(f, "unknown character {letter:?} in {token:?}")
            }
            Anomaly::RejectedToken { token } => write!(f, "editorial token {token:?} skipped"),
            Anomaly::InvalidFrequency { row, value } => {
                write!(f, "invalid frequency {value:?} in row {row}")
            }
        }
    }
}

/// Ordered log of recovered anomalies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anomalies {
    entries: Vec<Anomaly>,
}

impl Anomalies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, anomaly: Anomaly) {
        self.entries.push(anomaly);
    }

    pub fn extend(&mut self, other: Anomalies) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anomaly> {
        self.entries.iter()
    }

    /// Number of anomalies per kind.
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for anomaly in &self.entries {
            *counts.entry(anomaly.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// One-line summary such as `malformed_annotation=2, rejected_token=1`.
    pub fn summary(&self) -> String {
        if self.entries.is_empty() {
            return "no anomalies".to_string();
        }
        self.counts()
            .iter()
            .map(|(kind, n)| format!("{kind}={n}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl IntoIterator for Anomalies {
    type Item = Anomaly;
    type IntoIter = std::vec::IntoIter<Anomaly>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
