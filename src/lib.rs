//! Grapheme tokenization and cluster counting for historical wordlists.
//!
//! Tokens from a transcribed wordlist are split into grapheme units (single
//! letters, vowel clusters, marked forms such as `(i)` or `‖j‖`, explicit
//! `:sk:` clusters), the units are summed over token frequencies, bucketed by
//! length and compared across wordlists.
//!
//! ```
//! use rust_grapheme_count::{CountView, TokenizerConfig, WordlistRow, count_wordlist};
//!
//! let rows = vec![WordlistRow::new("hauh", 3.0), WordlistRow::new("hus", 2.0)];
//! let count = count_wordlist(&rows, &TokenizerConfig::default(), CountView::Vowels);
//! assert_eq!(count.table.get("auh"), 3.0);
//! assert_eq!(count.table.get("u"), 2.0);
//! ```

pub mod aggregate;
pub mod alphabet;
pub mod annotation;
pub mod classify;
pub mod config;
pub mod distance;
pub mod error;
pub mod io;
pub mod position;
pub mod tokenizer;
pub mod wordlist;

#[cfg(feature = "python")]
mod python;

pub use aggregate::{
    Aggregator, CountView, FrequencyTable, WordlistCount, WordlistRow, count_wordlist,
    count_wordlist_par, normalize_key,
};
pub use alphabet::{Alphabet, LetterClass};
pub use classify::{BucketTable, LengthBucket, SortMode, classify};
pub use config::{BarStyle, ClusterPrecedence, GlideOrder, TokenizerConfig};
pub use distance::{DistanceReport, DistanceRow};
pub use error::{Anomalies, Anomaly, Error, Result};
pub use position::{DEFAULT_EXCLUDE, SoundPosition, SoundPositions, sound_positions};
pub use tokenizer::{
    GraphemeUnit, Segment, Segmentation, TokenStatus, TokenUnits, Tokenizer, UnitClass,
};
pub use wordlist::extract_wordlist;

/// Segment one token with `config`: grapheme units and annotation spans in
/// token order.
pub fn segment_token(token: &str, config: &TokenizerConfig) -> Segmentation {
    Tokenizer::new(config.clone()).segment(token)
}

/// Countable units of one token, annotations and placeholders dropped.
pub fn tokenize(token: &str, config: &TokenizerConfig) -> TokenUnits {
    Tokenizer::new(config.clone()).tokenize(token)
}
