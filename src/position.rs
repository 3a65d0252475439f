//! Sound positions: one row per segment of every token, so each unit can be
//! looked up together with the words it occurs in.

use crate::aggregate::{WordlistRow, is_null_token};
use crate::config::TokenizerConfig;
use crate::error::{Anomalies, Anomaly};
use crate::tokenizer::{Segment, TokenStatus, Tokenizer, UnitClass};

/// Cells left out of sound position tables unless the caller passes its own
/// list: language tags, ignored spans and letters the annotators did not
/// treat as positions.
pub const DEFAULT_EXCLUDE: &[&str] = &["#", "<de>", "<en>", "[ig]", "h", "l", "v", "|ß|", "ü"];

#[derive(Debug, Clone, PartialEq)]
pub struct SoundPosition {
    /// Segment text as shown in the segmentation (`(i)h`, `sk`, `(ea)`).
    pub sound_position: String,
    pub word: String,
    pub frequency: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundPositions {
    /// Sorted by `sound_position`; rows with equal positions keep wordlist order.
    pub positions: Vec<SoundPosition>,
    pub anomalies: Anomalies,
}

/// Every segment of every valid row, minus placeholder runs and cells listed
/// in `exclude`.
pub fn sound_positions<S: AsRef<str>>(
    rows: &[WordlistRow],
    config: &TokenizerConfig,
    exclude: &[S],
) -> SoundPositions {
    let tokenizer = Tokenizer::new(config.clone());
    let mut out = SoundPositions::default();

    for (i, row) in rows.iter().enumerate() {
        let Some(token) = row.token.as_deref().filter(|t| !is_null_token(t)) else {
            out.anomalies.push(Anomaly::EmptyOrNullToken { row: i });
            continue;
        };
        if !row.frequency.is_finite() || row.frequency < 0.0 {
            out.anomalies.push(Anomaly::InvalidFrequency {
                row: i,
                value: row.frequency.to_string(),
            });
            continue;
        }

        let segmentation = tokenizer.segment(token);
        out.anomalies.extend(segmentation.anomalies);
        if segmentation.status != TokenStatus::Scanned {
            continue;
        }

        let word = token.trim();
        for segment in &segmentation.segments {
            if matches!(segment, Segment::Unit(u) if u.class == UnitClass::Placeholder) {
                continue;
            }
            let cell = segment.text();
            if exclude.iter().any(|e| e.as_ref() == cell) {
                continue;
            }
            out.positions.push(SoundPosition {
                sound_position: cell.to_string(),
                word: word.to_string(),
                frequency: row.frequency,
            });
        }
    }

    out.positions.sort_by(|a, b| a.sound_position.cmp(&b.sound_position));
    out
}
