//! Grapheme tokenizer.
//!
//! Turns one wordlist token into an ordered sequence of grapheme units. The
//! annotation scanner runs first; each text run it leaves is then consumed
//! left to right with these rules, in order of precedence:
//!
//! 1. the longest registered marked form (`(i)`, `‖j‖`, ...)
//! 2. a vowel extends greedily through the following vowels and vowel-class
//!    marked forms
//! 3. a vowel unit absorbs one trailing glide letter (`h`, `j`)
//! 4. a consonant is a unit of its own
//! 5. anything else passes through as a single-letter unit
//!
//! Concatenating the normalized units of a token gives back the token minus
//! its annotation spans, `#` runs and marker delimiters.

use unicode_normalization::UnicodeNormalization;

use crate::aggregate::normalize_key;
use crate::alphabet::{self, Alphabet, LetterClass};
use crate::annotation::{self, AnnotationKind, Piece};
use crate::config::{ClusterPrecedence, GlideOrder, TokenizerConfig};
use crate::error::{Anomalies, Anomaly};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitClass {
    Vowel,
    Consonant,
    /// Explicit `:x:` cluster.
    Cluster,
    /// `#` run. Segmented but never counted.
    Placeholder,
    /// Unknown character or literal delimiter.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphemeUnit {
    /// Surface text, decoration included (`(i)h`).
    pub text: String,
    pub class: UnitClass,
}

impl GraphemeUnit {
    pub fn new(text: impl Into<String>, class: UnitClass) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }

    /// Decoration-free key (`(i)h` -> `ih`).
    pub fn normalized(&self) -> String {
        normalize_key(&self.text)
    }
}

/// One cell of a token's segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Unit(GraphemeUnit),
    /// Unregistered decorated span such as `(ea)`: shown whole, counted by
    /// its units.
    Optional {
        text: String,
        units: Vec<GraphemeUnit>,
    },
    Annotation { kind: AnnotationKind, text: String },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Unit(unit) => &unit.text,
            Segment::Optional { text, .. } | Segment::Annotation { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Scanned,
    /// Starts with `*` or `!`.
    Rejected,
    /// Nothing left after trimming.
    Empty,
}

/// Full segmentation of a token, annotation spans included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// The token as scanned (trimmed, NFC, case-folded if configured).
    pub token: String,
    pub status: TokenStatus,
    pub segments: Vec<Segment>,
    pub anomalies: Anomalies,
}

impl Segmentation {
    pub fn cells(&self) -> Vec<&str> {
        self.segments.iter().map(Segment::text).collect()
    }
}

/// Countable units of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUnits {
    pub status: TokenStatus,
    pub units: Vec<GraphemeUnit>,
    pub anomalies: Anomalies,
}

struct Letter<'a> {
    text: &'a str,
    key: String,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    config: TokenizerConfig,
    alphabet: &'static Alphabet,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        let alphabet = Alphabet::for_style(config.bar_style);
        Self { config, alphabet }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    pub fn alphabet(&self) -> &'static Alphabet {
        self.alphabet
    }

    /// Trim, NFC-normalize and (if configured) lowercase a raw token.
    pub fn prepare(&self, token: &str) -> String {
        let nfc: String = token.trim().nfc().collect();
        if self.config.case_fold {
            nfc.to_lowercase()
        } else {
            nfc
        }
    }

    /// Every piece of the token in order, annotations included.
    pub fn segment(&self, token: &str) -> Segmentation {
        let prepared = self.prepare(token);
        let mut anomalies = Anomalies::new();

        if prepared.is_empty() {
            return Segmentation {
                token: prepared,
                status: TokenStatus::Empty,
                segments: Vec::new(),
                anomalies,
            };
        }
        if annotation::is_rejected(&prepared) {
            anomalies.push(Anomaly::RejectedToken {
                token: prepared.clone(),
            });
            return Segmentation {
                token: prepared,
                status: TokenStatus::Rejected,
                segments: Vec::new(),
                anomalies,
            };
        }

        let pieces = annotation::scan(&prepared, self.alphabet, &mut anomalies);
        let mut segments = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Text(run) => {
                    for unit in self.tokenize_run(&prepared, &run, &mut anomalies) {
                        segments.push(Segment::Unit(unit));
                    }
                }
                Piece::Optional { span, inner } => {
                    let units = self.tokenize_run(&prepared, &inner, &mut anomalies);
                    segments.push(Segment::Optional { text: span, units });
                }
                Piece::Cluster(text) => {
                    segments.push(Segment::Unit(GraphemeUnit::new(text, UnitClass::Cluster)))
                }
                Piece::Placeholder(text) => segments.push(Segment::Unit(GraphemeUnit::new(
                    text,
                    UnitClass::Placeholder,
                ))),
                Piece::Annotation { kind, text } => {
                    segments.push(Segment::Annotation { kind, text })
                }
            }
        }

        Segmentation {
            token: prepared,
            status: TokenStatus::Scanned,
            segments,
            anomalies,
        }
    }

    /// Units of a token for counting. Annotations and placeholders are left
    /// out; cluster precedence is applied.
    pub fn tokenize(&self, token: &str) -> TokenUnits {
        let segmentation = self.segment(token);
        let mut units: Vec<GraphemeUnit> = Vec::new();
        for segment in segmentation.segments {
            match segment {
                Segment::Unit(unit) if unit.class != UnitClass::Placeholder => units.push(unit),
                Segment::Optional { units: inner, .. } => units.extend(inner),
                _ => {}
            }
        }

        // Explicit clusters replace the consonant scan; vowels still count.
        if self.config.cluster_precedence == ClusterPrecedence::Exclusive
            && units.iter().any(|u| u.class == UnitClass::Cluster)
        {
            units.retain(|u| matches!(u.class, UnitClass::Cluster | UnitClass::Vowel));
        }

        TokenUnits {
            status: segmentation.status,
            units,
            anomalies: segmentation.anomalies,
        }
    }

    fn tokenize_run(
        &self,
        token: &str,
        run: &str,
        anomalies: &mut Anomalies,
    ) -> Vec<GraphemeUnit> {
        let letters: Vec<Letter<'_>> = alphabet::letters(run)
            .map(|text| Letter {
                text,
                key: text.to_lowercase(),
            })
            .collect();
        let keys: Vec<&str> = letters.iter().map(|l| l.key.as_str()).collect();
        let mut units = Vec::new();
        let mut p = 0;

        while p < letters.len() {
            let start = p;

            if let Some(form) = self.alphabet.match_marked(&keys[p..]) {
                p += form.letters.len();
                if form.class == LetterClass::Consonant {
                    units.push(GraphemeUnit::new(join(&letters[start..p]), UnitClass::Consonant));
                    continue;
                }
            } else {
                match self.classify(&letters[p].key) {
                    Some(LetterClass::Vowel) => p += 1,
                    Some(LetterClass::Consonant) => {
                        units.push(GraphemeUnit::new(letters[p].text, UnitClass::Consonant));
                        p += 1;
                        continue;
                    }
                    None => {
                        let text = letters[p].text;
                        let bar = self.alphabet.bar();
                        if !text.chars().all(|c| annotation::is_marker_char(c, bar)) {
                            anomalies.push(Anomaly::UnknownCharacter {
                                token: token.to_string(),
                                letter: text.to_string(),
                            });
                        }
                        units.push(GraphemeUnit::new(text, UnitClass::Other));
                        p += 1;
                        continue;
                    }
                }
            }

            p = self.extend_vowel_run(&keys, p);
            if self.config.glide_order == GlideOrder::AfterCluster
                && p < keys.len()
                && self.is_glide(keys[p])
            {
                p += 1;
            }
            units.push(GraphemeUnit::new(join(&letters[start..p]), UnitClass::Vowel));
        }

        units
    }

    /// Extend a vowel run that currently ends before `p`.
    fn extend_vowel_run(&self, keys: &[&str], mut p: usize) -> usize {
        while p < keys.len() {
            if let Some(form) = self.alphabet.match_marked(&keys[p..]) {
                if form.class == LetterClass::Vowel {
                    p += form.letters.len();
                    continue;
                }
                break;
            }
            if self.classify(keys[p]) == Some(LetterClass::Vowel) {
                p += 1;
                continue;
            }
            if self.config.glide_order == GlideOrder::WithinCluster && self.is_glide(keys[p]) {
                p += 1;
                continue;
            }
            break;
        }
        p
    }

    fn classify(&self, key: &str) -> Option<LetterClass> {
        self.alphabet
            .classify_folded(key, self.config.fold_diacritics)
    }

    fn is_glide(&self, key: &str) -> bool {
        let mut chars = key.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if self.config.is_glide(c))
    }
}

fn join(letters: &[Letter<'_>]) -> String {
    letters.iter().map(|l| l.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BarStyle;

    fn units(token: &str) -> Vec<(String, UnitClass)> {
        units_with(TokenizerConfig::default(), token)
    }

    fn units_with(config: TokenizerConfig, token: &str) -> Vec<(String, UnitClass)> {
        Tokenizer::new(config)
            .tokenize(token)
            .units
            .into_iter()
            .map(|u| (u.text, u.class))
            .collect()
    }

    fn texts(token: &str) -> Vec<String> {
        units(token).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_marked_vowel_absorbs_glide() {
        let result = Tokenizer::default().tokenize("(i)h");
        assert_eq!(result.status, TokenStatus::Scanned);
        assert_eq!(result.units.len(), 1);
        assert_eq!(result.units[0].text, "(i)h");
        assert_eq!(result.units[0].class, UnitClass::Vowel);
        assert_eq!(result.units[0].normalized(), "ih");
    }

    #[test]
    fn test_explicit_cluster_then_letters() {
        assert_eq!(
            units(":sk:at"),
            vec![
                ("sk".to_string(), UnitClass::Cluster),
                ("a".to_string(), UnitClass::Vowel),
                ("t".to_string(), UnitClass::Consonant),
            ]
        );
    }

    #[test]
    fn test_exclusive_cluster_precedence() {
        let config = TokenizerConfig {
            cluster_precedence: ClusterPrecedence::Exclusive,
            ..TokenizerConfig::default()
        };
        assert_eq!(
            units_with(config.clone(), ":sk:at"),
            vec![
                ("sk".to_string(), UnitClass::Cluster),
                ("a".to_string(), UnitClass::Vowel),
            ]
        );
        assert_eq!(
            units_with(config.clone(), "b:st:e(ea)"),
            vec![
                ("st".to_string(), UnitClass::Cluster),
                ("e".to_string(), UnitClass::Vowel),
                ("ea".to_string(), UnitClass::Vowel),
            ]
        );
        // no cluster: generic scan still runs
        assert_eq!(units_with(config, "at").len(), 2);
    }

    #[test]
    fn test_rejected_token_has_no_units() {
        let result = Tokenizer::default().tokenize("*editorial*");
        assert_eq!(result.status, TokenStatus::Rejected);
        assert!(result.units.is_empty());
        assert_eq!(result.anomalies.len(), 1);
    }

    #[test]
    fn test_empty_token() {
        let result = Tokenizer::default().tokenize("   ");
        assert_eq!(result.status, TokenStatus::Empty);
        assert!(result.units.is_empty());
    }

    #[test]
    fn test_vowel_cluster_is_maximal() {
        assert_eq!(texts("baum"), vec!["b", "au", "m"]);
        assert_eq!(texts("aieu"), vec!["aieu"]);
    }

    #[test]
    fn test_glide_is_one_letter_only() {
        assert_eq!(texts("ahh"), vec!["ah", "h"]);
        assert_eq!(texts("jah"), vec!["j", "ah"]);
        assert_eq!(texts("eja"), vec!["ej", "a"]);
    }

    #[test]
    fn test_within_cluster_glides_chain() {
        let config = TokenizerConfig {
            glide_order: GlideOrder::WithinCluster,
            ..TokenizerConfig::default()
        };
        let got: Vec<String> = units_with(config, "eha").into_iter().map(|(t, _)| t).collect();
        assert_eq!(got, vec!["eha"]);
    }

    #[test]
    fn test_marked_form_extends_vowel_run() {
        assert_eq!(texts("a(i)t"), vec!["a(i)", "t"]);
        assert_eq!(texts("a‖j‖e"), vec!["a‖j‖e"]);
    }

    #[test]
    fn test_marked_consonant_breaks_run() {
        assert_eq!(
            units("a‖i‖e"),
            vec![
                ("a".to_string(), UnitClass::Vowel),
                ("‖i‖".to_string(), UnitClass::Consonant),
                ("e".to_string(), UnitClass::Vowel),
            ]
        );
    }

    #[test]
    fn test_combining_vowel_is_one_letter() {
        assert_eq!(texts("bœ\u{302}t"), vec!["b", "œ\u{302}", "t"]);
    }

    #[test]
    fn test_unknown_characters_pass_through() {
        let result = Tokenizer::default().tokenize("a7b");
        let got: Vec<&str> = result.units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(got, vec!["a", "7", "b"]);
        assert_eq!(result.units[1].class, UnitClass::Other);
        assert_eq!(result.anomalies.counts().get("unknown_character"), Some(&1));
    }

    #[test]
    fn test_unterminated_paren_is_literal_unit() {
        let result = Tokenizer::default().tokenize("(ab");
        let got: Vec<&str> = result.units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(got, vec!["(", "a", "b"]);
        assert_eq!(result.anomalies.counts().get("malformed_annotation"), Some(&1));
        assert_eq!(result.anomalies.counts().get("unknown_character"), None);
    }

    #[test]
    fn test_segmentation_keeps_annotations() {
        let segmentation = Tokenizer::default().segment("<de>hus###");
        assert_eq!(segmentation.cells(), vec!["<de>", "h", "u", "s", "###"]);

        let counted = Tokenizer::default().tokenize("<de>hus###");
        let got: Vec<&str> = counted.units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(got, vec!["h", "u", "s"]);
    }

    #[test]
    fn test_unregistered_span_is_one_cell() {
        let segmentation = Tokenizer::default().segment("b(ea)t");
        assert_eq!(segmentation.cells(), vec!["b", "(ea)", "t"]);
        assert!(segmentation.anomalies.is_empty());

        assert_eq!(
            units("b(ea)t"),
            vec![
                ("b".to_string(), UnitClass::Consonant),
                ("ea".to_string(), UnitClass::Vowel),
                ("t".to_string(), UnitClass::Consonant),
            ]
        );
    }

    #[test]
    fn test_case_fold() {
        assert_eq!(texts("BAum"), vec!["b", "au", "m"]);

        let legacy = TokenizerConfig {
            case_fold: false,
            ..TokenizerConfig::default()
        };
        let got: Vec<String> = units_with(legacy, "BAum").into_iter().map(|(t, _)| t).collect();
        assert_eq!(got, vec!["B", "Au", "m"]);
    }

    #[test]
    fn test_pipe_bar_style() {
        let config = TokenizerConfig {
            bar_style: BarStyle::Pipe,
            ..TokenizerConfig::default()
        };
        let got: Vec<String> = units_with(config, "a|w|").into_iter().map(|(t, _)| t).collect();
        assert_eq!(got, vec!["a|w|"]);
    }

    #[test]
    fn test_fold_diacritics() {
        let folded = TokenizerConfig {
            fold_diacritics: true,
            ..TokenizerConfig::default()
        };
        assert_eq!(
            units_with(folded, "tē"),
            vec![
                ("t".to_string(), UnitClass::Consonant),
                ("ē".to_string(), UnitClass::Vowel),
            ]
        );
        assert_eq!(units("tē")[1].1, UnitClass::Other);
    }
}
