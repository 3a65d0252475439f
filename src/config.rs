//! Tokenizer settings.
//!
//! One engine serves every wordlist convention; the differences between
//! conventions live here. All fields have defaults, so an empty TOML document
//! is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which bar delimiter marks single-letter-class forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarStyle {
    /// `‖i‖`
    #[default]
    Double,
    /// `|i|`
    Pipe,
}

impl BarStyle {
    pub fn delimiter(self) -> char {
        match self {
            BarStyle::Double => '‖',
            BarStyle::Pipe => '|',
        }
    }
}

/// Where glide letters attach to a vowel run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlideOrder {
    /// At most one glide letter, after the run is complete.
    #[default]
    AfterCluster,
    /// Glide letters may appear anywhere inside the run and chain (`aha`).
    WithinCluster,
}

/// How explicit `:X:` clusters interact with the rest of the token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterPrecedence {
    /// Clusters are taken verbatim; the remainder is still tokenized.
    #[default]
    Claim,
    /// A token with any cluster yields only its clusters.
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub bar_style: BarStyle,
    pub glide_order: GlideOrder,
    pub glides: Vec<char>,
    /// Lowercase tokens before scanning. When off, units keep their case and
    /// letters are classified case-insensitively.
    pub case_fold: bool,
    /// Classify unlisted letters by their decomposed base letter.
    pub fold_diacritics: bool,
    pub cluster_precedence: ClusterPrecedence,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            bar_style: BarStyle::default(),
            glide_order: GlideOrder::default(),
            glides: vec!['h', 'j'],
            case_fold: true,
            fold_diacritics: false,
            cluster_precedence: ClusterPrecedence::default(),
        }
    }
}

impl TokenizerConfig {
    /// Load configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content)
    }

    pub fn is_glide(&self, c: char) -> bool {
        self.glides.contains(&c)
    }
}
