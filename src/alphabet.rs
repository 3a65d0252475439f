//! Vowel and consonant registry for historical wordlists.
//!
//! Holds the letter sets used to classify graphemes, plus the "marked" forms:
//! letters wrapped in parentheses or bars that override the class of the bare
//! letter (`(i)` and `‖j‖`-style semivowels). One registry exists per bar
//! style; both are built once and shared read-only.

use std::collections::HashSet;
use std::sync::OnceLock;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::BarStyle;

static DOUBLE_BAR: OnceLock<Alphabet> = OnceLock::new();
static PIPE_BAR: OnceLock<Alphabet> = OnceLock::new();

const VOWELS: &[&str] = &[
    "a", "ä", "â", "à", "á", "å",
    "e", "ë", "ê", "è", "é",
    "i", "ï", "î", "ì", "í",
    "o", "ö", "ô", "ø", "ò", "ó",
    "u", "ü", "û", "ù", "ú", "ů",
    "y", "ÿ", "ŷ", "ỳ", "ý",
    "æ", "œ", "œ̂", "œ̀", "œ́",
];

const CONSONANTS: &[&str] = &[
    "b", "c", "d", "f", "g", "h", "j", "k", "l", "m", "n", "p", "q", "r", "s", "ß", "ſ", "t",
    "v", "w", "x", "z", "þ", "ð",
];

// Semivowel letters written as vowels: `‖j‖`, `(j)`
const BAR_VOWELS: &[&str] = &[
    "j", "j̈", "ĵ", "j́",
    "v", "v̈", "v̂", "v̀", "v́", "v̊",
    "w", "ẅ", "ŵ", "ẁ", "ẃ", "ẘ",
];

const PAREN_VOWELS: &[&str] = &[
    "i", "ï", "î", "ì", "í",
    "y", "ÿ", "ŷ", "ỳ", "ý",
    "j", "j̈", "ĵ", "j́",
    "u", "ü", "û", "ù", "ú", "ů",
    "v", "v̈", "v̂", "v̀", "v́", "v̊",
    "w", "ẅ", "ŵ", "ẁ", "ẃ", "ẘ",
];

// Vowel letters written as consonants: `‖i‖`
const BAR_CONSONANTS: &[&str] = &[
    "i", "y", "u", "ï", "î", "ì", "í", "ÿ", "ŷ", "ỳ", "ý", "ü", "û", "ù", "ú", "ů",
];

/// Decoration characters stripped when keys are normalized.
pub const DECORATION: &[char] = &['(', ')', '|', '‖'];

pub fn is_decoration(c: char) -> bool {
    DECORATION.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterClass {
    Vowel,
    Consonant,
}

/// A decorated multi-character form with a fixed class.
#[derive(Debug, Clone)]
pub struct MarkedForm {
    /// Surface form, e.g. `(i)`.
    pub text: String,
    /// The form split into letters (see [`letters`]).
    pub letters: Vec<String>,
    pub class: LetterClass,
}

#[derive(Debug)]
pub struct Alphabet {
    style: BarStyle,
    vowels: HashSet<String>,
    consonants: HashSet<String>,
    /// Sorted longest-first so the first hit is the maximal munch.
    marked: Vec<MarkedForm>,
}

impl Alphabet {
    /// Shared registry for a bar style.
    pub fn for_style(style: BarStyle) -> &'static Alphabet {
        match style {
            BarStyle::Double => DOUBLE_BAR.get_or_init(|| Alphabet::build(style)),
            BarStyle::Pipe => PIPE_BAR.get_or_init(|| Alphabet::build(style)),
        }
    }

    fn build(style: BarStyle) -> Self {
        let bar = style.delimiter();
        let mut marked = Vec::new();

        for letter in BAR_VOWELS {
            marked.push(marked_form(&format!("{bar}{letter}{bar}"), LetterClass::Vowel));
        }
        for letter in PAREN_VOWELS {
            marked.push(marked_form(&format!("({letter})"), LetterClass::Vowel));
        }
        for letter in BAR_CONSONANTS {
            marked.push(marked_form(
                &format!("{bar}{letter}{bar}"),
                LetterClass::Consonant,
            ));
        }
        // Combining-mark vowels such as `œ̂` are one letter but several code
        // points; they need no special casing once input is split into letters.
        marked.sort_by(|a, b| {
            b.letters
                .len()
                .cmp(&a.letters.len())
                .then_with(|| a.text.cmp(&b.text))
        });

        Self {
            style,
            vowels: VOWELS.iter().map(|v| nfc(v)).collect(),
            consonants: CONSONANTS.iter().map(|c| nfc(c)).collect(),
            marked,
        }
    }

    pub fn style(&self) -> BarStyle {
        self.style
    }

    pub fn bar(&self) -> char {
        self.style.delimiter()
    }

    /// Class of a single letter. `letter` must already be lowercase.
    pub fn classify(&self, letter: &str) -> Option<LetterClass> {
        if self.vowels.contains(letter) {
            Some(LetterClass::Vowel)
        } else if self.consonants.contains(letter) {
            Some(LetterClass::Consonant)
        } else {
            None
        }
    }

    /// Like [`Alphabet::classify`], falling back to the decomposed base letter
    /// when `fold_diacritics` is set (`ē` classifies as `e`).
    pub fn classify_folded(&self, letter: &str, fold_diacritics: bool) -> Option<LetterClass> {
        let class = self.classify(letter);
        if class.is_some() || !fold_diacritics {
            return class;
        }
        let base: String = letter.nfd().filter(|c| !is_combining_mark(*c)).collect();
        if base.is_empty() || base == letter {
            return None;
        }
        self.classify(&base)
    }

    /// Longest marked form whose letters prefix `keys`.
    pub fn match_marked<S: AsRef<str>>(&self, keys: &[S]) -> Option<&MarkedForm> {
        self.marked.iter().find(|form| {
            form.letters.len() <= keys.len()
                && form
                    .letters
                    .iter()
                    .zip(keys)
                    .all(|(a, b)| a.as_str() == b.as_ref())
        })
    }

    /// Whether `text` is exactly a registered marked form.
    pub fn is_marked(&self, text: &str) -> bool {
        self.marked.iter().any(|form| form.text == text)
    }

    pub fn marked_forms(&self) -> &[MarkedForm] {
        &self.marked
    }
}

fn marked_form(text: &str, class: LetterClass) -> MarkedForm {
    let text = nfc(text);
    let letters = letters(&text).map(str::to_string).collect();
    MarkedForm {
        text,
        letters,
        class,
    }
}

fn nfc(s: &str) -> String {
    s.nfc().collect()
}

/// Split a string into letters: a base character followed by any combining
/// marks. A stray leading mark forms its own letter.
pub fn letters(s: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = s;
    std::iter::from_fn(move || {
        let mut chars = rest.char_indices();
        chars.next()?;
        let end = chars
            .find(|(_, c)| !is_combining_mark(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (letter, tail) = rest.split_at(end);
        rest = tail;
        Some(letter)
    })
}

/// Number of visible letters in `s`.
pub fn letter_count(s: &str) -> usize {
    letters(s).count()
}
