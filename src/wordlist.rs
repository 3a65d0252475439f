//! Wordlist extraction from running text.
//!
//! Turns a transcribed document into `(token, frequency)` pairs: editorial
//! apparatus is removed with ordered regex rules, transcription symbols are
//! mapped to `#` placeholders, and the remaining whitespace-separated words
//! are cleaned and counted.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Applied in order; later rules see the output of earlier ones.
    static ref EDITORIAL_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"  ").unwrap(), " "),
        // Language and hand tags
        (Regex::new(r"<.+?>").unwrap(), ""),
        // Marginalia
        (Regex::new(r"\{.*?\}\s?").unwrap(), ""),
        // Page break inside a word: keep the word joinable
        (Regex::new(r"(\w)\[-\d+\]").unwrap(), "${1}-"),
        (Regex::new(r"(\w)\[\d+\]").unwrap(), "${1}-"),
        (Regex::new(r"- ").unwrap(), ""),
        // Remaining page numbers and editorial brackets
        (Regex::new(r"\[.*?\]").unwrap(), ""),
        // Sentence punctuation separates words
        (Regex::new(r"\.\s?|:\s?|;\s?|!\s?").unwrap(), " "),
        // Transcription symbols become placeholder runs
        (Regex::new(r"__").unwrap(), "#####"),
        (Regex::new(r"_").unwrap(), "####"),
        (Regex::new(r"\|").unwrap(), "###"),
        (Regex::new(r"=\s?").unwrap(), "##"),
    ];
}

const STRIPPED_PUNCTUATION: &[char] = &['.', ',', ':', ';', '?', '!', '/', '>', '<'];

/// Join hyphenated line breaks and drop empty lines.
pub fn join_lines(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    for line in text.lines().filter(|l| !l.is_empty()) {
        match line.strip_suffix('-') {
            Some(head) => joined.push_str(head),
            None => {
                joined.push_str(line);
                joined.push(' ');
            }
        }
    }
    joined
}

/// Remove editorial apparatus and map transcription symbols.
pub fn strip_editorial(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in EDITORIAL_PATTERNS.iter() {
        if pattern.is_match(&result) {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
    }
    result
}

/// Strip punctuation and trailing whitespace from a word.
pub fn clean_word(word: &str) -> String {
    let cleaned: String = word
        .replace("- ", "")
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    balance_parens(cleaned.trim_end())
}

/// Drop parentheses that have no partner in the word.
fn balance_parens(word: &str) -> String {
    let has_open = word.contains('(');
    let has_close = word.contains(')');
    match (has_open, has_close) {
        (true, false) => word.replace('(', ""),
        (false, true) => word.replace(')', ""),
        _ => word.to_string(),
    }
}

/// Count the words of a document. Output is sorted case-insensitively;
/// words containing digits and empty words are dropped.
pub fn extract_wordlist(text: &str) -> Vec<(String, u64)> {
    let stripped = strip_editorial(&join_lines(text));

    let mut counts: HashMap<String, u64> = HashMap::new();
    for word in stripped.split_whitespace() {
        let mut chars = word.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_alphanumeric() {
                continue;
            }
        }
        *counts.entry(clean_word(word)).or_insert(0) += 1;
    }

    let mut wordlist: Vec<(String, u64)> = counts
        .into_iter()
        .filter(|(word, _)| !word.is_empty() && !word.chars().any(|c| c.is_ascii_digit()))
        .collect();
    wordlist.sort_by(|a, b| {
        a.0.to_lowercase()
            .cmp(&b.0.to_lowercase())
            .then_with(|| a.0.cmp(&b.0))
    });
    wordlist
}
