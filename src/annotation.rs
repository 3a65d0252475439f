//! Annotation scanner.
//!
//! Splits a prepared token into pieces before grapheme tokenization:
//! explicit clusters (`:sk:`), placeholder runs (`###`), excluded editorial
//! spans (`!x!`, `<de>`, `[12]`, `*x*`) and the plain text runs left for the
//! tokenizer. Decorated spans (`(i)`, `‖j‖`) that name a registered marked
//! form stay inside the text run; other well-formed decorated spans are
//! unwrapped into their own run.
//!
//! Only one marker may be open at a time. An opener without its closer, or
//! with another opener before the closer, is kept as a literal character.

use crate::alphabet::Alphabet;
use crate::error::{Anomalies, Anomaly};

/// Excluded span categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// `!note!`
    Editorial,
    /// `<de>`
    LanguageTag,
    /// `[12]`
    PageMarker,
    /// `*word*`
    Starred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Text for the tokenizer. May contain registered marked forms.
    Text(String),
    /// Unregistered `(x)` or bar span. `inner` is tokenized on its own;
    /// `span` keeps the delimiters for display.
    Optional { span: String, inner: String },
    /// Content of `:x:`, taken verbatim.
    Cluster(String),
    /// A run of `#`.
    Placeholder(String),
    /// Excluded span, delimiters included.
    Annotation { kind: AnnotationKind, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Cluster,
    Decoration,
    Excluded(AnnotationKind),
}

/// Tokens starting with `*` or `!` are editorial rows and are never counted.
pub fn is_rejected(token: &str) -> bool {
    token.starts_with('*') || token.starts_with('!')
}

/// Characters with a marker role, for telling stray delimiters apart from
/// genuinely unknown letters.
pub fn is_marker_char(c: char, bar: char) -> bool {
    matches!(c, ':' | '!' | '<' | '>' | '[' | ']' | '*' | '(' | ')' | '#') || c == bar
}

fn opener(c: char, bar: char) -> Option<(char, Marker)> {
    match c {
        ':' => Some((':', Marker::Cluster)),
        '!' => Some(('!', Marker::Excluded(AnnotationKind::Editorial))),
        '<' => Some(('>', Marker::Excluded(AnnotationKind::LanguageTag))),
        '[' => Some((']', Marker::Excluded(AnnotationKind::PageMarker))),
        '*' => Some(('*', Marker::Excluded(AnnotationKind::Starred))),
        '(' => Some((')', Marker::Decoration)),
        c if c == bar => Some((bar, Marker::Decoration)),
        _ => None,
    }
}

fn is_stray_closer(c: char) -> bool {
    matches!(c, ')' | '>' | ']')
}

/// Scan `token` into pieces. `token` must already be prepared (trimmed,
/// NFC-normalized and case-folded if configured).
pub fn scan(token: &str, alphabet: &Alphabet, anomalies: &mut Anomalies) -> Vec<Piece> {
    let bar = alphabet.bar();
    let chars: Vec<char> = token.chars().collect();
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '#' {
            flush(&mut text, &mut pieces);
            let start = i;
            while i < chars.len() && chars[i] == '#' {
                i += 1;
            }
            pieces.push(Piece::Placeholder(chars[start..i].iter().collect()));
            continue;
        }

        let Some((close, marker)) = opener(c, bar) else {
            if is_stray_closer(c) {
                malformed(token, c, i, anomalies);
            }
            text.push(c);
            i += 1;
            continue;
        };

        let Some(end) = find_close(&chars, i, close, bar) else {
            malformed(token, c, i, anomalies);
            text.push(c);
            i += 1;
            continue;
        };

        let span: String = chars[i..=end].iter().collect();
        let inner: String = chars[i + 1..end].iter().collect();
        match marker {
            Marker::Cluster => {
                flush(&mut text, &mut pieces);
                if !inner.is_empty() {
                    pieces.push(Piece::Cluster(inner));
                }
            }
            Marker::Excluded(kind) => {
                flush(&mut text, &mut pieces);
                pieces.push(Piece::Annotation { kind, text: span });
            }
            Marker::Decoration => {
                if alphabet.is_marked(&span.to_lowercase()) {
                    text.push_str(&span);
                } else {
                    flush(&mut text, &mut pieces);
                    if !inner.is_empty() {
                        pieces.push(Piece::Optional { span, inner });
                    }
                }
            }
        }
        i = end + 1;
    }

    flush(&mut text, &mut pieces);
    pieces
}

/// Index of the closing delimiter for the opener at `start`, or `None` when
/// the span is unterminated or another marker opens first.
fn find_close(chars: &[char], start: usize, close: char, bar: char) -> Option<usize> {
    for (offset, &c) in chars[start + 1..].iter().enumerate() {
        if c == close {
            return Some(start + 1 + offset);
        }
        if opener(c, bar).is_some() {
            return None;
        }
    }
    None
}

fn flush(text: &mut String, pieces: &mut Vec<Piece>) {
    if !text.is_empty() {
        pieces.push(Piece::Text(std::mem::take(text)));
    }
}

fn malformed(token: &str, delimiter: char, position: usize, anomalies: &mut Anomalies) {
    anomalies.push(Anomaly::MalformedAnnotation {
        token: token.to_string(),
        delimiter,
        position,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BarStyle;

    fn scan_default(token: &str) -> (Vec<Piece>, Anomalies) {
        let mut anomalies = Anomalies::new();
        let pieces = scan(token, Alphabet::for_style(BarStyle::Double), &mut anomalies);
        (pieces, anomalies)
    }

    fn text(s: &str) -> Piece {
        Piece::Text(s.to_string())
    }

    #[test]
    fn test_rejected_tokens() {
        assert!(is_rejected("*editorial*"));
        assert!(is_rejected("!note"));
        assert!(!is_rejected("word*"));
        assert!(!is_rejected(""));
    }

    #[test]
    fn test_cluster_is_split_out() {
        let (pieces, anomalies) = scan_default(":sk:at");
        assert_eq!(pieces, vec![Piece::Cluster("sk".into()), text("at")]);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_excluded_spans() {
        let (pieces, _) = scan_default("ab!x!c<de>d[12]e*f*");
        assert_eq!(
            pieces,
            vec![
                text("ab"),
                Piece::Annotation {
                    kind: AnnotationKind::Editorial,
                    text: "!x!".into()
                },
                text("c"),
                Piece::Annotation {
                    kind: AnnotationKind::LanguageTag,
                    text: "<de>".into()
                },
                text("d"),
                Piece::Annotation {
                    kind: AnnotationKind::PageMarker,
                    text: "[12]".into()
                },
                text("e"),
                Piece::Annotation {
                    kind: AnnotationKind::Starred,
                    text: "*f*".into()
                },
            ]
        );
    }

    #[test]
    fn test_placeholder_run() {
        let (pieces, _) = scan_default("a###b#");
        assert_eq!(
            pieces,
            vec![
                text("a"),
                Piece::Placeholder("###".into()),
                text("b"),
                Piece::Placeholder("#".into()),
            ]
        );
    }

    #[test]
    fn test_registered_marked_form_stays_in_text() {
        let (pieces, _) = scan_default("(i)h");
        assert_eq!(pieces, vec![text("(i)h")]);

        let (pieces, _) = scan_default("a‖j‖e");
        assert_eq!(pieces, vec![text("a‖j‖e")]);
    }

    #[test]
    fn test_unregistered_decoration_is_unwrapped() {
        let (pieces, anomalies) = scan_default("b(ea)t");
        assert_eq!(
            pieces,
            vec![
                text("b"),
                Piece::Optional {
                    span: "(ea)".into(),
                    inner: "ea".into()
                },
                text("t")
            ]
        );
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        let (pieces, anomalies) = scan_default("(ab");
        assert_eq!(pieces, vec![text("(ab")]);
        assert_eq!(
            anomalies.iter().next(),
            Some(&Anomaly::MalformedAnnotation {
                token: "(ab".into(),
                delimiter: '(',
                position: 0
            })
        );
    }

    #[test]
    fn test_nested_markers_are_malformed() {
        let (pieces, anomalies) = scan_default("(a:bc:d)");
        assert_eq!(
            pieces,
            vec![text("(a"), Piece::Cluster("bc".into()), text("d)")]
        );
        // the outer `(` and the stray `)`
        assert_eq!(anomalies.len(), 2);
    }

    #[test]
    fn test_pipe_is_literal_under_double_bar() {
        let (pieces, anomalies) = scan_default("a|j|");
        assert_eq!(pieces, vec![text("a|j|")]);
        assert!(anomalies.is_empty());

        let mut anomalies = Anomalies::new();
        let pieces = scan("a|j|", Alphabet::for_style(BarStyle::Pipe), &mut anomalies);
        assert_eq!(pieces, vec![text("a|j|")]);
        assert!(anomalies.is_empty());
    }
}
