pub mod dedupe;
pub mod subjective;

pub use dedupe::dedupe_sentences;
pub use subjective::trim_subjective;

/// Split text into sentences.
///
/// A sentence boundary is `.`, `!`, or `?` followed by whitespace. The
/// punctuation stays with the preceding sentence; the whitespace run is
/// consumed. Text with no boundary is returned as a single sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        match chars.peek() {
            Some(&(next_idx, next)) if next.is_whitespace() => {
                sentences.push(&text[start..next_idx]);
                start = next_idx;
                // Consume the whitespace run after the boundary
                while let Some(&(ws_idx, ws)) = chars.peek() {
                    if ws.is_whitespace() {
                        start = ws_idx + ws.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let sents = split_sentences("Pain in knee. Swelling noted. Follow up?");
        assert_eq!(
            sents,
            vec!["Pain in knee.", "Swelling noted.", "Follow up?"]
        );
    }

    #[test]
    fn test_split_no_boundary() {
        assert_eq!(split_sentences("no punctuation here"), vec!["no punctuation here"]);
    }

    #[test]
    fn test_split_newline_boundary() {
        let sents = split_sentences("First line.\nSecond line.");
        assert_eq!(sents, vec!["First line.", "Second line."]);
    }

    #[test]
    fn test_split_preserves_internal_newlines() {
        // Whitespace not preceded by sentence punctuation is not a boundary
        let sents = split_sentences("S: chief complaint\nO: none. A: pending.");
        assert_eq!(sents, vec!["S: chief complaint\nO: none.", "A: pending."]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_split_trailing_whitespace() {
        let sents = split_sentences("Done. ");
        assert_eq!(sents, vec!["Done."]);
    }
}
