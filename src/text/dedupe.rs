use std::collections::HashSet;

use super::split_sentences;

/// Remove case-insensitive duplicate sentences, keeping first occurrences.
///
/// The seen-set is local to the call; repeated phrasing across unrelated
/// notes must never be suppressed.
pub fn dedupe_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();

    for sentence in split_sentences(text) {
        let trimmed = sentence.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            cleaned.push(trimmed);
        }
    }

    cleaned.join(" ")
}
