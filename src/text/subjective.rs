use super::split_sentences;

/// Markers for sentences asserting symptom absence. Negated findings are
/// noise in a summarized chief-complaint section.
const NEGATION_MARKERS: &[&str] = &[
    "denies",
    "no ",
    "not experiencing",
    "without",
    "hasn't",
    "has not",
    "didn't",
    "did not",
    "no history of",
];

/// Trim a Subjective section to at most `max_sentences` sentences, dropping
/// sentences that assert symptom absence.
pub fn trim_subjective(section: &str, max_sentences: usize) -> String {
    let mut kept = Vec::new();

    for sentence in split_sentences(section.trim()) {
        if kept.len() >= max_sentences {
            break;
        }
        let lower = sentence.to_lowercase();
        if NEGATION_MARKERS.iter().any(|m| lower.contains(m)) {
            continue;
        }
        kept.push(sentence);
    }

    kept.join(" ").trim().to_string()
}
