//! SOAP section parsing and repair.
//!
//! Takes arbitrary generator output and produces a canonical four-section
//! note. Total over all string input: missing, empty, or malformed sections
//! degrade to a conservative placeholder or the matching fallback bucket,
//! never to an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::note::fallback;
use crate::text::{dedupe_sentences, trim_subjective};

/// Maximum sentences kept in the Subjective section.
pub const SUBJECTIVE_MAX_SENTENCES: usize = 4;

/// Objective sections under this many words are treated as absent.
const OBJECTIVE_MIN_WORDS: usize = 6;

const SUBJECTIVE_PLACEHOLDER: &str =
    "No subjective history was provided in the transcript.";

const OBJECTIVE_DISCLAIMER: &str = "No vitals, physical examination findings, laboratory data, or imaging were provided in the \
     transcript.";

const ASSESSMENT_PLACEHOLDER: &str =
    "Clinical assessment was not explicitly provided in the dialogue.";

const PLAN_PLACEHOLDER: &str = "Advise follow-up with a healthcare provider. Monitor symptoms and return sooner if new, \
     worsening, or concerning features develop.";

/// Section-like labels the generator sometimes echoes back.
static STRAY_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(R:|M:|Plan:|Summary:|Discussion:|Notes:|Prognosis:).*$").unwrap()
});

/// Leaked instructional text ("write a SOAP note...") up to end of line.
static INSTRUCTION_LEAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)(write|generate|compose|summarize|create).*?(soap|note|clinical).*?$")
        .unwrap()
});

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

static SECTION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(S:|O:|A:|P:)").unwrap());

/// Objective labels nested inside Subjective prose.
static EMBEDDED_OBJECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bo:\s*").unwrap());

const SECTION_MARKERS: [&str; 4] = ["S:", "O:", "A:", "P:"];

/// A four-section clinical note. All sections are non-empty after
/// [`enforce_structure`] completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapNote {
    pub subjective: String,
    pub objective: String,
    pub assessment: String,
    pub plan: String,
}

impl SoapNote {
    fn section_mut(&mut self, marker: &str) -> &mut String {
        match marker {
            "S:" => &mut self.subjective,
            "O:" => &mut self.objective,
            "A:" => &mut self.assessment,
            _ => &mut self.plan,
        }
    }

    /// Serialize in fixed S, O, A, P order, sections separated by blank lines.
    pub fn render(&self) -> String {
        format!(
            "S: {}\n\nO: {}\n\nA: {}\n\nP: {}",
            self.subjective, self.objective, self.assessment, self.plan
        )
        .trim()
        .to_string()
    }
}

/// Split raw text into the four labeled sections, strip extraneous headers
/// and instructional leakage, repair empty or malformed sections, and
/// re-serialize canonically. Uses the default subjective sentence cap.
pub fn enforce_structure(text: &str) -> String {
    enforce_structure_with(text, SUBJECTIVE_MAX_SENTENCES)
}

/// [`enforce_structure`] with an explicit subjective sentence cap.
pub fn enforce_structure_with(text: &str, max_subjective_sentences: usize) -> String {
    // Fallback pair resolved on the raw text, before any stripping
    let fallback_pair = fallback::fallback_for(text);

    let cleaned = STRAY_HEADER_RE.replace_all(text, "");
    let cleaned = INSTRUCTION_LEAK_RE.replace_all(&cleaned, "");
    let mut cleaned = BLANK_RUN_RE.replace_all(&cleaned, "\n").trim().to_string();

    // Pad missing markers so the split always finds all four sections
    for marker in SECTION_MARKERS {
        if !cleaned.contains(marker) {
            cleaned.push_str(&format!("\n{marker}\n"));
        }
    }

    let mut note = SoapNote::default();
    let marks: Vec<(usize, usize, String)> = SECTION_MARKER_RE
        .find_iter(&cleaned)
        .map(|m| (m.start(), m.end(), m.as_str().to_string()))
        .collect();

    for (idx, (_, body_start, marker)) in marks.iter().enumerate() {
        let body_end = marks.get(idx + 1).map(|next| next.0).unwrap_or(cleaned.len());
        *note.section_mut(marker) = cleaned[*body_start..body_end].trim().to_string();
    }

    // Stop Subjective from swallowing an inline Objective label
    note.subjective = EMBEDDED_OBJECTIVE_RE
        .replace_all(&note.subjective, "")
        .to_string();
    note.subjective = trim_subjective(&note.subjective, max_subjective_sentences);
    if note.subjective.is_empty() {
        note.subjective = SUBJECTIVE_PLACEHOLDER.to_string();
    }

    if note.objective.split_whitespace().count() < OBJECTIVE_MIN_WORDS {
        note.objective = OBJECTIVE_DISCLAIMER.to_string();
    }

    // Both-or-nothing: never mix a generated assessment with a fallback plan
    if note.assessment.trim().is_empty() || note.plan.trim().is_empty() {
        if let Some((assessment, plan)) = fallback_pair {
            note.assessment = assessment.to_string();
            note.plan = plan.to_string();
        }
    }

    if note.assessment.trim().is_empty() {
        note.assessment = ASSESSMENT_PLACEHOLDER.to_string();
    }
    if note.plan.trim().is_empty() {
        note.plan = PLAN_PLACEHOLDER.to_string();
    }

    note.render()
}

/// Full text-side post-processing: sentence deduplication followed by
/// structure enforcement.
pub fn clean_note_text(text: &str) -> String {
    clean_note_text_with(text, SUBJECTIVE_MAX_SENTENCES)
}

/// [`clean_note_text`] with an explicit subjective sentence cap.
pub fn clean_note_text_with(text: &str, max_subjective_sentences: usize) -> String {
    enforce_structure_with(&dedupe_sentences(text), max_subjective_sentences)
}
