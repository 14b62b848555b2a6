//! Keyword-driven clinical fallback knowledge base.
//!
//! Maps keyword patterns in dialogue/note text to a fixed (assessment, plan)
//! pair. Rules form an ordered cascade with first-match-wins semantics,
//! ordered by descending specificity. One hard override (ear complaints) is
//! evaluated before the cascade so ear-related vocabulary is never
//! misclassified into the broad chest-pain bucket.

use tracing::debug;

/// One fallback rule: a trigger over lowercased text plus a fixed outcome.
///
/// A rule matches when any `any_of` phrase is contained in the text, or when
/// `all_of` is set and some phrase from each group is contained (conjunctive
/// triggers keep narrow buckets from firing on generic symptom mentions).
#[derive(Debug)]
pub struct FallbackRule {
    pub label: &'static str,
    pub any_of: &'static [&'static str],
    pub all_of: Option<(&'static [&'static str], &'static [&'static str])>,
    pub assessment: &'static str,
    pub plan: &'static str,
}

impl FallbackRule {
    /// Check the trigger against already-lowercased text.
    pub fn matches(&self, lower: &str) -> bool {
        if self.any_of.iter().any(|p| lower.contains(p)) {
            return true;
        }
        if let Some((first, second)) = self.all_of {
            return first.iter().any(|p| lower.contains(p))
                && second.iter().any(|p| lower.contains(p));
        }
        false
    }
}

/// Ear-symptom markers checked before the rule cascade.
pub const EAR_MARKERS: &[&str] = &[
    "ear",
    "ear pain",
    "muffled",
    "popping",
    "ringing",
    "earbuds",
    "cotton bud",
    "hearing loss",
    "eustachian",
];

const EAR_ASSESSMENT: &str =
    "Ear discomfort likely related to eustachian tube dysfunction or local irritation.";
const EAR_PLAN: &str = "Recommend avoiding cotton buds and earbuds, using warm compresses, staying hydrated, and \
     trialing NSAIDs for discomfort. Seek follow-up if worsening pain, fever, drainage, persistent \
     hearing loss, or severe dizziness develops.";

/// The ordered rule cascade. Order encodes intentional specificity
/// tie-breaks; the chest-pain rule is last because its vocabulary is broad
/// enough to mask more specific matches.
pub static FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        label: "dermatologic/contact exposure",
        any_of: &["itching", "itchy", "detergent", "rash", "red spots", "new soap"],
        all_of: None,
        assessment: "Likely contact dermatitis associated with recent irritant exposure.",
        plan: "Discontinue the suspected irritant such as the new detergent. Recommend gentle cleansing, \
             moisturizers, and oral antihistamines for itching. Seek urgent care if breathing difficulty, \
             facial swelling, spreading rash, or fever develops.",
    },
    FallbackRule {
        label: "migraine",
        any_of: &["migraine"],
        all_of: Some((&["aura"], &["headache"])),
        assessment: "History suggests migraine with possible medication-overuse component.",
        plan: "Reduce OTC analgesic frequency, track triggers, hydrate, maintain regular sleep and meals, \
             and follow up in 4–6 weeks. Seek urgent care for sudden severe headache, fever, weakness, or \
             vision changes.",
    },
    FallbackRule {
        label: "musculoskeletal/inflammatory",
        any_of: &[],
        all_of: Some((
            &["joint pain", "knees", "wrists", "stiffness", "achy", "swelling"],
            &[
                "morning stiffness",
                "20–30 minutes",
                "worse in the morning",
                "improves with movement",
            ],
        )),
        assessment: "Polyarticular joint pain with morning stiffness, possibly post-viral or early \
             inflammatory arthritis.",
        plan: "Recommend NSAIDs as needed, gentle mobility exercises, hydration, and activity modification. \
             Follow up if symptoms persist beyond 1–2 weeks, worsen, or new swelling, high fever, or \
             functional decline occurs.",
    },
    FallbackRule {
        label: "viral upper respiratory infection",
        any_of: &[],
        all_of: Some((
            &["cough", "runny nose", "sore throat", "congestion"],
            &["fever"],
        )),
        assessment: "Likely uncomplicated viral upper respiratory infection.",
        plan: "Supportive care with hydration, rest, and antipyretics. Avoid unnecessary antibiotics. Seek \
             medical attention for worsening breathing, dehydration, prolonged fever, or severe symptoms.",
    },
    FallbackRule {
        label: "possible acute coronary syndrome",
        any_of: &["chest pain", "pressure", "left arm", "jaw pain"],
        all_of: Some((&["shortness of breath"], &["exertion"])),
        assessment: "Chest discomfort raises concern for possible acute coronary syndrome.",
        plan: "Recommend immediate emergency evaluation and avoidance of physical exertion.",
    },
];

/// Query the rule cascade alone (no ear override).
pub fn lookup(text: &str) -> Option<(&'static str, &'static str)> {
    let lower = text.to_lowercase();
    let rule = FALLBACK_RULES.iter().find(|rule| rule.matches(&lower))?;
    debug!("Fallback rule matched: {}", rule.label);
    Some((rule.assessment, rule.plan))
}

/// Determine the fallback pair for raw text: ear override first, then the
/// rule cascade. Returns `None` when nothing matches; the caller supplies
/// generic placeholders.
pub fn fallback_for(text: &str) -> Option<(&'static str, &'static str)> {
    let lower = text.to_lowercase();
    if EAR_MARKERS.iter().any(|m| lower.contains(m)) {
        debug!("Ear override engaged, skipping rule cascade");
        return Some((EAR_ASSESSMENT, EAR_PLAN));
    }
    lookup(text)
}
