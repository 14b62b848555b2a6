use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One generated note in a run. PHI-safe: word counts and latency only, no
/// note text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub dialogue_words: usize,
    pub note_words: usize,
    pub latency_ms: u64,
}

impl NoteRecord {
    pub fn new(dialogue: &str, note: &str, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            dialogue_words: dialogue.split_whitespace().count(),
            note_words: note.split_whitespace().count(),
            latency_ms,
        }
    }
}

/// Aggregate statistics for a batch or interactive run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub records: Vec<NoteRecord>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            ended_at: None,
            records: Vec::new(),
        }
    }

    pub fn add(&mut self, record: NoteRecord) {
        self.records.push(record);
    }

    pub fn finalize(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Wall-clock duration of the run. `None` until [`finalize`] is called.
    ///
    /// [`finalize`]: RunSummary::finalize
    pub fn duration_ms(&self) -> Option<i64> {
        let ended = self.ended_at?;
        Some((ended - self.started_at).num_milliseconds())
    }

    pub fn mean_latency_ms(&self) -> Option<u64> {
        if self.records.is_empty() {
            return None;
        }
        let total: u64 = self.records.iter().map(|r| r.latency_ms).sum();
        Some(total / self.records.len() as u64)
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
