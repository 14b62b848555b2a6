//! Chunked generation orchestration.
//!
//! Long dialogues are split into bounded token windows, condensed one window
//! at a time, stitched, then sent through one final full-note pass. The final
//! output is routed through sentence deduplication and structure repair, so a
//! misbehaving model still yields a well-formed note. Capability failures
//! propagate; there are no retries at this layer.

use anyhow::Result;
use tracing::debug;

use super::decoding::DecodingConfig;
use super::provider::TextGenerator;
use super::tokenizer::TokenCodec;
use crate::note::clean_note_text_with;

/// Dialogues below this word count are rejected without invoking the model.
pub const MIN_DIALOGUE_WORDS: usize = 4;

/// Tokens reserved inside each input window for prompt scaffolding.
pub const CHUNK_HEADROOM_TOKENS: usize = 100;

/// Fixed note returned for empty or too-short dialogue.
pub const INSUFFICIENT_DIALOGUE_NOTE: &str = "S: Insufficient dialogue provided to summarize.\n\n\
     O: No objective data available.\n\n\
     A: Unable to determine clinical assessment due to lack of information.\n\n\
     P: Provide additional dialogue for SOAP note generation.";

const FINAL_INSTRUCTION: &str = "Write a clinically accurate SOAP note based ONLY on the dialogue. Do not reference \
     instructions.\nS:\nO:\nA:\nP:";

/// Token budgets and post-processing knobs for a generation run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationLimits {
    pub max_input_tokens: usize,
    pub max_output_tokens: u32,
    pub max_subjective_sentences: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_input_tokens: 2048,
            max_output_tokens: 450,
            max_subjective_sentences: 4,
        }
    }
}

/// Split text into consecutive non-overlapping token windows, decoded back
/// to text per window.
pub fn chunk_text(text: &str, codec: &dyn TokenCodec, max_len: usize) -> Result<Vec<String>> {
    let ids = codec.encode(text)?;
    ids.chunks(max_len.max(1))
        .map(|window| codec.decode(window))
        .collect()
}

/// Generate a structured SOAP note for one dialogue.
pub async fn generate_note(
    dialogue: &str,
    generator: &dyn TextGenerator,
    codec: &dyn TokenCodec,
    limits: &GenerationLimits,
) -> Result<String> {
    if dialogue.trim().split_whitespace().count() < MIN_DIALOGUE_WORDS {
        debug!("Dialogue below {} words, returning placeholder note", MIN_DIALOGUE_WORDS);
        return Ok(INSUFFICIENT_DIALOGUE_NOTE.to_string());
    }

    let window = limits
        .max_input_tokens
        .saturating_sub(CHUNK_HEADROOM_TOKENS)
        .max(1);
    let chunks = chunk_text(dialogue, codec, window)?;
    debug!(
        "Dialogue split into {} chunk(s) of up to {} tokens",
        chunks.len(),
        window
    );

    let chunk_config = DecodingConfig::chunk_pass(limits.max_output_tokens);
    let mut outputs = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        debug!("Generating for chunk {}/{}", i + 1, chunks.len());
        outputs.push(generator.generate(chunk, &chunk_config).await?);
    }
    let stitched = outputs.join(" ").trim().to_string();

    let prompt = format!("{stitched}\n\n{FINAL_INSTRUCTION}");
    let raw = generator.generate(&prompt, &DecodingConfig::final_pass()).await?;

    Ok(clean_note_text_with(&raw, limits.max_subjective_sentences))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns a fixed reply and counts invocations.
    struct MockGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    impl MockGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, _prompt: &str, _config: &DecodingConfig) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    /// Word-level codec: one token per whitespace-separated word.
    struct WordCodec {
        vocab: Mutex<Vec<String>>,
    }

    impl WordCodec {
        fn new() -> Self {
            Self {
                vocab: Mutex::new(Vec::new()),
            }
        }
    }

    impl TokenCodec for WordCodec {
        fn encode(&self, text: &str) -> Result<Vec<u32>> {
            let mut vocab = self.vocab.lock().unwrap();
            Ok(text
                .split_whitespace()
                .map(|word| {
                    vocab.push(word.to_string());
                    (vocab.len() - 1) as u32
                })
                .collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String> {
            let vocab = self.vocab.lock().unwrap();
            Ok(ids
                .iter()
                .map(|&id| vocab[id as usize].as_str())
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    #[tokio::test]
    async fn test_empty_dialogue_bypasses_generation() {
        let generator = MockGenerator::new("should never be used");
        let codec = WordCodec::new();

        let note = generate_note("", &generator, &codec, &GenerationLimits::default())
            .await
            .unwrap();

        assert_eq!(note, INSUFFICIENT_DIALOGUE_NOTE);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_three_word_dialogue_bypasses_generation() {
        let generator = MockGenerator::new("should never be used");
        let codec = WordCodec::new();

        let note = generate_note("hi there doc", &generator, &codec, &GenerationLimits::default())
            .await
            .unwrap();

        assert_eq!(note, INSUFFICIENT_DIALOGUE_NOTE);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_one_generation_call_per_chunk_plus_final() {
        let generator = MockGenerator::new(
            "S: Summary of the visit.\nO: Exam findings were unremarkable across all systems.\nA: Stable.\nP: Continue current care.",
        );
        let codec = WordCodec::new();
        let limits = GenerationLimits {
            max_input_tokens: 104, // window of 4 tokens after headroom
            max_output_tokens: 50,
            ..Default::default()
        };

        let dialogue = "one two three four five six seven eight nine ten";
        generate_note(dialogue, &generator, &codec, &limits)
            .await
            .unwrap();

        // 10 words / window 4 = 3 chunks, plus the final pass
        assert_eq!(generator.call_count(), 4);
    }

    #[tokio::test]
    async fn test_subjective_cap_flows_through_limits() {
        let generator = MockGenerator::new("S: One here. Two here. Three here.");
        let codec = WordCodec::new();
        let limits = GenerationLimits {
            max_subjective_sentences: 1,
            ..Default::default()
        };

        let note = generate_note("doctor I feel tired today", &generator, &codec, &limits)
            .await
            .unwrap();

        assert!(note.contains("S: One here."));
        assert!(!note.contains("Two here."));
    }

    #[tokio::test]
    async fn test_malformed_output_still_yields_valid_note() {
        let generator =
            MockGenerator::new("Patient reports a bad cough and a fever since Tuesday.");
        let codec = WordCodec::new();

        let note = generate_note(
            "doctor I have been coughing",
            &generator,
            &codec,
            &GenerationLimits::default(),
        )
        .await
        .unwrap();

        let sections: Vec<&str> = note.split("\n\n").collect();
        assert_eq!(sections.len(), 4);
        // No markers in the raw output: assessment/plan come from the URI bucket
        assert!(note.contains("viral upper respiratory infection"));
    }

    #[test]
    fn test_chunk_text_windows() {
        let codec = WordCodec::new();
        let chunks = chunk_text("a b c d e", &codec, 2).unwrap();
        assert_eq!(chunks, vec!["a b", "c d", "e"]);
    }
}
