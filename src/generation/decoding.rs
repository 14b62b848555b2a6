use serde::{Deserialize, Serialize};

/// Decoding parameters passed opaquely to the generation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodingConfig {
    pub num_beams: u32,
    pub no_repeat_ngram_size: u32,
    pub repetition_penalty: f32,
    pub length_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    pub max_new_tokens: u32,
    pub early_stopping: bool,
}

impl DecodingConfig {
    /// Parameters for the per-chunk condensation passes.
    pub fn chunk_pass(max_new_tokens: u32) -> Self {
        Self {
            num_beams: 4,
            no_repeat_ngram_size: 3,
            repetition_penalty: 1.2,
            length_penalty: 1.0,
            min_length: None,
            max_new_tokens,
            early_stopping: false,
        }
    }

    /// Stricter parameters for the final full-note pass; the minimum length
    /// forces full-length section coverage.
    pub fn final_pass() -> Self {
        Self {
            num_beams: 4,
            no_repeat_ngram_size: 3,
            repetition_penalty: 1.25,
            length_penalty: 1.0,
            min_length: Some(350),
            max_new_tokens: 500,
            early_stopping: false,
        }
    }
}
