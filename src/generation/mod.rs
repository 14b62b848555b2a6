pub mod decoding;
pub mod orchestrator;
pub mod provider;
pub mod tokenizer;

pub use decoding::DecodingConfig;
pub use orchestrator::{generate_note, GenerationLimits, INSUFFICIENT_DIALOGUE_NOTE};
pub use provider::{HttpGenerator, TextGenerator};
pub use tokenizer::{HfTokenizer, TokenCodec};
