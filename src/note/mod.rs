pub mod fallback;
pub mod record;
pub mod structure;

pub use record::{NoteRecord, RunSummary};
pub use structure::{clean_note_text, clean_note_text_with, enforce_structure, SoapNote};
