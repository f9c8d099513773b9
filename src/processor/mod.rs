pub mod chunker;
pub mod extract;
pub mod metadata;
pub mod validate;

pub use chunker::chunk_text;
pub use extract::{extract_text, FileFormat};
pub use metadata::ResumeMetadata;
pub use validate::{validate_resume, Validation};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("unsupported file type: {filename}. Supported types: PDF, DOCX, TXT")]
    UnsupportedFormat { filename: String },
    #[error("failed to extract text from {filename}: {reason}")]
    Extraction { filename: String, reason: String },
}

/// Char-safe prefix of `text`, at most `max_chars` characters. Prompts are
/// bounded in characters, and byte slicing would panic mid-codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
