//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text is too short to be a text-layer filing (scanned or empty PDF)
    #[error(
        "PDF file can't be processed ({found} characters of text, {required} required). \
         Please check if the text is selectable and that it's a correctly formatted 10-K file."
    )]
    InsufficientText {
        /// Non-whitespace-trimmed length found
        found: usize,
        /// Minimum length required
        required: usize,
    },

    /// Extraction timeout
    #[error("Extraction timeout")]
    Timeout,

    /// Malformed graph in LLM response
    #[error("Invalid graph format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

impl ExtractorError {
    /// True for the precondition failure that rejects a document outright
    pub fn is_validation(&self) -> bool {
        matches!(self, ExtractorError::InsufficientText { .. })
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
