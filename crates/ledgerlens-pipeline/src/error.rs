//! Error types for the processing pipeline

use ledgerlens_extractor::ExtractorError;
use ledgerlens_store::StoreError;
use thiserror::Error;

/// Errors that can occur while processing a document
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The document failed a processing precondition; the message is user-facing
    #[error("{0}")]
    Validation(String),

    /// The uploaded file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Extraction failed
    #[error("Extraction error: {0}")]
    Extractor(ExtractorError),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Message delivered to the user as a terminal progress error.
    ///
    /// Validation failures are shown verbatim; everything else is reported
    /// as unexpected, carrying the original failure text.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation(msg) => msg.clone(),
            other => format!("An unexpected error occurred: {}", other),
        }
    }
}

impl From<ExtractorError> for PipelineError {
    fn from(e: ExtractorError) -> Self {
        if e.is_validation() {
            PipelineError::Validation(e.to_string())
        } else {
            PipelineError::Extractor(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_text_is_validation() {
        let err: PipelineError = ExtractorError::InsufficientText {
            found: 12,
            required: 500,
        }
        .into();

        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(err.user_message().starts_with("PDF file can't be processed"));
    }

    #[test]
    fn test_other_errors_are_unexpected() {
        let err: PipelineError = ExtractorError::Timeout.into();
        assert_eq!(
            err.user_message(),
            "An unexpected error occurred: Extraction error: Extraction timeout"
        );
    }
}
