//! Error types for artifact storage

use std::io;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Removing one of a document's artifacts failed
    #[error("Error during deletion of {artifact}.")]
    Delete {
        /// File name of the artifact that could not be removed
        artifact: String,
        /// Underlying filesystem error
        #[source]
        source: io::Error,
    },

    /// Upload source missing or not a regular file
    #[error("File not found: {0}")]
    NotFound(String),

    /// Upload larger than the accepted maximum
    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Size of the rejected file
        size: u64,
        /// Maximum accepted size
        limit: u64,
    },

    /// File name that cannot identify a document
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Text extraction from the document failed
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// Graph could not be serialized for rendering
    #[error("Render error: {0}")]
    Render(String),
}
