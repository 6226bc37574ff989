//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error("{0}")]
    Pipeline(#[from] ledgerlens_pipeline::PipelineError),

    /// Storage error
    #[error("{0}")]
    Store(#[from] ledgerlens_store::StoreError),

    /// LLM provider could not be created
    #[error("LLM provider error: {0}")]
    Llm(#[from] ledgerlens_llm::LlmError),

    /// Graph server error
    #[error("Server error: {0}")]
    Server(#[from] ledgerlens_server::ServerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Processing ended with an error status
    #[error("{0}")]
    Processing(String),
}
