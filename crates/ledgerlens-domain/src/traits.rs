//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and the
//! generative oracles. Implementations live in other crates, and tests
//! substitute deterministic stubs.

use crate::GraphDocument;
use std::sync::Arc;

/// Trait for language-model oracles
///
/// Implemented by the infrastructure layer (ledgerlens-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a free-text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate a completion constrained to JSON output (if supported).
    ///
    /// `schema` is a short description of the expected shape; providers
    /// without a JSON mode may ignore it.
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

// Shared and boxed providers delegate to the inner provider
impl<T: LlmProvider + ?Sized> LlmProvider for Arc<T> {
    type Error = T::Error;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        (**self).generate(prompt)
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        (**self).generate_structured(prompt, schema)
    }
}

impl<T: LlmProvider + ?Sized> LlmProvider for Box<T> {
    type Error = T::Error;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        (**self).generate(prompt)
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        (**self).generate_structured(prompt, schema)
    }
}

/// Trait for turning one chunk of text into a partial graph
///
/// Implemented by the application layer (ledgerlens-extractor)
pub trait GraphExtractor {
    /// Error type for extraction operations
    type Error;

    /// Extract the nodes and relationships mentioned in one chunk
    fn extract_one(&self, chunk: &str) -> Result<GraphDocument, Self::Error>;
}
