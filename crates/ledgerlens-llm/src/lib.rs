//! LedgerLens LLM Provider Layer
//!
//! Pluggable implementations of the `LlmProvider` oracle trait from
//! `ledgerlens-domain`. The pipeline treats every provider as a black box
//! with a prompt-in, text-out contract.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic stub for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: Any OpenAI-compatible chat completions endpoint
//!
//! # Examples
//!
//! ```
//! use ledgerlens_llm::MockProvider;
//! use ledgerlens_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use ledgerlens_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider is missing required configuration (API key, endpoint)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// How a scripted rule matches a prompt
#[derive(Debug, Clone)]
enum PromptMatch {
    Exact(String),
    Contains(String),
}

impl PromptMatch {
    fn matches(&self, prompt: &str) -> bool {
        match self {
            PromptMatch::Exact(p) => p == prompt,
            PromptMatch::Contains(fragment) => prompt.contains(fragment.as_str()),
        }
    }
}

/// What a scripted rule produces
#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail,
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(PromptMatch, Scripted)>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Rules are checked in insertion order; the first match wins, otherwise
/// the default response is returned. Every prompt is recorded so tests can
/// assert how many oracle calls were made and what was sent.
///
/// # Examples
///
/// ```
/// use ledgerlens_llm::MockProvider;
/// use ledgerlens_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Fragment-matched responses and failures
/// let mut provider = MockProvider::default();
/// provider.add_response_containing("revenue", "It grew.");
/// provider.add_error_containing("scanned page");
/// assert_eq!(provider.generate("How did revenue change?").unwrap(), "It grew.");
/// assert!(provider.generate("a scanned page").is_err());
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a specific response for an exact prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.state().rules.push((
            PromptMatch::Exact(prompt.into()),
            Scripted::Respond(response.into()),
        ));
    }

    /// Add a response for any prompt containing `fragment`
    pub fn add_response_containing(
        &mut self,
        fragment: impl Into<String>,
        response: impl Into<String>,
    ) {
        self.state().rules.push((
            PromptMatch::Contains(fragment.into()),
            Scripted::Respond(response.into()),
        ));
    }

    /// Configure to return an error for an exact prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.state()
            .rules
            .push((PromptMatch::Exact(prompt.into()), Scripted::Fail));
    }

    /// Configure to return an error for any prompt containing `fragment`
    pub fn add_error_containing(&mut self, fragment: impl Into<String>) {
        self.state()
            .rules
            .push((PromptMatch::Contains(fragment.into()), Scripted::Fail));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Reset the call count and recorded prompts
    pub fn reset_call_count(&self) {
        self.state().prompts.clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.prompts.push(prompt.to_string());

        let scripted = state
            .rules
            .iter()
            .find(|(matcher, _)| matcher.matches(prompt))
            .map(|(_, outcome)| outcome.clone());

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").unwrap(), "world");
        assert_eq!(provider.generate("foo").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_fragment_responses() {
        let mut provider = MockProvider::new("[]");
        provider.add_response_containing("Item 1A", "risk");

        assert_eq!(provider.generate("...Item 1A. Risk Factors...").unwrap(), "risk");
        assert_eq!(provider.generate("Item 7").unwrap(), "[]");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut provider = MockProvider::default();
        provider.add_response_containing("Acme", "first");
        provider.add_response_containing("Acme Corp", "second");

        assert_eq!(provider.generate("Acme Corp").unwrap(), "first");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");
        provider.add_error_containing("corrupt");

        let result = provider.generate("bad prompt");
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
        assert!(provider.generate("a corrupt chunk").is_err());
        // Failed calls still count
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_mock_provider_structured() {
        let provider = MockProvider::new("structured response");
        let result = provider.generate_structured("prompt", "schema");
        assert_eq!(result.unwrap(), "structured response");
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        // Both share the same state due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
