//! Language model selection from the configuration.
//!
//! Providers are built on first use, so commands that never reach the
//! model (listing, deleting, viewing) work without credentials.

use crate::config::{LlmSettings, ProviderKind};
use ledgerlens_domain::LlmProvider;
use ledgerlens_llm::{ollama, openai, LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

/// A boxed provider as stored after construction
pub type BoxedProvider = Box<dyn LlmProvider<Error = LlmError> + Send + Sync>;

const MOCK_GRAPH: &str = r#"{"nodes": [], "relationships": []}"#;
const MOCK_ANSWER: &str = "The offline model has no answer for this question.";

/// What the provider is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Graph extraction, always at temperature 0
    Extraction,
    /// Question answering at the configured temperature
    Query,
}

/// Provider built from settings on first use
pub struct LazyProvider {
    settings: LlmSettings,
    purpose: Purpose,
    inner: OnceLock<Result<BoxedProvider, String>>,
}

impl LazyProvider {
    /// Create an unbuilt provider
    pub fn new(settings: LlmSettings, purpose: Purpose) -> Self {
        Self {
            settings,
            purpose,
            inner: OnceLock::new(),
        }
    }

    /// Build the provider if needed and return it
    pub fn get(&self) -> Result<&BoxedProvider, LlmError> {
        self.inner
            .get_or_init(|| {
                build_provider(&self.settings, self.purpose).map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|msg| LlmError::NotConfigured(msg.clone()))
    }
}

impl LlmProvider for LazyProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.get()?.generate(prompt)
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        self.get()?.generate_structured(prompt, schema)
    }
}

fn temperature(settings: &LlmSettings, purpose: Purpose) -> f32 {
    match purpose {
        Purpose::Extraction => 0.0,
        Purpose::Query => settings.temperature,
    }
}

fn build_provider(settings: &LlmSettings, purpose: Purpose) -> Result<BoxedProvider, LlmError> {
    let temperature = temperature(settings, purpose);
    let timeout = Duration::from_secs(settings.timeout_secs);

    let provider: BoxedProvider = match settings.provider {
        ProviderKind::Mock => match purpose {
            Purpose::Extraction => Box::new(MockProvider::new(MOCK_GRAPH)),
            Purpose::Query => Box::new(MockProvider::new(MOCK_ANSWER)),
        },
        ProviderKind::Ollama => {
            let endpoint = settings
                .endpoint
                .as_deref()
                .unwrap_or(ollama::DEFAULT_ENDPOINT);
            Box::new(
                OllamaProvider::with_timeout(endpoint, &settings.model, timeout)?
                    .with_temperature(temperature),
            )
        }
        ProviderKind::Openai => {
            let base_url = settings
                .endpoint
                .as_deref()
                .unwrap_or(openai::DEFAULT_BASE_URL);
            Box::new(
                OpenAiProvider::from_env(base_url, &settings.model, timeout)?
                    .with_temperature(temperature),
            )
        }
    };

    info!(
        provider = ?settings.provider,
        model = %settings.model,
        purpose = ?purpose,
        "Language model ready"
    );
    Ok(provider)
}
