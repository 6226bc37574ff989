//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use ledgerlens_extractor::PipelineConfig;
use ledgerlens_pipeline::DEFAULT_PUBLIC_URL;
use ledgerlens_server::config::ServerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding uploads and derived artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Graph server settings
    #[serde(default)]
    pub graph_server: GraphServerSettings,

    /// Language model settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Chunking, merging and validation limits
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Chat history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

/// Where the graph server listens and how it is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphServerSettings {
    /// Bind address
    pub bind_address: String,

    /// Bind port
    pub bind_port: u16,

    /// Base URL used in visualization snippets
    pub public_url: String,
}

/// Which oracle answers extraction and query prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline stub returning empty graphs
    Mock,
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible chat completions
    Openai,
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider kind
    pub provider: ProviderKind,

    /// API endpoint; the provider's default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model name
    pub model: String,

    /// Sampling temperature for questions (extraction always uses 0)
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".ledgerlens").join("config.toml"))
    }

    /// Load configuration from `path`, or the default location.
    ///
    /// A missing file is created with the defaults.
    pub fn load_or_init(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section for unusable values.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate().map_err(CliError::Config)?;

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(CliError::Config(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model is empty".to_string()));
        }

        Ok(())
    }

    /// Graph server configuration for `serve`.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_address: self.graph_server.bind_address.clone(),
            bind_port: self.graph_server.bind_port,
            data_dir: self.data_dir.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            settings: Settings::default(),
            graph_server: GraphServerSettings::default(),
            llm: LlmSettings::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            history_size: 1000,
        }
    }
}

impl Default for GraphServerSettings {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            bind_address: server.bind_address,
            bind_port: server.bind_port,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Openai,
            endpoint: None,
            model: ledgerlens_llm::openai::DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            timeout_secs: 120,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ledgerlens").join("data"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_size() -> usize {
    1000
}
