//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for section extraction, chunking and graph merging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunk window size (characters)
    pub window_size: usize,

    /// Characters shared between consecutive chunks
    pub overlap: usize,

    /// Global relationship cap applied once after merging
    pub relationship_cap: usize,

    /// Minimum trimmed text length for a document to be processable
    pub min_text_length: usize,

    /// Pages used when no named section is found
    pub fallback_pages: usize,

    /// Characters skipped past a section start before looking for its boundary
    pub section_boundary_offset: usize,

    /// Maximum time for a single chunk extraction call (seconds)
    pub extraction_timeout_secs: u64,
}

impl PipelineConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 {
            return Err("window_size must be greater than 0".to_string());
        }
        if self.overlap >= self.window_size {
            return Err("overlap must be smaller than window_size".to_string());
        }
        if self.relationship_cap == 0 {
            return Err("relationship_cap must be greater than 0".to_string());
        }
        if self.fallback_pages == 0 {
            return Err("fallback_pages must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Smaller windows and a tighter cap, for local models with short contexts
    pub fn small_context() -> Self {
        Self {
            window_size: 2048,
            overlap: 128,
            relationship_cap: 120,
            extraction_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: 4096,
            overlap: 256,
            relationship_cap: 250,
            min_text_length: 500,
            fallback_pages: 15,
            section_boundary_offset: 10,
            extraction_timeout_secs: 120,
        }
    }
}
