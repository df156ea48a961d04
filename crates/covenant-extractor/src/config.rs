//! Configuration for the extraction pipeline

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the metadata extractor
///
/// The oracle model identifier is not duplicated here; it lives on the
/// `ChatClient`, and token-length estimation follows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Per-chunk token budget; documents above it are split
    pub max_chunk_tokens: usize,

    /// Maximum time for a single oracle call (seconds)
    pub extraction_timeout_secs: u64,

    /// How many characters of an unparsable payload to include in error
    /// logs
    pub payload_preview_chars: usize,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_chunk_tokens == 0 {
            return Err(ExtractorError::Config(
                "max_chunk_tokens must be greater than 0".to_string(),
            ));
        }
        if self.extraction_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "extraction_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Aggressive preset: smaller chunks and shorter timeouts for faster
    /// turnaround on large batches
    pub fn aggressive() -> Self {
        Self {
            max_chunk_tokens: 3_000,
            extraction_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Lenient preset: larger chunks and longer timeouts for better
    /// single-pass quality
    pub fn lenient() -> Self {
        Self {
            max_chunk_tokens: 12_000,
            extraction_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: 6_000,
            extraction_timeout_secs: 120,
            payload_preview_chars: 120,
        }
    }
}
