//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
///
/// All sizes are Unicode character counts.
///
/// # TOML Example
///
/// ```toml
/// [extractor]
/// chunk_threshold = 50000
/// max_chunk_size = 40000
/// chunk_overlap = 2000
/// call_timeout_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Documents longer than this are extracted chunk by chunk
    pub chunk_threshold: usize,

    /// Upper bound on a chunk's length
    pub max_chunk_size: usize,

    /// Characters repeated from the end of one chunk at the start of the next
    pub chunk_overlap: usize,

    /// Maximum time for a single LLM call (seconds)
    pub call_timeout_secs: u64,

    /// Documents longer than this are sampled for schema suggestion
    pub suggestion_sample_threshold: usize,

    /// Leading characters kept when sampling
    pub suggestion_head_chars: usize,

    /// Trailing characters kept when sampling
    pub suggestion_tail_chars: usize,
}

impl ExtractorConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_chunk_size == 0 {
            return Err(config_error("max_chunk_size must be greater than 0"));
        }
        if self.chunk_overlap >= self.max_chunk_size {
            return Err(config_error("chunk_overlap must be smaller than max_chunk_size"));
        }
        if self.max_chunk_size > self.chunk_threshold {
            return Err(config_error("max_chunk_size cannot exceed chunk_threshold"));
        }
        if self.call_timeout_secs == 0 {
            return Err(config_error("call_timeout_secs must be greater than 0"));
        }
        if self.suggestion_head_chars + self.suggestion_tail_chars > self.suggestion_sample_threshold
        {
            return Err(config_error(
                "suggestion sample cannot be larger than suggestion_sample_threshold",
            ));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> ExtractorError {
    ExtractorError::Config(message.to_string())
}

impl Default for ExtractorConfig {
    /// Defaults sized for models with a large context window
    fn default() -> Self {
        Self {
            chunk_threshold: 50_000,
            max_chunk_size: 40_000,
            chunk_overlap: 2_000,
            call_timeout_secs: 300,
            suggestion_sample_threshold: 16_000,
            suggestion_head_chars: 12_000,
            suggestion_tail_chars: 3_000,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_threshold, 50_000);
        assert_eq!(config.max_chunk_size, 40_000);
        assert_eq!(config.chunk_overlap, 2_000);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let config = ExtractorConfig {
            chunk_overlap: 40_000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_invalid_chunk_size_too_large() {
        let mut config = ExtractorConfig::default();
        config.max_chunk_size = config.chunk_threshold + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ExtractorConfig {
            call_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("max_chunk_size = 30000\n").unwrap();
        assert_eq!(config.max_chunk_size, 30_000);
        assert_eq!(config.chunk_overlap, 2_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            chunk_threshold: 12_000,
            max_chunk_size: 10_000,
            chunk_overlap: 500,
            call_timeout_secs: 120,
            ..Default::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
