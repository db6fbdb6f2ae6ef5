//! Configuration for job attempts and retry scheduling

use crate::error::JobError;
use docsift_domain::{DEFAULT_MAX_RETRIES, DEFAULT_SUGGESTION_MAX_RETRIES};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry budgets and backoff bounds for jobs and schema suggestions
///
/// The delay before retry `n` (0-based) is `min(2^n * backoff_base_secs, cap)`.
///
/// # Examples
///
/// ```
/// use docsift_jobs::JobsConfig;
/// use std::time::Duration;
///
/// let config = JobsConfig::default();
/// assert_eq!(config.max_retries, 10);
/// assert_eq!(config.backoff_delay(0), Duration::from_secs(30));
/// assert_eq!(config.backoff_delay(7), Duration::from_secs(600));
///
/// // Suggestions share the formula with a lower cap
/// assert_eq!(config.suggestion_backoff_delay(5), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Automatic retries before a job fails permanently
    /// Default: 10
    pub max_retries: u32,

    /// Delay before the first retry (in seconds), doubled for each later one
    /// Default: 30
    pub backoff_base_secs: u64,

    /// Upper bound on a job's retry delay (in seconds)
    /// Default: 600 (10 minutes)
    pub backoff_max_secs: u64,

    /// Automatic retries before a schema suggestion fails permanently
    /// Default: 3
    pub suggestion_max_retries: u32,

    /// Upper bound on a suggestion's retry delay (in seconds)
    /// Default: 300 (5 minutes)
    pub suggestion_backoff_max_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_secs: 30,
            backoff_max_secs: 600,
            suggestion_max_retries: DEFAULT_SUGGESTION_MAX_RETRIES,
            suggestion_backoff_max_secs: 300,
        }
    }
}

impl JobsConfig {
    /// Fail fast: the same settings with every retry budget set to zero
    ///
    /// Suitable for interactive one-shot runs where the caller reports the
    /// first error.
    pub fn without_retries(self) -> Self {
        Self {
            max_retries: 0,
            suggestion_max_retries: 0,
            ..self
        }
    }

    /// Delay before job retry `retry` (0-based)
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        exponential(self.backoff_base_secs, retry, self.backoff_max_secs)
    }

    /// Delay before suggestion retry `retry` (0-based)
    pub fn suggestion_backoff_delay(&self, retry: u32) -> Duration {
        exponential(self.backoff_base_secs, retry, self.suggestion_backoff_max_secs)
    }

    /// Check that the backoff bounds make sense
    pub fn validate(&self) -> Result<(), JobError> {
        if self.backoff_base_secs == 0 {
            return Err(JobError::Config(
                "backoff_base_secs must be greater than 0".to_string(),
            ));
        }
        if self.backoff_max_secs < self.backoff_base_secs {
            return Err(JobError::Config(format!(
                "backoff_max_secs ({}) must be at least backoff_base_secs ({})",
                self.backoff_max_secs, self.backoff_base_secs
            )));
        }
        if self.suggestion_backoff_max_secs < self.backoff_base_secs {
            return Err(JobError::Config(format!(
                "suggestion_backoff_max_secs ({}) must be at least backoff_base_secs ({})",
                self.suggestion_backoff_max_secs, self.backoff_base_secs
            )));
        }
        Ok(())
    }

    /// Load from a TOML table
    pub fn from_toml(s: &str) -> Result<Self, JobError> {
        let config: Self = toml::from_str(s).map_err(|e| JobError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, JobError> {
        toml::to_string_pretty(self).map_err(|e| JobError::Config(e.to_string()))
    }
}

fn exponential(base_secs: u64, retry: u32, cap_secs: u64) -> Duration {
    let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
    Duration::from_secs(factor.saturating_mul(base_secs).min(cap_secs))
}
