//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_search_results` is outside 1..=20
    /// - `max_history` exceeds 50
    /// - `request_timeout` is outside 1..=120 seconds
    /// - `fetch_timeout_ms` is less than 100ms or exceeds 60s
    /// - `generation_timeout_secs` is 0
    /// - `user_agent`, `topic_qualifier` or `gemini_model` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=20).contains(&self.max_search_results) {
            return Err(ConfigError::Invalid {
                field: "max_search_results".into(),
                reason: "must be between 1 and 20".into(),
            });
        }

        if self.max_history > 50 {
            return Err(ConfigError::Invalid { field: "max_history".into(), reason: "must not exceed 50".into() });
        }

        if !(1..=120).contains(&self.request_timeout) {
            return Err(ConfigError::Invalid {
                field: "request_timeout".into(),
                reason: "must be between 1 and 120 seconds".into(),
            });
        }

        if self.fetch_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.fetch_timeout_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must not exceed 60000ms".into(),
            });
        }

        if self.generation_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "generation_timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.topic_qualifier.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "topic_qualifier".into(), reason: "must not be empty".into() });
        }

        if self.gemini_model.is_empty() {
            return Err(ConfigError::Invalid { field: "gemini_model".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }

    /// Settings that are valid but probably unintended.
    ///
    /// Kept separate from [`AppConfig::validate`] so callers can report them
    /// once logging is up.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.max_history == 0 {
            warnings.push("max_history is 0; answers will not see earlier turns");
        }
        warnings
    }
}
