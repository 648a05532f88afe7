//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HUEGUIDE_*)
//! 2. Unprefixed legacy variables (GEMINI_API_KEY, MAX_HISTORY, ...)
//! 3. TOML config file (if HUEGUIDE_CONFIG_FILE set)
//! 4. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Unprefixed environment variables accepted for compatibility with plain `.env` files.
const LEGACY_ENV_KEYS: &[&str] =
    &["gemini_api_key", "brave_api_key", "max_search_results", "max_history", "request_timeout"];

/// Which retrieval pipeline answers questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Search, fetch and extract pages, then generate.
    #[default]
    Fetch,
    /// Search and generate from the provider's snippets only.
    Snippets,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HUEGUIDE_*)
/// 2. Legacy unprefixed variables
/// 3. TOML config file (if HUEGUIDE_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key for answer generation.
    ///
    /// Set via HUEGUIDE_GEMINI_API_KEY or GEMINI_API_KEY.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Gemini model id.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Gemini API root.
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Brave API subscription token. DuckDuckGo is used when unset.
    #[serde(default)]
    pub brave_api_key: Option<String>,

    /// Maximum URLs kept per search.
    ///
    /// Set via HUEGUIDE_MAX_SEARCH_RESULTS or MAX_SEARCH_RESULTS.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Number of trailing turns sent as conversation context.
    ///
    /// Set via HUEGUIDE_MAX_HISTORY or MAX_HISTORY.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Search provider timeout in seconds.
    ///
    /// Set via HUEGUIDE_REQUEST_TIMEOUT or REQUEST_TIMEOUT.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Per-page fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Upper bound on a single generation call, in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Text appended to every search query to keep results on topic.
    #[serde(default = "default_topic_qualifier")]
    pub topic_qualifier: String,

    /// Regional hint in `region-language` form (e.g. `vn-vi`).
    #[serde(default = "default_search_region")]
    pub search_region: String,

    /// Browser User-Agent sent with page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pipeline strategy.
    #[serde(default)]
    pub strategy: Strategy,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_max_search_results() -> usize {
    2
}

fn default_max_history() -> usize {
    5
}

fn default_request_timeout() -> u64 {
    5
}

fn default_fetch_timeout_ms() -> u64 {
    3_000
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_topic_qualifier() -> String {
    "Huế, Việt Nam".into()
}

fn default_search_region() -> String {
    "vn-vi".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            brave_api_key: None,
            max_search_results: default_max_search_results(),
            max_history: default_max_history(),
            request_timeout: default_request_timeout(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            generation_timeout_secs: default_generation_timeout_secs(),
            topic_qualifier: default_topic_qualifier(),
            search_region: default_search_region(),
            user_agent: default_user_agent(),
            strategy: Strategy::default(),
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Search timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Per-page fetch timeout as Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Generation timeout as Duration.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The layered figment used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HUEGUIDE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment
            .merge(Env::raw().only(LEGACY_ENV_KEYS))
            .merge(
                Env::prefixed("HUEGUIDE_")
                    .ignore(&["config_file"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            )
    }

    /// Return the Gemini API key, which answer generation cannot run without.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_gemini_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "gemini_api_key".into(),
                hint: "Set GEMINI_API_KEY in the environment or a .env file".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_search_results, 2);
        assert_eq!(config.max_history, 5);
        assert_eq!(config.request_timeout, 5);
        assert_eq!(config.fetch_timeout_ms, 3_000);
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.topic_qualifier, "Huế, Việt Nam");
        assert_eq!(config.search_region, "vn-vi");
        assert_eq!(config.strategy, Strategy::Fetch);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.gemini_api_key.is_none());
        assert!(config.brave_api_key.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch_timeout(), Duration::from_millis(3_000));
        assert_eq!(config.generation_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_require_gemini_api_key_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_gemini_api_key(), Err(ConfigError::Missing { .. })));

        let config = AppConfig { gemini_api_key: Some(String::new()), ..Default::default() };
        assert!(matches!(config.require_gemini_api_key(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_gemini_api_key_present() {
        let config = AppConfig { gemini_api_key: Some("test-key".into()), ..Default::default() };
        assert_eq!(config.require_gemini_api_key().unwrap(), "test-key");
    }

    #[test]
    fn test_legacy_env_names() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MAX_HISTORY", "2");
            jail.set_env("MAX_SEARCH_RESULTS", "4");
            jail.set_env("GEMINI_API_KEY", "legacy-key");

            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.max_history, 2);
            assert_eq!(config.max_search_results, 4);
            assert_eq!(config.gemini_api_key.as_deref(), Some("legacy-key"));
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_wins_over_legacy() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MAX_HISTORY", "2");
            jail.set_env("HUEGUIDE_MAX_HISTORY", "7");
            jail.set_env("HUEGUIDE_STRATEGY", "snippets");

            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.max_history, 7);
            assert_eq!(config.strategy, Strategy::Snippets);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_layer() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("hueguide.toml", "max_history = 3\ntopic_qualifier = \"Hue\"\n")?;
            jail.set_env("HUEGUIDE_CONFIG_FILE", "hueguide.toml");

            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.max_history, 3);
            assert_eq!(config.topic_qualifier, "Hue");
            Ok(())
        });
    }
}
