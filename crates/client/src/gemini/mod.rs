//! Gemini API client.
//!
//! ### Protocol
//!
//! - **Endpoint**: `{base_url}/models/{model}:generateContent`
//! - **Authentication**: Uses `x-goog-api-key` header.
//! - **Blocking**: prompt blocks and safety stops map to `GeminiError::Blocked`.
//! - **Retries**: none; a failed call is reported once.

pub mod error;
pub mod request;
pub mod response;

pub use error::GeminiError;

use async_trait::async_trait;
use hueguide_core::Error;
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::generate::{GenerationRequest, TextGenerator};
use request::GenerateContentRequest;
use response::{ApiErrorBody, GenerateContentResponse};

/// Default API root.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model id without the `models/` prefix.
    pub model: String,
    pub base_url: String,
    /// Upper bound on one call (default: 60s).
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        if config.api_key.is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| GeminiError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        let model = self.config.model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.config.base_url.trim_end_matches('/'), model)
    }

    /// Call `generateContent` and return the first candidate's text.
    pub async fn generate_content(&self, req: &GenerationRequest) -> Result<String, GeminiError> {
        let start = Instant::now();
        let body = GenerateContentRequest::from(req);

        tracing::debug!(model = %self.config.model, prompt_chars = req.prompt.chars().count(), "calling Gemini");

        let http_response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = http_response.status();
        let bytes = http_response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).chars().take(200).collect());
            return Err(GeminiError::Api { status: status.as_u16(), message });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_slice(&bytes).map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text = parsed.into_text()?;
        tracing::debug!("generation completed in {:?}, {} chars", start.elapsed(), text.chars().count());

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, Error> {
        Ok(self.generate_content(request).await?)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
