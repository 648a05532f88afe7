//! Gemini API client error types.

use std::sync::Arc;

use hueguide_core::Error;

/// Errors from the Gemini `generateContent` endpoint.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// No API key configured.
    #[error("missing API key: gemini_api_key not set")]
    MissingApiKey,

    /// The API answered with an error status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The prompt or the answer was blocked.
    #[error("response blocked: {0}")]
    Blocked(String),

    /// The response carried no text.
    #[error("empty response")]
    EmptyResponse,

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { GeminiError::Timeout } else { GeminiError::Network(Arc::new(err)) }
    }
}

impl From<GeminiError> for Error {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey => Error::MissingApiKey("gemini_api_key".into()),
            GeminiError::Blocked(reason) => Error::ContentBlocked(reason),
            other => Error::GenerationFailed(other.to_string()),
        }
    }
}
