//! Brave search errors and their mapping onto the shared error type.

use std::sync::Arc;

use hueguide_core::Error;
use reqwest::StatusCode;

/// Failures of a Brave web search call.
#[derive(Debug, thiserror::Error)]
pub enum BraveError {
    #[error("missing API key: brave_api_key not set")]
    MissingApiKey,

    /// The query is blank or too long.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// `count` outside 1..=20.
    #[error("invalid count {0}: must be 1-20")]
    InvalidCount(u8),

    /// 401 or 403: the subscription token was refused.
    #[error("subscription token rejected (status {0})")]
    Unauthorized(u16),

    /// 429: plan quota or per-second limit exceeded.
    #[error("rate limited by Brave")]
    RateLimited,

    /// Any other non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The body was not the expected JSON.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl BraveError {
    /// Classify a response status. `None` means the call succeeded.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status.as_u16() {
            401 | 403 => Some(BraveError::Unauthorized(status.as_u16())),
            429 => Some(BraveError::RateLimited),
            _ if status.is_success() => None,
            code => Some(BraveError::Status(code)),
        }
    }
}

impl From<reqwest::Error> for BraveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { BraveError::Timeout } else { BraveError::Network(Arc::new(err)) }
    }
}

impl From<BraveError> for Error {
    fn from(err: BraveError) -> Self {
        match err {
            BraveError::MissingApiKey => Error::MissingApiKey("brave_api_key".into()),
            BraveError::InvalidQuery(msg) => Error::InvalidInput(msg),
            other => Error::SearchFailed(format!("brave: {other}")),
        }
    }
}
