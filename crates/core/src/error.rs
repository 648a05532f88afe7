//! Unified error types for hueguide.
//!
//! Every variant carries a stable, machine-readable prefix so log lines and
//! fail-soft answers can be grepped for the failing stage.

/// Unified error type shared by the search, fetch and generation stages.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Search provider failed.
    #[error("SEARCH_FAILED: {0}")]
    SearchFailed(String),

    /// Generation provider failed.
    #[error("GENERATION_FAILED: {0}")]
    GenerationFailed(String),

    /// Generation provider refused to answer (safety or recitation block).
    #[error("CONTENT_BLOCKED: {0}")]
    ContentBlocked(String),

    /// A provider credential is not configured.
    #[error("MISSING_API_KEY: {0}")]
    MissingApiKey(String),
}
