//! Brave Search API client.
//!
//! ### Protocol
//!
//! - **Endpoint**: `https://api.search.brave.com/res/v1/web/search`
//! - **Authentication**: Uses `X-Subscription-Token` header.
//! - **Rate Limiting**: at most one request per second (free tier).
//! - **Normalization**: Converts Brave's response into provider-neutral `SearchHit`s.
//! - **Retries**: none; a failed call is reported once.

pub mod error;
pub mod request;
pub mod response;

pub use error::BraveError;
pub use request::SearchRequest;

use async_trait::async_trait;
use hueguide_core::Error;
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::search::{SearchHit, SearchProvider};

/// Default base URL for Brave Search API.
const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "hueguide/0.1";

/// Minimum interval between requests for rate limiting (1 second for free tier).
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Brave API client configuration.
#[derive(Debug, Clone)]
pub struct BraveConfig {
    /// Subscription token.
    pub api_key: String,
    /// Base URL (default: https://api.search.brave.com/res/v1).
    pub base_url: String,
    /// Request timeout (default: 5s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for BraveConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Spaces calls at least `min_interval` apart.
#[derive(Debug)]
struct RequestPacer {
    next_slot: Mutex<Option<tokio::time::Instant>>,
    min_interval: Duration,
}

impl RequestPacer {
    fn new(min_interval: Duration) -> Self {
        Self { next_slot: Mutex::new(None), min_interval }
    }

    /// Wait for the next free slot and claim it.
    async fn wait_turn(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot {
            tokio::time::sleep_until(slot).await;
        }
        *next_slot = Some(tokio::time::Instant::now() + self.min_interval);
    }
}

/// Brave Search API client.
#[derive(Debug, Clone)]
pub struct BraveClient {
    http: reqwest::Client,
    config: BraveConfig,
    pacer: Arc<RequestPacer>,
}

impl BraveClient {
    /// Create a new Brave client with the given configuration.
    pub fn new(config: BraveConfig) -> Result<Self, BraveError> {
        if config.api_key.is_empty() {
            return Err(BraveError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| BraveError::Network(Arc::new(e)))?;

        Ok(Self { http, config, pacer: Arc::new(RequestPacer::new(MIN_REQUEST_INTERVAL)) })
    }

    /// Run one web search and return the hits in Brave's ranking order.
    pub async fn web_search(&self, req: &SearchRequest) -> Result<Vec<SearchHit>, BraveError> {
        req.validate()?;
        self.pacer.wait_turn().await;

        let start = Instant::now();
        tracing::debug!(query = %req.q, country = ?req.country, "querying Brave");

        let http_response = self
            .http
            .get(format!("{}/web/search", self.config.base_url.trim_end_matches('/')))
            .header("X-Subscription-Token", &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(req)
            .send()
            .await?;

        if let Some(err) = BraveError::from_status(http_response.status()) {
            return Err(err);
        }

        let bytes = http_response.bytes().await?;
        let hits = serde_json::from_slice::<response::BraveApiResponse>(&bytes)
            .map_err(|e| BraveError::Parse(e.to_string()))?
            .into_hits();

        tracing::debug!(hits = hits.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Brave search done");
        Ok(hits)
    }
}

#[async_trait]
impl SearchProvider for BraveClient {
    async fn search(&self, query: &str, count: usize, region: &str) -> Result<Vec<SearchHit>, Error> {
        let req = SearchRequest::for_region(query, count, region);
        Ok(self.web_search(&req).await?)
    }

    fn name(&self) -> &'static str {
        "brave"
    }
}
