//! Page fetching for the content extractor.
//!
//! A single `reqwest::Client` is cloned into every extraction task, so a batch
//! of fetches shares one connection pool.
//!
//! - Browser `User-Agent`, HTML `Accept` and Vietnamese-first `Accept-Language`
//! - Per-request timeout (default: 3s), at most 5 redirects
//! - Bodies are read in chunks and abandoned once they pass `max_bytes` (5 MiB)
//!
//! Every failure comes back as an [`Error`]; degrading to empty text is the
//! extractor's job.

pub mod url;

use bytes::{Bytes, BytesMut};
use reqwest::{Client, Response, StatusCode, Url, header};
use std::time::{Duration, Instant};

pub use self::url::parse_page_url;

use hueguide_core::Error;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "vi-VN,vi;q=0.9,en;q=0.8";

/// Fetch client settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Sent as `User-Agent` (default: the configured desktop browser UA)
    pub user_agent: String,
    /// Largest body accepted, in bytes (default: 5 MiB)
    pub max_bytes: usize,
    /// Whole-request timeout (default: 3s)
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: hueguide_core::AppConfig::default().user_agent,
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(3000),
            max_redirects: 5,
        }
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Where the redirects ended.
    pub final_url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Shared HTTP client for page fetches.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// GET a page and return its body with response metadata.
    pub async fn fetch(&self, raw_url: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = parse_page_url(raw_url)?;

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, ACCEPT_HTML)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("{url}: status {}", status.as_u16())));
        }

        if let Some(declared) = response.content_length()
            && declared > self.config.max_bytes as u64
        {
            return Err(self.too_large(declared));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = self.read_capped(response, &url).await?;
        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(url = %url, final_url = %final_url, bytes = bytes.len(), fetch_ms, "fetched page");

        Ok(FetchResponse { final_url, status, content_type, bytes, fetch_ms })
    }

    /// Read the body chunk by chunk, giving up as soon as it passes the cap.
    async fn read_capped(&self, mut response: Response, url: &Url) -> Result<Bytes, Error> {
        let mut body = BytesMut::new();

        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(url, e))? {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(self.too_large((body.len() + chunk.len()) as u64));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }

    fn too_large(&self, size: u64) -> Error {
        Error::FetchTooLarge(format!("{size} bytes exceeds {}", self.config.max_bytes))
    }

    fn classify(&self, url: &Url, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("{url} after {}ms", self.config.timeout.as_millis()))
        } else {
            Error::HttpError(format!("{url}: {err}"))
        }
    }
}
