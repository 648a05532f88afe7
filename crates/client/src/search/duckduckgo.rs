//! DuckDuckGo HTML search provider.
//!
//! Uses the keyless HTML endpoint. Result links are wrapped in a
//! `/l/?uddg=<encoded target>` redirect, which is unwrapped here.

use async_trait::async_trait;
use hueguide_core::Error;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use super::{SearchHit, SearchProvider};

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo search provider (no API key required).
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    http: Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    /// Create a provider with the given request timeout and browser user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::SearchFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint: DDG_HTML_URL.to_string() })
    }

    /// Point the provider at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str, count: usize, region: &str) -> Result<Vec<SearchHit>, Error> {
        let response = self
            .http
            .post(&self.endpoint)
            .form(&[("q", query), ("kl", region)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::SearchFailed("duckduckgo request timed out".into())
                } else {
                    Error::SearchFailed(format!("duckduckgo network error: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SearchFailed(format!("duckduckgo status {}", status.as_u16())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::SearchFailed(format!("duckduckgo body: {e}")))?;

        let hits = parse_results(&html, count);
        tracing::debug!(count = hits.len(), "duckduckgo results parsed");
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Parse result blocks from the DuckDuckGo HTML page, skipping ads.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let (Ok(block_sel), Ok(link_sel), Ok(snippet_sel)) =
        (Selector::parse("div.result"), Selector::parse("a.result__a"), Selector::parse(".result__snippet"))
    else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for block in document.select(&block_sel) {
        if hits.len() >= max_results {
            break;
        }
        if block.value().classes().any(|c| c == "result--ad") {
            continue;
        }

        let Some(link) = block.select(&link_sel).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(resolve_redirect) else {
            continue;
        };

        let title = collapse(link.text());
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(|s| collapse(s.text()))
            .unwrap_or_default();

        hits.push(SearchHit { title, url, snippet, rank: hits.len() + 1 });
    }
    hits
}

/// Turn a result href into the target URL.
///
/// Handles protocol-relative `//duckduckgo.com/l/?uddg=...` redirects and
/// plain absolute links.
fn resolve_redirect(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") { format!("https:{href}") } else { href.to_string() };
    let parsed = Url::parse(&absolute)
        .or_else(|_| Url::parse("https://duckduckgo.com").and_then(|base| base.join(href)))
        .ok()?;

    if parsed.path().starts_with("/l/") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned());
    }

    match parsed.scheme() {
        "http" | "https" => Some(parsed.to_string()),
        _ => None,
    }
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
