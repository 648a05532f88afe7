//! Web search: provider abstraction and the topical search client.
//!
//! ### Query shaping
//! - Every question is suffixed with a fixed topical qualifier.
//! - Providers are asked for twice the wanted count to leave room for filtering.
//!
//! ### Filtering
//! - URLs whose lowercase form contains a denylisted substring are dropped.
//! - Collection stops once `max_results` URLs survive.
//!
//! ### Failure
//! - `try_search` surfaces provider errors; `search` logs them and returns an
//!   empty list.

pub mod duckduckgo;

pub use duckduckgo::DuckDuckGoProvider;

use async_trait::async_trait;
use hueguide_core::Error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Substrings marking results that are not readable articles.
pub const DEFAULT_DENYLIST: &[&str] = &[".pdf", "facebook", "youtube", "instagram", "shopee", "tiki"];

/// A ranked search hit as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// 1-indexed rank within the provider's answer.
    pub rank: usize,
}

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `query`, asking for up to `count` hits.
    ///
    /// `region` is a `region-language` hint such as `vn-vi`.
    async fn search(&self, query: &str, count: usize, region: &str) -> Result<Vec<SearchHit>, Error>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Topical search client with denylist filtering.
#[derive(Clone)]
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
    qualifier: String,
    region: String,
    denylist: Vec<String>,
}

impl SearchClient {
    /// Create a search client using the default denylist.
    pub fn new(provider: Arc<dyn SearchProvider>, qualifier: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            provider,
            qualifier: qualifier.into(),
            region: region.into(),
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the denylist. Entries are matched case-insensitively.
    pub fn with_denylist(mut self, denylist: Vec<String>) -> Self {
        self.denylist = denylist.into_iter().map(|s| s.to_lowercase()).collect();
        self
    }

    /// The query actually sent to the provider.
    pub fn qualified_query(&self, question: &str) -> String {
        format!("{} {}", question.trim(), self.qualifier)
    }

    /// Whether a URL is excluded by the denylist.
    pub fn is_blocked(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.denylist.iter().any(|bad| lower.contains(bad.as_str()))
    }

    /// Search and return up to `max_results` filtered hits in provider order.
    pub async fn try_search_hits(&self, question: &str, max_results: usize) -> Result<Vec<SearchHit>, Error> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let query = self.qualified_query(question);
        tracing::debug!(provider = self.provider.name(), query = %query, "searching");

        let hits = self.provider.search(&query, max_results * 2, &self.region).await?;
        let total = hits.len();

        let mut kept = Vec::with_capacity(max_results);
        for hit in hits {
            if !self.is_blocked(&hit.url) {
                kept.push(hit);
            }
            if kept.len() >= max_results {
                break;
            }
        }

        tracing::debug!(received = total, kept = kept.len(), "search results filtered");
        Ok(kept)
    }

    /// Search and return up to `max_results` filtered URLs.
    pub async fn try_search(&self, question: &str, max_results: usize) -> Result<Vec<String>, Error> {
        let hits = self.try_search_hits(question, max_results).await?;
        Ok(hits.into_iter().map(|h| h.url).collect())
    }

    /// Fail-soft search: provider errors are logged and yield no URLs.
    pub async fn search(&self, question: &str, max_results: usize) -> Vec<String> {
        match self.try_search(question, max_results).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider double that records requests and replays fixed hits.
    struct StubProvider {
        hits: Vec<SearchHit>,
        fail: bool,
        calls: AtomicUsize,
        requests: Mutex<Vec<(String, usize, String)>>,
    }

    impl StubProvider {
        fn with_urls(urls: &[&str]) -> Self {
            let hits = urls
                .iter()
                .enumerate()
                .map(|(i, u)| SearchHit {
                    title: format!("Result {}", i + 1),
                    url: u.to_string(),
                    snippet: format!("snippet {}", i + 1),
                    rank: i + 1,
                })
                .collect();
            Self { hits, fail: false, calls: AtomicUsize::new(0), requests: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { fail: true, ..Self::with_urls(&[]) }
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        async fn search(&self, query: &str, count: usize, region: &str) -> Result<Vec<SearchHit>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .unwrap()
                .push((query.to_string(), count, region.to_string()));
            if self.fail {
                return Err(Error::SearchFailed("stub provider down".into()));
            }
            Ok(self.hits.iter().take(count).cloned().collect())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn client(provider: Arc<StubProvider>) -> SearchClient {
        SearchClient::new(provider, "Huế, Việt Nam", "vn-vi")
    }

    #[tokio::test]
    async fn test_qualifier_and_double_count() {
        let provider = Arc::new(StubProvider::with_urls(&["https://a.vn/1"]));
        let client = client(provider.clone());

        client.search("Đại Nội", 2).await;

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "Đại Nội Huế, Việt Nam");
        assert_eq!(requests[0].1, 4);
        assert_eq!(requests[0].2, "vn-vi");
    }

    #[tokio::test]
    async fn test_denylist_filtering_case_insensitive() {
        let provider = Arc::new(StubProvider::with_urls(&[
            "https://www.FACEBOOK.com/hue",
            "https://example.vn/guide.PDF",
            "https://dulich.vn/hue",
            "https://m.YouTube.com/watch?v=1",
            "https://shopee.vn/non-la",
            "https://baochinhphu.vn/hue",
        ]));
        let client = client(provider);

        let urls = client.search("nón lá", 5).await;
        assert_eq!(urls, vec!["https://dulich.vn/hue".to_string(), "https://baochinhphu.vn/hue".to_string()]);
        for url in &urls {
            for bad in DEFAULT_DENYLIST {
                assert!(!url.to_lowercase().contains(bad));
            }
        }
    }

    #[tokio::test]
    async fn test_never_more_than_max_results() {
        let provider = Arc::new(StubProvider::with_urls(&[
            "https://a.vn/1",
            "https://b.vn/2",
            "https://c.vn/3",
            "https://d.vn/4",
        ]));
        let client = client(provider);

        assert_eq!(client.search("q", 2).await, vec!["https://a.vn/1".to_string(), "https://b.vn/2".to_string()]);
        assert_eq!(client.search("q", 1).await.len(), 1);
        assert!(client.search("q", 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_fewer_usable_results() {
        let provider = Arc::new(StubProvider::with_urls(&["https://tiki.vn/x", "https://a.vn/1"]));
        let client = client(provider);

        assert_eq!(client.search("q", 2).await, vec!["https://a.vn/1".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_is_soft() {
        let provider = Arc::new(StubProvider::failing());
        let client = client(provider.clone());

        assert!(client.search("q", 2).await.is_empty());
        assert!(matches!(client.try_search("q", 2).await, Err(Error::SearchFailed(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_custom_denylist() {
        let provider = Arc::new(StubProvider::with_urls(&[]));
        let client = client(provider).with_denylist(vec!["Wikipedia".into()]);
        assert!(client.is_blocked("https://vi.wikipedia.org/wiki/Huế"));
        assert!(!client.is_blocked("https://facebook.com/hue"));
    }
}
