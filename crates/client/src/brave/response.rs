//! Brave Search API response types and normalization.

use scraper::Html;
use serde::Deserialize;

use crate::search::SearchHit;

/// Raw response from Brave Web Search API.
#[derive(Debug, Deserialize)]
pub struct BraveApiResponse {
    #[serde(default)]
    pub web: Option<WebResults>,
}

/// Web search results container.
#[derive(Debug, Deserialize)]
pub struct WebResults {
    pub results: Vec<WebResult>,
}

/// Individual web search result from Brave.
#[derive(Debug, Deserialize)]
pub struct WebResult {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl BraveApiResponse {
    /// Convert into provider-neutral hits, ranked from 1.
    pub fn into_hits(self) -> Vec<SearchHit> {
        self.web
            .map(|w| {
                w.results
                    .into_iter()
                    .enumerate()
                    .map(|(idx, r)| SearchHit {
                        title: plain_text(&r.title),
                        url: r.url,
                        snippet: plain_text(&r.description),
                        rank: idx + 1,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Brave wraps matched terms in `<strong>` and escapes entities.
fn plain_text(fragment: &str) -> String {
    if !fragment.contains(['<', '&']) {
        return fragment.to_string();
    }
    Html::parse_fragment(fragment).root_element().text().collect::<String>()
}
