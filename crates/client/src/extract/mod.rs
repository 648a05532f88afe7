//! Heuristic article-text extraction.
//!
//! ### Algorithm
//! 1. Fetch the page with the shared [`FetchClient`].
//! 2. Ignore structural noise (`script`, `style`, `nav`, `header`, `footer`, `aside`).
//! 3. Try each content-region selector in order; the first region found
//!    supplies the text.
//! 4. If no region matched, or its text is shorter than `min_region_chars`,
//!    use the whole page's visible text instead.
//! 5. Cut to `max_chars` characters plus a truncation marker.
//!
//! ### Failure
//! Extraction never fails outward: fetch and parse problems become
//! [`FetchOutcome::Failed`], blank pages become [`FetchOutcome::Empty`].

pub mod text;

use async_trait::async_trait;
use hueguide_core::Error;
use scraper::{Html, Selector};

use crate::fetch::FetchClient;

pub use text::{inside_stripped, truncate_chars, visible_text};

/// Content-region selectors, most specific first.
pub const DEFAULT_SELECTORS: &[&str] = &[
    "article",
    ".article-content",
    ".content",
    ".post-content",
    ".entry-content",
    ".main-content",
    "main",
    ".article-body",
];

/// Elements whose text is never part of the article.
pub const DEFAULT_STRIP_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// One way of locating the article text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractStrategy {
    /// Text of the first element matching a CSS selector.
    Region(String),
    /// Visible text of the whole page.
    FullPage,
}

/// Configuration for content extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Content-region selectors tried in order.
    pub selectors: Vec<String>,
    /// Element names skipped entirely.
    pub strip_tags: Vec<String>,
    /// Region text shorter than this falls back to the full page (default: 100)
    pub min_region_chars: usize,
    /// Maximum characters kept per document (default: 2000)
    pub max_chars: usize,
    /// Appended when a document is cut (default: "...")
    pub truncation_marker: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            strip_tags: DEFAULT_STRIP_TAGS.iter().map(|s| s.to_string()).collect(),
            min_region_chars: 100,
            max_chars: 2000,
            truncation_marker: "...".to_string(),
        }
    }
}

impl ExtractConfig {
    /// The strategy chain: every region selector, then the full page.
    pub fn strategies(&self) -> Vec<ExtractStrategy> {
        self.selectors
            .iter()
            .cloned()
            .map(ExtractStrategy::Region)
            .chain(std::iter::once(ExtractStrategy::FullPage))
            .collect()
    }

    /// Longest text [`extract_text`] can return.
    pub fn max_output_chars(&self) -> usize {
        self.max_chars + self.truncation_marker.chars().count()
    }
}

/// Result of extracting one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Usable text and its length in characters.
    Success { text: String, length: usize },
    /// The page loaded but had no visible text.
    Empty,
    /// Fetching or parsing failed.
    Failed(String),
}

impl FetchOutcome {
    /// Classify extracted text.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            FetchOutcome::Empty
        } else {
            let length = text.chars().count();
            FetchOutcome::Success { text, length }
        }
    }

    /// The extracted text, or `""` for anything but success.
    pub fn text(&self) -> &str {
        match self {
            FetchOutcome::Success { text, .. } => text,
            FetchOutcome::Empty | FetchOutcome::Failed(_) => "",
        }
    }
}

impl From<Error> for FetchOutcome {
    fn from(err: Error) -> Self {
        FetchOutcome::Failed(err.to_string())
    }
}

/// Turns a URL into article text.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Extract article text from `url`. Never fails outward.
    async fn extract(&self, url: &str) -> FetchOutcome;
}

/// Extract article text from an HTML string.
pub fn extract_text(html: &str, config: &ExtractConfig) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    for strategy in config.strategies() {
        match strategy {
            ExtractStrategy::Region(selector) => {
                let Ok(sel) = Selector::parse(&selector) else {
                    tracing::debug!(selector = %selector, "skipping unparsable selector");
                    continue;
                };
                let region = document
                    .select(&sel)
                    .find(|el| !inside_stripped(*el, &config.strip_tags));
                if let Some(region) = region {
                    text = visible_text(region, &config.strip_tags);
                    if text.chars().count() >= config.min_region_chars {
                        break;
                    }
                    // First region found but too thin: go straight to the page.
                    text = visible_text(document.root_element(), &config.strip_tags);
                    break;
                }
            }
            ExtractStrategy::FullPage => {
                text = visible_text(document.root_element(), &config.strip_tags);
            }
        }
    }

    truncate_chars(&text, config.max_chars, &config.truncation_marker)
}

/// Fetches pages and extracts their article text.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    fetch: FetchClient,
    config: ExtractConfig,
}

impl ContentExtractor {
    pub fn new(fetch: FetchClient, config: ExtractConfig) -> Self {
        Self { fetch, config }
    }
}

#[async_trait]
impl PageExtractor for ContentExtractor {
    async fn extract(&self, url: &str) -> FetchOutcome {
        match self.fetch.fetch(url).await {
            Ok(response) => {
                let outcome = FetchOutcome::from_text(extract_text(&response.text(), &self.config));
                tracing::debug!(url, chars = outcome.text().chars().count(), "extracted");
                outcome
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "extraction failed");
                e.into()
            }
        }
    }
}
