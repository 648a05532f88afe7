//! Brave Search API request types and validation.

use serde::Serialize;

use crate::brave::BraveError;

/// Search request parameters for Brave Web Search API.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SearchRequest {
    /// Search query (required, max 400 chars / 50 words).
    pub q: String,

    /// Number of results (1-20, default 20).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u8>,

    /// Country code (ISO 3166-1 alpha-2, e.g., "VN").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Content language (ISO 639-1, e.g., "vi").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_lang: Option<String>,
}

impl SearchRequest {
    /// Build a request from a query, a wanted count and a `region-language` hint.
    ///
    /// The count is clamped to the API's 1-20 range. Region hints that are not
    /// two dash-separated parts are ignored.
    pub fn for_region(q: &str, count: usize, region: &str) -> Self {
        let count = count.clamp(1, 20) as u8;
        let (country, search_lang) = match region.split_once('-') {
            Some((country, lang)) if !country.is_empty() && !lang.is_empty() => {
                (Some(country.to_uppercase()), Some(lang.to_lowercase()))
            }
            _ => (None, None),
        };

        Self { q: q.to_string(), count: Some(count), country, search_lang }
    }

    /// Validate the search request parameters.
    pub fn validate(&self) -> Result<(), BraveError> {
        if self.q.trim().is_empty() {
            return Err(BraveError::InvalidQuery("query cannot be empty".to_string()));
        }

        let chars = self.q.chars().count();
        if chars > 400 {
            return Err(BraveError::InvalidQuery(format!("query too long: {chars} chars (max 400)")));
        }

        let word_count = self.q.split_whitespace().count();
        if word_count > 50 {
            return Err(BraveError::InvalidQuery(format!("query too long: {word_count} words (max 50)")));
        }

        if let Some(count) = self.count
            && !(1..=20).contains(&count)
        {
            return Err(BraveError::InvalidCount(count));
        }

        Ok(())
    }
}
