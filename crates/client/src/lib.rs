//! Client code for hueguide.
//!
//! This crate provides the adapters for every external service the answer
//! pipeline talks to (web search, page fetch, text generation) together with
//! the pure HTML-to-text extraction they feed.

pub mod brave;
pub mod extract;
pub mod fetch;
pub mod gemini;
pub mod generate;
pub mod search;

pub use brave::{BraveClient, BraveConfig, BraveError};
pub use extract::{ContentExtractor, ExtractConfig, ExtractStrategy, FetchOutcome, PageExtractor, extract_text};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use gemini::{GeminiClient, GeminiConfig, GeminiError};
pub use generate::{DecodingParams, GenerationRequest, TextGenerator};
pub use search::{DuckDuckGoProvider, SearchClient, SearchHit, SearchProvider};
