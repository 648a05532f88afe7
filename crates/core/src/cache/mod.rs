//! In-memory search cache.
//!
//! Maps a query string (exact match) to the URL list produced by one
//! successful search. The cache lives as long as the pipeline that owns it;
//! there is no TTL and no eviction.
//!
//! ### Concurrency
//! The presence check and the store each take the lock, but the search itself
//! runs unlocked. Two concurrent misses for the same query both search, and the
//! later store overwrites the earlier one with an equivalent value
//! (at-least-once search, idempotent write).

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Query string to URL list memo table.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl QueryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached URLs for `query`, or run `fetcher` and cache its result.
    ///
    /// Failed fetches are returned to the caller and not cached, so the next
    /// call for the same query searches again.
    pub async fn get_or_fetch<F, Fut, E>(&self, query: &str, fetcher: F) -> Result<Vec<String>, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Vec<String>, E>>,
    {
        if let Some(urls) = self.get(query) {
            tracing::debug!(query, "search cache hit");
            return Ok(urls);
        }

        let urls = fetcher(query.to_string()).await?;
        self.put(query, urls.clone());
        Ok(urls)
    }

    /// Look up a query without fetching.
    pub fn get(&self, query: &str) -> Option<Vec<String>> {
        self.lock().get(query).cloned()
    }

    /// Store the URL list for a query, replacing any previous entry.
    pub fn put(&self, query: &str, urls: Vec<String>) {
        self.lock().insert(query.to_string(), urls);
    }

    /// Number of cached queries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<String>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
