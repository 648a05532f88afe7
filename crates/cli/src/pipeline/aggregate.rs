//! Parallel fetch-and-extract over a batch of URLs.
//!
//! Every URL is submitted up front; a semaphore bounds how many run at once.
//! Results are consumed in completion order until one of:
//! - all tasks have finished
//! - the batch deadline passes
//! - the combined text grows past `max_combined_chars`
//!
//! Whatever is still queued or in flight at that point is aborted and its
//! result discarded.

use hueguide_client::PageExtractor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Separator placed after every accepted document.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Tuning for [`FetchAggregator`].
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Simultaneous fetches (default: 5)
    pub max_concurrency: usize,
    /// Wall-clock budget for the whole batch (default: 8s)
    pub deadline: Duration,
    /// A document counts only if its trimmed text is longer than this (default: 50)
    pub min_usable_chars: usize,
    /// Collection stops once the combined text exceeds this (default: 5000)
    pub max_combined_chars: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self { max_concurrency: 5, deadline: Duration::from_secs(8), min_usable_chars: 50, max_combined_chars: 5000 }
    }
}

/// What one batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Accepted documents in completion order, each followed by a blank line.
    pub text: String,
    pub succeeded: usize,
    pub attempted: usize,
    /// The deadline cut collection short.
    pub timed_out: bool,
}

impl AggregateReport {
    /// Whether no document cleared the usable threshold.
    pub fn is_empty(&self) -> bool {
        self.succeeded == 0
    }
}

/// Fetches a batch of URLs concurrently and merges their text.
#[derive(Clone)]
pub struct FetchAggregator {
    extractor: Arc<dyn PageExtractor>,
    config: AggregateConfig,
}

impl FetchAggregator {
    pub fn new(extractor: Arc<dyn PageExtractor>, config: AggregateConfig) -> Self {
        Self { extractor, config }
    }

    /// Fetch `urls` and return the combined usable text.
    pub async fn aggregate(&self, urls: &[String]) -> AggregateReport {
        let mut report = AggregateReport { attempted: urls.len(), ..Default::default() };
        if urls.is_empty() {
            return report;
        }

        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.deadline;
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        let mut join_set = JoinSet::new();
        for url in urls {
            let semaphore = semaphore.clone();
            let extractor = self.extractor.clone();
            let url = url.clone();

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (url, None);
                };
                let outcome = extractor.extract(&url).await;
                (url, Some(outcome))
            });
        }

        let mut combined_chars = 0usize;

        loop {
            let joined = match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break,
                Err(_) => {
                    report.timed_out = true;
                    tracing::warn!(
                        deadline_ms = self.config.deadline.as_millis() as u64,
                        succeeded = report.succeeded,
                        total = report.attempted,
                        "fetch deadline reached, keeping partial results"
                    );
                    break;
                }
            };

            let (url, outcome) = match joined {
                Ok((url, Some(outcome))) => (url, outcome),
                Ok((url, None)) => {
                    tracing::debug!(url = %url, "fetch task never started");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "fetch task failed");
                    continue;
                }
            };

            let text = outcome.text();
            if text.trim().chars().count() <= self.config.min_usable_chars {
                tracing::debug!(url = %url, "discarding unusable page");
                continue;
            }

            report.text.push_str(text);
            report.text.push_str(DOCUMENT_SEPARATOR);
            combined_chars += text.chars().count() + DOCUMENT_SEPARATOR.len();
            report.succeeded += 1;
            tracing::info!("extracted {}/{} pages", report.succeeded, report.attempted);

            if combined_chars > self.config.max_combined_chars {
                tracing::debug!(chars = combined_chars, "enough content collected");
                break;
            }
        }

        join_set.abort_all();

        tracing::debug!(
            succeeded = report.succeeded,
            total = report.attempted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetch batch finished"
        );

        report
    }
}
