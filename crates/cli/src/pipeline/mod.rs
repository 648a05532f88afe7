//! Question answering pipelines.
//!
//! ### Stages (fetch strategy)
//! 1. **Searching**: cached search for candidate URLs. None → [`NO_RESULTS_ANSWER`].
//! 2. **Extracting**: concurrent fetch of every URL. No usable text → [`NO_CONTENT_ANSWER`].
//! 3. **Generating**: grounded answer from the combined text plus recent history.
//!
//! The snippets strategy replaces stages 1-2 with the provider's own result
//! titles and snippets.
//!
//! Every turn, sentinel or not, is recorded in the history window.

pub mod aggregate;
pub mod answer;

pub use aggregate::{AggregateConfig, FetchAggregator};
pub use answer::AnswerGenerator;

use async_trait::async_trait;
use hueguide_client::{SearchClient, SearchHit};
use hueguide_core::{HistoryTurn, HistoryWindow, QueryCache};
use std::time::{Duration, Instant};

/// Answer when the search produced no usable URLs.
pub const NO_RESULTS_ANSWER: &str = "no information found";

/// Answer when no page yielded usable text.
pub const NO_CONTENT_ANSWER: &str = "could not extract information";

/// Hits used as context by the snippets strategy.
pub const SNIPPET_HITS: usize = 5;

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Answered,
    NoResults,
    NoContent,
}

/// Wall-clock time spent in each stage. Skipped stages stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub search: Duration,
    pub extract: Duration,
    pub generate: Duration,
    pub total: Duration,
}

/// The answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub answer: String,
    pub outcome: Outcome,
    pub timings: StageTimings,
}

impl Reply {
    fn no_results(timings: StageTimings) -> Self {
        Self { answer: NO_RESULTS_ANSWER.to_string(), outcome: Outcome::NoResults, timings }
    }

    fn no_content(timings: StageTimings) -> Self {
        Self { answer: NO_CONTENT_ANSWER.to_string(), outcome: Outcome::NoContent, timings }
    }
}

/// Anything that can hold a conversation.
#[async_trait]
pub trait Responder: Send {
    /// Answer `question` and record the turn. Never fails.
    async fn ask(&mut self, question: &str) -> Reply;
}

/// Search, fetch and extract pages, then generate.
pub struct RagPipeline {
    search: SearchClient,
    cache: QueryCache,
    aggregator: FetchAggregator,
    answerer: AnswerGenerator,
    history: HistoryWindow,
    max_search_results: usize,
    max_history: usize,
}

impl RagPipeline {
    pub fn new(
        search: SearchClient, aggregator: FetchAggregator, answerer: AnswerGenerator, max_search_results: usize,
        max_history: usize,
    ) -> Self {
        Self {
            search,
            cache: QueryCache::new(),
            aggregator,
            answerer,
            history: HistoryWindow::new(),
            max_search_results,
            max_history,
        }
    }

    /// Cached URL search. Failures are logged, not cached, and read as no results.
    async fn search_urls(&self, question: &str) -> Vec<String> {
        let search = &self.search;
        let max = self.max_search_results;

        let result = self
            .cache
            .get_or_fetch(question, move |query| async move { search.try_search(&query, max).await })
            .await;

        match result {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                Vec::new()
            }
        }
    }

    async fn run(&self, question: &str) -> Reply {
        let started = Instant::now();
        let mut timings = StageTimings::default();

        let stage = Instant::now();
        let urls = self.search_urls(question).await;
        timings.search = stage.elapsed();
        tracing::info!(urls = urls.len(), elapsed_ms = millis(timings.search), "search stage done");

        if urls.is_empty() {
            timings.total = started.elapsed();
            return Reply::no_results(timings);
        }

        let stage = Instant::now();
        let report = self.aggregator.aggregate(&urls).await;
        timings.extract = stage.elapsed();
        tracing::info!(
            succeeded = report.succeeded,
            total = report.attempted,
            timed_out = report.timed_out,
            elapsed_ms = millis(timings.extract),
            "extract stage done"
        );

        if report.is_empty() {
            timings.total = started.elapsed();
            return Reply::no_content(timings);
        }

        let stage = Instant::now();
        let history = self.history.render(self.max_history);
        let answer = self.answerer.generate(question, &report.text, &history).await;
        timings.generate = stage.elapsed();
        timings.total = started.elapsed();
        tracing::info!(
            elapsed_ms = millis(timings.generate),
            total_ms = millis(timings.total),
            "generate stage done"
        );

        Reply { answer, outcome: Outcome::Answered, timings }
    }
}

#[async_trait]
impl Responder for RagPipeline {
    async fn ask(&mut self, question: &str) -> Reply {
        let reply = self.run(question).await;
        self.history.append(HistoryTurn::new(question, reply.answer.clone()));
        reply
    }
}

/// Answer from search-result snippets without fetching pages.
pub struct SnippetPipeline {
    search: SearchClient,
    answerer: AnswerGenerator,
    history: HistoryWindow,
    max_history: usize,
}

impl SnippetPipeline {
    pub fn new(search: SearchClient, answerer: AnswerGenerator, max_history: usize) -> Self {
        Self { search, answerer, history: HistoryWindow::new(), max_history }
    }

    async fn run(&self, question: &str) -> Reply {
        let started = Instant::now();
        let mut timings = StageTimings::default();

        let stage = Instant::now();
        let hits = match self.search.try_search_hits(question, SNIPPET_HITS).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                Vec::new()
            }
        };
        timings.search = stage.elapsed();
        tracing::info!(hits = hits.len(), elapsed_ms = millis(timings.search), "search stage done");

        if hits.is_empty() {
            timings.total = started.elapsed();
            return Reply::no_results(timings);
        }

        let context = snippet_context(&hits);
        if context.trim().is_empty() {
            timings.total = started.elapsed();
            return Reply::no_content(timings);
        }

        let stage = Instant::now();
        let history = self.history.render(self.max_history);
        let answer = self.answerer.generate(question, &context, &history).await;
        timings.generate = stage.elapsed();
        timings.total = started.elapsed();
        tracing::info!(
            elapsed_ms = millis(timings.generate),
            total_ms = millis(timings.total),
            "generate stage done"
        );

        Reply { answer, outcome: Outcome::Answered, timings }
    }
}

#[async_trait]
impl Responder for SnippetPipeline {
    async fn ask(&mut self, question: &str) -> Reply {
        let reply = self.run(question).await;
        self.history.append(HistoryTurn::new(question, reply.answer.clone()));
        reply
    }
}

/// `title: snippet` blocks for hits that carry any text.
fn snippet_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .filter_map(|hit| {
            let title = hit.title.trim();
            let snippet = hit.snippet.trim();
            match (title.is_empty(), snippet.is_empty()) {
                (true, true) => None,
                (false, true) => Some(title.to_string()),
                (true, false) => Some(snippet.to_string()),
                (false, false) => Some(format!("{title}: {snippet}")),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use hueguide_client::{FetchOutcome, GenerationRequest, PageExtractor, SearchProvider, TextGenerator};
    use hueguide_core::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct StubSearch {
        hits: Vec<SearchHit>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubSearch {
        fn with_urls(urls: &[&str]) -> Arc<Self> {
            let hits = urls
                .iter()
                .enumerate()
                .map(|(i, u)| SearchHit {
                    title: format!("Bài {}", i + 1),
                    url: u.to_string(),
                    snippet: format!("Tóm tắt {}", i + 1),
                    rank: i + 1,
                })
                .collect();
            Arc::new(Self { hits, fail: false, calls: AtomicUsize::new(0) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { hits: Vec::new(), fail: true, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str, count: usize, _region: &str) -> Result<Vec<SearchHit>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::SearchFailed("stub outage".into()));
            }
            Ok(self.hits.iter().take(count).cloned().collect())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    /// Every URL yields the same text.
    struct StubExtractor {
        text: String,
    }

    #[async_trait]
    impl PageExtractor for StubExtractor {
        async fn extract(&self, url: &str) -> FetchOutcome {
            FetchOutcome::from_text(format!("{url} {}", self.text))
        }
    }

    struct StubGenerator {
        fail: bool,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self { fail, calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, Error> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.prompts.lock().unwrap().push(request.prompt.clone());
            if self.fail {
                return Err(Error::GenerationFailed("upstream 500: model overloaded".into()));
            }
            Ok(format!("answer {n}"))
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn rag(search: Arc<StubSearch>, page_text: &str, generator: Arc<StubGenerator>, max_history: usize) -> RagPipeline {
        let client = SearchClient::new(search, "Huế, Việt Nam", "vn-vi");
        let extractor = Arc::new(StubExtractor { text: page_text.to_string() });
        let aggregator = FetchAggregator::new(extractor, AggregateConfig::default());
        RagPipeline::new(client, aggregator, AnswerGenerator::new(generator), 2, max_history)
    }

    fn long_text() -> String {
        "Kinh thành Huế được xây dựng dưới triều Nguyễn. ".repeat(4)
    }

    #[tokio::test]
    async fn test_no_results_skips_generation() {
        let generator = StubGenerator::new(false);
        let mut pipeline = rag(StubSearch::with_urls(&[]), &long_text(), generator.clone(), 5);

        let reply = pipeline.ask("Lăng Khải Định?").await;

        assert_eq!(reply.answer, NO_RESULTS_ANSWER);
        assert_eq!(reply.outcome, Outcome::NoResults);
        assert_eq!(reply.timings.generate, Duration::ZERO);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_unusable_pages_skip_generation() {
        let generator = StubGenerator::new(false);
        let search = StubSearch::with_urls(&["https://a.vn", "https://b.vn"]);
        let mut pipeline = rag(search, "", generator.clone(), 5);

        let reply = pipeline.ask("Chợ Đông Ba?").await;

        assert_eq!(reply.answer, NO_CONTENT_ANSWER);
        assert_eq!(reply.outcome, Outcome::NoContent);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_answered_uses_page_text() {
        let generator = StubGenerator::new(false);
        let search = StubSearch::with_urls(&["https://a.vn/dai-noi"]);
        let mut pipeline = rag(search, &long_text(), generator.clone(), 5);

        let reply = pipeline.ask("Đại Nội xây khi nào?").await;

        assert_eq!(reply.outcome, Outcome::Answered);
        assert_eq!(reply.answer, "answer 1");
        let prompt = generator.last_prompt();
        assert!(prompt.contains("https://a.vn/dai-noi Kinh thành Huế"));
        assert!(prompt.contains("QUESTION: Đại Nội xây khi nào?"));
        assert_eq!(pipeline.history.len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_is_an_answer() {
        let generator = StubGenerator::new(true);
        let search = StubSearch::with_urls(&["https://a.vn"]);
        let mut pipeline = rag(search, &long_text(), generator.clone(), 5);

        let reply = pipeline.ask("Nhã nhạc là gì?").await;
        assert!(reply.answer.contains("model overloaded"));
        assert_eq!(reply.outcome, Outcome::Answered);

        // Still usable afterwards.
        let reply = pipeline.ask("Còn ca Huế?").await;
        assert!(reply.answer.contains("model overloaded"));
        assert_eq!(pipeline.history.len(), 2);
    }

    #[tokio::test]
    async fn test_history_window_limits_prompt() {
        let generator = StubGenerator::new(false);
        let search = StubSearch::with_urls(&["https://a.vn"]);
        let mut pipeline = rag(search, &long_text(), generator.clone(), 2);

        pipeline.ask("first question").await;
        pipeline.ask("second question").await;
        pipeline.ask("third question").await;
        pipeline.ask("fourth question").await;

        let prompt = generator.last_prompt();
        assert!(!prompt.contains("first question"));
        assert!(!prompt.contains("answer 1"));
        assert!(prompt.contains("Q: second question A: answer 2 Q: third question A: answer 3"));
        assert_eq!(pipeline.history.len(), 4);
    }

    #[tokio::test]
    async fn test_repeat_question_hits_cache() {
        let generator = StubGenerator::new(false);
        let search = StubSearch::with_urls(&["https://a.vn"]);
        let mut pipeline = rag(search.clone(), &long_text(), generator, 5);

        pipeline.ask("Cầu Trường Tiền").await;
        pipeline.ask("Cầu Trường Tiền").await;
        pipeline.ask("Sông Hương").await;

        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_failure_is_retried_next_turn() {
        let generator = StubGenerator::new(false);
        let search = StubSearch::failing();
        let mut pipeline = rag(search.clone(), &long_text(), generator.clone(), 5);

        assert_eq!(pipeline.ask("Huế").await.answer, NO_RESULTS_ANSWER);
        assert_eq!(pipeline.ask("Huế").await.answer, NO_RESULTS_ANSWER);

        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_sentinel_turns_are_recorded() {
        let generator = StubGenerator::new(false);
        let mut pipeline = rag(StubSearch::with_urls(&[]), &long_text(), generator, 5);

        pipeline.ask("Lăng Gia Long?").await;

        let turns = pipeline.history.recent(1);
        assert_eq!(turns[0], HistoryTurn::new("Lăng Gia Long?", NO_RESULTS_ANSWER));
    }

    #[tokio::test]
    async fn test_snippet_pipeline_uses_hits() {
        let generator = StubGenerator::new(false);
        let search = StubSearch::with_urls(&["https://a.vn", "https://b.vn"]);
        let client = SearchClient::new(search, "Huế, Việt Nam", "vn-vi");
        let mut pipeline = SnippetPipeline::new(client, AnswerGenerator::new(generator.clone()), 5);

        let reply = pipeline.ask("Áo dài Huế?").await;

        assert_eq!(reply.outcome, Outcome::Answered);
        assert_eq!(reply.timings.extract, Duration::ZERO);
        assert!(generator.last_prompt().contains("Bài 1: Tóm tắt 1 Bài 2: Tóm tắt 2"));
        assert_eq!(pipeline.history.len(), 1);
    }

    #[tokio::test]
    async fn test_snippet_pipeline_no_results() {
        let generator = StubGenerator::new(false);
        let client = SearchClient::new(StubSearch::failing(), "Huế, Việt Nam", "vn-vi");
        let mut pipeline = SnippetPipeline::new(client, AnswerGenerator::new(generator.clone()), 5);

        assert_eq!(pipeline.ask("Huế").await.answer, NO_RESULTS_ANSWER);
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn test_snippet_context_skips_blank_hits() {
        let hit = |title: &str, snippet: &str| SearchHit {
            title: title.into(),
            url: "https://a.vn".into(),
            snippet: snippet.into(),
            rank: 1,
        };
        let context = snippet_context(&[hit("Chè Huế", ""), hit(" ", " "), hit("", "ngọt mát")]);
        assert_eq!(context, "Chè Huế\n\nngọt mát");
    }
}
