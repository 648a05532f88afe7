//! hueguide entry point.
//!
//! Runs an interactive Huế culture guide on stdin/stdout.
//! Logging goes to stderr so it never interleaves with the conversation.

use anyhow::Result;
use hueguide_client::{
    BraveClient, BraveConfig, ContentExtractor, DuckDuckGoProvider, ExtractConfig, FetchClient, FetchConfig,
    GeminiClient, GeminiConfig, SearchClient, SearchProvider,
};
use hueguide_core::{AppConfig, Strategy};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod pipeline;
mod session;

use pipeline::{AggregateConfig, AnswerGenerator, FetchAggregator, RagPipeline, Responder, SnippetPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(config.log_json);
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    tracing::info!(strategy = ?config.strategy, model = %config.gemini_model, "starting hueguide");

    let responder = build_responder(&config)?;
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        result = session::run_session(responder, stdin, &mut stdout) => {
            let summary = result?;
            tracing::info!(
                questions = summary.questions,
                answered = summary.answered,
                failed = summary.failed_turns,
                "session finished"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(format!("\n\n{}\n", session::FAREWELL).as_bytes()).await?;
            stdout.flush().await?;
            // A pending stdin read would keep the runtime from shutting down.
            std::process::exit(0);
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,hueguide=info"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

fn build_search(config: &AppConfig) -> Result<SearchClient> {
    let provider: Arc<dyn SearchProvider> = match config.brave_api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(api_key) => Arc::new(BraveClient::new(BraveConfig {
            api_key: api_key.to_string(),
            timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
            ..Default::default()
        })?),
        None => Arc::new(DuckDuckGoProvider::new(config.request_timeout(), &config.user_agent)?),
    };

    tracing::info!(provider = provider.name(), "search provider ready");
    Ok(SearchClient::new(provider, config.topic_qualifier.clone(), config.search_region.clone()))
}

fn build_answerer(config: &AppConfig) -> Result<AnswerGenerator> {
    let gemini = GeminiClient::new(GeminiConfig {
        api_key: config.require_gemini_api_key()?.to_string(),
        model: config.gemini_model.clone(),
        base_url: config.gemini_base_url.clone(),
        timeout: config.generation_timeout(),
    })?;

    Ok(AnswerGenerator::new(Arc::new(gemini)))
}

fn build_responder(config: &AppConfig) -> Result<Arc<Mutex<dyn Responder>>> {
    let answerer = build_answerer(config)?;
    let search = build_search(config)?;

    let responder: Arc<Mutex<dyn Responder>> = match config.strategy {
        Strategy::Fetch => {
            let fetch = FetchClient::new(FetchConfig {
                user_agent: config.user_agent.clone(),
                timeout: config.fetch_timeout(),
                ..Default::default()
            })?;
            let extractor = Arc::new(ContentExtractor::new(fetch, ExtractConfig::default()));
            let aggregator = FetchAggregator::new(extractor, AggregateConfig::default());
            Arc::new(Mutex::new(RagPipeline::new(
                search,
                aggregator,
                answerer,
                config.max_search_results,
                config.max_history,
            )))
        }
        Strategy::Snippets => Arc::new(Mutex::new(SnippetPipeline::new(search, answerer, config.max_history))),
    };

    Ok(responder)
}
