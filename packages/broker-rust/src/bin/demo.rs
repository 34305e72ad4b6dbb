//! End-to-end demo: broker + in-process worker with the stub provider.
//!
//! Runs each of the four operations once and logs the typed results.
//! `RUST_LOG=debug` shows the dispatch and routing internals.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use veracity_broker::worker::{InProcessHost, StubAnalysisProvider};
use veracity_broker::{Broker, BrokerConfig};
use veracity_core::types::ExtractOptions;

#[derive(Debug, Parser)]
#[command(name = "veracity-demo", about = "Exercise the analysis request broker")]
struct Args {
    /// Deadline for each pending request, in milliseconds.
    #[arg(long, env = "VERACITY_TIMEOUT_MS", default_value_t = 30_000)]
    timeout_ms: u64,

    /// Simulated worker latency, in milliseconds.
    #[arg(long, env = "VERACITY_WORKER_DELAY_MS", default_value_t = 100)]
    worker_delay_ms: u64,

    /// Text fed to the analysis operations.
    #[arg(
        long,
        default_value = "You won't believe what this quiet coastal town is hiding."
    )]
    text: String,

    /// URL attributed to the extracted article.
    #[arg(long, default_value = "https://example.com/story")]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = BrokerConfig {
        response_timeout_ms: args.timeout_ms,
        ..BrokerConfig::default()
    };

    let provider = StubAnalysisProvider::new(Duration::from_millis(args.worker_delay_ms));
    let host = Arc::new(InProcessHost::new(provider, config.worker_queue_capacity));
    let broker = Broker::new(Arc::clone(&host), &config);
    host.attach_router(broker.router());

    info!(instance = broker.instance_id(), "broker ready");

    let html = format!("<article><p>{}</p></article>", args.text);
    let article = broker
        .extract_article(&html, &args.url, ExtractOptions::default())
        .await?;
    info!(words = article.word_count, url = %article.url, "extracted article");

    let sentiment = broker.analyze_sentiment(&args.text).await?;
    info!(score = sentiment.score, label = ?sentiment.label, "sentiment");

    let clickbait = broker.analyze_clickbait(&args.text).await?;
    info!(score = clickbait.score, flagged = clickbait.is_clickbait, "clickbait");

    let complexity = broker.analyze_complexity(&args.text).await?;
    info!(
        score = complexity.score,
        avg_sentence_length = complexity.avg_sentence_length,
        "complexity"
    );

    broker.close().await;
    Ok(())
}
