//! Pluggable analysis strategy.
//!
//! The credibility heuristics themselves are replaceable policy, not part of
//! the broker. Real deployments implement [`AnalysisProvider`] over whatever
//! scoring backend they use; [`StubAnalysisProvider`] stands in for the
//! original system's fixed-delay mocked scoring calls -- injected here rather
//! than hardcoded into the broker.

use std::time::Duration;

use async_trait::async_trait;
use veracity_core::types::{
    Article, ClickbaitResult, ComplexityResult, ExtractArticleRequest, SentimentLabel,
    SentimentResult,
};

/// Strategy interface the worker runtime executes operations against.
#[async_trait]
pub trait AnalysisProvider: Send + Sync + 'static {
    /// Extracts the main article content from a page.
    async fn extract_article(&self, request: ExtractArticleRequest) -> anyhow::Result<Article>;

    /// Scores the sentiment polarity of a text.
    async fn analyze_sentiment(&self, text: &str) -> anyhow::Result<SentimentResult>;

    /// Scores how clickbait-like a text reads.
    async fn analyze_clickbait(&self, text: &str) -> anyhow::Result<ClickbaitResult>;

    /// Scores the reading complexity of a text.
    async fn analyze_complexity(&self, text: &str) -> anyhow::Result<ComplexityResult>;
}

/// Deterministic stand-in for the real scoring backend.
///
/// Produces input-derived counts with fixed scores after a configurable
/// delay, mimicking the latency profile of the external calls it replaces.
#[derive(Debug, Clone)]
pub struct StubAnalysisProvider {
    /// Simulated per-operation latency.
    pub delay: Duration,
}

impl StubAnalysisProvider {
    /// Creates a stub with the given simulated latency.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for StubAnalysisProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

#[async_trait]
impl AnalysisProvider for StubAnalysisProvider {
    async fn extract_article(&self, request: ExtractArticleRequest) -> anyhow::Result<Article> {
        tokio::time::sleep(self.delay).await;
        let mut text = request.html;
        if let Some(max) = request.options.max_text_length {
            text.truncate(max);
        }
        let word_count = text.split_whitespace().count();
        Ok(Article {
            title: None,
            byline: None,
            raw_content: request.options.include_raw_content.then(|| text.clone()),
            text,
            url: request.url,
            site_name: None,
            word_count,
        })
    }

    async fn analyze_sentiment(&self, text: &str) -> anyhow::Result<SentimentResult> {
        tokio::time::sleep(self.delay).await;
        Ok(SentimentResult {
            score: 0.0,
            label: SentimentLabel::Neutral,
            word_count: text.split_whitespace().count(),
        })
    }

    async fn analyze_clickbait(&self, text: &str) -> anyhow::Result<ClickbaitResult> {
        tokio::time::sleep(self.delay).await;
        let _ = text;
        Ok(ClickbaitResult {
            score: 0.5,
            is_clickbait: false,
            signals: Vec::new(),
        })
    }

    async fn analyze_complexity(&self, text: &str) -> anyhow::Result<ComplexityResult> {
        tokio::time::sleep(self.delay).await;
        let words = text.split_whitespace().count();
        let sentences = text.split(['.', '!', '?']).filter(|s| !s.trim().is_empty()).count();
        #[allow(clippy::cast_precision_loss)]
        let avg_sentence_length = if sentences == 0 {
            0.0
        } else {
            words as f64 / sentences as f64
        };
        Ok(ComplexityResult {
            score: 0.5,
            grade_level: "unrated".to_string(),
            avg_sentence_length,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
