//! Public operation facade.
//!
//! `Broker` wires the lifecycle manager, correlation table, dispatcher, and
//! response router together and exposes one typed entry point per worker
//! operation. Each entry point validates its inputs, delegates to the
//! dispatcher with a fixed action tag, and maps the generic JSON result into
//! the operation's typed shape. Dispatcher failures propagate unchanged.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use veracity_core::messages::Action;
use veracity_core::types::{
    Article, ClickbaitResult, ComplexityResult, ExtractArticleRequest, ExtractOptions,
    SentimentResult, TextRequest,
};

use super::correlation::CorrelationTable;
use super::dispatcher::Dispatcher;
use super::lifecycle::WorkerLifecycle;
use super::router::ResponseRouter;
use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::traits::WorkerHost;

/// Cross-context request broker for analysis work.
///
/// The sole public surface consumed by the annotator's UI and scoring layers.
pub struct Broker<H> {
    dispatcher: Dispatcher<H>,
    lifecycle: Arc<WorkerLifecycle<H>>,
    router: ResponseRouter,
    instance_id: String,
}

impl<H: WorkerHost> Broker<H> {
    /// Creates a broker over the given host capabilities.
    ///
    /// The worker context is not created here; it is provisioned lazily on
    /// the first dispatch.
    #[must_use]
    pub fn new(host: Arc<H>, config: &BrokerConfig) -> Self {
        let table = Arc::new(CorrelationTable::new());
        let lifecycle = Arc::new(WorkerLifecycle::new(Arc::clone(&host)));
        let router = ResponseRouter::new(Arc::clone(&table));
        let dispatcher = Dispatcher::new(
            host,
            Arc::clone(&lifecycle),
            table,
            Duration::from_millis(config.response_timeout_ms),
        );
        Self {
            dispatcher,
            lifecycle,
            router,
            instance_id: config.instance_id.clone(),
        }
    }

    /// The router the host integration feeds inbound messages into.
    ///
    /// Cheap clone; stable for the broker's lifetime.
    #[must_use]
    pub fn router(&self) -> ResponseRouter {
        self.router.clone()
    }

    /// This broker instance's identifier, as carried in log events.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Extracts the main article content from a page.
    ///
    /// # Errors
    ///
    /// Fails with [`BrokerError::InvalidInput`] when `html` or `url` is
    /// empty, without creating a worker context; otherwise propagates
    /// dispatcher failures unchanged.
    #[instrument(skip_all, fields(instance = %self.instance_id, url = %url))]
    pub async fn extract_article(
        &self,
        html: &str,
        url: &str,
        options: ExtractOptions,
    ) -> Result<Article, BrokerError> {
        require_non_empty("html", html)?;
        require_non_empty("url", url)?;
        self.call(
            Action::ExtractArticle,
            &ExtractArticleRequest {
                html: html.to_string(),
                url: url.to_string(),
                options,
            },
        )
        .await
    }

    /// Scores the sentiment polarity of a text.
    ///
    /// # Errors
    ///
    /// Fails with [`BrokerError::InvalidInput`] when `text` is empty;
    /// otherwise propagates dispatcher failures unchanged.
    #[instrument(skip_all, fields(instance = %self.instance_id))]
    pub async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult, BrokerError> {
        require_non_empty("text", text)?;
        self.call(Action::AnalyzeSentiment, &text_request(text)).await
    }

    /// Scores how clickbait-like a text reads.
    ///
    /// # Errors
    ///
    /// Fails with [`BrokerError::InvalidInput`] when `text` is empty;
    /// otherwise propagates dispatcher failures unchanged.
    #[instrument(skip_all, fields(instance = %self.instance_id))]
    pub async fn analyze_clickbait(&self, text: &str) -> Result<ClickbaitResult, BrokerError> {
        require_non_empty("text", text)?;
        self.call(Action::AnalyzeClickbait, &text_request(text)).await
    }

    /// Scores the reading complexity of a text.
    ///
    /// # Errors
    ///
    /// Fails with [`BrokerError::InvalidInput`] when `text` is empty;
    /// otherwise propagates dispatcher failures unchanged.
    #[instrument(skip_all, fields(instance = %self.instance_id))]
    pub async fn analyze_complexity(&self, text: &str) -> Result<ComplexityResult, BrokerError> {
        require_non_empty("text", text)?;
        self.call(Action::AnalyzeComplexity, &text_request(text)).await
    }

    /// Tears the worker context down, best-effort.
    ///
    /// The next operation recreates it transparently.
    pub async fn close(&self) {
        self.lifecycle.close().await;
    }

    /// Dispatches a typed payload and maps the generic result back into the
    /// operation's result shape. The worker is trusted to produce the right
    /// shape; a mismatch is an internal error, not a caller mistake.
    async fn call<P, R>(&self, action: Action, payload: &P) -> Result<R, BrokerError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_value(payload)
            .map_err(|e| BrokerError::Internal(anyhow!("payload serialization failed: {e}")))?;
        let result = self.dispatcher.send(action, payload).await?;
        serde_json::from_value(result)
            .map_err(|e| BrokerError::Internal(anyhow!("malformed {action} result: {e}")))
    }
}

fn text_request(text: &str) -> TextRequest {
    TextRequest {
        text: text.to_string(),
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), BrokerError> {
    if value.trim().is_empty() {
        return Err(BrokerError::InvalidInput { field });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
