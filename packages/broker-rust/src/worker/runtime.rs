//! In-worker message loop.
//!
//! Receives requests from the broker, decodes the payload for the tagged
//! action, invokes the injected analysis provider, and feeds a response back
//! through the response router. Malformed payloads and provider failures
//! become failure responses, never panics -- the broker side decides what to
//! do with them.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use veracity_core::messages::{Action, WorkerRequest, WorkerResponse};
use veracity_core::types::{ExtractArticleRequest, TextRequest};

use super::provider::AnalysisProvider;
use crate::broker::router::ResponseRouter;

/// Message loop executing requests against an [`AnalysisProvider`].
pub struct WorkerRuntime;

impl WorkerRuntime {
    /// Runs the loop until the request channel closes.
    ///
    /// Each request executes on its own task, so slow operations never block
    /// later ones and replies may complete out of order relative to dispatch.
    pub async fn run<P: AnalysisProvider>(
        provider: Arc<P>,
        mut requests: mpsc::Receiver<WorkerRequest>,
        router: ResponseRouter,
    ) {
        while let Some(request) = requests.recv().await {
            let provider = Arc::clone(&provider);
            let router = router.clone();
            tokio::spawn(async move {
                let id = request.id;
                let response = match Self::execute(provider.as_ref(), request).await {
                    Ok(result) => WorkerResponse::ok(id, result),
                    Err(error) => WorkerResponse::err(id, error.to_string()),
                };
                router.on_message(response);
            });
        }
        debug!("worker runtime stopped");
    }

    async fn execute<P: AnalysisProvider>(
        provider: &P,
        request: WorkerRequest,
    ) -> anyhow::Result<Value> {
        match request.action {
            Action::ExtractArticle => {
                let payload: ExtractArticleRequest = serde_json::from_value(request.data)?;
                Ok(serde_json::to_value(
                    provider.extract_article(payload).await?,
                )?)
            }
            Action::AnalyzeSentiment => {
                let payload: TextRequest = serde_json::from_value(request.data)?;
                Ok(serde_json::to_value(
                    provider.analyze_sentiment(&payload.text).await?,
                )?)
            }
            Action::AnalyzeClickbait => {
                let payload: TextRequest = serde_json::from_value(request.data)?;
                Ok(serde_json::to_value(
                    provider.analyze_clickbait(&payload.text).await?,
                )?)
            }
            Action::AnalyzeComplexity => {
                let payload: TextRequest = serde_json::from_value(request.data)?;
                Ok(serde_json::to_value(
                    provider.analyze_complexity(&payload.text).await?,
                )?)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::oneshot;

    use super::*;
    use crate::broker::correlation::{CorrelationTable, PendingOutcome};
    use crate::error::BrokerError;
    use crate::worker::provider::StubAnalysisProvider;

    struct Harness {
        requests: mpsc::Sender<WorkerRequest>,
        table: Arc<CorrelationTable>,
    }

    fn spawn_runtime() -> Harness {
        let table = Arc::new(CorrelationTable::new());
        let router = ResponseRouter::new(Arc::clone(&table));
        let (tx, rx) = mpsc::channel(8);
        let provider = Arc::new(StubAnalysisProvider::new(Duration::from_millis(1)));
        tokio::spawn(WorkerRuntime::run(provider, rx, router));
        Harness {
            requests: tx,
            table,
        }
    }

    fn pending(harness: &Harness, token: u64) -> oneshot::Receiver<PendingOutcome> {
        let (tx, rx) = oneshot::channel();
        harness.table.register(token, tx, Duration::from_secs(10));
        rx
    }

    #[tokio::test]
    async fn executes_a_request_and_routes_the_response() {
        let harness = spawn_runtime();
        let rx = pending(&harness, 1);

        harness
            .requests
            .send(WorkerRequest::new(
                Action::AnalyzeSentiment,
                json!({"text": "fine day"}),
                1,
            ))
            .await
            .expect("queued");

        let result = rx.await.expect("routed").expect("resolved");
        assert_eq!(result["wordCount"], json!(2));
        assert_eq!(result["label"], json!("neutral"));
    }

    #[tokio::test]
    async fn malformed_payload_becomes_a_failure_response() {
        let harness = spawn_runtime();
        let rx = pending(&harness, 2);

        harness
            .requests
            .send(WorkerRequest::new(
                Action::AnalyzeClickbait,
                json!({"wrong": "shape"}),
                2,
            ))
            .await
            .expect("queued");

        let outcome = rx.await.expect("routed");
        assert!(matches!(outcome, Err(BrokerError::WorkerReported { .. })));
    }

    #[tokio::test]
    async fn loop_exits_when_the_channel_closes() {
        let table = Arc::new(CorrelationTable::new());
        let router = ResponseRouter::new(Arc::clone(&table));
        let (tx, rx) = mpsc::channel::<WorkerRequest>(1);
        let provider = Arc::new(StubAnalysisProvider::new(Duration::from_millis(1)));
        let task = tokio::spawn(WorkerRuntime::run(provider, rx, router));

        drop(tx);
        task.await.expect("runtime exits cleanly");
    }
}
