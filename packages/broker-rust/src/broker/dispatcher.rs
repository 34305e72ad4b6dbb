//! Request dispatch: token minting, registration, and transmission.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use serde_json::Value;
use tracing::debug;
use veracity_core::messages::{Action, WorkerRequest};

use super::correlation::CorrelationTable;
use super::lifecycle::WorkerLifecycle;
use crate::error::BrokerError;
use crate::traits::WorkerHost;

/// Sends tagged requests into the worker context and registers each one in
/// the correlation table with a deadline.
pub struct Dispatcher<H> {
    host: Arc<H>,
    lifecycle: Arc<WorkerLifecycle<H>>,
    table: Arc<CorrelationTable>,
    /// Monotonic token source. Process-lifetime unique by construction, so a
    /// collision in the table is an invariant breach rather than bad luck.
    next_token: AtomicU64,
    response_timeout: Duration,
}

impl<H: WorkerHost> Dispatcher<H> {
    /// Creates a dispatcher over the shared lifecycle manager and table.
    #[must_use]
    pub fn new(
        host: Arc<H>,
        lifecycle: Arc<WorkerLifecycle<H>>,
        table: Arc<CorrelationTable>,
        response_timeout: Duration,
    ) -> Self {
        Self {
            host,
            lifecycle,
            table,
            next_token: AtomicU64::new(1),
            response_timeout,
        }
    }

    /// Dispatches `action` with `payload` and awaits the matched response.
    ///
    /// Ensures the worker context exists, registers a pending request under a
    /// fresh correlation token, transmits the message, and suspends until the
    /// response router or the deadline timer settles the request. A
    /// synchronous delivery failure removes the pending entry immediately --
    /// no deadline timer is left behind.
    ///
    /// # Errors
    ///
    /// Propagates lifecycle failures unchanged and surfaces
    /// [`BrokerError::DeliveryFailed`], [`BrokerError::Timeout`], or the
    /// worker-reported error for this call.
    pub async fn send(&self, action: Action, payload: Value) -> Result<Value, BrokerError> {
        self.lifecycle.ensure_ready().await?;

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.table.register(token, tx, self.response_timeout);

        let request = WorkerRequest::new(action, payload, token);
        debug!(token, %action, "dispatching request to worker context");

        if let Err(delivery) = self.host.deliver(request) {
            // Clean up before surfacing: the rejection removes the entry and
            // cancels its timer, then flows back through `rx` below.
            self.table.reject(
                token,
                BrokerError::DeliveryFailed {
                    reason: delivery.reason,
                },
            );
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(BrokerError::Internal(anyhow!(
                "pending request {token} dropped without resolution"
            ))),
        }
    }

    /// The correlation table backing this dispatcher.
    #[must_use]
    pub fn table(&self) -> &Arc<CorrelationTable> {
        &self.table
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
