//! Pending-request correlation table with deadline enforcement.
//!
//! Owns every in-flight request: a correlation token maps to the oneshot
//! sender that completes the caller's future and to the deadline timer that
//! rejects it if no reply ever arrives. Lock-free concurrent access via
//! `DashMap`; removal from the map is the atomic point that decides which of
//! resolve/reject/timeout wins.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::BrokerError;

/// Outcome delivered to the caller awaiting a pending request.
pub type PendingOutcome = Result<Value, BrokerError>;

/// A registered request awaiting its response.
struct PendingEntry {
    /// Completes the caller's future. Fires exactly once.
    tx: oneshot::Sender<PendingOutcome>,
    /// Deadline timer; aborted when the entry completes before expiry.
    /// Installed under the same shard lock as the insert, so the timer can
    /// never observe the map before its own entry exists.
    timer: Option<JoinHandle<()>>,
}

/// Table of in-flight requests keyed by correlation token.
///
/// At most one entry exists per token at any time; tokens are never reused
/// while their entry is live. Every registered entry is eventually removed --
/// by a matching response, an explicit rejection, or deadline expiry.
#[derive(Default)]
pub struct CorrelationTable {
    entries: DashMap<u64, PendingEntry>,
}

impl CorrelationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pending request and starts its deadline timer.
    ///
    /// On expiry, if the entry is still present, it is removed and rejected
    /// with [`BrokerError::Timeout`] -- indistinguishable from the reply never
    /// arriving.
    ///
    /// # Panics
    ///
    /// Panics if `token` is already registered. Token generation is a
    /// monotonic counter, so a collision is an invariant breach, not a
    /// recoverable condition.
    pub fn register(
        self: &Arc<Self>,
        token: u64,
        tx: oneshot::Sender<PendingOutcome>,
        timeout: Duration,
    ) {
        // Insert before spawning the timer. The returned ref keeps the shard
        // locked, so even a zero-duration timer cannot run its rejection
        // until the handle is stored and the entry is fully formed.
        let mut entry = match self.entries.entry(token) {
            Entry::Vacant(slot) => slot.insert(PendingEntry { tx, timer: None }),
            Entry::Occupied(_) => panic!("correlation token {token} already registered"),
        };

        let timer = tokio::spawn({
            let table = Arc::clone(self);
            async move {
                tokio::time::sleep(timeout).await;
                #[allow(clippy::cast_possible_truncation)]
                let timeout_ms = timeout.as_millis() as u64;
                if table.reject(token, BrokerError::Timeout { timeout_ms }) {
                    debug!(token, timeout_ms, "pending request timed out");
                }
            }
        });
        entry.timer = Some(timer);
    }

    /// Resolves the pending request for `token` with `value`.
    ///
    /// Returns `false` if the token is unknown -- already resolved, expired,
    /// or foreign. Idempotent: a second call with the same token is a no-op.
    pub fn resolve(&self, token: u64, value: Value) -> bool {
        self.complete(token, Ok(value))
    }

    /// Rejects the pending request for `token` with `error`.
    ///
    /// Symmetric to [`resolve`](Self::resolve).
    pub fn reject(&self, token: u64, error: BrokerError) -> bool {
        self.complete(token, Err(error))
    }

    /// Number of requests currently in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no requests are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn complete(&self, token: u64, outcome: PendingOutcome) -> bool {
        let Some((_, entry)) = self.entries.remove(&token) else {
            return false;
        };
        if let Some(timer) = entry.timer {
            timer.abort();
        }
        // The receiver may already be gone if the caller's future was
        // dropped; the entry is removed either way.
        let _ = entry.tx.send(outcome);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn register(
        table: &Arc<CorrelationTable>,
        token: u64,
        timeout_ms: u64,
    ) -> oneshot::Receiver<PendingOutcome> {
        let (tx, rx) = oneshot::channel();
        table.register(token, tx, Duration::from_millis(timeout_ms));
        rx
    }

    #[tokio::test]
    async fn resolve_fires_exactly_once() {
        let table = Arc::new(CorrelationTable::new());
        let rx = register(&table, 1, 30);

        assert!(table.resolve(1, json!("v")));
        assert_eq!(rx.await.expect("completed").expect("resolved"), json!("v"));

        // Second resolution with the same token is a no-op.
        assert!(!table.resolve(1, json!("other")));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn reject_cancels_the_deadline_timer() {
        let table = Arc::new(CorrelationTable::new());
        let rx = register(&table, 2, 30);

        assert!(table.reject(
            2,
            BrokerError::WorkerReported {
                message: "bad".into()
            }
        ));
        let outcome = rx.await.expect("completed");
        assert!(matches!(
            outcome,
            Err(BrokerError::WorkerReported { ref message }) if message == "bad"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_rejects_with_timeout() {
        let table = Arc::new(CorrelationTable::new());
        let rx = register(&table, 3, 30);

        let outcome = rx.await.expect("timer fired");
        assert!(matches!(outcome, Err(BrokerError::Timeout { timeout_ms: 30 })));

        // Late arrival after the timeout already fired.
        assert!(!table.resolve(3, json!("late")));
        assert!(table.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fires_at_the_deadline_not_before() {
        let table = Arc::new(CorrelationTable::new());
        let start = tokio::time::Instant::now();
        let rx = register(&table, 4, 30);

        rx.await.expect("timer fired").expect_err("timeout");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(30), "fired early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(31), "fired late: {elapsed:?}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn zero_deadline_still_reaps_the_entry() {
        let table = Arc::new(CorrelationTable::new());

        // A zero deadline makes the timer runnable the instant it is
        // spawned; the entry must already be visible to it by then.
        for token in 0..500 {
            let rx = register(&table, token, 0);
            let outcome = tokio::time::timeout(Duration::from_secs(1), rx)
                .await
                .expect("entry reaped")
                .expect("timer fired");
            assert!(matches!(outcome, Err(BrokerError::Timeout { timeout_ms: 0 })));
        }
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn unknown_token_returns_false() {
        let table = Arc::new(CorrelationTable::new());
        assert!(!table.resolve(99, json!(null)));
        assert!(!table.reject(99, BrokerError::InvalidInput { field: "x" }));
    }

    #[tokio::test]
    async fn len_tracks_in_flight_entries() {
        let table = Arc::new(CorrelationTable::new());
        let _rx1 = register(&table, 10, 1_000);
        let _rx2 = register(&table, 11, 1_000);
        assert_eq!(table.len(), 2);

        table.resolve(10, json!(1));
        assert_eq!(table.len(), 1);
    }
}
