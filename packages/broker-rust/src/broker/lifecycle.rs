//! Worker-context lifecycle management.
//!
//! The worker context is an expensive, host-managed resource. This manager
//! amortizes its creation across many requests and self-heals when the host
//! silently reclaims it. State transitions:
//!
//! ```text
//! Absent --ensure_ready--> Ready
//! Ready  --close / probe-reports-gone--> Absent
//! ```
//!
//! The transient `Creating` phase is realized by holding the state mutex
//! across the host's creation call: concurrent `ensure_ready` callers queue
//! on the lock and observe `Ready` once the first creation completes, so only
//! a single creation request is ever issued per absence.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::BrokerError;
use crate::traits::{ContextError, WorkerHost};

/// Observable lifecycle states of the worker context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextState {
    /// No context exists (or the host reclaimed it).
    Absent,
    /// The context was created and is assumed live until a probe says otherwise.
    Ready,
}

/// Ensures a single worker context exists before any request is dispatched.
pub struct WorkerLifecycle<H> {
    host: Arc<H>,
    state: Mutex<ContextState>,
}

impl<H: WorkerHost> WorkerLifecycle<H> {
    /// Creates a lifecycle manager in the `Absent` state.
    #[must_use]
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            state: Mutex::new(ContextState::Absent),
        }
    }

    /// Ensures the worker context exists, creating it if necessary.
    ///
    /// A `Ready` state is re-verified against the host's liveness probe; if
    /// the context is gone, it is recreated transparently. The host reporting
    /// "already exists" on creation means a concurrent creator won the race
    /// and is treated as success.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::ContextCreationFailed`] when the host cannot
    /// provision the context; the state remains `Absent` and the next call
    /// retries.
    pub async fn ensure_ready(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().await;

        if *state == ContextState::Ready {
            if self.host.context_exists().await {
                return Ok(());
            }
            debug!("worker context disappeared; recreating");
            *state = ContextState::Absent;
        }

        match self.host.create_context().await {
            Ok(()) => {
                info!("worker context created");
                *state = ContextState::Ready;
                Ok(())
            }
            Err(ContextError::AlreadyExists) => {
                // Lost a benign race with a concurrent creator.
                *state = ContextState::Ready;
                Ok(())
            }
            Err(ContextError::Failed(source)) => Err(BrokerError::ContextCreationFailed(source)),
        }
    }

    /// Tears the worker context down, best-effort.
    ///
    /// A missing context is not an error at this layer: teardown failures are
    /// logged and the state becomes `Absent` regardless.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let Err(error) = self.host.destroy_context().await {
            warn!(%error, "worker context teardown failed");
        }
        *state = ContextState::Absent;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use veracity_core::messages::WorkerRequest;

    use super::*;
    use crate::traits::DeliveryError;

    /// Scripted host that counts capability calls and simulates failures.
    #[derive(Default)]
    struct ScriptedHost {
        exists: AtomicBool,
        create_calls: AtomicUsize,
        destroy_calls: AtomicUsize,
        fail_create: AtomicBool,
        report_already_exists: AtomicBool,
        fail_destroy: AtomicBool,
    }

    #[async_trait]
    impl WorkerHost for ScriptedHost {
        async fn context_exists(&self) -> bool {
            self.exists.load(Ordering::SeqCst)
        }

        async fn create_context(&self) -> Result<(), ContextError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.report_already_exists.load(Ordering::SeqCst) {
                return Err(ContextError::AlreadyExists);
            }
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(ContextError::Failed(anyhow::anyhow!("quota exceeded")));
            }
            self.exists.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn destroy_context(&self) -> anyhow::Result<()> {
            self.destroy_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_destroy.load(Ordering::SeqCst) {
                anyhow::bail!("teardown refused");
            }
            self.exists.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn deliver(&self, _request: WorkerRequest) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn creates_context_once_and_reuses_it() {
        let host = Arc::new(ScriptedHost::default());
        let lifecycle = WorkerLifecycle::new(Arc::clone(&host));

        lifecycle.ensure_ready().await.expect("first call");
        lifecycle.ensure_ready().await.expect("second call");

        assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_coalesce_into_one_creation() {
        let host = Arc::new(ScriptedHost::default());
        let lifecycle = Arc::new(WorkerLifecycle::new(Arc::clone(&host)));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let lifecycle = Arc::clone(&lifecycle);
                tokio::spawn(async move { lifecycle.ensure_ready().await })
            })
            .collect();
        for task in tasks {
            task.await.expect("join").expect("ensure_ready");
        }

        assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recreates_when_probe_reports_context_gone() {
        let host = Arc::new(ScriptedHost::default());
        let lifecycle = WorkerLifecycle::new(Arc::clone(&host));

        lifecycle.ensure_ready().await.expect("first call");
        // Host silently reclaims the context.
        host.exists.store(false, Ordering::SeqCst);
        lifecycle.ensure_ready().await.expect("recreation");

        assert_eq!(host.create_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn already_exists_is_absorbed_as_success() {
        let host = Arc::new(ScriptedHost::default());
        host.report_already_exists.store(true, Ordering::SeqCst);
        host.exists.store(true, Ordering::SeqCst);
        let lifecycle = WorkerLifecycle::new(Arc::clone(&host));

        lifecycle.ensure_ready().await.expect("absorbed");
        // Now Ready; the live probe short-circuits further creations.
        lifecycle.ensure_ready().await.expect("short-circuit");
        assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn creation_failure_leaves_state_absent_and_retries() {
        let host = Arc::new(ScriptedHost::default());
        host.fail_create.store(true, Ordering::SeqCst);
        let lifecycle = WorkerLifecycle::new(Arc::clone(&host));

        let err = lifecycle.ensure_ready().await.expect_err("creation fails");
        assert!(matches!(err, BrokerError::ContextCreationFailed(_)));

        // The next call retries creation rather than assuming Ready.
        host.fail_create.store(false, Ordering::SeqCst);
        lifecycle.ensure_ready().await.expect("retry succeeds");
        assert_eq!(host.create_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn close_is_best_effort() {
        let host = Arc::new(ScriptedHost::default());
        let lifecycle = WorkerLifecycle::new(Arc::clone(&host));

        lifecycle.ensure_ready().await.expect("create");
        host.fail_destroy.store(true, Ordering::SeqCst);
        lifecycle.close().await;

        // Teardown failed, but the manager still treats the context as
        // absent and recreates on the next dispatch.
        host.fail_destroy.store(false, Ordering::SeqCst);
        host.exists.store(false, Ordering::SeqCst);
        lifecycle.ensure_ready().await.expect("recreate after close");
        assert_eq!(host.create_calls.load(Ordering::SeqCst), 2);
    }
}
