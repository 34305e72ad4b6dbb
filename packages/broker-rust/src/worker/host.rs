//! In-process worker host.
//!
//! Implements [`WorkerHost`] by running the worker runtime as a tokio task:
//! `create_context` spawns it, `context_exists` probes the task and its
//! request queue, `deliver` pushes into the bounded queue, and
//! `destroy_context` closes the queue and waits for the loop to drain.
//!
//! Because the router is created by the broker, which in turn needs the host,
//! the router is attached after construction via [`InProcessHost::attach_router`].

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use veracity_core::messages::WorkerRequest;

use super::provider::AnalysisProvider;
use super::runtime::WorkerRuntime;
use crate::broker::router::ResponseRouter;
use crate::traits::{ContextError, DeliveryError, WorkerHost};

/// Live worker context: the runtime task and the sender into its queue.
struct WorkerSlot {
    requests: mpsc::Sender<WorkerRequest>,
    task: JoinHandle<()>,
}

impl WorkerSlot {
    fn is_alive(&self) -> bool {
        !self.requests.is_closed() && !self.task.is_finished()
    }
}

/// `WorkerHost` that runs the analysis worker inside the current process.
pub struct InProcessHost<P> {
    provider: Arc<P>,
    queue_capacity: usize,
    router: OnceLock<ResponseRouter>,
    slot: Mutex<Option<WorkerSlot>>,
}

impl<P: AnalysisProvider> InProcessHost<P> {
    /// Creates a host with no worker context; one is spawned on demand.
    #[must_use]
    pub fn new(provider: P, queue_capacity: usize) -> Self {
        Self {
            provider: Arc::new(provider),
            queue_capacity,
            router: OnceLock::new(),
            slot: Mutex::new(None),
        }
    }

    /// Attaches the broker's response router. Must be called once, before
    /// the first dispatch; later calls are ignored.
    pub fn attach_router(&self, router: ResponseRouter) {
        let _ = self.router.set(router);
    }
}

#[async_trait]
impl<P: AnalysisProvider> WorkerHost for InProcessHost<P> {
    async fn context_exists(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(WorkerSlot::is_alive)
    }

    async fn create_context(&self) -> Result<(), ContextError> {
        let router = self
            .router
            .get()
            .cloned()
            .ok_or_else(|| ContextError::Failed(anyhow::anyhow!("no response router attached")))?;

        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(WorkerSlot::is_alive) {
            return Err(ContextError::AlreadyExists);
        }

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let task = tokio::spawn(WorkerRuntime::run(Arc::clone(&self.provider), rx, router));
        *slot = Some(WorkerSlot { requests: tx, task });
        Ok(())
    }

    async fn destroy_context(&self) -> anyhow::Result<()> {
        let slot = self.slot.lock().take();
        if let Some(slot) = slot {
            // Closing the queue lets the runtime drain what it already
            // accepted, then exit.
            drop(slot.requests);
            slot.task
                .await
                .map_err(|e| anyhow::anyhow!("worker runtime task failed: {e}"))?;
        }
        Ok(())
    }

    fn deliver(&self, request: WorkerRequest) -> Result<(), DeliveryError> {
        let slot = self.slot.lock();
        let Some(slot) = slot.as_ref() else {
            return Err(DeliveryError::new("no worker context"));
        };
        slot.requests.try_send(request).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::new("worker queue full"),
            mpsc::error::TrySendError::Closed(_) => DeliveryError::new("worker context gone"),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
