//! Host capability boundary.
//!
//! The broker never talks to the runtime environment directly; everything it
//! needs from the host -- context provisioning, liveness probing, message
//! delivery -- comes through [`WorkerHost`]. The inbound half of the protocol
//! is push-based: the host feeds every received message into
//! [`crate::broker::ResponseRouter::on_message`].

use async_trait::async_trait;
use veracity_core::messages::WorkerRequest;

/// Context provisioning failure reported by the host.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// The context already exists. Raced with a concurrent creator; the
    /// lifecycle manager treats this as success.
    #[error("worker context already exists")]
    AlreadyExists,

    /// Any other provisioning failure.
    #[error("context provisioning failed")]
    Failed(#[source] anyhow::Error),
}

/// Synchronously detectable message delivery failure.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct DeliveryError {
    /// Host-reported description of the failure.
    pub reason: String,
}

impl DeliveryError {
    /// Builds a delivery error from any displayable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Capabilities the broker requires from its host environment.
///
/// The worker context is an expensive, host-managed resource; implementations
/// own its actual provisioning and teardown. Delivery is fire-and-forget:
/// `deliver` returning `Ok` means the message was handed off, not that it was
/// processed -- replies arrive asynchronously through the response router.
#[async_trait]
pub trait WorkerHost: Send + Sync + 'static {
    /// Liveness probe: does the worker context currently exist?
    async fn context_exists(&self) -> bool;

    /// Provisions the worker context.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::AlreadyExists`] when a concurrent caller won
    /// the creation race, and [`ContextError::Failed`] for any other failure.
    async fn create_context(&self) -> Result<(), ContextError>;

    /// Tears the worker context down.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails; the lifecycle manager treats this
    /// as best-effort and only logs it.
    async fn destroy_context(&self) -> anyhow::Result<()>;

    /// Transmits a request into the worker context.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] when the host rejects transmission (e.g.
    /// the context's queue is gone or full).
    fn deliver(&self, request: WorkerRequest) -> Result<(), DeliveryError>;
}
