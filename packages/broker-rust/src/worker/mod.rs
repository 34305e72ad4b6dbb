//! The worker-context side of the protocol.
//!
//! - `provider`: pluggable analysis strategy plus a deterministic stub
//! - `runtime`: message loop that decodes requests and emits responses
//! - `host`: in-process `WorkerHost` that runs the runtime as a tokio task

pub mod host;
pub mod provider;
pub mod runtime;

pub use host::InProcessHost;
pub use provider::{AnalysisProvider, StubAnalysisProvider};
pub use runtime::WorkerRuntime;
