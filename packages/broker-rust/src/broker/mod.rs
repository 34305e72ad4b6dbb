//! The cross-context request broker.
//!
//! This module implements the request/response brokering pipeline:
//!
//! 1. **Correlation** (`correlation`): pending-request table with deadline timers
//! 2. **Lifecycle** (`lifecycle`): worker-context state machine (`Absent`/`Ready`)
//! 3. **Dispatch** (`dispatcher`): token minting, registration, transmission
//! 4. **Routing** (`router`): matches inbound replies to pending requests
//! 5. **Facade** (`module`): typed public operations (extract, sentiment, ...)

pub mod correlation;
pub mod dispatcher;
pub mod lifecycle;
pub mod module;
pub mod router;

// Re-export key types for convenient access.
pub use correlation::CorrelationTable;
pub use dispatcher::Dispatcher;
pub use lifecycle::WorkerLifecycle;
pub use module::Broker;
pub use router::ResponseRouter;
