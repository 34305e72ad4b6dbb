//! Broker failure taxonomy.
//!
//! Every failure a facade caller can observe is a distinguishable variant so
//! the caller can decide what to retry (`Timeout`, `ContextCreationFailed`)
//! versus what not to (`InvalidInput`, `WorkerReported`). The broker itself
//! never retries.

/// Errors surfaced by broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Caller-supplied data failed a precondition; the dispatcher was never
    /// invoked and no worker context was created.
    #[error("invalid input: {field} must be non-empty")]
    InvalidInput {
        /// Name of the offending input field.
        field: &'static str,
    },

    /// The host could not provision the worker context and it does not
    /// already exist. Fatal to this call only; the next call retries creation.
    #[error("worker context creation failed")]
    ContextCreationFailed(#[source] anyhow::Error),

    /// The host rejected message transmission. The pending request was
    /// cleaned up immediately; no deadline timer is left behind.
    #[error("message delivery failed: {reason}")]
    DeliveryFailed {
        /// Host-reported delivery failure description.
        reason: String,
    },

    /// No matching response arrived within the deadline.
    #[error("no response within {timeout_ms}ms")]
    Timeout {
        /// The deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The worker executed the operation but signalled failure. Carries the
    /// worker's error description verbatim.
    #[error("worker reported error: {message}")]
    WorkerReported {
        /// Worker-supplied error description.
        message: String,
    },

    /// Invariant breach or plumbing failure that should not occur in normal
    /// operation (e.g. a pending request dropped without resolution).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_field() {
        let err = BrokerError::InvalidInput { field: "html" };
        assert_eq!(err.to_string(), "invalid input: html must be non-empty");
    }

    #[test]
    fn worker_error_carries_description_verbatim() {
        let err = BrokerError::WorkerReported {
            message: "parse failed at byte 12".into(),
        };
        assert!(err.to_string().contains("parse failed at byte 12"));
    }
}
