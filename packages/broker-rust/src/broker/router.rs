//! Inbound response routing.
//!
//! The host pushes every message it receives into the router, regardless of
//! origin. Messages that do not correspond to a live pending request --
//! foreign messages, duplicates, replies arriving after their deadline
//! already fired -- are discarded with a debug log. The router is a cheap
//! `Clone` handle over the shared correlation table, installed once at broker
//! construction and referentially stable for the broker's lifetime.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use veracity_core::messages::WorkerResponse;

use super::correlation::CorrelationTable;
use crate::error::BrokerError;

/// Error description substituted when a failed response carries none.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Routes inbound worker responses to their pending requests.
#[derive(Clone)]
pub struct ResponseRouter {
    table: Arc<CorrelationTable>,
}

impl ResponseRouter {
    /// Creates a router over the shared correlation table.
    #[must_use]
    pub fn new(table: Arc<CorrelationTable>) -> Self {
        Self { table }
    }

    /// Routes a parsed worker response to its pending request.
    ///
    /// A successful response resolves with the carried result payload (null
    /// when absent); a failed one rejects with the worker's error description
    /// verbatim, or `"Unknown error"` when the worker supplied none. Unknown
    /// correlation tokens are dropped.
    pub fn on_message(&self, response: WorkerResponse) {
        let token = response.id;
        let matched = if response.success {
            self.table
                .resolve(token, response.result.unwrap_or(Value::Null))
        } else {
            let message = response
                .error
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            self.table
                .reject(token, BrokerError::WorkerReported { message })
        };

        if !matched {
            debug!(token, "dropping response with no pending request");
        }
    }

    /// Tolerant entry point for hosts that push raw message values.
    ///
    /// Messages that do not parse as a [`WorkerResponse`] -- no correlation
    /// token, foreign shape, not addressed to this broker -- are ignored.
    pub fn on_raw_message(&self, raw: &Value) {
        match serde_json::from_value::<WorkerResponse>(raw.clone()) {
            Ok(response) => self.on_message(response),
            Err(_) => debug!("ignoring inbound message with foreign shape"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
