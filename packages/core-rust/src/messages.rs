//! Wire message schemas for the main-to-worker request protocol.
//!
//! These types define the logical wire shape exchanged between the broker and
//! the isolated worker context. All structs use
//! `#[serde(rename_all = "camelCase")]` so the JSON form matches the
//! extension's message protocol exactly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Routing identifier for the analysis worker context.
///
/// Every outbound request carries this as its `target` so a host with
/// multiple message listeners can route without inspecting the payload.
pub const WORKER_TARGET: &str = "veracity-analysis-worker";

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Operation tags understood by the analysis worker.
///
/// Wire values are camelCase strings (`"extractArticle"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    ExtractArticle,
    AnalyzeSentiment,
    AnalyzeClickbait,
    AnalyzeComplexity,
}

impl Action {
    /// Returns the wire tag for this action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExtractArticle => "extractArticle",
            Self::AnalyzeSentiment => "analyzeSentiment",
            Self::AnalyzeClickbait => "analyzeClickbait",
            Self::AnalyzeComplexity => "analyzeComplexity",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request / Response envelopes
// ---------------------------------------------------------------------------

/// Outbound message from the broker into the worker context.
///
/// Immutable once sent: the broker builds it, hands it to the host's
/// `deliver` capability, and never touches it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    /// Fixed worker-context identifier; always [`WORKER_TARGET`].
    pub target: String,
    /// Operation the worker should perform.
    pub action: Action,
    /// Operation-specific payload.
    pub data: Value,
    /// Correlation token echoed back in the matching [`WorkerResponse`].
    pub id: u64,
}

impl WorkerRequest {
    /// Builds a request addressed to the analysis worker.
    #[must_use]
    pub fn new(action: Action, data: Value, id: u64) -> Self {
        Self {
            target: WORKER_TARGET.to_string(),
            action,
            data,
            id,
        }
    }
}

/// Inbound reply from the worker context.
///
/// Transient: routed to the matching pending request and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    /// Correlation token copied from the originating request.
    pub id: u64,
    /// Whether the worker executed the operation successfully.
    pub success: bool,
    /// Result payload when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerResponse {
    /// Builds a successful response carrying `result`.
    #[must_use]
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            id,
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Builds a failure response carrying the worker's error description.
    #[must_use]
    pub fn err(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
