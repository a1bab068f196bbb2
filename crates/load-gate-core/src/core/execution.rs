// crates/load-gate-core/src/core/execution.rs
// ============================================================================
// Module: Execution Records
// Description: Worker request payload and execution outcome records.
// Purpose: Define the wire contract between the gate and the execution worker.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An execution request is assembled on demand from the last successfully
//! validated artifacts and handed to the execution worker; the core never
//! persists it. Field names follow the original worker protocol: the outer
//! request is snake_case (`test_id`, `config`, `timestamp`), the config body
//! is camelCase (`virtualUsers`, `usersData`, ...).
//!
//! The outcome `status` is a string, not a closed enum: a successful worker
//! reply passes its own status through verbatim, while locally-detected
//! failures use the fixed `failed` and `timeout` values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::document::LoadMode;
use crate::core::identifiers::TestId;

// ============================================================================
// SECTION: Outcome Status Labels
// ============================================================================

/// Outcome status for a request the worker never completed.
pub const STATUS_FAILED: &str = "failed";
/// Outcome status for a request that exceeded the execution time budget.
pub const STATUS_TIMEOUT: &str = "timeout";
/// Fallback status when a successful worker reply omits its own.
pub const STATUS_COMPLETED: &str = "completed";

// ============================================================================
// SECTION: Run Configuration Payload
// ============================================================================

/// Fully-resolved run configuration forwarded to the worker.
///
/// # Invariants
/// - Every optional variables-document field has been defaulted; the worker
///   never applies defaults of its own.
/// - `scenario` is the validated scenario document, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfigPayload {
    /// Load-generation mode.
    pub mode: LoadMode,
    /// Virtual user population (meaningful in `users` mode).
    #[serde(rename = "virtualUsers")]
    pub virtual_users: u64,
    /// Total request count (meaningful in `requests` mode).
    #[serde(rename = "totalRequests")]
    pub total_requests: u64,
    /// Test duration, worker-interpreted (for example `2m`).
    pub duration: String,
    /// Warmup period, worker-interpreted (for example `30s`).
    pub warmup: String,
    /// Environment substitutions for `env.*` placeholders.
    pub environment: BTreeMap<String, String>,
    /// Validated scenario document, verbatim.
    pub scenario: Value,
    /// Per-user dataset rows (empty when no dataset was submitted).
    #[serde(rename = "usersData")]
    pub users_data: Vec<BTreeMap<String, String>>,
}

// ============================================================================
// SECTION: Execution Request
// ============================================================================

/// Request payload dispatched to the execution worker.
///
/// # Invariants
/// - `timestamp` is RFC 3339 and supplied by the caller; the core never reads
///   wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Unique identifier for this submission.
    pub test_id: TestId,
    /// Fully-resolved run configuration.
    pub config: RunConfigPayload,
    /// Submission timestamp (RFC 3339).
    pub timestamp: String,
}

// ============================================================================
// SECTION: Execution Outcome
// ============================================================================

/// Outcome of an execution dispatch, successful or not.
///
/// # Invariants
/// - Every branch carries the `test_id` so callers can correlate.
/// - `status` is the worker's own status on success, or one of
///   [`STATUS_FAILED`] / [`STATUS_TIMEOUT`] for locally-detected failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    /// Outcome status label.
    pub status: String,
    /// Test identifier for correlation.
    pub test_id: TestId,
    /// Human-readable outcome summary.
    pub message: String,
    /// Result summary passed through from the worker, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    /// Report location passed through from the worker, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    /// Error detail, when the dispatch or the test failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Test duration lifted from `summary.duration`, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl ExecutionOutcome {
    /// Builds a failed outcome with the given message and error detail.
    #[must_use]
    pub fn failed(test_id: TestId, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: STATUS_FAILED.to_string(),
            test_id,
            message: message.into(),
            summary: None,
            report_path: None,
            error: Some(error.into()),
            duration: None,
        }
    }

    /// Builds a timeout outcome with the given message and error detail.
    #[must_use]
    pub fn timeout(test_id: TestId, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: STATUS_TIMEOUT.to_string(),
            test_id,
            message: message.into(),
            summary: None,
            report_path: None,
            error: Some(error.into()),
            duration: None,
        }
    }
}
