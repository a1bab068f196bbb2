// crates/load-gate-core/src/runtime/planner.rs
// ============================================================================
// Module: Execution Planner
// Description: Builds execution requests and maps worker replies to outcomes.
// Purpose: Drive the dispatch of validated submissions to the worker.
// Dependencies: crate::core, crate::interfaces, thiserror, time
// ============================================================================

//! ## Overview
//! The planner assembles an [`ExecutionRequest`] from the latest validated
//! artifacts and delegates transport to the [`ExecutionBackend`]. The test
//! identifier is minted before anything else so that every outcome branch —
//! including precondition failures — carries it for correlation. Connection
//! failures and timeouts stay distinguished all the way into the outcome.
//!
//! The planner never reads wall-clock time; callers supply the submission
//! timestamp.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::dataset::Dataset;
use crate::core::execution::ExecutionOutcome;
use crate::core::execution::ExecutionRequest;
use crate::core::execution::STATUS_COMPLETED;
use crate::core::identifiers::TestId;
use crate::interfaces::ArtifactStore;
use crate::interfaces::ExecutionBackend;
use crate::interfaces::ExecutionError;
use crate::interfaces::StoreError;
use crate::interfaces::WorkerReply;
use crate::runtime::resolve::ResolvedRunConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Planning errors raised before any dispatch happens.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The store holds no validated submission.
    #[error("no validated submission is available")]
    MissingArtifacts,
    /// The store could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Execution Planner
// ============================================================================

/// Plans and dispatches execution requests from validated artifacts.
///
/// # Invariants
/// - Requests are built only from artifacts a prior validation persisted.
pub struct ExecutionPlanner<'a> {
    /// Source of validated artifacts.
    store: &'a dyn ArtifactStore,
    /// Execution worker boundary.
    backend: &'a dyn ExecutionBackend,
}

impl<'a> ExecutionPlanner<'a> {
    /// Creates a planner over the given store and backend.
    #[must_use]
    pub const fn new(store: &'a dyn ArtifactStore, backend: &'a dyn ExecutionBackend) -> Self {
        Self {
            store,
            backend,
        }
    }

    /// Builds an execution request from the latest validated artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the store fails or holds no submission.
    pub fn plan(
        &self,
        test_id: TestId,
        submitted_at: OffsetDateTime,
    ) -> Result<ExecutionRequest, PlanError> {
        let stored = self.store.latest()?.ok_or(PlanError::MissingArtifacts)?;
        let resolved = ResolvedRunConfig::from_variables(&stored.artifacts.variables);
        let users_data = stored
            .artifacts
            .dataset
            .as_deref()
            .map(|text| Dataset::parse(text).rows().to_vec())
            .unwrap_or_default();
        let config = resolved.into_payload(stored.artifacts.scenario.into_value(), users_data);
        Ok(ExecutionRequest {
            test_id,
            config,
            timestamp: format_timestamp(submitted_at),
        })
    }

    /// Plans, dispatches, and maps the result into an execution outcome.
    ///
    /// This never fails: every planning or dispatch error becomes a failed or
    /// timeout outcome carrying the minted test identifier.
    #[must_use]
    pub fn execute(&self, submitted_at: OffsetDateTime) -> ExecutionOutcome {
        let test_id = TestId::random();
        let request = match self.plan(test_id.clone(), submitted_at) {
            Ok(request) => request,
            Err(PlanError::MissingArtifacts) => {
                return ExecutionOutcome::failed(
                    test_id,
                    "missing validated configuration",
                    "upload and validate a scenario and variables document first",
                );
            }
            Err(PlanError::Store(err)) => {
                return ExecutionOutcome::failed(
                    test_id,
                    "validated artifacts are unavailable",
                    err.to_string(),
                );
            }
        };
        match self.backend.execute(&request) {
            Ok(reply) => passthrough_outcome(test_id, reply),
            Err(ExecutionError::Timeout(detail)) => ExecutionOutcome::timeout(
                test_id,
                "the test exceeded the execution time budget",
                detail,
            ),
            Err(ExecutionError::Connection(detail)) => {
                ExecutionOutcome::failed(test_id, "could not reach the execution worker", detail)
            }
            Err(err @ ExecutionError::Rejected { .. }) => ExecutionOutcome::failed(
                test_id,
                "the worker rejected the execution request",
                err.to_string(),
            ),
            Err(err) => {
                ExecutionOutcome::failed(test_id, "execution dispatch failed", err.to_string())
            }
        }
    }
}

// ============================================================================
// SECTION: Outcome Mapping
// ============================================================================

/// Maps a successful worker reply into a pass-through outcome.
fn passthrough_outcome(test_id: TestId, reply: WorkerReply) -> ExecutionOutcome {
    let duration = reply
        .summary
        .as_ref()
        .and_then(|summary| summary.get("duration"))
        .and_then(Value::as_str)
        .map(str::to_string);
    ExecutionOutcome {
        status: reply.status.unwrap_or_else(|| STATUS_COMPLETED.to_string()),
        test_id,
        message: reply.message.unwrap_or_else(|| "test executed successfully".to_string()),
        summary: reply.summary,
        report_path: reply.report_path,
        error: reply.error,
        duration,
    }
}

/// Formats a timestamp as RFC 3339; formatting a valid timestamp cannot fail.
fn format_timestamp(submitted_at: OffsetDateTime) -> String {
    submitted_at.format(&Rfc3339).unwrap_or_default()
}
