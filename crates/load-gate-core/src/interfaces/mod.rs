// crates/load-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Load Gate Interfaces
// Description: Backend-agnostic interfaces for storage and execution dispatch.
// Purpose: Define the contract surfaces used by the Load Gate runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the validation core integrates with external systems
//! without embedding backend-specific details. Implementations must fail
//! closed: a store that cannot answer reports an error rather than a guess,
//! and a worker client maps every transport condition to a distinct error
//! kind instead of folding them into one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::document::ScenarioDocument;
use crate::core::document::VariablesDocument;
use crate::core::execution::ExecutionRequest;
use crate::core::identifiers::SubmissionKey;

// ============================================================================
// SECTION: Validated Artifacts
// ============================================================================

/// The artifact triple persisted after a successful validation.
///
/// # Invariants
/// - Documents are stored verbatim; the dataset is kept as submitted text and
///   re-parsed at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedArtifacts {
    /// Validated scenario document.
    pub scenario: ScenarioDocument,
    /// Validated variables document.
    pub variables: VariablesDocument,
    /// Raw dataset text, when a dataset was submitted.
    pub dataset: Option<String>,
}

/// A stored submission: its key and its artifacts.
///
/// # Invariants
/// - `key` is the key the artifacts were stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSubmission {
    /// Submission key.
    pub key: SubmissionKey,
    /// Stored artifact triple.
    pub artifacts: ValidatedArtifacts,
}

// ============================================================================
// SECTION: Artifact Store
// ============================================================================

/// Artifact store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("artifact store io error: {0}")]
    Io(String),
    /// Store data is invalid or corrupted.
    #[error("artifact store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("artifact store error: {0}")]
    Store(String),
}

/// Keying behavior for artifact stores.
///
/// # Invariants
/// - `SingleSlot` is last-writer-wins: a new successful validation silently
///   supersedes any previously stored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreKeying {
    /// One entry per submission key; `latest` tracks the newest write.
    #[default]
    Keyed,
    /// One shared slot for the whole store (legacy-compatible).
    SingleSlot,
}

/// Store for validated submission artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Persists the artifact triple under the submission key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn put(&self, key: &SubmissionKey, artifacts: &ValidatedArtifacts) -> Result<(), StoreError>;

    /// Loads the artifacts stored under a submission key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, key: &SubmissionKey) -> Result<Option<ValidatedArtifacts>, StoreError>;

    /// Returns the most recently stored submission, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn latest(&self) -> Result<Option<StoredSubmission>, StoreError>;

    /// Reports store readiness for health probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Artifact Store
// ============================================================================

/// Mutable state shared behind the in-memory store lock.
#[derive(Debug, Default)]
struct MemoryState {
    /// Stored submissions by key.
    entries: BTreeMap<SubmissionKey, ValidatedArtifacts>,
    /// Key of the most recent successful write.
    latest: Option<SubmissionKey>,
}

/// In-memory reference implementation of [`ArtifactStore`].
///
/// # Invariants
/// - In `SingleSlot` keying, at most one entry exists at any time.
/// - A poisoned lock surfaces as [`StoreError::Store`], never a panic.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    /// Keying behavior.
    keying: StoreKeying,
    /// Guarded store state.
    state: Mutex<MemoryState>,
}

impl InMemoryArtifactStore {
    /// Creates a keyed in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store with the given keying behavior.
    #[must_use]
    pub fn with_keying(keying: StoreKeying) -> Self {
        Self {
            keying,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Locks the store state, converting poisoning into a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("artifact store lock poisoned".to_string()))
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn put(&self, key: &SubmissionKey, artifacts: &ValidatedArtifacts) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if self.keying == StoreKeying::SingleSlot {
            state.entries.clear();
        }
        state.entries.insert(key.clone(), artifacts.clone());
        state.latest = Some(key.clone());
        Ok(())
    }

    fn get(&self, key: &SubmissionKey) -> Result<Option<ValidatedArtifacts>, StoreError> {
        let state = self.lock()?;
        Ok(state.entries.get(key).cloned())
    }

    fn latest(&self) -> Result<Option<StoredSubmission>, StoreError> {
        let state = self.lock()?;
        let Some(key) = state.latest.clone() else {
            return Ok(None);
        };
        let artifacts = state.entries.get(&key).cloned().ok_or_else(|| {
            StoreError::Invalid(format!("latest submission {key} is missing its artifacts"))
        })?;
        Ok(Some(StoredSubmission {
            key,
            artifacts,
        }))
    }
}

// ============================================================================
// SECTION: Execution Backend
// ============================================================================

/// Execution dispatch errors.
///
/// # Invariants
/// - Connection failures and timeouts are distinct kinds, never folded into
///   one generic error.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The worker could not be reached.
    #[error("worker connection failed: {0}")]
    Connection(String),
    /// The worker did not reply within the time budget.
    #[error("worker request timed out: {0}")]
    Timeout(String),
    /// The worker replied with a non-success status.
    #[error("worker rejected the request: http status {status}: {body}")]
    Rejected {
        /// HTTP status code of the reply.
        status: u16,
        /// Reply body text.
        body: String,
    },
    /// The worker reply could not be decoded.
    #[error("worker reply was not valid JSON: {0}")]
    InvalidReply(String),
    /// Any other transport failure.
    #[error("worker transport error: {0}")]
    Transport(String),
}

/// Reply payload returned by the execution worker.
///
/// # Invariants
/// - Every field is optional; the planner applies documented fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerReply {
    /// Worker-reported status label.
    pub status: Option<String>,
    /// Worker-reported message.
    pub message: Option<String>,
    /// Result summary object.
    pub summary: Option<Value>,
    /// Report location on the worker side.
    pub report_path: Option<String>,
    /// Worker-reported error detail.
    pub error: Option<String>,
}

/// Execution worker reached over a network boundary.
pub trait ExecutionBackend: Send + Sync {
    /// Dispatches an execution request and returns the worker reply.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when dispatch fails; the kind distinguishes
    /// connection failures, timeouts, rejections, and undecodable replies.
    fn execute(&self, request: &ExecutionRequest) -> Result<WorkerReply, ExecutionError>;

    /// Probes worker health and returns the reported body verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the probe fails.
    fn health(&self) -> Result<Value, ExecutionError>;
}
