// crates/load-gate-core/src/core/report.rs
// ============================================================================
// Module: Validation Report
// Description: Aggregated outcome of a submission validation run.
// Purpose: Carry pass/fail, diagnostics, and analysis in one stable record.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The validation report is the single outcome type for a submission. Its wire
//! form matches the original orchestrator protocol: `status`, `message`,
//! `errors`, `warnings`, and an `analysis` object with snake_case keys.
//! Diagnostics are ordered strings; each names the violated rule and the
//! field or value that triggered it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::template::VariableCatalog;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Overall validation status.
///
/// # Invariants
/// - `Error` if and only if the report carries at least one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// All artifacts are valid and mutually consistent.
    Success,
    /// At least one decode, structural, cross-reference, or persistence error.
    Error,
}

// ============================================================================
// SECTION: Analysis
// ============================================================================

/// Analysis section of the validation report.
///
/// # Invariants
/// - Populated on a best-effort basis; present even when validation fails.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReportAnalysis {
    /// Placeholder references found in the scenario, bucketed by origin.
    pub variables_found: VariableCatalog,
    /// Cleaned dataset column names (empty when no dataset was submitted).
    pub dataset_columns: Vec<String>,
    /// Whether the validated artifacts were persisted to the store.
    pub files_saved: bool,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Aggregated validation report for one submission.
///
/// # Invariants
/// - `errors` is empty if and only if `status` is [`ValidationStatus::Success`].
/// - Re-validating identical artifacts yields a byte-identical report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Overall pass/fail status.
    pub status: ValidationStatus,
    /// Fixed human-readable summary templated with the error count.
    pub message: String,
    /// Ordered diagnostics; empty on success.
    pub errors: Vec<String>,
    /// Ordered non-fatal warnings, independent of the error state.
    pub warnings: Vec<String>,
    /// Best-effort analysis of the submission.
    pub analysis: ReportAnalysis,
}

impl ValidationReport {
    /// Returns true when the submission passed validation.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Success
    }
}
