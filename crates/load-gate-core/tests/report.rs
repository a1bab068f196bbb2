// crates/load-gate-core/tests/report.rs
// ============================================================================
// Module: Validation Report Tests
// Description: End-to-end report building over raw submissions.
// Purpose: Verify aggregation order, gating, warnings, and persistence rules.
// ============================================================================
//! ## Overview
//! Drives [`load_gate_core::SubmissionValidator`] with complete raw
//! submissions and checks the aggregated report: decode short-circuiting,
//! structural gating of cross-reference checks, warning independence,
//! success-only persistence, and idempotence.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

use load_gate_core::ArtifactStore;
use load_gate_core::InMemoryArtifactStore;
use load_gate_core::RawSubmission;
use load_gate_core::StoreError;
use load_gate_core::StoredSubmission;
use load_gate_core::SubmissionKey;
use load_gate_core::SubmissionValidator;
use load_gate_core::ValidatedArtifacts;
use load_gate_core::ValidationStatus;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Scenario used by the end-to-end cases: one GET step with a user reference.
const SCENARIO: &str =
    r#"{"name":"s","steps":[{"name":"step1","method":"GET","url":"/x?id={{user.id}}"}]}"#;
/// Variables used by the end-to-end cases: five virtual users.
const VARIABLES: &str = r#"{"mode":"users","virtualUsers":5}"#;

/// Builds a submission from the given parts.
fn submission(scenario: &str, variables: &str, dataset: Option<&str>) -> RawSubmission {
    RawSubmission {
        scenario: scenario.to_string(),
        variables: variables.to_string(),
        dataset: dataset.map(str::to_string),
    }
}

/// Store whose writes always fail, for persistence-downgrade tests.
struct FailingStore;

impl ArtifactStore for FailingStore {
    fn put(&self, _key: &SubmissionKey, _artifacts: &ValidatedArtifacts) -> Result<(), StoreError> {
        Err(StoreError::Io("disk full".to_string()))
    }

    fn get(&self, _key: &SubmissionKey) -> Result<Option<ValidatedArtifacts>, StoreError> {
        Ok(None)
    }

    fn latest(&self) -> Result<Option<StoredSubmission>, StoreError> {
        Ok(None)
    }
}

// ============================================================================
// SECTION: Decode Failures
// ============================================================================

#[test]
fn undecodable_scenario_yields_a_minimal_report() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission("{not json", VARIABLES, None));
    assert_eq!(report.status, ValidationStatus::Error);
    assert_eq!(report.message, "artifact decoding failed");
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("scenario is not valid JSON"));
    assert!(report.warnings.is_empty());
    assert!(report.analysis.variables_found.user().is_empty());
}

#[test]
fn undecodable_variables_yields_a_minimal_report() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(SCENARIO, "][", None));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("variables is not valid JSON"));
}

// ============================================================================
// SECTION: Gating
// ============================================================================

#[test]
fn empty_steps_fail_structurally_and_skip_cross_reference() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(
        r#"{"name":"s","steps":[]}"#,
        r#"{"mode":"users","virtualUsers":1}"#,
        None,
    ));
    assert_eq!(report.status, ValidationStatus::Error);
    assert_eq!(report.errors, vec!["scenario must have at least one step".to_string()]);
}

#[test]
fn dataset_errors_do_not_gate_cross_reference_checks() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    // Headers only: dataset fails its own check, yet the user.id reference is
    // still resolved against the (valid) column list.
    let report = validator.validate(&submission(SCENARIO, VARIABLES, Some("id,name\n")));
    assert_eq!(report.status, ValidationStatus::Error);
    assert_eq!(report.errors, vec!["dataset has no data rows (headers only)".to_string()]);
    assert_eq!(report.analysis.dataset_columns, ["id".to_string(), "name".to_string()]);
}

// ============================================================================
// SECTION: End-to-End Outcomes
// ============================================================================

#[test]
fn consistent_submission_succeeds_and_persists() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(SCENARIO, VARIABLES, Some("id,name\nu1,alice\n")));
    assert_eq!(report.status, ValidationStatus::Success);
    assert_eq!(report.message, "all artifacts are valid and consistent");
    assert!(report.errors.is_empty());
    assert_eq!(report.analysis.variables_found.user(), ["id".to_string()]);
    assert!(report.analysis.files_saved);
    let stored = store.latest().expect("latest").expect("stored submission");
    assert_eq!(stored.artifacts.dataset.as_deref(), Some("id,name\nu1,alice\n"));
}

#[test]
fn missing_referenced_column_fails_with_one_specific_error() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(SCENARIO, VARIABLES, Some("name\nalice\n")));
    assert_eq!(report.status, ValidationStatus::Error);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("{{user.id}}"));
    assert!(report.errors[0].contains("'id' is missing from the dataset"));
    assert!(!report.analysis.files_saved);
    assert!(store.latest().expect("latest").is_none());
}

#[test]
fn boundary_zero_total_requests_is_a_structural_error() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(
        r#"{"name":"s","steps":[{"name":"a","method":"GET","url":"/"}]}"#,
        r#"{"mode":"requests","totalRequests":0}"#,
        None,
    ));
    assert_eq!(report.errors, vec!["'totalRequests' must be a positive integer".to_string()]);
}

// ============================================================================
// SECTION: Warnings
// ============================================================================

#[test]
fn missing_dataset_with_user_references_warns() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(SCENARIO, VARIABLES, None));
    // The mode/dataset mismatch is an error; the warning still names the
    // referenced columns.
    assert_eq!(report.status, ValidationStatus::Error);
    assert_eq!(
        report.warnings,
        vec!["no dataset was provided but user variables are referenced: id".to_string()]
    );
}

#[test]
fn unused_dataset_warns_without_failing() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(
        r#"{"name":"s","steps":[{"name":"a","method":"GET","url":"/"}]}"#,
        VARIABLES,
        Some("id\nu1\n"),
    ));
    assert_eq!(report.status, ValidationStatus::Success);
    assert_eq!(
        report.warnings,
        vec!["a dataset was provided but the scenario references no user variables".to_string()]
    );
}

// ============================================================================
// SECTION: Persistence Failures
// ============================================================================

#[test]
fn store_failure_downgrades_to_an_appended_error() {
    let store = FailingStore;
    let validator = SubmissionValidator::new(&store);
    let report = validator.validate(&submission(SCENARIO, VARIABLES, Some("id\nu1\n")));
    assert_eq!(report.status, ValidationStatus::Error);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("failed to persist validated artifacts"));
    assert!(report.errors[0].contains("disk full"));
    // Analysis survives the downgrade.
    assert_eq!(report.analysis.variables_found.user(), ["id".to_string()]);
    assert!(!report.analysis.files_saved);
}

// ============================================================================
// SECTION: Idempotence
// ============================================================================

#[test]
fn revalidating_identical_artifacts_yields_identical_reports() {
    let store = InMemoryArtifactStore::new();
    let validator = SubmissionValidator::new(&store);
    let input = submission(SCENARIO, VARIABLES, Some("id,name\nu1,alice\n"));
    let first = validator.validate(&input);
    let second = validator.validate(&input);
    let first_json = serde_json::to_vec(&first).expect("serialize first");
    let second_json = serde_json::to_vec(&second).expect("serialize second");
    assert_eq!(first_json, second_json);
}
