// crates/load-gate-core/src/runtime/validator.rs
// ============================================================================
// Module: Submission Validator
// Description: Structural and cross-reference checks plus report aggregation.
// Purpose: Decide whether three artifacts form a coherent test configuration.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! [`SubmissionValidator`] is the single consolidated report builder; every
//! entry surface routes through it and none re-implements classification or
//! structural rules. Checks collect every violated rule rather than stopping
//! at the first, with the documented exceptions: a document that is not JSON
//! at all is terminal for the submission, and a scenario without a usable
//! `steps` array skips the per-step checks that would be meaningless.
//!
//! Cross-reference checks run only when the scenario and variables checks are
//! both clean; dataset errors do not gate them, since dataset absence is
//! itself one of the conditions being checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::dataset::Dataset;
use crate::core::document::HttpMethod;
use crate::core::document::LoadMode;
use crate::core::document::ScenarioDocument;
use crate::core::document::VariablesDocument;
use crate::core::identifiers::SubmissionKey;
use crate::core::report::ReportAnalysis;
use crate::core::report::ValidationReport;
use crate::core::report::ValidationStatus;
use crate::core::template::VariableCatalog;
use crate::interfaces::ArtifactStore;
use crate::interfaces::ValidatedArtifacts;

// ============================================================================
// SECTION: Report Messages
// ============================================================================

/// Summary message for a submission that failed to decode.
const MSG_DECODE_FAILED: &str = "artifact decoding failed";
/// Summary message for a fully consistent submission.
const MSG_SUCCESS: &str = "all artifacts are valid and consistent";

/// Label used for steps that carry no usable name.
const UNNAMED_STEP: &str = "unnamed";

// ============================================================================
// SECTION: Raw Submission
// ============================================================================

/// Raw artifact texts as received from the caller.
///
/// # Invariants
/// - Texts are unparsed; decoding happens inside the validator so parse
///   failures become report errors instead of transport errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSubmission {
    /// Scenario document text (JSON).
    pub scenario: String,
    /// Variables document text (JSON).
    pub variables: String,
    /// Optional dataset text (delimited tabular).
    pub dataset: Option<String>,
}

// ============================================================================
// SECTION: Structural Checks
// ============================================================================

/// Checks the scenario document shape and returns one error per violation.
#[must_use]
pub fn check_scenario(scenario: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(root) = scenario.as_object() else {
        errors.push("scenario must be a JSON object".to_string());
        return errors;
    };
    if !root.contains_key("name") {
        errors.push("scenario must have a 'name'".to_string());
    }
    let Some(steps) = root.get("steps") else {
        errors.push("scenario must have 'steps'".to_string());
        return errors;
    };
    let Some(steps) = steps.as_array() else {
        errors.push("'steps' must be an array".to_string());
        return errors;
    };
    if steps.is_empty() {
        errors.push("scenario must have at least one step".to_string());
    }
    for (index, step) in steps.iter().enumerate() {
        let position = index + 1;
        let Some(step) = step.as_object() else {
            errors.push(format!("step {position} must be an object"));
            continue;
        };
        let label = step.get("name").and_then(Value::as_str).unwrap_or(UNNAMED_STEP);
        for field in ["name", "method", "url"] {
            if !step.contains_key(field) {
                errors.push(format!("step {position} '{label}' is missing field '{field}'"));
            }
        }
        if let Some(method) = step.get("method") {
            let valid = method.as_str().is_some_and(|raw| HttpMethod::parse(raw).is_some());
            if !valid {
                errors.push(format!("step {position} has an invalid HTTP method: {method}"));
            }
        }
    }
    errors
}

/// Checks the variables document shape and returns one error per violation.
#[must_use]
pub fn check_variables(variables: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(root) = variables.as_object() else {
        errors.push("variables must be a JSON object".to_string());
        return errors;
    };
    let mode = match root.get("mode") {
        None => {
            errors.push("variables must specify a 'mode'".to_string());
            None
        }
        Some(raw) => {
            let parsed = raw.as_str().and_then(LoadMode::parse);
            if parsed.is_none() {
                errors.push("mode must be 'users' or 'requests'".to_string());
            }
            parsed
        }
    };
    if mode == Some(LoadMode::Users) {
        match root.get("virtualUsers") {
            None => errors.push("mode 'users' requires the field 'virtualUsers'".to_string()),
            Some(count) if !is_positive_integer(count) => {
                errors.push("'virtualUsers' must be a positive integer".to_string());
            }
            Some(_) => {}
        }
    }
    if mode == Some(LoadMode::Requests) {
        match root.get("totalRequests") {
            None => errors.push("mode 'requests' requires the field 'totalRequests'".to_string()),
            Some(count) if !is_positive_integer(count) => {
                errors.push("'totalRequests' must be a positive integer".to_string());
            }
            Some(_) => {}
        }
    }
    errors
}

/// Returns true for JSON numbers that are integers greater than zero.
fn is_positive_integer(value: &Value) -> bool {
    value.as_u64().is_some_and(|count| count > 0)
}

/// Checks dataset structure. At most one violation is reported; the checks
/// are sequential because each presupposes the previous one.
#[must_use]
pub fn check_dataset(dataset: &Dataset) -> Vec<String> {
    if !dataset.has_header_line() {
        return vec!["dataset is empty or has no header row".to_string()];
    }
    if dataset.columns().is_empty() {
        return vec!["dataset has no usable columns".to_string()];
    }
    if dataset.rows().is_empty() {
        return vec!["dataset has no data rows (headers only)".to_string()];
    }
    Vec::new()
}

// ============================================================================
// SECTION: Cross-Reference Checks
// ============================================================================

/// Checks that every placeholder reference resolves against its declared
/// source. All errors are collected; nothing short-circuits.
#[must_use]
pub fn check_cross_references(
    catalog: &VariableCatalog,
    variables: &VariablesDocument,
    dataset_columns: &[String],
) -> Vec<String> {
    let mut errors = Vec::new();
    for column in catalog.user() {
        if !dataset_columns.iter().any(|name| name == column) {
            errors.push(format!(
                "variable '{{{{user.{column}}}}}' is referenced in the scenario but column \
                 '{column}' is missing from the dataset"
            ));
        }
    }
    let environment = variables.environment_keys();
    for key in catalog.env() {
        if !environment.iter().any(|name| name == key) {
            errors.push(format!(
                "variable '{{{{env.{key}}}}}' is referenced in the scenario but key '{key}' is \
                 missing from the variables 'environment'"
            ));
        }
    }
    let mode = variables.as_value().get("mode").and_then(Value::as_str);
    if mode == Some(LoadMode::Users.as_str()) && dataset_columns.is_empty() {
        errors.push("mode 'users' requires a dataset with at least one column".to_string());
    }
    errors
}

// ============================================================================
// SECTION: Submission Validator
// ============================================================================

/// Consolidated validation report builder.
///
/// # Invariants
/// - The store is written only when the combined error list is empty; a store
///   failure is appended as one more error without discarding the analysis.
pub struct SubmissionValidator<'a> {
    /// Destination for validated artifacts.
    store: &'a dyn ArtifactStore,
}

impl<'a> SubmissionValidator<'a> {
    /// Creates a validator that persists into the given store.
    #[must_use]
    pub const fn new(store: &'a dyn ArtifactStore) -> Self {
        Self {
            store,
        }
    }

    /// Validates a raw submission and returns the aggregated report.
    ///
    /// Identical inputs produce byte-identical reports (absent a concurrent
    /// store failure).
    #[must_use]
    pub fn validate(&self, submission: &RawSubmission) -> ValidationReport {
        let scenario = match ScenarioDocument::decode(&submission.scenario) {
            Ok(document) => document,
            Err(err) => return decode_failure_report(&err.to_string()),
        };
        let variables = match VariablesDocument::decode(&submission.variables) {
            Ok(document) => document,
            Err(err) => return decode_failure_report(&err.to_string()),
        };

        let mut errors = Vec::new();
        let dataset = submission.dataset.as_deref().map(Dataset::parse);
        let dataset_columns = dataset.as_ref().map(|parsed| parsed.columns().to_vec());
        if let Some(parsed) = &dataset {
            errors.extend(check_dataset(parsed));
        }

        let scenario_errors = check_scenario(scenario.as_value());
        let variables_errors = check_variables(variables.as_value());
        let catalog = VariableCatalog::from_scenario(&scenario);

        let structurally_clean = scenario_errors.is_empty() && variables_errors.is_empty();
        errors.extend(scenario_errors);
        errors.extend(variables_errors);
        if structurally_clean {
            errors.extend(check_cross_references(
                &catalog,
                &variables,
                dataset_columns.as_deref().unwrap_or_default(),
            ));
        }

        let mut warnings = Vec::new();
        if submission.dataset.is_none() && catalog.references_dataset() {
            warnings.push(format!(
                "no dataset was provided but user variables are referenced: {}",
                catalog.user().join(", ")
            ));
        }
        if submission.dataset.is_some() && !catalog.references_dataset() {
            warnings
                .push("a dataset was provided but the scenario references no user variables"
                    .to_string());
        }

        let mut files_saved = false;
        if errors.is_empty() {
            let key = SubmissionKey::derive(&scenario, &variables, submission.dataset.as_deref());
            let artifacts = ValidatedArtifacts {
                scenario,
                variables,
                dataset: submission.dataset.clone(),
            };
            match self.store.put(&key, &artifacts) {
                Ok(()) => files_saved = true,
                Err(err) => errors.push(format!("failed to persist validated artifacts: {err}")),
            }
        }

        let analysis = ReportAnalysis {
            variables_found: catalog,
            dataset_columns: dataset_columns.unwrap_or_default(),
            files_saved,
        };
        if errors.is_empty() {
            ValidationReport {
                status: ValidationStatus::Success,
                message: MSG_SUCCESS.to_string(),
                errors,
                warnings,
                analysis,
            }
        } else {
            ValidationReport {
                status: ValidationStatus::Error,
                message: format!("validation failed: {} error(s) detected", errors.len()),
                errors,
                warnings,
                analysis,
            }
        }
    }
}

/// Builds the minimal report for a submission that failed to decode.
fn decode_failure_report(error: &str) -> ValidationReport {
    ValidationReport {
        status: ValidationStatus::Error,
        message: MSG_DECODE_FAILED.to_string(),
        errors: vec![error.to_string()],
        warnings: Vec::new(),
        analysis: ReportAnalysis::default(),
    }
}
