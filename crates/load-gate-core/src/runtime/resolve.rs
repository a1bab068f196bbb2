// crates/load-gate-core/src/runtime/resolve.rs
// ============================================================================
// Module: Run Configuration Resolution
// Description: Single-step defaulting of variables-document run parameters.
// Purpose: Centralize every default so no use site resolves them ad hoc.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Every optional field of the variables document is resolved here, once per
//! execution request. The recognized options are exactly: `mode`,
//! `virtualUsers`, `totalRequests`, `duration`, `warmup`, and `environment`.
//! Downstream code reads the resolved configuration and never consults the
//! raw document again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::document::LoadMode;
use crate::core::document::VariablesDocument;
use crate::core::execution::RunConfigPayload;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default load-generation mode.
pub const DEFAULT_MODE: LoadMode = LoadMode::Users;
/// Default virtual user population.
pub const DEFAULT_VIRTUAL_USERS: u64 = 1;
/// Default total request count.
pub const DEFAULT_TOTAL_REQUESTS: u64 = 100;
/// Default test duration.
pub const DEFAULT_DURATION: &str = "2m";
/// Default warmup period.
pub const DEFAULT_WARMUP: &str = "30s";

// ============================================================================
// SECTION: Resolved Run Configuration
// ============================================================================

/// Variables-document run parameters with every default applied.
///
/// # Invariants
/// - Resolution is total: any well-formed variables document resolves, with
///   unrecognized or mistyped fields falling back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRunConfig {
    /// Load-generation mode.
    pub mode: LoadMode,
    /// Virtual user population.
    pub virtual_users: u64,
    /// Total request count.
    pub total_requests: u64,
    /// Test duration, worker-interpreted.
    pub duration: String,
    /// Warmup period, worker-interpreted.
    pub warmup: String,
    /// Environment substitutions. Non-string values are carried as their
    /// compact JSON form so no validated key is ever dropped.
    pub environment: BTreeMap<String, String>,
}

impl ResolvedRunConfig {
    /// Resolves run parameters from a validated variables document.
    #[must_use]
    pub fn from_variables(variables: &VariablesDocument) -> Self {
        let root = variables.as_value();
        let mode = root
            .get("mode")
            .and_then(Value::as_str)
            .and_then(LoadMode::parse)
            .unwrap_or(DEFAULT_MODE);
        let virtual_users =
            root.get("virtualUsers").and_then(Value::as_u64).unwrap_or(DEFAULT_VIRTUAL_USERS);
        let total_requests =
            root.get("totalRequests").and_then(Value::as_u64).unwrap_or(DEFAULT_TOTAL_REQUESTS);
        let duration = root
            .get("duration")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DURATION)
            .to_string();
        let warmup =
            root.get("warmup").and_then(Value::as_str).unwrap_or(DEFAULT_WARMUP).to_string();
        let environment = root
            .get("environment")
            .and_then(Value::as_object)
            .map(|section| {
                section
                    .iter()
                    .map(|(key, value)| (key.clone(), environment_value(value)))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            mode,
            virtual_users,
            total_requests,
            duration,
            warmup,
            environment,
        }
    }

    /// Assembles the worker config payload around this resolved configuration.
    #[must_use]
    pub fn into_payload(
        self,
        scenario: Value,
        users_data: Vec<BTreeMap<String, String>>,
    ) -> RunConfigPayload {
        RunConfigPayload {
            mode: self.mode,
            virtual_users: self.virtual_users,
            total_requests: self.total_requests,
            duration: self.duration,
            warmup: self.warmup,
            environment: self.environment,
            scenario,
            users_data,
        }
    }
}

/// Renders an environment value as a substitution string.
fn environment_value(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), str::to_string)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
