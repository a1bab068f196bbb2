//! Worker and artifact-store validation tests for load-gate-config.
// crates/load-gate-config/tests/worker_validation.rs
// =============================================================================
// Module: Worker Config Validation Tests
// Description: Validate worker URL, timeout, and store cross-field rules.
// Purpose: Ensure misconfigured collaborators are rejected before serving.
// =============================================================================

use std::path::PathBuf;

use load_gate_config::ArtifactStoreType;
use load_gate_config::ConfigError;
use load_gate_config::LoadGateConfig;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn malformed_worker_url_is_rejected() -> TestResult {
    let mut config = LoadGateConfig::default();
    config.worker.base_url = "not a url".to_string();
    assert_invalid(config.validate(), "worker.base_url must be a valid url")
}

#[test]
fn non_http_worker_scheme_is_rejected() -> TestResult {
    let mut config = LoadGateConfig::default();
    config.worker.base_url = "ftp://worker:21".to_string();
    assert_invalid(config.validate(), "worker.base_url must use http or https")
}

#[test]
fn zero_execute_timeout_is_rejected() -> TestResult {
    let mut config = LoadGateConfig::default();
    config.worker.execute_timeout_secs = 0;
    assert_invalid(config.validate(), "worker.execute_timeout_secs must be greater than zero")
}

#[test]
fn zero_health_timeout_is_rejected() -> TestResult {
    let mut config = LoadGateConfig::default();
    config.worker.health_timeout_secs = 0;
    assert_invalid(config.validate(), "worker.health_timeout_secs must be greater than zero")
}

#[test]
fn fs_store_without_path_is_rejected() -> TestResult {
    let mut config = LoadGateConfig::default();
    config.artifact_store.store_type = ArtifactStoreType::Fs;
    assert_invalid(config.validate(), "fs artifact_store requires a path")
}

#[test]
fn fs_store_with_path_validates() -> TestResult {
    let mut config = LoadGateConfig::default();
    config.artifact_store.store_type = ArtifactStoreType::Fs;
    config.artifact_store.path = Some(PathBuf::from("/var/lib/load-gate"));
    config.validate().map_err(|err| err.to_string())
}
