//! Config load validation tests for load-gate-config.
// crates/load-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use load_gate_config::ConfigError;
use load_gate_config::LoadGateConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<LoadGateConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_without_path_yields_defaults() -> TestResult {
    let config = LoadGateConfig::load(None).map_err(|err| err.to_string())?;
    if config.server.bind != "127.0.0.1:8080" {
        return Err(format!("unexpected default bind {}", config.server.bind));
    }
    if config.worker.execute_timeout_secs != 300 {
        return Err("unexpected default execute timeout".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(LoadGateConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(LoadGateConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(LoadGateConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(LoadGateConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[server\nbind = ").map_err(|err| err.to_string())?;
    assert_invalid(LoadGateConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_accepts_a_complete_document() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let document = r#"
[server]
bind = "0.0.0.0:9000"
max_body_bytes = 262144

[[server.auth.users]]
username = "admin"
password = "admin123"

[worker]
base_url = "http://127.0.0.1:8090"
execute_timeout_secs = 120
health_timeout_secs = 2

[artifact_store]
store_type = "fs"
path = "/var/lib/load-gate"
keying = "single_slot"
"#;
    file.write_all(document.as_bytes()).map_err(|err| err.to_string())?;
    let config = LoadGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.server.bind != "0.0.0.0:9000" {
        return Err("bind not loaded".to_string());
    }
    let auth = config.server.auth.as_ref().ok_or("auth not loaded")?;
    if auth.users.len() != 1 || auth.users[0].username != "admin" {
        return Err("auth users not loaded".to_string());
    }
    Ok(())
}
