// crates/load-gate-server/src/main.rs
// ============================================================================
// Module: Gate Server Entry Point
// Description: Binary entry point for the Load Gate HTTP server.
// Purpose: Load configuration, build the server, and serve until shutdown.
// Dependencies: load-gate-config, load-gate-server, tokio
// ============================================================================

//! ## Overview
//! The binary takes one optional argument — the path to a TOML configuration
//! file — and serves the gate on the configured bind address. Every startup
//! failure is reported on stderr with a non-zero exit code; the process never
//! panics on bad input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use load_gate_config::LoadGateConfig;
use load_gate_server::GateServer;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Loads configuration, builds the gate server, and serves requests.
#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match LoadGateConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => return fail(&format!("failed to load config: {err}")),
    };
    let server = match GateServer::from_config(config) {
        Ok(server) => server,
        Err(err) => return fail(&format!("failed to start: {err}")),
    };
    match server.serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&format!("server failed: {err}")),
    }
}

/// Reports a fatal error and returns the failure exit code.
#[allow(clippy::print_stderr, reason = "Startup failures must reach the operator.")]
fn fail(message: &str) -> ExitCode {
    eprintln!("load-gate-server: {message}");
    ExitCode::FAILURE
}
