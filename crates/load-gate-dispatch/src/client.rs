// crates/load-gate-dispatch/src/client.rs
// ============================================================================
// Module: Worker Client
// Description: Blocking execution-worker client with bounded round-trips.
// Purpose: Dispatch execution requests and health probes, fail closed.
// Dependencies: load-gate-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The worker client wraps two blocking HTTP clients: one with the long
//! execution budget (a load test legitimately runs for minutes) and one with
//! the short health-probe budget. Redirects are rejected and non-success
//! statuses fail closed with the reply body preserved for diagnostics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use load_gate_core::ExecutionBackend;
use load_gate_core::ExecutionError;
use load_gate_core::ExecutionRequest;
use load_gate_core::WorkerReply;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Worker route receiving execution requests.
const EXECUTE_ROUTE: &str = "/execute";
/// Worker route answering health probes.
const HEALTH_ROUTE: &str = "/health";

// ============================================================================
// SECTION: Worker Client
// ============================================================================

/// Blocking HTTP client for the execution worker.
///
/// # Invariants
/// - Redirects are rejected on both clients.
/// - `execute` and `health` round-trips are bounded by their own timeouts.
#[derive(Debug, Clone)]
pub struct WorkerClient {
    /// Base URL of the worker.
    base_url: Url,
    /// Client used for execution dispatch (long budget).
    execute_client: Client,
    /// Client used for health probes (short budget).
    health_client: Client,
}

impl WorkerClient {
    /// Builds a worker client for the given base URL and time budgets.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the URL is not http(s) or a client
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        execute_timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, ExecutionError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ExecutionError::Transport(format!("invalid worker url: {err}")))?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ExecutionError::Transport(format!(
                    "unsupported worker url scheme: {scheme}"
                )));
            }
        }
        Ok(Self {
            base_url,
            execute_client: build_client(execute_timeout)?,
            health_client: build_client(health_timeout)?,
        })
    }

    /// Resolves a worker route against the base URL.
    fn route(&self, route: &str) -> Result<Url, ExecutionError> {
        self.base_url
            .join(route)
            .map_err(|err| ExecutionError::Transport(format!("invalid worker route: {err}")))
    }
}

impl ExecutionBackend for WorkerClient {
    fn execute(&self, request: &ExecutionRequest) -> Result<WorkerReply, ExecutionError> {
        let url = self.route(EXECUTE_ROUTE)?;
        let response = self
            .execute_client
            .post(url)
            .json(request)
            .send()
            .map_err(map_transport_error)?;
        let response = require_success(response)?;
        response.json().map_err(|err| ExecutionError::InvalidReply(err.to_string()))
    }

    fn health(&self) -> Result<Value, ExecutionError> {
        let url = self.route(HEALTH_ROUTE)?;
        let response = self.health_client.get(url).send().map_err(map_transport_error)?;
        let response = require_success(response)?;
        response.json().map_err(|err| ExecutionError::InvalidReply(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a blocking client with the given timeout and no redirects.
fn build_client(timeout: Duration) -> Result<Client, ExecutionError> {
    Client::builder()
        .redirect(Policy::none())
        .timeout(timeout)
        .build()
        .map_err(|err| ExecutionError::Transport(err.to_string()))
}

/// Maps a reqwest transport error to its distinguished kind.
fn map_transport_error(err: reqwest::Error) -> ExecutionError {
    if err.is_timeout() {
        ExecutionError::Timeout(err.to_string())
    } else if err.is_connect() {
        ExecutionError::Connection(err.to_string())
    } else {
        ExecutionError::Transport(err.to_string())
    }
}

/// Fails closed on non-success statuses, preserving the reply body.
fn require_success(response: Response) -> Result<Response, ExecutionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ExecutionError::Rejected {
        status: status.as_u16(),
        body,
    })
}
