// crates/load-gate-dispatch/tests/worker_client.rs
// ============================================================================
// Module: Worker Client Unit Tests
// Description: Transport-behavior tests for the worker client.
// ============================================================================
//! ## Overview
//! Exercises [`load_gate_dispatch::WorkerClient`] against a stub HTTP server:
//! reply pass-through, rejected statuses, connection failures, and timeouts
//! each surface as their own error kind.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use load_gate_core::ExecutionBackend;
use load_gate_core::ExecutionError;
use load_gate_core::ExecutionRequest;
use load_gate_core::LoadMode;
use load_gate_core::RunConfigPayload;
use load_gate_core::TestId;
use load_gate_dispatch::WorkerClient;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a minimal execution request for dispatch tests.
fn request() -> ExecutionRequest {
    ExecutionRequest {
        test_id: TestId::new("test_fixture"),
        config: RunConfigPayload {
            mode: LoadMode::Users,
            virtual_users: 1,
            total_requests: 100,
            duration: "2m".to_string(),
            warmup: "30s".to_string(),
            environment: BTreeMap::new(),
            scenario: json!({"name": "s", "steps": []}),
            users_data: Vec::new(),
        },
        timestamp: "2025-06-01T12:00:00Z".to_string(),
    }
}

/// Builds a client pointed at the given address with short budgets.
fn client(addr: &str) -> WorkerClient {
    WorkerClient::new(
        &format!("http://{addr}"),
        Duration::from_secs(2),
        Duration::from_secs(1),
    )
    .expect("worker client")
}

/// JSON content-type header for stub responses.
fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("header")
}

// ============================================================================
// SECTION: Execute Dispatch
// ============================================================================

#[test]
fn execute_parses_a_successful_worker_reply() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();

    let handle = thread::spawn(move || {
        if let Ok(mut incoming) = server.recv() {
            let mut body = String::new();
            incoming.as_reader().read_to_string(&mut body).expect("read body");
            let payload: Value = serde_json::from_str(&body).expect("request json");
            assert_eq!(payload["test_id"], "test_fixture");
            assert_eq!(payload["config"]["virtualUsers"], 1);
            let reply = json!({
                "status": "success",
                "message": "done",
                "summary": {"duration": "1m"},
            });
            let response =
                Response::from_string(reply.to_string()).with_header(json_header());
            incoming.respond(response).expect("respond");
        }
    });

    let reply = client(&addr).execute(&request()).expect("execute");
    assert_eq!(reply.status.as_deref(), Some("success"));
    assert_eq!(reply.message.as_deref(), Some("done"));

    handle.join().expect("server thread");
}

#[test]
fn execute_maps_non_success_status_to_rejected() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();

    let handle = thread::spawn(move || {
        if let Ok(incoming) = server.recv() {
            let response = Response::from_string("worker busy")
                .with_status_code(tiny_http::StatusCode(503));
            incoming.respond(response).expect("respond");
        }
    });

    let error = client(&addr).execute(&request()).err().expect("rejected");
    match error {
        ExecutionError::Rejected {
            status,
            body,
        } => {
            assert_eq!(status, 503);
            assert_eq!(body, "worker busy");
        }
        other => panic!("unexpected error kind: {other}"),
    }

    handle.join().expect("server thread");
}

#[test]
fn execute_maps_undecodable_reply_to_invalid_reply() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();

    let handle = thread::spawn(move || {
        if let Ok(incoming) = server.recv() {
            let response = Response::from_string("<html>not json</html>");
            incoming.respond(response).expect("respond");
        }
    });

    let error = client(&addr).execute(&request()).err().expect("invalid reply");
    assert!(matches!(error, ExecutionError::InvalidReply(_)));

    handle.join().expect("server thread");
}

#[test]
fn execute_maps_refused_connection_to_connection_error() {
    // Bind and drop a listener so the port is known-free.
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let addr = listener.local_addr().expect("addr").to_string();
    drop(listener);

    let error = client(&addr).execute(&request()).err().expect("connection error");
    assert!(matches!(error, ExecutionError::Connection(_)));
}

#[test]
fn execute_maps_elapsed_budget_to_timeout() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();

    let handle = thread::spawn(move || {
        if let Ok(incoming) = server.recv() {
            // Hold the request past the client's budget before answering.
            thread::sleep(Duration::from_secs(3));
            let response = Response::from_string("{}").with_header(json_header());
            let _ = incoming.respond(response);
        }
    });

    let error = client(&addr).execute(&request()).err().expect("timeout");
    assert!(matches!(error, ExecutionError::Timeout(_)));

    handle.join().expect("server thread");
}

// ============================================================================
// SECTION: Health Probes
// ============================================================================

#[test]
fn health_passes_the_worker_body_through_verbatim() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();

    let handle = thread::spawn(move || {
        if let Ok(incoming) = server.recv() {
            let reply = json!({"status": "ok", "component": "worker", "uptime": "3h"});
            let response =
                Response::from_string(reply.to_string()).with_header(json_header());
            incoming.respond(response).expect("respond");
        }
    });

    let body = client(&addr).health().expect("health");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["uptime"], "3h");

    handle.join().expect("server thread");
}

#[test]
fn health_maps_non_success_status_to_rejected() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();

    let handle = thread::spawn(move || {
        if let Ok(incoming) = server.recv() {
            let response =
                Response::from_string("down").with_status_code(tiny_http::StatusCode(500));
            incoming.respond(response).expect("respond");
        }
    });

    let error = client(&addr).health().err().expect("rejected");
    assert!(matches!(error, ExecutionError::Rejected { status: 500, .. }));

    handle.join().expect("server thread");
}

// ============================================================================
// SECTION: Construction
// ============================================================================

#[test]
fn non_http_worker_urls_are_rejected() {
    let result =
        WorkerClient::new("ftp://worker:21", Duration::from_secs(1), Duration::from_secs(1));
    assert!(result.is_err());
}
