// crates/load-gate-server/src/server.rs
// ============================================================================
// Module: Gate HTTP Server
// Description: Axum router and handlers for validation and execution routes.
// Purpose: Expose the core over HTTP with fail-closed auth and bounded bodies.
// Dependencies: axum, load-gate-config, load-gate-core, load-gate-dispatch,
// load-gate-store-fs, tokio
// ============================================================================

//! ## Overview
//! The HTTP surface has six routes: `/health`, the three `/auth` routes,
//! `/upload/validate` (multipart submission), `/execute`, and
//! `/worker/health`. Protected routes resolve a verified caller identity
//! before any validation work begins. Core work is synchronous by design;
//! handlers shift it off the async runtime with `block_in_place` when the
//! runtime allows it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::Multipart;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use load_gate_config::ArtifactStoreType;
use load_gate_config::LoadGateConfig;
use load_gate_core::ArtifactStore;
use load_gate_core::ExecutionBackend;
use load_gate_core::ExecutionError;
use load_gate_core::ExecutionOutcome;
use load_gate_core::ExecutionPlanner;
use load_gate_core::InMemoryArtifactStore;
use load_gate_core::RawSubmission;
use load_gate_core::SubmissionValidator;
use load_gate_core::ValidationReport;
use load_gate_dispatch::WorkerClient;
use load_gate_store_fs::FsArtifactStore;
use load_gate_store_fs::FsStoreConfig;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;

use crate::auth::AuthAuditEvent;
use crate::auth::AuthAuditSink;
use crate::auth::AuthContext;
use crate::auth::AuthMethod;
use crate::auth::IssuedSession;
use crate::auth::RequestContext;
use crate::auth::SessionAuthz;
use crate::auth::StderrAuditSink;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gate server errors.
#[derive(Debug, thiserror::Error)]
pub enum GateServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Error responses for HTTP handlers.
#[derive(Debug)]
enum ApiError {
    /// Caller identity could not be verified.
    Unauthorized(String),
    /// Request body is malformed.
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(json!({"error": message}))).into_response()
    }
}

// ============================================================================
// SECTION: Server State
// ============================================================================

/// Shared state behind every handler.
struct ServerState {
    /// Validated-artifact store.
    store: Arc<dyn ArtifactStore>,
    /// Execution worker boundary.
    backend: Arc<dyn ExecutionBackend>,
    /// Session-issuing authorizer.
    sessions: SessionAuthz,
    /// Audit sink for auth decisions.
    audit: Arc<dyn AuthAuditSink>,
    /// Worker base URL, echoed in health responses.
    worker_url: String,
}

// ============================================================================
// SECTION: Gate Server
// ============================================================================

/// Gate server instance.
pub struct GateServer {
    /// Server configuration.
    config: LoadGateConfig,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl GateServer {
    /// Builds a gate server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GateServerError`] when the configuration is invalid or a
    /// collaborator cannot be initialized.
    pub fn from_config(config: LoadGateConfig) -> Result<Self, GateServerError> {
        config.validate().map_err(|err| GateServerError::Config(err.to_string()))?;
        let store = build_artifact_store(&config)?;
        let backend = WorkerClient::new(
            &config.worker.base_url,
            Duration::from_secs(config.worker.execute_timeout_secs),
            Duration::from_secs(config.worker.health_timeout_secs),
        )
        .map_err(|err| GateServerError::Init(err.to_string()))?;
        let sessions = SessionAuthz::from_config(config.server.auth.as_ref());
        emit_local_only_warning(&sessions);
        let state = Arc::new(ServerState {
            store,
            backend: Arc::new(backend),
            sessions,
            audit: Arc::new(StderrAuditSink),
            worker_url: config.worker.base_url.clone(),
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the gate router over the server state.
    #[must_use]
    pub fn router(&self) -> Router {
        let body_limit = DefaultBodyLimit::max(self.config.server.max_body_bytes);
        Router::new()
            .route("/health", get(handle_health))
            .route("/auth/login", post(handle_login))
            .route("/auth/verify", get(handle_verify))
            .route("/auth/logout", post(handle_logout))
            .route("/upload/validate", post(handle_validate))
            .route("/execute", post(handle_execute))
            .route("/worker/health", get(handle_worker_health))
            .layer(body_limit)
            .with_state(Arc::clone(&self.state))
    }

    /// Serves requests on the configured bind address until shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`GateServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), GateServerError> {
        let addr: SocketAddr = self
            .config
            .server
            .bind
            .parse()
            .map_err(|_| GateServerError::Config("invalid bind address".to_string()))?;
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| GateServerError::Transport("http bind failed".to_string()))?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| GateServerError::Transport("http server failed".to_string()))
    }
}

/// Builds the artifact store selected by configuration.
fn build_artifact_store(
    config: &LoadGateConfig,
) -> Result<Arc<dyn ArtifactStore>, GateServerError> {
    let keying = config.artifact_store.keying;
    match config.artifact_store.store_type {
        ArtifactStoreType::Memory => Ok(Arc::new(InMemoryArtifactStore::with_keying(keying))),
        ArtifactStoreType::Fs => {
            let path = config.artifact_store.path.clone().ok_or_else(|| {
                GateServerError::Config("fs artifact_store requires a path".to_string())
            })?;
            let store = FsArtifactStore::new(FsStoreConfig {
                path,
                keying,
            })
            .map_err(|err| GateServerError::Init(err.to_string()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Warns on startup when the server runs without configured auth.
#[allow(clippy::print_stderr, reason = "Startup warning shares the audit log destination.")]
fn emit_local_only_warning(sessions: &SessionAuthz) {
    if sessions.is_local_only() {
        eprintln!(
            "load-gate-server: WARNING: server running in local-only mode without explicit auth; \
             configure server.auth to enable bearer sessions"
        );
    }
}

// ============================================================================
// SECTION: Request Payloads
// ============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
struct LoginRequest {
    /// Login username.
    username: String,
    /// Login password.
    password: String,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Reports gate liveness.
async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok", "component": "load-gate"}))
}

/// Issues a bearer session for valid credentials.
async fn handle_login(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(login): Json<LoginRequest>,
) -> Result<Json<IssuedSession>, ApiError> {
    let ctx = request_context(peer, &headers);
    match state.sessions.login(&login.username, &login.password, OffsetDateTime::now_utc()) {
        Ok(session) => {
            let auth = AuthContext {
                method: AuthMethod::BearerSession,
                username: session.username.clone(),
                token_fingerprint: None,
            };
            state.audit.record(&AuthAuditEvent::allowed(&ctx, "auth/login", &auth));
            Ok(Json(session))
        }
        Err(err) => {
            state.audit.record(&AuthAuditEvent::denied(&ctx, "auth/login", &err));
            Err(ApiError::Unauthorized(err.to_string()))
        }
    }
}

/// Confirms the caller's session.
async fn handle_verify(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let ctx = request_context(peer, &headers);
    let auth = authorize(&state, &ctx, "auth/verify")?;
    Ok(Json(json!({"status": "valid", "username": auth.username})))
}

/// Revokes the caller's session; idempotent.
async fn handle_logout(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<Value> {
    let ctx = request_context(peer, &headers);
    state.sessions.logout(&ctx);
    Json(json!({"message": "successfully logged out"}))
}

/// Validates a multipart submission and returns the report.
async fn handle_validate(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ValidationReport>, ApiError> {
    let ctx = request_context(peer, &headers);
    authorize(&state, &ctx, "upload/validate")?;
    let submission = read_submission(multipart).await?;
    let report =
        run_blocking(|| SubmissionValidator::new(state.store.as_ref()).validate(&submission));
    Ok(Json(report))
}

/// Dispatches the latest validated submission to the worker.
async fn handle_execute(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<ExecutionOutcome>, ApiError> {
    let ctx = request_context(peer, &headers);
    authorize(&state, &ctx, "execute")?;
    let outcome = run_blocking(|| {
        ExecutionPlanner::new(state.store.as_ref(), state.backend.as_ref())
            .execute(OffsetDateTime::now_utc())
    });
    Ok(Json(outcome))
}

/// Probes the worker and passes its health body through.
async fn handle_worker_health(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let ctx = request_context(peer, &headers);
    authorize(&state, &ctx, "worker/health")?;
    let result = run_blocking(|| state.backend.health());
    Ok(Json(worker_health_body(result, &state.worker_url)))
}

// ============================================================================
// SECTION: Handler Helpers
// ============================================================================

/// Builds the auth request context from peer address and headers.
fn request_context(peer: SocketAddr, headers: &HeaderMap) -> RequestContext {
    let auth_header =
        headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
    RequestContext::new(Some(peer.ip()), auth_header)
}

/// Authorizes a request, recording the decision in the audit log.
fn authorize(
    state: &ServerState,
    ctx: &RequestContext,
    action: &str,
) -> Result<AuthContext, ApiError> {
    match state.sessions.authorize(ctx, OffsetDateTime::now_utc()) {
        Ok(auth) => {
            state.audit.record(&AuthAuditEvent::allowed(ctx, action, &auth));
            Ok(auth)
        }
        Err(err) => {
            state.audit.record(&AuthAuditEvent::denied(ctx, action, &err));
            Err(ApiError::Unauthorized(err.to_string()))
        }
    }
}

/// Reads the three named submission parts from a multipart body.
async fn read_submission(mut multipart: Multipart) -> Result<RawSubmission, ApiError> {
    let mut scenario = None;
    let mut variables = None;
    let mut dataset = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let text = field
            .text()
            .await
            .map_err(|err| ApiError::BadRequest(format!("part '{name}' is not text: {err}")))?;
        match name.as_str() {
            "scenario" => scenario = Some(text),
            "variables" => variables = Some(text),
            "users" => dataset = Some(text),
            _ => {}
        }
    }
    Ok(RawSubmission {
        scenario: scenario
            .ok_or_else(|| ApiError::BadRequest("missing multipart part 'scenario'".to_string()))?,
        variables: variables
            .ok_or_else(|| ApiError::BadRequest("missing multipart part 'variables'".to_string()))?,
        dataset,
    })
}

/// Maps a worker health probe result onto the response body.
fn worker_health_body(result: Result<Value, ExecutionError>, worker_url: &str) -> Value {
    match result {
        Ok(body) => json!({
            "status": "connected",
            "worker_status": body,
            "worker_url": worker_url,
        }),
        Err(ExecutionError::Rejected {
            status, ..
        }) => json!({
            "status": "error",
            "message": format!("worker responded with status {status}"),
            "worker_url": worker_url,
        }),
        Err(err) => json!({
            "status": "unreachable",
            "error": err.to_string(),
            "worker_url": worker_url,
        }),
    }
}

/// Runs synchronous core work, shifting to a blocking context when available.
fn run_blocking<T>(task: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(task)
        }
        _ => task(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only assertions use unwrap for clarity."
    )]

    use load_gate_core::ExecutionError;
    use serde_json::json;

    use super::run_blocking;
    use super::worker_health_body;

    #[test]
    fn worker_health_maps_success_to_connected() {
        let body = worker_health_body(Ok(json!({"status": "ok"})), "http://worker:8090");
        assert_eq!(body["status"], "connected");
        assert_eq!(body["worker_status"]["status"], "ok");
        assert_eq!(body["worker_url"], "http://worker:8090");
    }

    #[test]
    fn worker_health_maps_rejection_to_error() {
        let result = Err(ExecutionError::Rejected {
            status: 500,
            body: "boom".to_string(),
        });
        let body = worker_health_body(result, "http://worker:8090");
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "worker responded with status 500");
    }

    #[test]
    fn worker_health_maps_transport_failures_to_unreachable() {
        let result = Err(ExecutionError::Connection("refused".to_string()));
        let body = worker_health_body(result, "http://worker:8090");
        assert_eq!(body["status"], "unreachable");
        assert!(body["error"].as_str().unwrap_or_default().contains("refused"));
    }

    #[test]
    fn run_blocking_outside_a_runtime_runs_inline() {
        let value = run_blocking(|| 41 + 1);
        assert_eq!(value, 42);
    }
}
