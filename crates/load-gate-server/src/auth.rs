// crates/load-gate-server/src/auth.rs
// ============================================================================
// Module: Gate Authn/Authz
// Description: Bearer-session authentication for gate HTTP routes.
// Purpose: Provide strict, fail-closed caller identity before any core work.
// Dependencies: load-gate-config, rand, serde, sha2, time
// ============================================================================

//! ## Overview
//! Every protected route resolves a caller identity before any validation or
//! dispatch work begins. Two modes exist: with `server.auth` configured, the
//! login endpoint issues opaque bearer tokens with a fixed lifetime and every
//! protected request must present one; without it, only loopback callers are
//! accepted and the server logs a startup warning. All decisions are
//! fail-closed and emit audit events; raw tokens are never logged, only
//! sha-256 fingerprints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Mutex;

use load_gate_config::ServerAuthConfig;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted authorization header size.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;
/// Length of issued session tokens.
const SESSION_TOKEN_LENGTH: usize = 32;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request context used for auth decisions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Authorization header value.
    pub auth_header: Option<String>,
}

impl RequestContext {
    /// Builds a request context from peer address and authorization header.
    #[must_use]
    pub const fn new(peer_ip: Option<IpAddr>, auth_header: Option<String>) -> Self {
        Self {
            peer_ip,
            auth_header,
        }
    }

    /// Returns true when the peer IP is loopback.
    #[must_use]
    pub fn peer_is_loopback(&self) -> bool {
        self.peer_ip.is_some_and(|ip| ip.is_loopback())
    }
}

// ============================================================================
// SECTION: Auth Context
// ============================================================================

/// Authentication method used for the request.
#[derive(Debug, Clone, Copy)]
pub enum AuthMethod {
    /// Local-only loopback access (no auth configured).
    Local,
    /// Bearer session issued by the login endpoint.
    BearerSession,
}

/// Authenticated caller context.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authentication method.
    pub method: AuthMethod,
    /// Verified caller identity.
    pub username: String,
    /// Token fingerprint for bearer sessions (hashed).
    pub token_fingerprint: Option<String>,
}

impl AuthContext {
    /// Returns a stable label for the auth method.
    #[must_use]
    pub const fn method_label(&self) -> &'static str {
        match self.method {
            AuthMethod::Local => "local",
            AuthMethod::BearerSession => "bearer_session",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication or authorization errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or invalid authentication.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Caller is authenticated but not authorized.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

// ============================================================================
// SECTION: Issued Sessions
// ============================================================================

/// Session issued by the login endpoint.
///
/// # Invariants
/// - `access_token` is random and never logged raw.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    /// Opaque bearer token.
    pub access_token: String,
    /// Token type, always `bearer`.
    pub token_type: &'static str,
    /// Session lifetime in seconds.
    pub expires_in: u64,
    /// Username the session is scoped to.
    pub username: String,
}

/// Active session state.
#[derive(Debug, Clone)]
struct Session {
    /// Username the session is scoped to.
    username: String,
    /// Expiry instant.
    expires_at: OffsetDateTime,
}

// ============================================================================
// SECTION: Session Authz
// ============================================================================

/// Enforcement mode derived from server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthzMode {
    /// No auth configured: loopback callers only.
    LocalOnly,
    /// Bearer sessions issued against configured credentials.
    BearerSession,
}

/// Session-issuing authorizer for gate routes.
///
/// # Invariants
/// - Expired sessions are removed on access and never authorize.
/// - A poisoned session lock fails closed as an authentication error.
pub struct SessionAuthz {
    /// Enforcement mode.
    mode: AuthzMode,
    /// Accepted credentials (username to password).
    credentials: BTreeMap<String, String>,
    /// Session lifetime.
    ttl: Duration,
    /// Active sessions by token.
    sessions: Mutex<BTreeMap<String, Session>>,
}

impl SessionAuthz {
    /// Builds an authorizer from server auth configuration.
    #[must_use]
    pub fn from_config(config: Option<&ServerAuthConfig>) -> Self {
        let mode = if config.is_some() {
            AuthzMode::BearerSession
        } else {
            AuthzMode::LocalOnly
        };
        let credentials = config
            .map(|cfg| {
                cfg.users
                    .iter()
                    .map(|user| (user.username.clone(), user.password.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let ttl_minutes = config.map_or(0, |cfg| cfg.session_ttl_minutes);
        Self {
            mode,
            credentials,
            ttl: Duration::minutes(i64::try_from(ttl_minutes).unwrap_or(i64::MAX)),
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns true when the authorizer runs without configured auth.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.mode == AuthzMode::LocalOnly
    }

    /// Authenticates a login attempt and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when auth is not configured or the credentials
    /// do not match.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<IssuedSession, AuthError> {
        if self.mode == AuthzMode::LocalOnly {
            return Err(AuthError::Unauthenticated(
                "authentication is not configured".to_string(),
            ));
        }
        let matches = self
            .credentials
            .get(username)
            .is_some_and(|expected| expected.as_str() == password);
        if !matches {
            return Err(AuthError::Unauthenticated("incorrect username or password".to_string()));
        }
        let token = random_token();
        let session = Session {
            username: username.to_string(),
            expires_at: now.saturating_add(self.ttl),
        };
        let mut sessions = self.lock_sessions()?;
        sessions.insert(token.clone(), session);
        Ok(IssuedSession {
            access_token: token,
            token_type: "bearer",
            expires_in: u64::try_from(self.ttl.whole_seconds()).unwrap_or_default(),
            username: username.to_string(),
        })
    }

    /// Authorizes a request and returns the authenticated caller context.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the caller cannot be authenticated.
    pub fn authorize(
        &self,
        ctx: &RequestContext,
        now: OffsetDateTime,
    ) -> Result<AuthContext, AuthError> {
        match self.mode {
            AuthzMode::LocalOnly => {
                if ctx.peer_is_loopback() {
                    Ok(AuthContext {
                        method: AuthMethod::Local,
                        username: "loopback".to_string(),
                        token_fingerprint: None,
                    })
                } else {
                    Err(AuthError::Unauthenticated(
                        "local-only mode requires loopback access".to_string(),
                    ))
                }
            }
            AuthzMode::BearerSession => {
                let token = parse_bearer_token(ctx.auth_header.as_deref())?;
                let mut sessions = self.lock_sessions()?;
                let Some(session) = sessions.get(&token).cloned() else {
                    return Err(AuthError::Unauthenticated("unknown session token".to_string()));
                };
                if session.expires_at <= now {
                    sessions.remove(&token);
                    return Err(AuthError::Unauthenticated("session expired".to_string()));
                }
                Ok(AuthContext {
                    method: AuthMethod::BearerSession,
                    username: session.username,
                    token_fingerprint: Some(fingerprint(&token)),
                })
            }
        }
    }

    /// Revokes the session named by the request, when one is present.
    ///
    /// Logout is idempotent: unknown or missing tokens are not an error.
    pub fn logout(&self, ctx: &RequestContext) {
        let Ok(token) = parse_bearer_token(ctx.auth_header.as_deref()) else {
            return;
        };
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(&token);
        }
    }

    /// Locks the session table, converting poisoning into an auth error.
    fn lock_sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Session>>, AuthError> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::Unauthenticated("session store unavailable".to_string()))
    }
}

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Auth audit event payload.
#[derive(Debug, Serialize)]
pub struct AuthAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Decision outcome.
    decision: &'static str,
    /// Route or action name.
    action: String,
    /// Caller IP address (if available).
    peer_ip: Option<String>,
    /// Auth method label.
    auth_method: Option<&'static str>,
    /// Caller identity.
    username: Option<String>,
    /// Bearer token fingerprint (sha256).
    token_fingerprint: Option<String>,
    /// Failure reason (for deny events).
    reason: Option<String>,
}

impl AuthAuditEvent {
    /// Builds an allow event.
    #[must_use]
    pub fn allowed(ctx: &RequestContext, action: &str, auth: &AuthContext) -> Self {
        Self {
            event: "gate_authz",
            decision: "allow",
            action: action.to_string(),
            peer_ip: ctx.peer_ip.map(|ip| ip.to_string()),
            auth_method: Some(auth.method_label()),
            username: Some(auth.username.clone()),
            token_fingerprint: auth.token_fingerprint.clone(),
            reason: None,
        }
    }

    /// Builds a deny event.
    #[must_use]
    pub fn denied(ctx: &RequestContext, action: &str, error: &AuthError) -> Self {
        Self {
            event: "gate_authz",
            decision: "deny",
            action: action.to_string(),
            peer_ip: ctx.peer_ip.map(|ip| ip.to_string()),
            auth_method: None,
            username: None,
            token_fingerprint: None,
            reason: Some(error.to_string()),
        }
    }
}

/// Audit sink for auth decisions.
pub trait AuthAuditSink: Send + Sync {
    /// Records an auth audit event.
    fn record(&self, event: &AuthAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuthAuditSink for StderrAuditSink {
    #[allow(clippy::print_stderr, reason = "Stderr is the audit log destination.")]
    fn record(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            eprintln!("{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl AuthAuditSink for NoopAuditSink {
    fn record(&self, _event: &AuthAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Generates a random alphanumeric session token.
fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns the sha-256 hex fingerprint of a token.
fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Parses a bearer token from an authorization header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<String, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token.to_string())
}
