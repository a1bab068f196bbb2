// crates/load-gate-server/src/lib.rs
// ============================================================================
// Module: Load Gate Server
// Description: HTTP surface, bearer sessions, and audit logging.
// Purpose: Expose validation and execution over a thin, fail-closed transport.
// Dependencies: axum, load-gate-config, load-gate-core, load-gate-dispatch,
// load-gate-store-fs, tokio
// ============================================================================

//! ## Overview
//! The server is deliberately thin plumbing over `load-gate-core`: it decodes
//! multipart submissions, enforces caller identity before any validation work
//! begins, shifts blocking core work off the async runtime, and maps core
//! outcomes onto JSON responses. No validation rule lives here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod server;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::auth::AuthContext;
pub use crate::auth::AuthError;
pub use crate::auth::RequestContext;
pub use crate::auth::SessionAuthz;
pub use crate::server::GateServer;
pub use crate::server::GateServerError;
