// crates/load-gate-dispatch/src/lib.rs
// ============================================================================
// Module: Load Gate Dispatch
// Description: Blocking HTTP client for the execution worker.
// Purpose: Deliver execution requests and health probes over the network.
// Dependencies: load-gate-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`WorkerClient`] is the outbound boundary of the gate: it implements
//! [`load_gate_core::ExecutionBackend`] over blocking HTTP. Transport
//! conditions stay distinguished — connection failures, timeouts, non-success
//! statuses, and undecodable replies each map to their own
//! [`load_gate_core::ExecutionError`] kind so callers can report precisely.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod client;

pub use client::WorkerClient;
