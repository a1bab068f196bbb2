// crates/load-gate-core/src/lib.rs
// ============================================================================
// Module: Load Gate Core
// Description: Domain model, validation runtime, and collaborator interfaces.
// Purpose: Provide the backend-agnostic core of the Load Gate validation gate.
// Dependencies: rand, serde, serde_json, sha2, thiserror, time
// ============================================================================

//! ## Overview
//! Load Gate validates a load-test submission made of three artifacts — a
//! scenario document, a variables document, and an optional per-virtual-user
//! dataset — and decides whether they form a coherent, executable test
//! configuration. This crate holds everything that does not touch a network
//! or a filesystem: the document model, the placeholder scanner and
//! classifier, the structural and cross-reference validators, the report
//! builder, and the execution-request planner. Transports and durable stores
//! implement the interfaces defined here.
//!
//! The core never reads wall-clock time; callers supply timestamps.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::core::dataset::Dataset;
pub use crate::core::document::DecodeError;
pub use crate::core::document::HttpMethod;
pub use crate::core::document::LoadMode;
pub use crate::core::document::ScenarioDocument;
pub use crate::core::document::VariablesDocument;
pub use crate::core::execution::ExecutionOutcome;
pub use crate::core::execution::ExecutionRequest;
pub use crate::core::execution::RunConfigPayload;
pub use crate::core::identifiers::SubmissionKey;
pub use crate::core::identifiers::TestId;
pub use crate::core::report::ReportAnalysis;
pub use crate::core::report::ValidationReport;
pub use crate::core::report::ValidationStatus;
pub use crate::core::template::VariableCatalog;
pub use crate::core::template::scan_placeholders;
pub use crate::interfaces::ArtifactStore;
pub use crate::interfaces::ExecutionBackend;
pub use crate::interfaces::ExecutionError;
pub use crate::interfaces::InMemoryArtifactStore;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::StoreKeying;
pub use crate::interfaces::StoredSubmission;
pub use crate::interfaces::ValidatedArtifacts;
pub use crate::interfaces::WorkerReply;
pub use crate::runtime::planner::ExecutionPlanner;
pub use crate::runtime::resolve::ResolvedRunConfig;
pub use crate::runtime::validator::RawSubmission;
pub use crate::runtime::validator::SubmissionValidator;
