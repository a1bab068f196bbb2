// crates/load-gate-core/src/core/mod.rs
// ============================================================================
// Module: Load Gate Domain Model
// Description: Documents, datasets, placeholders, reports, and identifiers.
// Purpose: Define the data carried between validation and execution stages.
// Dependencies: crate submodules
// ============================================================================

//! ## Overview
//! The domain model is deliberately thin: documents are decode-checked JSON
//! values that travel verbatim from submission to worker payload, and every
//! richer judgement about them lives in [`crate::runtime`].

pub mod dataset;
pub mod document;
pub mod execution;
pub mod identifiers;
pub mod report;
pub mod template;
