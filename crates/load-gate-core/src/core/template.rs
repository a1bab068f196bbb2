// crates/load-gate-core/src/core/template.rs
// ============================================================================
// Module: Placeholder Templates
// Description: Placeholder scanner and origin classifier for scenario text.
// Purpose: Extract and bucket every template reference for cross-checking.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Scenario documents embed a `{{...}}` templating mini-language resolved at
//! execution time. The scanner works on the serialized document text so
//! placeholders nested at any depth — including inside non-standard step
//! fields — are found. Classification is a closed partition by prefix:
//! `user.` references resolve against dataset columns, `env.` references
//! against the variables document's environment section, and everything else
//! is collected as an extraction reference (never validated; reserved for
//! cross-step data extraction).
//!
//! There is no escaping: a literal `{{` always opens a placeholder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::document::ScenarioDocument;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix marking a placeholder resolved against dataset columns.
const USER_PREFIX: &str = "user.";
/// Prefix marking a placeholder resolved against the environment section.
const ENV_PREFIX: &str = "env.";

// ============================================================================
// SECTION: Scanner
// ============================================================================

/// Extracts every `{{...}}` placeholder body from the text, in order.
///
/// Matching is non-greedy per occurrence: each `{{` captures up to the first
/// following `}}`. Duplicates are retained at this stage; the scan is a pure
/// function of its input.
#[must_use]
pub fn scan_placeholders(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };
        found.push(after_open[..end].to_string());
        rest = &after_open[end + 2..];
    }
    found
}

// ============================================================================
// SECTION: Variable Catalog
// ============================================================================

/// Placeholder references bucketed by origin.
///
/// # Invariants
/// - Entries keep first-appearance order within each category.
/// - Each category is de-duplicated; every scanned token lands in exactly one
///   category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VariableCatalog {
    /// Column names referenced as `user.X`.
    user: Vec<String>,
    /// Environment keys referenced as `env.X`.
    env: Vec<String>,
    /// Remaining placeholder bodies, reserved for cross-step extraction.
    extract: Vec<String>,
}

impl VariableCatalog {
    /// Scans a scenario document and classifies every placeholder found.
    #[must_use]
    pub fn from_scenario(scenario: &ScenarioDocument) -> Self {
        Self::classify(scan_placeholders(&scenario.to_compact_text()))
    }

    /// Classifies raw placeholder bodies into the three categories.
    #[must_use]
    pub fn classify(tokens: impl IntoIterator<Item = String>) -> Self {
        let mut catalog = Self::default();
        for token in tokens {
            if let Some(column) = token.strip_prefix(USER_PREFIX) {
                push_unique(&mut catalog.user, column);
            } else if let Some(key) = token.strip_prefix(ENV_PREFIX) {
                push_unique(&mut catalog.env, key);
            } else {
                push_unique(&mut catalog.extract, &token);
            }
        }
        catalog
    }

    /// Returns the referenced dataset column names.
    #[must_use]
    pub fn user(&self) -> &[String] {
        &self.user
    }

    /// Returns the referenced environment keys.
    #[must_use]
    pub fn env(&self) -> &[String] {
        &self.env
    }

    /// Returns the uncategorized extraction references.
    #[must_use]
    pub fn extract(&self) -> &[String] {
        &self.extract
    }

    /// Returns true when the scenario references any dataset column.
    #[must_use]
    pub fn references_dataset(&self) -> bool {
        !self.user.is_empty()
    }
}

/// Appends a value when it is not already present, preserving order.
fn push_unique(entries: &mut Vec<String>, value: &str) {
    if !entries.iter().any(|entry| entry == value) {
        entries.push(value.to_string());
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
