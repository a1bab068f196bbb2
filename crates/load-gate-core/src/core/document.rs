// crates/load-gate-core/src/core/document.rs
// ============================================================================
// Module: Submission Documents
// Description: Scenario and variables documents plus their closed enums.
// Purpose: Separate decode-checked documents from raw submission text.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The scenario and variables documents are JSON values wrapped in newtypes so
//! that unparsed text and decode-checked documents cannot be confused. Decoding
//! only guarantees well-formed JSON; shape rules are enforced separately by
//! [`crate::runtime::validator`] so that every violated rule produces its own
//! diagnostic instead of a single deserialization failure.
//!
//! Both documents are forwarded verbatim to the execution worker; the core
//! never rewrites them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Decode errors for submitted artifacts.
///
/// # Invariants
/// - A decode error is terminal for the whole submission; no validator runs.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Scenario text is not well-formed JSON.
    #[error("scenario is not valid JSON: {0}")]
    Scenario(String),
    /// Variables text is not well-formed JSON.
    #[error("variables is not valid JSON: {0}")]
    Variables(String),
}

// ============================================================================
// SECTION: HTTP Methods
// ============================================================================

/// HTTP methods accepted in scenario steps.
///
/// # Invariants
/// - Variants are stable for serialization and step validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
    /// HTTP PATCH.
    Patch,
}

impl HttpMethod {
    /// Parses an uppercase method name (returns `None` for anything else).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            _ => None,
        }
    }

    /// Returns the wire form of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

// ============================================================================
// SECTION: Load Modes
// ============================================================================

/// Load-generation mode declared by the variables document.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// A fixed population of virtual users drives the load.
    Users,
    /// A fixed total request count drives the load.
    Requests,
}

impl LoadMode {
    /// Parses a mode name (returns `None` for anything else).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "users" => Some(Self::Users),
            "requests" => Some(Self::Requests),
            _ => None,
        }
    }

    /// Returns the wire form of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Requests => "requests",
        }
    }
}

// ============================================================================
// SECTION: Scenario Document
// ============================================================================

/// Decode-checked scenario document.
///
/// # Invariants
/// - The wrapped value is well-formed JSON; shape is not guaranteed here.
/// - The value is persisted and forwarded to the worker verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioDocument(Value);

impl ScenarioDocument {
    /// Decodes scenario text into a document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Scenario`] when the text is not well-formed JSON.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(text).map(Self).map_err(|err| DecodeError::Scenario(err.to_string()))
    }

    /// Wraps an already-decoded JSON value.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the document and returns the underlying JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Serializes the document to compact JSON text for placeholder scanning.
    ///
    /// Serializing an in-memory JSON value cannot fail; the fallback empty
    /// string is unreachable in practice.
    #[must_use]
    pub fn to_compact_text(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Variables Document
// ============================================================================

/// Decode-checked variables document.
///
/// # Invariants
/// - The wrapped value is well-formed JSON; shape is not guaranteed here.
/// - The value is persisted verbatim; defaults are applied only by
///   [`crate::runtime::resolve::ResolvedRunConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariablesDocument(Value);

impl VariablesDocument {
    /// Decodes variables text into a document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Variables`] when the text is not well-formed JSON.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(text).map(Self).map_err(|err| DecodeError::Variables(err.to_string()))
    }

    /// Wraps an already-decoded JSON value.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the keys of the `environment` section, regardless of the value
    /// types they carry. Missing or non-object `environment` yields an empty
    /// list.
    #[must_use]
    pub fn environment_keys(&self) -> Vec<String> {
        self.0
            .get("environment")
            .and_then(Value::as_object)
            .map(|section| section.keys().cloned().collect())
            .unwrap_or_default()
    }
}
