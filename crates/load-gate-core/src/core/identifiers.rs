// crates/load-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Load Gate Identifiers
// Description: Test and submission identifiers with stable wire forms.
// Purpose: Provide collision-resistant, serializable identifiers.
// Dependencies: rand, serde, sha2
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings on the wire. Test identifiers are random
//! tokens generated at submission time; submission keys are content hashes of
//! the validated artifact triple, so identical submissions share a key and
//! concurrent submissions never collide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::core::document::ScenarioDocument;
use crate::core::document::VariablesDocument;

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

// ============================================================================
// SECTION: Test Identifier
// ============================================================================

/// Unique identifier for one execution request.
///
/// # Invariants
/// - Generated identifiers are `test_` followed by 16 hex characters drawn
///   from a thread-local RNG; collisions are not expected in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    /// Generates a fresh random test identifier.
    #[must_use]
    pub fn random() -> Self {
        let bytes: [u8; 8] = rand::thread_rng().r#gen();
        Self(format!("test_{}", hex_encode(&bytes)))
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Submission Key
// ============================================================================

/// Content-derived key for a validated submission.
///
/// # Invariants
/// - Derivation is deterministic over the three artifacts; each part is
///   length-prefixed before hashing so boundaries are unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionKey(String);

impl SubmissionKey {
    /// Derives the key from the validated artifact triple.
    #[must_use]
    pub fn derive(
        scenario: &ScenarioDocument,
        variables: &VariablesDocument,
        dataset: Option<&str>,
    ) -> Self {
        let mut hasher = Sha256::new();
        for part in [
            scenario.to_compact_text(),
            serde_json::to_string(variables.as_value()).unwrap_or_default(),
            dataset.unwrap_or_default().to_string(),
        ] {
            hasher.update(part.len().to_le_bytes());
            hasher.update(part.as_bytes());
        }
        Self(hex_encode(&hasher.finalize()))
    }

    /// Wraps an existing key string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
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

    use serde_json::json;

    use super::SubmissionKey;
    use super::TestId;
    use crate::core::document::ScenarioDocument;
    use crate::core::document::VariablesDocument;

    #[test]
    fn random_test_ids_have_stable_shape() {
        let id = TestId::random();
        assert!(id.as_str().starts_with("test_"));
        assert_eq!(id.as_str().len(), "test_".len() + 16);
    }

    #[test]
    fn submission_keys_are_deterministic_and_content_sensitive() {
        let scenario = ScenarioDocument::from_value(json!({"name": "s", "steps": []}));
        let variables = VariablesDocument::from_value(json!({"mode": "users"}));
        let key_a = SubmissionKey::derive(&scenario, &variables, Some("id\n1"));
        let key_b = SubmissionKey::derive(&scenario, &variables, Some("id\n1"));
        let key_c = SubmissionKey::derive(&scenario, &variables, None);
        assert_eq!(key_a, key_b);
        assert_ne!(key_a, key_c);
    }
}
