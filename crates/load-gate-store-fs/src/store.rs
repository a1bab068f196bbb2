// crates/load-gate-store-fs/src/store.rs
// ============================================================================
// Module: Filesystem Artifact Store
// Description: Durable ArtifactStore writing plain artifact files.
// Purpose: Persist validated submissions with keyed or single-slot layout.
// Dependencies: load-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The filesystem store writes each submission as the three artifact files the
//! gate received: `scenario.json`, `variables.json`, and `users.csv` when a
//! dataset was submitted. In `keyed` layout every submission gets its own
//! directory named by its submission key, and a `latest` marker file points at
//! the newest one; in `single_slot` layout the files live directly under the
//! root and every successful validation overwrites the previous one
//! (last-writer-wins, kept for parity with the original tool).
//!
//! Keys are hex strings and are checked before being used as path components;
//! anything else fails closed. Loads verify that stored documents are still
//! well-formed JSON and fail closed on corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use load_gate_core::ArtifactStore;
use load_gate_core::ScenarioDocument;
use load_gate_core::StoreError;
use load_gate_core::StoreKeying;
use load_gate_core::StoredSubmission;
use load_gate_core::SubmissionKey;
use load_gate_core::ValidatedArtifacts;
use load_gate_core::VariablesDocument;
use serde::Deserialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Scenario artifact filename.
const SCENARIO_FILE: &str = "scenario.json";
/// Variables artifact filename.
const VARIABLES_FILE: &str = "variables.json";
/// Dataset artifact filename.
const DATASET_FILE: &str = "users.csv";
/// Marker file naming the newest submission key.
const LATEST_FILE: &str = "latest";
/// Maximum length of a submission key used as a path component.
const MAX_KEY_LENGTH: usize = 128;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the filesystem artifact store.
///
/// # Invariants
/// - `path` must resolve to a directory (created when absent).
#[derive(Debug, Clone, Deserialize)]
pub struct FsStoreConfig {
    /// Root directory for stored submissions.
    pub path: PathBuf,
    /// Keying behavior.
    #[serde(default)]
    pub keying: StoreKeying,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Filesystem-backed artifact store.
///
/// # Invariants
/// - The `latest` marker is written only after the artifact files, so it never
///   names an incomplete submission.
#[derive(Debug)]
pub struct FsArtifactStore {
    /// Root directory for stored submissions.
    root: PathBuf,
    /// Keying behavior.
    keying: StoreKeying,
}

impl FsArtifactStore {
    /// Opens the store, creating the root directory when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the root cannot be created or is not a
    /// directory.
    pub fn new(config: FsStoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.path).map_err(|err| StoreError::Io(err.to_string()))?;
        let metadata =
            fs::metadata(&config.path).map_err(|err| StoreError::Io(err.to_string()))?;
        if !metadata.is_dir() {
            return Err(StoreError::Invalid(format!(
                "store path is not a directory: {}",
                config.path.display()
            )));
        }
        Ok(Self {
            root: config.path,
            keying: config.keying,
        })
    }

    /// Returns the directory a submission key maps to.
    fn submission_dir(&self, key: &SubmissionKey) -> Result<PathBuf, StoreError> {
        match self.keying {
            StoreKeying::SingleSlot => Ok(self.root.clone()),
            StoreKeying::Keyed => {
                check_key(key)?;
                Ok(self.root.join(key.as_str()))
            }
        }
    }

    /// Reads the key recorded by the `latest` marker, if any.
    fn read_latest_key(&self) -> Result<Option<SubmissionKey>, StoreError> {
        let marker = self.root.join(LATEST_FILE);
        if !marker.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&marker).map_err(|err| StoreError::Io(err.to_string()))?;
        let key = SubmissionKey::new(raw.trim().to_string());
        check_key(&key)?;
        Ok(Some(key))
    }

    /// Loads the artifacts stored in a submission directory.
    fn read_artifacts(dir: &Path) -> Result<Option<ValidatedArtifacts>, StoreError> {
        let scenario_path = dir.join(SCENARIO_FILE);
        let variables_path = dir.join(VARIABLES_FILE);
        if !scenario_path.exists() || !variables_path.exists() {
            return Ok(None);
        }
        let scenario = read_document(&scenario_path)?;
        let variables = read_document(&variables_path)?;
        let dataset_path = dir.join(DATASET_FILE);
        let dataset = if dataset_path.exists() {
            Some(fs::read_to_string(&dataset_path).map_err(|err| StoreError::Io(err.to_string()))?)
        } else {
            None
        };
        Ok(Some(ValidatedArtifacts {
            scenario: ScenarioDocument::from_value(scenario),
            variables: VariablesDocument::from_value(variables),
            dataset,
        }))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, key: &SubmissionKey, artifacts: &ValidatedArtifacts) -> Result<(), StoreError> {
        check_key(key)?;
        let dir = self.submission_dir(key)?;
        fs::create_dir_all(&dir).map_err(|err| StoreError::Io(err.to_string()))?;
        write_document(&dir.join(SCENARIO_FILE), artifacts.scenario.as_value())?;
        write_document(&dir.join(VARIABLES_FILE), artifacts.variables.as_value())?;
        let dataset_path = dir.join(DATASET_FILE);
        match &artifacts.dataset {
            Some(text) => {
                fs::write(&dataset_path, text).map_err(|err| StoreError::Io(err.to_string()))?;
            }
            None => {
                // A stale dataset from a superseded submission must not leak
                // into the new one.
                if dataset_path.exists() {
                    fs::remove_file(&dataset_path)
                        .map_err(|err| StoreError::Io(err.to_string()))?;
                }
            }
        }
        fs::write(self.root.join(LATEST_FILE), key.as_str())
            .map_err(|err| StoreError::Io(err.to_string()))
    }

    fn get(&self, key: &SubmissionKey) -> Result<Option<ValidatedArtifacts>, StoreError> {
        check_key(key)?;
        if self.keying == StoreKeying::SingleSlot {
            let Some(stored_key) = self.read_latest_key()? else {
                return Ok(None);
            };
            if stored_key != *key {
                return Ok(None);
            }
        }
        let dir = self.submission_dir(key)?;
        Self::read_artifacts(&dir)
    }

    fn latest(&self) -> Result<Option<StoredSubmission>, StoreError> {
        let Some(key) = self.read_latest_key()? else {
            return Ok(None);
        };
        let dir = self.submission_dir(&key)?;
        let artifacts = Self::read_artifacts(&dir)?.ok_or_else(|| {
            StoreError::Invalid(format!("latest submission {key} is missing its artifacts"))
        })?;
        Ok(Some(StoredSubmission {
            key,
            artifacts,
        }))
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let metadata = fs::metadata(&self.root).map_err(|err| StoreError::Io(err.to_string()))?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Invalid("store root is not a directory".to_string()))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects keys that are unusable as path components.
fn check_key(key: &SubmissionKey) -> Result<(), StoreError> {
    let raw = key.as_str();
    if raw.is_empty() || raw.len() > MAX_KEY_LENGTH {
        return Err(StoreError::Invalid("submission key has an invalid length".to_string()));
    }
    if !raw.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(StoreError::Invalid("submission key must be a hex string".to_string()));
    }
    Ok(())
}

/// Reads and decodes a stored JSON document, failing closed on corruption.
fn read_document(path: &Path) -> Result<serde_json::Value, StoreError> {
    let text = fs::read_to_string(path).map_err(|err| StoreError::Io(err.to_string()))?;
    serde_json::from_str(&text).map_err(|err| {
        StoreError::Invalid(format!("stored document {} is corrupt: {err}", path.display()))
    })
}

/// Writes a JSON document with a trailing newline.
fn write_document(path: &Path, value: &serde_json::Value) -> Result<(), StoreError> {
    let mut text = serde_json::to_string_pretty(value)
        .map_err(|err| StoreError::Invalid(err.to_string()))?;
    text.push('\n');
    fs::write(path, text).map_err(|err| StoreError::Io(err.to_string()))
}
