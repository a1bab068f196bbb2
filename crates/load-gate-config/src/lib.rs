// crates/load-gate-config/src/lib.rs
// ============================================================================
// Module: Load Gate Configuration
// Description: Canonical configuration model, loading, and validation.
// Purpose: Single source of truth for server, worker, auth, and store config.
// Dependencies: load-gate-core, serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict, fail-closed input
//! guards (path length, file size, UTF-8) and then validated as a whole with
//! cross-field rules. Every other crate consumes the types defined here; no
//! caller re-parses configuration on its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use load_gate_core::StoreKeying;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted config file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Maximum length of a single config path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total config path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Default server bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;
/// Default session lifetime in minutes (eight hours).
const DEFAULT_SESSION_TTL_MINUTES: u64 = 480;
/// Default execution worker base URL.
const DEFAULT_WORKER_BASE_URL: &str = "http://worker:8090";
/// Default execution dispatch timeout in seconds (five minutes).
const DEFAULT_EXECUTE_TIMEOUT_SECS: u64 = 300;
/// Default worker health probe timeout in seconds.
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config path exceeds the total length limit.
    #[error("config path exceeds max length")]
    PathTooLong,
    /// A config path component exceeds the component length limit.
    #[error("config path component too long")]
    PathComponentTooLong,
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file exceeds the size limit.
    #[error("config file exceeds size limit")]
    FileTooLarge,
    /// Config file is not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// Config file is not valid TOML for this model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config loaded but failed cross-field validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Server Configuration
// ============================================================================

/// Credential accepted by the login endpoint.
///
/// # Invariants
/// - `username` and `password` are non-empty after validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCredential {
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
}

/// Authentication settings for the HTTP surface.
///
/// # Invariants
/// - When present, at least one credential is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerAuthConfig {
    /// Accepted login credentials.
    #[serde(default)]
    pub users: Vec<UserCredential>,
    /// Session lifetime in minutes.
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u64,
}

/// HTTP server settings.
///
/// # Invariants
/// - `bind` parses as a socket address after validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Authentication settings; absent means every protected route rejects.
    #[serde(default)]
    pub auth: Option<ServerAuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            auth: None,
        }
    }
}

// ============================================================================
// SECTION: Worker Configuration
// ============================================================================

/// Execution worker settings.
///
/// # Invariants
/// - `base_url` parses as an http(s) URL after validation.
/// - Timeouts are non-zero after validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkerConfig {
    /// Base URL of the execution worker.
    #[serde(default = "default_worker_base_url")]
    pub base_url: String,
    /// Execution dispatch timeout in seconds.
    #[serde(default = "default_execute_timeout_secs")]
    pub execute_timeout_secs: u64,
    /// Health probe timeout in seconds.
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            base_url: default_worker_base_url(),
            execute_timeout_secs: default_execute_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
        }
    }
}

// ============================================================================
// SECTION: Artifact Store Configuration
// ============================================================================

/// Artifact store backend selection.
///
/// # Invariants
/// - Variants map 1:1 to store implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStoreType {
    /// In-memory store (lost on restart).
    #[default]
    Memory,
    /// Filesystem-backed store.
    Fs,
}

/// Artifact store settings.
///
/// # Invariants
/// - `path` is required when `store_type` is [`ArtifactStoreType::Fs`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct ArtifactStoreConfig {
    /// Store backend type.
    #[serde(default)]
    pub store_type: ArtifactStoreType,
    /// Root directory for the filesystem store.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Keying behavior (`keyed` or legacy `single_slot`).
    #[serde(default)]
    pub keying: StoreKeying,
}

// ============================================================================
// SECTION: Top-Level Configuration
// ============================================================================

/// Canonical Load Gate configuration.
///
/// # Invariants
/// - A loaded configuration has passed the input guards but not necessarily
///   [`LoadGateConfig::validate`]; servers must validate before serving.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct LoadGateConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Execution worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Artifact store settings.
    #[serde(default)]
    pub artifact_store: ArtifactStoreConfig,
}

impl LoadGateConfig {
    /// Loads configuration from a TOML file, or defaults when no path is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path violates length limits, the file
    /// cannot be read, exceeds the size limit, is not UTF-8, or is not valid
    /// TOML for this model.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        check_path(path)?;
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::FileTooLarge);
        }
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() as u64 > MAX_CONFIG_BYTES {
            return Err(ConfigError::FileTooLarge);
        }
        let text = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates cross-field rules over a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(
                "server.bind must be a valid socket address".to_string(),
            ));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(auth) = &self.server.auth {
            validate_auth(auth)?;
        }
        let url = Url::parse(&self.worker.base_url).map_err(|_| {
            ConfigError::Invalid("worker.base_url must be a valid url".to_string())
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(
                "worker.base_url must use http or https".to_string(),
            ));
        }
        if self.worker.execute_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "worker.execute_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.worker.health_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "worker.health_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.artifact_store.store_type == ArtifactStoreType::Fs
            && self.artifact_store.path.is_none()
        {
            return Err(ConfigError::Invalid(
                "fs artifact_store requires a path".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Guards
// ============================================================================

/// Enforces path length limits before any filesystem access.
fn check_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::PathTooLong);
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::PathComponentTooLong);
        }
    }
    Ok(())
}

/// Validates the auth section: credentials well-formed and usernames unique.
fn validate_auth(auth: &ServerAuthConfig) -> Result<(), ConfigError> {
    if auth.users.is_empty() {
        return Err(ConfigError::Invalid(
            "server.auth requires at least one user".to_string(),
        ));
    }
    if auth.session_ttl_minutes == 0 {
        return Err(ConfigError::Invalid(
            "server.auth.session_ttl_minutes must be greater than zero".to_string(),
        ));
    }
    let mut seen = BTreeSet::new();
    for user in &auth.users {
        if user.username.trim().is_empty() {
            return Err(ConfigError::Invalid("auth user has an empty username".to_string()));
        }
        if user.password.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "auth user '{}' has an empty password",
                user.username
            )));
        }
        if !seen.insert(user.username.clone()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate auth username '{}'",
                user.username
            )));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default session lifetime.
const fn default_session_ttl_minutes() -> u64 {
    DEFAULT_SESSION_TTL_MINUTES
}

/// Default worker base URL.
fn default_worker_base_url() -> String {
    DEFAULT_WORKER_BASE_URL.to_string()
}

/// Default execution dispatch timeout.
const fn default_execute_timeout_secs() -> u64 {
    DEFAULT_EXECUTE_TIMEOUT_SECS
}

/// Default health probe timeout.
const fn default_health_timeout_secs() -> u64 {
    DEFAULT_HEALTH_TIMEOUT_SECS
}
