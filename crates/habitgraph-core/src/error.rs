//! Core error types for habitgraph-core.
//!
//! Three families of failure exist in the engine:
//!
//! - [`StorageError`]: the key-value store could not be read or written.
//! - [`SnapshotError`]: a stored or imported document is malformed.
//! - [`ConfigError`]: the TOML configuration could not be handled.
//!
//! Invalid mutation requests (unknown node ids, colors that are not
//! unlocked) are not errors at all: the mutation methods report whether
//! anything changed and otherwise leave state untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitgraph-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed snapshot or import payload
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors outside of snapshot parsing
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable store failures.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Reading a key failed
    #[error("Failed to read key '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Writing a key failed
    #[error("Failed to write key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// The snapshot could not be serialized before writing
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Malformed stored state or import payloads.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Payload is not valid JSON
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Top level is not a JSON object
    #[error("Snapshot must be a JSON object")]
    NotAnObject,

    /// `nodes` key is absent
    #[error("Snapshot is missing the 'nodes' field")]
    MissingNodes,

    /// `nodes` key holds something other than an array
    #[error("Snapshot field 'nodes' must be an array, found {found}")]
    NodesNotArray { found: &'static str },

    /// The user declined to overwrite the current graph
    #[error("Import cancelled by user")]
    Declined,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl StorageError {
    pub(crate) fn read(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::ReadFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::WriteFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

impl SnapshotError {
    pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
