//! Error types for the Permigrate core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! Only [`SourceError`] is ever fatal to a migration run; node and storage
//! errors are captured per holder by the engine and collected into the run
//! report.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors from the legacy configuration source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The legacy source is not reachable. Checked before any mutation; the
    /// run aborts with zero holders created.
    #[error("legacy source is not available")]
    Unavailable,

    /// The source document could not be parsed.
    #[error("failed to parse legacy configuration: {0}")]
    ParseError(String),

    /// The source document's root is not a key/value mapping.
    #[error("legacy configuration root is not a mapping")]
    NotAMapping,

    /// Generic I/O wrapper.
    #[error("source I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Node errors
// ---------------------------------------------------------------------------

/// Errors from permission-node construction.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The permission key is empty or blank.
    #[error("invalid permission node key: '{0}'")]
    InvalidKey(String),

    /// A group reference is empty, or canonicalizes to nothing.
    #[error("invalid group reference: '{0}'")]
    InvalidGroupReference(String),
}

// ---------------------------------------------------------------------------
// Identity errors
// ---------------------------------------------------------------------------

/// Errors from the identity resolution subsystem.
///
/// A lookup miss is not an error; resolvers return `None` for unknown keys.
/// These variants cover mapping-file loading only.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The mapping file could not be loaded.
    #[error("identity mapping file error at '{path}': {detail}")]
    MappingFileError { path: String, detail: String },

    /// TOML parse error when reading the mapping file.
    #[error("identity mapping parse error: {0}")]
    ParseError(String),

    /// Generic I/O error.
    #[error("identity I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Errors from the destination holder store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A holder could not be serialized for persistence.
    #[error("failed to serialize holder '{key}': {detail}")]
    SerializeError { key: String, detail: String },

    /// A stored holder record could not be deserialized.
    #[error("failed to read stored holder at '{path}': {detail}")]
    DeserializeError { path: String, detail: String },

    /// Backend-specific failure (lock poisoning, connection loss, ...).
    #[error("storage backend error: {0}")]
    BackendError(String),

    /// Generic I/O wrapper.
    #[error("storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Per-holder errors
// ---------------------------------------------------------------------------

/// Union of the errors that can fail a single holder's migration.
///
/// The engine catches these at the batch-loop boundary, records them in the
/// run report, and continues with the next holder. They never propagate out
/// of a run.
#[derive(Debug, Error)]
pub enum HolderError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
