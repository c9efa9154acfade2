//! Error types for installer-ops.
//!
//! Operations report failures through [`OperationError`], which carries the
//! error kind and a message naming the offending path(s). Everything above the
//! operation contract (registry, log handling, CLI) returns `Result<T>`, which
//! aliases `Result<T, Error>`.

use thiserror::Error;

/// Classification of an operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed arguments, or an internal consistency failure during undo.
    InvalidArguments,
    /// Environment or I/O failure (permissions, disk full, path collision).
    UserDefined,
}

/// Failure reported by an operation's `perform` or `undo`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    /// Arguments were rejected before touching the file system, or an undo
    /// step could not be completed.
    #[error("{0}")]
    InvalidArguments(String),

    /// A file system mutation failed.
    #[error("{0}")]
    UserDefined(String),
}

impl OperationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::UserDefined(_) => ErrorKind::UserDefined,
        }
    }

    /// Human-readable message, without the kind.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArguments(msg) | Self::UserDefined(msg) => msg,
        }
    }
}

/// Errors surfaced by the registry and the maintenance driver.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation failed.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// No constructor is registered under this name.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Operation record could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for installer-ops.
pub type Result<T> = std::result::Result<T, Error>;
