//! Error types for dockyard.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dockyard operations.
pub type Result<T> = std::result::Result<T, DockyardError>;

/// Main error type for dockyard.
#[derive(Error, Debug)]
pub enum DockyardError {
    // Scaling errors
    #[error("system {system} is not scalable: scaling past the limit of {limit} instances")]
    SystemNotScalable { system: String, limit: i64 },

    #[error(
        "system '{system}' depends on '{dependency}' which has no running instances \
         and automatic dependency startup is disabled"
    )]
    SystemDependError { system: String, dependency: String },

    // Mount errors
    #[error("remote fetch of {origin} to {target:?} failed: {reason}")]
    RemoteFetchFailed { origin: String, target: PathBuf, reason: String },

    // Configuration errors
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Generic errors
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DockyardError {
    /// Create an Internal error from any error type.
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(err.to_string())
    }
}
