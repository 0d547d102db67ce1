//! Error types for anidl
//!
//! Submission-time failures (invalid request, filesystem problems, missing
//! downloader binary) are reported synchronously through these types. A
//! download that fails *after* the detached job has been spawned is never an
//! `Error`; it surfaces as [`Status::Failed`](crate::types::Status) on the
//! job handle and as output in the job's log file.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for anidl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for anidl
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing request fields (empty slug, episode < 1, ...)
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Human-readable description of what is wrong with the request
        reason: String,
    },

    /// Filesystem operation failed (output directory creation, log file open)
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// The path the operation was acting on
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "providers.provider_priority")
        key: Option<String>,
    },

    /// The external downloader binary could not be located
    #[error("downloader tool not found: {tool}")]
    ToolNotFound {
        /// The binary name or path that was searched for
        tool: String,
    },

    /// Spawning the detached download process failed
    #[error("failed to spawn {}: {source}", tool.display())]
    Spawn {
        /// Path to the binary that failed to start
        tool: PathBuf,
        /// The underlying I/O error from the spawn attempt
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand constructor for [`Error::InvalidRequest`]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Error::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Machine-readable error code, stable across message wording changes
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidRequest { .. } => "invalid_request",
            Error::Filesystem { .. } => "filesystem_error",
            Error::Config { .. } => "config_error",
            Error::ToolNotFound { .. } => "tool_not_found",
            Error::Spawn { .. } => "spawn_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}
