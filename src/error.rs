//! Error types for artifact-dl
//!
//! This module provides the crate-wide error type and its mapping onto
//! process exit codes:
//! - Usage errors (bad configuration, no active context, malformed type filter)
//!   are detected before planning and map to exit code 2
//! - Everything else maps to exit code 1
//!
//! Per-artifact failures never surface as `Err` at the batch level. They are
//! captured as [`Outcome::Failed`](crate::types::Outcome::Failed) entries using
//! the error's `Display` text.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for artifact-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code: every requested artifact was downloaded or expectedly skipped
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code: at least one artifact failed
pub const EXIT_FAILURE: i32 = 1;
/// Exit code: the invocation itself was invalid
pub const EXIT_USAGE: i32 = 2;

/// Main error type for artifact-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// No context was given and none is active
    #[error("no context selected: pass a context explicitly or set an active one")]
    NoContext,

    /// A type filter value is not a downloadable artifact type
    #[error("invalid type filter '{0}': expected one of audio, video, slides, infographic")]
    InvalidTypeFilter(String),

    /// Artifact not found in the repository
    #[error("not found")]
    NotFound(String),

    /// Transport failure while talking to the artifact repository
    #[error("transport error: {0}")]
    Transport(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No collision-free destination could be found
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// Why no alternative was found
        reason: String,
    },

    /// A destination path cannot be used
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },

    /// The batch was cancelled before this item completed
    #[error("cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error describes a malformed invocation rather than a runtime failure
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::NoContext | Error::InvalidTypeFilter(_)
        )
    }
}

/// Map results and errors to process exit codes
///
/// Implemented for [`Error`] and for [`BatchResult`](crate::types::BatchResult)
/// so the embedding binary can derive its exit status from either.
pub trait ToExitCode {
    /// Get the process exit code
    fn exit_code(&self) -> i32;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> i32 {
        if self.is_usage_error() {
            EXIT_USAGE
        } else {
            EXIT_FAILURE
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::NoContext => "no_context",
            Error::InvalidTypeFilter(_) => "invalid_type_filter",
            Error::NotFound(_) => "not_found",
            Error::Transport(_) => "transport_error",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::FileCollision { .. } => "file_collision",
            Error::InvalidPath { .. } => "invalid_path",
            Error::Cancelled => "cancelled",
            Error::Other(_) => "internal_error",
        }
    }
}
