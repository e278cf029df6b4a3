//! Error types for FileBot.
//!
//! Library crates use [`FileBotError`] via `thiserror`.
//! The `filebot` binary wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all FileBot operations.
#[derive(Debug, thiserror::Error)]
pub enum FileBotError {
    /// A remote service could not be reached, answered with a non-success
    /// status, timed out, or returned a body we could not decode.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// User input rejected before any lookup ran (e.g. a blank line).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The operation needs a credential and the session has none.
    #[error("not authenticated: no access token in session")]
    Unauthenticated,

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FileBotError>;

impl FileBotError {
    /// Create a service-unavailable error from any displayable message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create an invalid-input error from any displayable message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a routine remote failure rather than a caller mistake.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}
