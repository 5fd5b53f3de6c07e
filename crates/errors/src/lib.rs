#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the vintner build orchestrator
//!
//! This crate provides fine-grained error types organized by domain.
//! Configuration-class errors are reported before any external process
//! runs; build-class errors carry the identity of the failing step so a
//! ranged/bisect loop can trust the first reported failure.

use std::borrow::Cow;

use thiserror::Error;

pub mod build;
pub mod config;
pub mod layout;
pub mod source;
pub mod toolchain;

// Re-export all error types at the root
pub use build::BuildError;
pub use config::ConfigError;
pub use layout::LayoutError;
pub use source::SourceError;
pub use toolchain::ToolchainError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

/// Result type alias for vintner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same invocation is likely to succeed
    /// without the caller changing inputs.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Build(err) => err.user_message(),
            Error::Source(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Build(err) => err.user_hint(),
            Error::Source(err) => err.user_hint(),
            Error::Toolchain(err) => err.user_hint(),
            Error::Config(_) => Some("Check your vintner configuration file."),
            Error::Layout(_) => {
                Some("Check the requested variant/version/architecture combination.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Source(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Layout(err) => err.user_code(),
            Error::Source(err) => err.user_code(),
            Error::Toolchain(err) => err.user_code(),
            Error::Build(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
