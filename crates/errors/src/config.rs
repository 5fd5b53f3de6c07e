//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("invalid environment variable {name}: {message}")]
    InvalidEnv { name: String, message: String },

    #[error("invalid flag combination: {message}")]
    InvalidFlags { message: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::Invalid { .. } => "config.invalid",
            Self::InvalidEnv { .. } => "config.invalid_env",
            Self::InvalidFlags { .. } => "config.invalid_flags",
        };
        Some(code)
    }
}
