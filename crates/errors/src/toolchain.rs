//! Toolchain detection error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ToolchainError {
    #[error("no usable compiler found for cross prefix {prefix}")]
    CompilerNotFound { prefix: String },

    #[error("unsupported target machine: {machine}")]
    UnsupportedTarget { machine: String },

    #[error("compiler probe failed for {command}: {message}")]
    ProbeFailed { command: String, message: String },
}

impl UserFacingError for ToolchainError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CompilerNotFound { .. } => {
                Some("Source the SDK environment script or add the toolchain to PATH.")
            }
            Self::UnsupportedTarget { .. } => {
                Some("Supported cross targets are 32-bit ARM and AArch64.")
            }
            Self::ProbeFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CompilerNotFound { .. } => "toolchain.compiler_not_found",
            Self::UnsupportedTarget { .. } => "toolchain.unsupported_target",
            Self::ProbeFailed { .. } => "toolchain.probe_failed",
        };
        Some(code)
    }
}
