//! Build plan and execution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("{step} failed for {arch} with exit code {code:?}")]
    StepFailed {
        step: String,
        arch: String,
        code: Option<i32>,
    },

    #[error("failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("clean failed for {path}: {message}")]
    CleanFailed { path: String, message: String },

    #[error("empty build plan")]
    EmptyPlan,
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SpawnFailed { .. } => {
                Some("Check that the build tools are installed in the environment.")
            }
            Self::CleanFailed { .. } => {
                Some("Remove the directory manually, then retry.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::StepFailed { .. } => "build.step_failed",
            Self::SpawnFailed { .. } => "build.spawn_failed",
            Self::CleanFailed { .. } => "build.clean_failed",
            Self::EmptyPlan => "build.empty_plan",
        };
        Some(code)
    }
}
