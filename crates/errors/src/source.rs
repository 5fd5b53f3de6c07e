//! Source selection and materialization error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("source checkout missing: {path}")]
    CheckoutMissing { path: String },

    #[error("staging patch set missing for version {version}: {path}")]
    PatchSetMissing { version: String, path: String },

    #[error("patch set for {version} is empty: {path}")]
    PatchSetEmpty { version: String, path: String },

    #[error("git {operation} failed in {path}: {message}")]
    GitFailed {
        operation: String,
        path: String,
        message: String,
    },

    #[error("cherry-pick {commit} failed: {message}")]
    CherryPickFailed { commit: String, message: String },

    #[error("clone failed from {uri}: {message}")]
    CloneFailed { uri: String, message: String },
}

impl UserFacingError for SourceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CheckoutMissing { .. } => {
                Some("Run again with --fetch to materialize the checkout.")
            }
            Self::PatchSetMissing { .. } | Self::PatchSetEmpty { .. } => {
                Some("Fetch the staging patch set matching the requested release.")
            }
            Self::CloneFailed { .. } => Some("Check network access and the configured repo URIs."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CloneFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CheckoutMissing { .. } => "source.checkout_missing",
            Self::PatchSetMissing { .. } => "source.patch_set_missing",
            Self::PatchSetEmpty { .. } => "source.patch_set_empty",
            Self::GitFailed { .. } => "source.git_failed",
            Self::CherryPickFailed { .. } => "source.cherry_pick_failed",
            Self::CloneFailed { .. } => "source.clone_failed",
        };
        Some(code)
    }
}
