//! Layout resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("staging variant requires a version (staging has no rolling HEAD)")]
    StagingNeedsVersion,

    #[error("no target architectures requested")]
    NoArchitectures,

    #[error("cross builds target exactly one architecture, got {count}")]
    CrossNeedsSingleArch { count: usize },
}

impl UserFacingError for LayoutError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::StagingNeedsVersion => {
                Some("Pass --version-tag with a release that has a staging patch set.")
            }
            Self::CrossNeedsSingleArch { .. } => {
                Some("Drop the extra architectures or the cross prefix.")
            }
            Self::NoArchitectures => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::StagingNeedsVersion => "layout.staging_needs_version",
            Self::NoArchitectures => "layout.no_architectures",
            Self::CrossNeedsSingleArch { .. } => "layout.cross_needs_single_arch",
        };
        Some(code)
    }
}
