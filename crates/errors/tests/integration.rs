//! Integration tests for error types

use vintner_errors::*;

#[test]
fn error_conversion() {
    let layout_err = LayoutError::StagingNeedsVersion;
    let err: Error = layout_err.into();
    assert!(matches!(err, Error::Layout(_)));
}

#[test]
fn error_display() {
    let err = SourceError::PatchSetMissing {
        version: "4.0".into(),
        path: "/wine/staging-patches-4.0".into(),
    };
    assert_eq!(
        err.to_string(),
        "staging patch set missing for version 4.0: /wine/staging-patches-4.0"
    );
}

#[test]
fn error_clone() {
    let err = BuildError::StepFailed {
        step: "configure".into(),
        arch: "x86_64".into(),
        code: Some(1),
    };
    let cloned = err.clone();
    assert_eq!(err.to_string(), cloned.to_string());
}

#[test]
fn io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn user_codes_are_stable() {
    let err: Error = ToolchainError::CompilerNotFound {
        prefix: "aarch64-poky-linux-".into(),
    }
    .into();
    assert_eq!(err.user_code(), Some("toolchain.compiler_not_found"));
    assert!(!err.is_retryable());
}
