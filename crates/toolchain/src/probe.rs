//! Environment probing
//!
//! [`ToolchainProbe`] abstracts the search path and compiler queries so
//! detection logic is testable with a fake environment.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use vintner_errors::{Error, ToolchainError};

/// Injectable view of the build environment.
#[async_trait]
pub trait ToolchainProbe: Send + Sync {
    /// Find a program on the search path.
    fn find_program(&self, name: &str) -> Option<PathBuf>;

    /// The compiler's target machine string (`cc -dumpmachine`).
    async fn compiler_machine(&self, compiler: &str) -> Result<String, Error>;

    /// The compiler's built-in default for a target flag, e.g.
    /// `mfloat-abi` or `mfpu` (`cc -Q --help=target`).
    async fn compiler_target_default(&self, compiler: &str, flag: &str) -> Option<String>;
}

/// Probe backed by the real search path and compiler binaries.
pub struct SystemProbe;

#[async_trait]
impl ToolchainProbe for SystemProbe {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    async fn compiler_machine(&self, compiler: &str) -> Result<String, Error> {
        let output = Command::new(compiler)
            .arg("-dumpmachine")
            .output()
            .await
            .map_err(|e| ToolchainError::ProbeFailed {
                command: format!("{compiler} -dumpmachine"),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(ToolchainError::ProbeFailed {
                command: format!("{compiler} -dumpmachine"),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn compiler_target_default(&self, compiler: &str, flag: &str) -> Option<String> {
        let output = Command::new(compiler)
            .args(["-Q", "--help=target"])
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_target_default(&stdout, flag)
    }
}

/// Extract a flag's default from `cc -Q --help=target` output. Lines
/// look like `  -mfloat-abi=                  hard`.
fn parse_target_default(help: &str, flag: &str) -> Option<String> {
    let needle = format!("-{flag}=");
    for line in help.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(&needle) {
            let value = rest.trim();
            if !value.is_empty() && !value.starts_with('[') {
                return Some(value.split_whitespace().next().unwrap_or(value).to_string());
            }
        }
    }
    None
}
