//! Thin wrappers around the external `git` binary
//!
//! Git is an external collaborator with a standard exit-code contract;
//! vintner never manipulates repository internals itself.

use std::path::Path;
use tokio::process::Command;
use vintner_errors::{Error, SourceError};

async fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<std::process::Output, Error> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.output().await.map_err(|e| {
        SourceError::GitFailed {
            operation: args.first().copied().unwrap_or("git").to_string(),
            path: cwd.map_or_else(|| ".".to_string(), |p| p.display().to_string()),
            message: e.to_string(),
        }
        .into()
    })
}

fn check(output: &std::process::Output, operation: &str, path: &Path) -> Result<(), Error> {
    if output.status.success() {
        Ok(())
    } else {
        Err(SourceError::GitFailed {
            operation: operation.to_string(),
            path: path.display().to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into())
    }
}

/// Clone `uri` into `dest`.
///
/// # Errors
///
/// Returns an error if git exits non-zero or cannot be spawned.
pub async fn clone(uri: &str, dest: &Path) -> Result<(), Error> {
    let dest_str = dest.display().to_string();
    let output = run_git(&["clone", uri, &dest_str], None).await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(SourceError::CloneFailed {
            uri: uri.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into())
    }
}

/// Hard-reset a working tree to a ref.
///
/// # Errors
///
/// Returns an error if git exits non-zero, e.g. when the tag does not
/// exist in the checkout.
pub async fn reset_hard(repo: &Path, reference: &str) -> Result<(), Error> {
    let output = run_git(&["reset", "--hard", reference], Some(repo)).await?;
    check(&output, "reset", repo)
}

/// Whether `commit` is already contained in any local branch.
///
/// # Errors
///
/// Returns an error if git cannot be spawned.
pub async fn branch_contains(repo: &Path, commit: &str) -> Result<bool, Error> {
    // exits non-zero for unknown commits, which just means "not contained"
    let output = run_git(&["branch", "--contains", commit], Some(repo)).await?;
    Ok(output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Cherry-pick a single commit, preferring the incoming side on
/// conflicts. Skipped by the caller when the commit is already present.
///
/// # Errors
///
/// Returns an error if the cherry-pick does not apply.
pub async fn cherry_pick(repo: &Path, commit: &str) -> Result<(), Error> {
    let output = run_git(
        &[
            "cherry-pick",
            "--strategy=recursive",
            "-X",
            "theirs",
            "-x",
            commit,
        ],
        Some(repo),
    )
    .await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(SourceError::CherryPickFailed {
            commit: commit.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into())
    }
}
