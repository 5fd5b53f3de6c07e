//! Staging patch-set resolution

use std::path::{Path, PathBuf};
use vintner_errors::{Error, SourceError};
use vintner_types::WineVersion;

/// An ordered, immutable set of patch files for one (staging, version)
/// pair. Resolved once per build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSet {
    pub version: WineVersion,
    /// Patch files in application order (file-sorted).
    pub files: Vec<PathBuf>,
}

impl PatchSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_patch_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("patch" | "diff")
    )
}

/// Resolve the patch set for a release from its patches directory.
///
/// Files are collected recursively and sorted by path so application
/// order is deterministic across filesystems.
///
/// # Errors
///
/// Returns a configuration error when the directory is missing or holds
/// no patch files; a staging build must never silently proceed
/// unpatched.
pub async fn resolve(dir: &Path, version: WineVersion) -> Result<PatchSet, Error> {
    if !dir.is_dir() {
        return Err(SourceError::PatchSetMissing {
            version: version.to_string(),
            path: dir.display().to_string(),
        }
        .into());
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| Error::io_with_path(&e, &current))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_path(&e, &current))?
        {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_patch_file(&path) {
                files.push(path);
            }
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(SourceError::PatchSetEmpty {
            version: version.to_string(),
            path: dir.display().to_string(),
        }
        .into());
    }

    Ok(PatchSet { version, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> WineVersion {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn missing_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(&dir.path().join("staging-patches-9.9"), v("9.9"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::PatchSetMissing { .. })
        ));
    }

    #[tokio::test]
    async fn empty_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(dir.path(), v("4.0")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::PatchSetEmpty { .. })
        ));
    }

    #[tokio::test]
    async fn files_come_back_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("ntdll");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("0002-b.patch"), "").unwrap();
        std::fs::write(dir.path().join("0001-a.patch"), "").unwrap();
        std::fs::write(sub.join("0003-c.diff"), "").unwrap();
        std::fs::write(dir.path().join("README"), "not a patch").unwrap();

        let set = resolve(dir.path(), v("4.0")).await.unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.files[0].ends_with("0001-a.patch"));
        assert!(set.files[1].ends_with("0002-b.patch"));
        assert!(set.files[2].ends_with("ntdll/0003-c.diff"));
    }
}
