#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Artifact layout resolution for vintner
//!
//! Maps a (variant, version, architectures) tuple to the canonical
//! directory names under the workspace root. The naming grammar is the
//! only on-disk contract vintner has; external scripts treat these names
//! as stable keys:
//!
//! ```text
//! <variant>-src[-<version>]
//! staging-patches[-<version>]
//! <variant>-build[-<version>]-<arch>
//! <variant>-install[-<version>]-<arch>
//! mainline-src-reference-gitmirror
//! ```
//!
//! Resolution is a pure function: no filesystem access, same input gives
//! the same output, distinct tuples give distinct names.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vintner_errors::{Error, LayoutError};
use vintner_types::{Arch, Variant, WineVersion};

/// Immutable reference mirror backing tag/commit lookups. Never written
/// to by normal builds.
pub const REFERENCE_GITMIRROR: &str = "mainline-src-reference-gitmirror";

/// Resolved directory layout for one build invocation.
///
/// Derived deterministically from the request; never hand-edited.
/// Directories are created lazily on first use and destroyed only under
/// an explicit clean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Source tree the build configures from.
    pub source_dir: PathBuf,
    /// Staging patch-set directory; `None` for non-staging variants.
    pub patches_dir: Option<PathBuf>,
    /// Out-of-source build tree per architecture.
    pub build_dirs: BTreeMap<Arch, PathBuf>,
    /// Install prefix per architecture.
    pub install_dirs: BTreeMap<Arch, PathBuf>,
}

impl ArtifactLayout {
    /// All build and install directories, the set an explicit clean
    /// wipes. Source directories are deliberately absent.
    #[must_use]
    pub fn volatile_dirs(&self) -> Vec<PathBuf> {
        self.build_dirs
            .values()
            .chain(self.install_dirs.values())
            .cloned()
            .collect()
    }
}

/// Version suffix, `-<version>` for tagged builds, empty for HEAD.
fn dash_version(version: Option<WineVersion>) -> String {
    version.map_or_else(String::new, |v| format!("-{v}"))
}

/// Source directory name for a variant.
///
/// `custom` never carries a version suffix: it is a single working tree
/// mutated externally between invocations.
#[must_use]
pub fn source_dir_name(variant: Variant, version: Option<WineVersion>) -> String {
    let version = match variant {
        Variant::Custom => None,
        _ => version,
    };
    format!("{variant}-src{}", dash_version(version))
}

/// Staging patch-set directory name for a release.
#[must_use]
pub fn patches_dir_name(version: Option<WineVersion>) -> String {
    format!("staging-patches{}", dash_version(version))
}

/// Build directory name for one architecture.
#[must_use]
pub fn build_dir_name(variant: Variant, version: Option<WineVersion>, arch: Arch) -> String {
    let version = match variant {
        Variant::Custom => None,
        _ => version,
    };
    format!("{variant}-build{}-{arch}", dash_version(version))
}

/// Install directory name for one architecture.
#[must_use]
pub fn install_dir_name(variant: Variant, version: Option<WineVersion>, arch: Arch) -> String {
    let version = match variant {
        Variant::Custom => None,
        _ => version,
    };
    format!("{variant}-install{}-{arch}", dash_version(version))
}

/// Tagged mainline source directory, which staging builds clone from.
#[must_use]
pub fn mainline_source_dir(root: &Path, version: Option<WineVersion>) -> PathBuf {
    root.join(source_dir_name(Variant::Mainline, version))
}

/// Resolve the full artifact layout for a build request.
///
/// # Errors
///
/// Returns a configuration error when staging is requested without a
/// version (staging has no rolling HEAD), when no architectures are
/// requested, or when a cross build requests more than one architecture.
pub fn resolve(
    root: &Path,
    variant: Variant,
    version: Option<WineVersion>,
    architectures: &[Arch],
    is_cross: bool,
) -> Result<ArtifactLayout, Error> {
    if variant == Variant::Staging && version.is_none() {
        return Err(LayoutError::StagingNeedsVersion.into());
    }
    if architectures.is_empty() {
        return Err(LayoutError::NoArchitectures.into());
    }
    if is_cross && architectures.len() != 1 {
        return Err(LayoutError::CrossNeedsSingleArch {
            count: architectures.len(),
        }
        .into());
    }

    let source_dir = root.join(source_dir_name(variant, version));
    let patches_dir = match variant {
        Variant::Staging => Some(root.join(patches_dir_name(version))),
        Variant::Mainline | Variant::Custom => None,
    };

    let mut build_dirs = BTreeMap::new();
    let mut install_dirs = BTreeMap::new();
    for &arch in architectures {
        build_dirs.insert(arch, root.join(build_dir_name(variant, version, arch)));
        install_dirs.insert(arch, root.join(install_dir_name(variant, version, arch)));
    }

    Ok(ArtifactLayout {
        source_dir,
        patches_dir,
        build_dirs,
        install_dirs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> WineVersion {
        s.parse().unwrap()
    }

    #[test]
    fn head_build_omits_version_suffix() {
        assert_eq!(source_dir_name(Variant::Mainline, None), "mainline-src");
        assert_eq!(
            build_dir_name(Variant::Mainline, None, Arch::X86_64),
            "mainline-build-x86_64"
        );
    }

    #[test]
    fn tagged_build_carries_version_suffix() {
        assert_eq!(
            source_dir_name(Variant::Staging, Some(v("4.0"))),
            "staging-src-4.0"
        );
        assert_eq!(
            install_dir_name(Variant::Staging, Some(v("4.0")), Arch::X86),
            "staging-install-4.0-i686"
        );
    }

    #[test]
    fn custom_never_carries_version() {
        assert_eq!(source_dir_name(Variant::Custom, Some(v("4.0"))), "custom-src");
        assert_eq!(
            build_dir_name(Variant::Custom, Some(v("4.0")), Arch::X86_64),
            "custom-build-x86_64"
        );
    }

    #[test]
    fn staging_without_version_is_rejected() {
        let err = resolve(
            Path::new("/wine"),
            Variant::Staging,
            None,
            &[Arch::X86_64],
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Layout(LayoutError::StagingNeedsVersion)
        ));
    }

    #[test]
    fn cross_requires_single_arch() {
        let err = resolve(
            Path::new("/wine"),
            Variant::Mainline,
            None,
            &[Arch::X86, Arch::X86_64],
            true,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Layout(LayoutError::CrossNeedsSingleArch { count: 2 })
        ));
    }

    #[test]
    fn resolution_is_stable_and_unique() {
        let root = Path::new("/wine");
        let a = resolve(root, Variant::Mainline, Some(v("4.0")), &[Arch::X86_64], false).unwrap();
        let b = resolve(root, Variant::Mainline, Some(v("4.0")), &[Arch::X86_64], false).unwrap();
        assert_eq!(a, b);

        // distinct tuples give distinct names
        let tuples = [
            (Variant::Mainline, None),
            (Variant::Mainline, Some(v("4.0"))),
            (Variant::Mainline, Some(v("4.1"))),
            (Variant::Staging, Some(v("4.0"))),
            (Variant::Custom, None),
        ];
        let mut seen = std::collections::HashSet::new();
        for (variant, version) in tuples {
            let layout =
                resolve(root, variant, version, &[Arch::X86, Arch::X86_64], false).unwrap();
            for dir in layout.volatile_dirs() {
                assert!(seen.insert(dir.clone()), "collision: {}", dir.display());
            }
        }
    }

    #[test]
    fn volatile_dirs_exclude_source() {
        let layout = resolve(
            Path::new("/wine"),
            Variant::Mainline,
            None,
            &[Arch::X86, Arch::X86_64],
            false,
        )
        .unwrap();
        assert_eq!(layout.volatile_dirs().len(), 4);
        assert!(!layout.volatile_dirs().contains(&layout.source_dir));
    }
}
