#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Variant source selection for vintner
//!
//! Decides which source checkout a build uses and which patch set (if
//! any) applies, given the variant and version. Selection itself only
//! inspects the filesystem; materialization of missing checkouts is a
//! separate, explicitly requested operation so ranged/bisect loops stay
//! deterministic by default.

pub mod fixups;
pub mod git;
pub mod patches;

pub use fixups::{fixups_for, Fixups};
pub use patches::PatchSet;

use std::path::{Path, PathBuf};
use vintner_config::RepoConfig;
use vintner_errors::{Error, SourceError};
use vintner_events::{AppEvent, EventEmitter, EventSender, SourceEvent};
use vintner_layout::{ArtifactLayout, REFERENCE_GITMIRROR};
use vintner_types::{Variant, WineVersion};

/// The outcome of source selection: where to build from, what to patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSource {
    pub source_dir: PathBuf,
    /// Staging patch set; `None` for mainline and custom.
    pub patch_set: Option<PatchSet>,
    /// Version-gated extra configure arguments (fixup table).
    pub extra_configure_args: Vec<String>,
}

/// Selects, materializes, and prepares variant source trees.
pub struct SourceSelector {
    root: PathBuf,
    repos: RepoConfig,
    events: Option<EventSender>,
}

impl SourceSelector {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, repos: RepoConfig) -> Self {
        Self {
            root: root.into(),
            repos,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Select the source tree and patch set for a build.
    ///
    /// Pure resolution: reads the filesystem but runs no external
    /// process and mutates nothing, so every failure here is a
    /// configuration error the caller can fix before anything ran.
    ///
    /// # Errors
    ///
    /// Returns an error when a required checkout or patch set is absent.
    pub async fn select(
        &self,
        layout: &ArtifactLayout,
        variant: Variant,
        version: Option<WineVersion>,
    ) -> Result<SelectedSource, Error> {
        let extra_configure_args = version
            .filter(|_| variant != Variant::Custom)
            .map(|v| {
                fixups_for(v)
                    .configure_args
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        match variant {
            Variant::Mainline | Variant::Custom => {
                if !layout.source_dir.is_dir() {
                    return Err(checkout_missing(&layout.source_dir));
                }
                Ok(SelectedSource {
                    source_dir: layout.source_dir.clone(),
                    patch_set: None,
                    extra_configure_args,
                })
            }
            Variant::Staging => {
                // layout resolution guarantees a version for staging
                let version = version.ok_or_else(|| Error::internal("staging without version"))?;

                let mainline = vintner_layout::mainline_source_dir(&self.root, Some(version));
                if !mainline.is_dir() {
                    return Err(checkout_missing(&mainline));
                }

                let patches_dir = layout
                    .patches_dir
                    .as_ref()
                    .ok_or_else(|| Error::internal("staging layout without patches dir"))?;
                let patch_set = patches::resolve(patches_dir, version).await?;
                self.events.emit(AppEvent::Source(SourceEvent::PatchSetResolved {
                    version: version.to_string(),
                    patches: patch_set.len(),
                }));

                Ok(SelectedSource {
                    source_dir: layout.source_dir.clone(),
                    patch_set: Some(patch_set),
                    extra_configure_args,
                })
            }
        }
    }

    /// Materialize missing checkouts for a tagged build (`--fetch`).
    ///
    /// Mainline is cloned from the reference mirror when one exists,
    /// otherwise from the configured upstream; tagged trees are local
    /// clones reset to the release tag. Staging patch sets come from the
    /// staging repository, reset to the matching `v<version>` tag.
    ///
    /// # Errors
    ///
    /// Returns an error when any clone or reset fails.
    pub async fn materialize(
        &self,
        variant: Variant,
        version: Option<WineVersion>,
    ) -> Result<(), Error> {
        let head_checkout = vintner_layout::mainline_source_dir(&self.root, None);
        if !head_checkout.is_dir() {
            let mirror = self.root.join(REFERENCE_GITMIRROR);
            let uri = if mirror.is_dir() {
                mirror.display().to_string()
            } else {
                self.repos.mainline_uri.clone()
            };
            self.clone_into(&uri, &head_checkout).await?;
        }

        if let Some(version) = version {
            let tagged = vintner_layout::mainline_source_dir(&self.root, Some(version));
            if !tagged.is_dir() {
                self.clone_into(&head_checkout.display().to_string(), &tagged)
                    .await?;
            }
            self.reset(&tagged, &format!("wine-{version}")).await?;

            if variant == Variant::Staging {
                let patches = self
                    .root
                    .join(vintner_layout::patches_dir_name(Some(version)));
                if !patches.is_dir() {
                    self.clone_into(&self.repos.staging_uri, &patches).await?;
                }
                self.reset(&patches, &format!("v{version}")).await?;
            }
        }

        Ok(())
    }

    /// Prepare the selected tree for building: create the staging clone,
    /// reset it to the release tag, and cherry-pick version-gated build
    /// fixups. Custom trees are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error when a git operation fails; a fixup that does
    /// not apply aborts the build before any configure step runs.
    pub async fn prepare(
        &self,
        selected: &SelectedSource,
        variant: Variant,
        version: Option<WineVersion>,
    ) -> Result<(), Error> {
        if variant == Variant::Custom {
            return Ok(());
        }

        if variant == Variant::Staging {
            let version = version.ok_or_else(|| Error::internal("staging without version"))?;
            if !selected.source_dir.is_dir() {
                let mainline = vintner_layout::mainline_source_dir(&self.root, Some(version));
                self.clone_into(&mainline.display().to_string(), &selected.source_dir)
                    .await?;
            }
            // fresh tree so the patch step applies all-or-nothing
            self.reset(&selected.source_dir, &format!("wine-{version}"))
                .await?;
        }

        if let Some(version) = version {
            for commit in fixups_for(version).cherry_picks {
                if git::branch_contains(&selected.source_dir, commit).await? {
                    continue;
                }
                git::cherry_pick(&selected.source_dir, commit).await?;
                self.events.emit(AppEvent::Source(SourceEvent::FixupApplied {
                    commit: commit.to_string(),
                }));
            }
        }

        Ok(())
    }

    async fn clone_into(&self, uri: &str, dest: &Path) -> Result<(), Error> {
        self.events.emit(AppEvent::Source(SourceEvent::Cloning {
            uri: uri.to_string(),
            dest: dest.to_path_buf(),
        }));
        git::clone(uri, dest).await
    }

    async fn reset(&self, repo: &Path, reference: &str) -> Result<(), Error> {
        self.events.emit(AppEvent::Source(SourceEvent::Reset {
            path: repo.to_path_buf(),
            reference: reference.to_string(),
        }));
        git::reset_hard(repo, reference).await
    }
}

fn checkout_missing(path: &Path) -> Error {
    SourceError::CheckoutMissing {
        path: path.display().to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vintner_types::Arch;

    fn v(s: &str) -> WineVersion {
        s.parse().unwrap()
    }

    fn selector(root: &Path) -> SourceSelector {
        SourceSelector::new(root, RepoConfig::default())
    }

    fn layout(root: &Path, variant: Variant, version: Option<WineVersion>) -> ArtifactLayout {
        vintner_layout::resolve(root, variant, version, &[Arch::X86_64], false).unwrap()
    }

    #[tokio::test]
    async fn mainline_head_requires_existing_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path(), Variant::Mainline, None);
        let err = selector(dir.path())
            .select(&layout, Variant::Mainline, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::CheckoutMissing { .. })
        ));

        std::fs::create_dir(dir.path().join("mainline-src")).unwrap();
        let selected = selector(dir.path())
            .select(&layout, Variant::Mainline, None)
            .await
            .unwrap();
        assert!(selected.patch_set.is_none());
        assert!(selected.extra_configure_args.is_empty());
    }

    #[tokio::test]
    async fn staging_requires_tagged_source_and_patches() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path(), Variant::Staging, Some(v("4.0")));
        let sel = selector(dir.path());

        // no tagged mainline checkout
        let err = sel
            .select(&layout, Variant::Staging, Some(v("4.0")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::CheckoutMissing { .. })
        ));

        // tagged checkout present, but no patch set
        std::fs::create_dir(dir.path().join("mainline-src-4.0")).unwrap();
        let err = sel
            .select(&layout, Variant::Staging, Some(v("4.0")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::PatchSetMissing { .. })
        ));

        // both present
        let patches = dir.path().join("staging-patches-4.0");
        std::fs::create_dir(&patches).unwrap();
        std::fs::write(patches.join("0001-a.patch"), "").unwrap();
        let selected = sel
            .select(&layout, Variant::Staging, Some(v("4.0")))
            .await
            .unwrap();
        assert_eq!(selected.patch_set.unwrap().len(), 1);
        assert!(selected.source_dir.ends_with("staging-src-4.0"));
    }

    #[tokio::test]
    async fn custom_uses_unversioned_tree_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("custom-src")).unwrap();
        let layout = layout(dir.path(), Variant::Custom, None);
        let selected = selector(dir.path())
            .select(&layout, Variant::Custom, None)
            .await
            .unwrap();
        assert!(selected.source_dir.ends_with("custom-src"));
        assert!(selected.patch_set.is_none());
    }

    #[tokio::test]
    async fn old_release_picks_up_configure_fixups() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("mainline-src-1.4")).unwrap();
        let layout = layout(dir.path(), Variant::Mainline, Some(v("1.4")));
        let selected = selector(dir.path())
            .select(&layout, Variant::Mainline, Some(v("1.4")))
            .await
            .unwrap();
        assert!(selected
            .extra_configure_args
            .contains(&"--disable-wineps.drv".to_string()));
    }
}
