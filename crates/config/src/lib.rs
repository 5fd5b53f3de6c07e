#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for vintner
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/vintner/config.toml)
//! - Environment variables (`VINTNER_*`)
//! - CLI flags (applied last by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use vintner_errors::{ConfigError, Error};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub repos: RepoConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// Build policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Default number of build jobs; 0 = auto-detect
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Common CFLAGS prepended to every architecture's flags
    #[serde(default = "default_common_cflags")]
    pub common_cflags: String,
    /// Default the runtime-integration component (mscoree) on for
    /// tagged release builds. Never applies to HEAD builds.
    #[serde(default = "default_mscoree_for_releases")]
    pub enable_mscoree_for_releases: bool,
}

/// Upstream repository URIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default = "default_mainline_uri")]
    pub mainline_uri: String,
    #[serde(default = "default_staging_uri")]
    pub staging_uri: String,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Workspace root holding all source/build/install trees.
    /// Defaults to the current directory when unset.
    pub workspace_root: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: 0, // 0 = auto-detect
            common_cflags: default_common_cflags(),
            enable_mscoree_for_releases: false,
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            mainline_uri: default_mainline_uri(),
            staging_uri: default_staging_uri(),
        }
    }
}

// Default value functions for serde

fn default_jobs() -> usize {
    0
}

fn default_common_cflags() -> String {
    "-g -O2".to_string()
}

fn default_mscoree_for_releases() -> bool {
    false
}

fn default_mainline_uri() -> String {
    "git://source.winehq.org/git/wine.git".to_string()
}

fn default_staging_uri() -> String {
    "https://github.com/wine-staging/wine-staging.git".to_string()
}

impl Config {
    /// Load configuration from an explicit path, or from the default
    /// location, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing or if any
    /// file fails to parse.
    pub async fn load_or_default(explicit: Option<&Path>) -> Result<Self, Error> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            return Self::load_file(path).await;
        }

        let default_path = Self::default_path();
        if let Some(path) = default_path {
            if path.exists() {
                return Self::load_file(&path).await;
            }
        }

        Ok(Self::default())
    }

    async fn load_file(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        toml::from_str(&content).map_err(|e| {
            ConfigError::Invalid {
                message: format!("{}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Default config file location (`~/.config/vintner/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("vintner").join("config.toml"))
    }

    /// Merge `VINTNER_*` environment variables over file values.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but does not parse.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(root) = std::env::var("VINTNER_WORKSPACE_ROOT") {
            self.paths.workspace_root = Some(PathBuf::from(root));
        }
        if let Ok(jobs) = std::env::var("VINTNER_JOBS") {
            self.build.jobs = jobs.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "VINTNER_JOBS".to_string(),
                message: format!("expected a number, got {jobs}"),
            })?;
        }
        if let Ok(uri) = std::env::var("VINTNER_MAINLINE_URI") {
            self.repos.mainline_uri = uri;
        }
        if let Ok(uri) = std::env::var("VINTNER_STAGING_URI") {
            self.repos.staging_uri = uri;
        }
        Ok(())
    }

    /// Resolved workspace root (configured value or current directory).
    #[must_use]
    pub fn workspace_root(&self) -> PathBuf {
        self.paths
            .workspace_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.build.jobs, 0);
        assert_eq!(config.build.common_cflags, "-g -O2");
        assert!(!config.build.enable_mscoree_for_releases);
        assert!(config.repos.mainline_uri.contains("winehq.org"));
    }

    #[tokio::test]
    async fn explicit_missing_file_is_an_error() {
        let err = Config::load_or_default(Some(Path::new("/nonexistent/vintner.toml")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn parses_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[build]\njobs = 4\n").unwrap();

        let config = Config::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(config.build.jobs, 4);
        // untouched sections keep defaults
        assert_eq!(config.build.common_cflags, "-g -O2");
        assert!(config.repos.staging_uri.contains("wine-staging"));
    }
}
