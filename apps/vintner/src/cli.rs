//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;
use vintner_errors::{ConfigError, Error};
use vintner_types::{BuildRequest, Jobs, Variant, WineVersion};

/// vintner - Wine build matrix orchestrator
#[derive(Parser)]
#[command(name = "vintner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build Wine variants across releases, architectures, and toolchains")]
#[command(long_about = None)]
pub struct Cli {
    /// Source/patch strategy to build
    #[arg(long, value_enum, default_value_t = Variant::Mainline)]
    pub variant: Variant,

    /// Release to build, e.g. 4.0 or 1.7.20 (omit for git HEAD)
    #[arg(long, value_name = "X.Y[.Z]")]
    pub version_tag: Option<WineVersion>,

    /// Build the test suites instead of skipping them
    #[arg(long)]
    pub enable_tests: bool,

    /// Build the mscoree runtime-integration component
    #[arg(long)]
    pub enable_mscoree: bool,

    /// Build Intel targets without position-independent code
    #[arg(long)]
    pub enable_nopic: bool,

    /// Cross-toolchain binary prefix, e.g. aarch64-w64-mingw32-
    #[arg(long, value_name = "PREFIX")]
    pub cross_compile_prefix: Option<String>,

    /// Skip MinGW probing; assume an SDK cross toolchain
    #[arg(long, requires = "cross_compile_prefix")]
    pub disable_mingw: bool,

    /// Regenerate the configure script even when nothing requires it
    #[arg(long)]
    pub force_autoconf: bool,

    /// Wipe build and install directories before building
    #[arg(long)]
    pub clean: bool,

    /// Clone missing source checkouts before selection
    #[arg(long)]
    pub fetch: bool,

    /// Number of parallel make jobs (default: all processing units)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Directory holding all source/build/install trees
    #[arg(long, value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Output events as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Convert the parsed flags into a build request.
    ///
    /// `config_jobs` is the configured default job count (0 = auto); an
    /// explicit `--jobs` wins over it.
    ///
    /// # Errors
    ///
    /// Returns an error for flag combinations clap cannot express, such
    /// as a version tag on the custom variant.
    pub fn to_request(&self, config_jobs: usize) -> Result<BuildRequest, Error> {
        if self.variant == Variant::Custom && self.version_tag.is_some() {
            return Err(ConfigError::InvalidFlags {
                message: "--version-tag does not apply to the custom variant".to_string(),
            }
            .into());
        }

        let mut request = BuildRequest::new(self.variant, self.version_tag);
        request.cross_compile_prefix = self.cross_compile_prefix.clone();
        request.disable_mingw = self.disable_mingw;
        request.enable_tests = self.enable_tests;
        request.enable_mscoree = self.enable_mscoree;
        request.enable_nopic = self.enable_nopic;
        request.force_autoconf = self.force_autoconf;
        request.clean = self.clean;
        request.jobs = match (self.jobs, config_jobs) {
            (Some(n), _) => Jobs::Count(n),
            (None, 0) => Jobs::Auto,
            (None, n) => Jobs::Count(n),
        };
        Ok(request)
    }
}
