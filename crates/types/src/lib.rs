#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Shared types for the vintner build orchestrator
//!
//! The build matrix is described by a [`BuildRequest`]: which Wine
//! variant, which release (or HEAD), which target architectures, and
//! which toolchain modifiers. Everything downstream (layout, source
//! selection, plan building) is a deterministic function of this type.

pub mod arch;
pub mod version;

pub use arch::Arch;
pub use version::WineVersion;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source/patch strategy for a build.
///
/// The three variants are a closed set; every resolution rule downstream
/// dispatches exhaustively on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Upstream Wine, unpatched.
    Mainline,
    /// Tagged mainline with the matching wine-staging patch set applied.
    Staging,
    /// A single unversioned working tree, mutated externally (bisects).
    Custom,
}

impl Variant {
    /// Directory-name component for this variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainline => "mainline",
            Self::Staging => "staging",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainline" => Ok(Self::Mainline),
            "staging" => Ok(Self::Staging),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

/// Parallelism passed through to the underlying `make` invocation.
///
/// The orchestrator never schedules compilation units itself; this is an
/// opaque concurrency hint for the external build tool. `Serial` (one
/// job) gives deterministic failure points during bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Jobs {
    /// Use all available processing units.
    Auto,
    /// Fixed job count; `Count(1)` serializes the build.
    Count(usize),
}

impl Jobs {
    /// Resolve to a concrete job count.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Auto => num_cpus::get(),
            Self::Count(n) => (*n).max(1),
        }
    }
}

impl Default for Jobs {
    fn default() -> Self {
        Self::Auto
    }
}

/// A fully specified build-matrix request.
///
/// Caller-owned and immutable once constructed; one invocation of the
/// pipeline consumes exactly one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub variant: Variant,
    /// Release tag to build; `None` means git HEAD.
    pub version: Option<WineVersion>,
    /// Target architectures in build order. Exactly one element whenever
    /// `cross_compile_prefix` is set.
    pub architectures: Vec<Arch>,
    /// Cross-toolchain binary prefix, e.g. `aarch64-poky-linux-`.
    pub cross_compile_prefix: Option<String>,
    /// With a cross prefix: skip MinGW probing and assume an SDK
    /// toolchain that needs a native host-tools build first.
    pub disable_mingw: bool,
    pub enable_tests: bool,
    pub enable_mscoree: bool,
    /// Build Intel targets without position-independent code.
    pub enable_nopic: bool,
    pub force_autoconf: bool,
    pub clean: bool,
    pub jobs: Jobs,
}

impl BuildRequest {
    /// Create a request with default policy: tests off, runtime
    /// integration off, native WoW64 dual-arch targets.
    #[must_use]
    pub fn new(variant: Variant, version: Option<WineVersion>) -> Self {
        Self {
            variant,
            version,
            architectures: vec![Arch::X86, Arch::X86_64],
            cross_compile_prefix: None,
            disable_mingw: false,
            enable_tests: false,
            enable_mscoree: false,
            enable_nopic: false,
            force_autoconf: false,
            clean: false,
            jobs: Jobs::Auto,
        }
    }

    /// Whether this is an untagged (HEAD) build.
    #[must_use]
    pub fn is_head(&self) -> bool {
        self.version.is_none()
    }

    /// Apply the default-policy rule for the runtime-integration
    /// component: a configured default may enable it for tagged
    /// releases, but untagged builds keep it off unless the flag was
    /// given explicitly.
    pub fn apply_mscoree_default(&mut self, release_default: bool) {
        if !self.enable_mscoree && !self.is_head() {
            self.enable_mscoree = release_default;
        }
    }
}
