#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Toolchain detection for vintner
//!
//! Decides which compiler toolchain a build uses: the native host
//! toolchain (WoW64 dual-arch), an LLVM-MinGW cross toolchain, or a
//! Poky/Yocto SDK cross toolchain. The environment is an injectable
//! [`ToolchainProbe`] so tests never touch a real `PATH`. Detection
//! failure with a cross prefix set is a hard error - there is no silent
//! fallback to native.

pub mod probe;

pub use probe::{SystemProbe, ToolchainProbe};

use vintner_errors::{Error, ToolchainError};
use vintner_types::Arch;

/// Which compiler suite drives the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainKind {
    /// Native host toolchain; WoW64 dual-architecture plan.
    Native,
    /// LLVM-MinGW cross toolchain; PE-native output.
    LlvmMingw,
    /// Poky/Yocto SDK cross toolchain; cross-built tool binaries cannot
    /// run on the build machine, so native host tools are built first.
    PokySdk,
}

/// The resolved toolchain decision for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainDecision {
    pub kind: ToolchainKind,
    /// Whether a native host-tools sub-build must precede the cross
    /// configure/make sequence.
    pub host_build_required: bool,
    /// Cross target architecture; `None` for native builds.
    pub target_arch: Option<Arch>,
    /// Cross builds regenerate `configure` - the checked-in script has
    /// historically been out of sync for cross targets.
    pub regen_configure: bool,
    /// Extra configure arguments (host triple, ARM float ABI).
    pub extra_configure_args: Vec<String>,
    /// Extra environment for every build step (pinned `PKG_CONFIG`).
    pub extra_env: Vec<(String, String)>,
}

impl ToolchainDecision {
    /// Native decision: nothing extra to do.
    #[must_use]
    pub fn native() -> Self {
        Self {
            kind: ToolchainKind::Native,
            host_build_required: false,
            target_arch: None,
            regen_configure: false,
            extra_configure_args: Vec::new(),
            extra_env: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_cross(&self) -> bool {
        self.target_arch.is_some()
    }
}

/// Detect the active toolchain from the cross prefix and flags.
///
/// # Errors
///
/// Returns a hard error when a prefix is set but no usable compiler is
/// discoverable, or when the compiler targets an unsupported machine.
pub async fn detect(
    cross_prefix: Option<&str>,
    disable_mingw: bool,
    probe: &dyn ToolchainProbe,
) -> Result<ToolchainDecision, Error> {
    let Some(prefix) = cross_prefix else {
        return Ok(ToolchainDecision::native());
    };

    let (kind, compiler) = if disable_mingw {
        // SDK toolchains ship a prefixed gcc
        let gcc = format!("{prefix}gcc");
        if probe.find_program(&gcc).is_none() {
            return Err(compiler_not_found(prefix));
        }
        (ToolchainKind::PokySdk, gcc)
    } else {
        let candidates = [format!("{prefix}clang"), format!("{prefix}gcc")];
        let compiler = candidates
            .into_iter()
            .find(|c| probe.find_program(c).is_some())
            .ok_or_else(|| compiler_not_found(prefix))?;
        (ToolchainKind::LlvmMingw, compiler)
    };

    let machine = probe.compiler_machine(&compiler).await?;
    let target_arch = match Arch::from_machine(&machine) {
        Some(arch @ (Arch::Arm | Arch::Aarch64)) => arch,
        _ => {
            return Err(ToolchainError::UnsupportedTarget { machine }.into());
        }
    };

    let triple = prefix.trim_end_matches('-');
    let mut extra_configure_args = vec![format!("--host={triple}"), format!("host_alias={triple}")];

    if target_arch == Arch::Arm {
        // 32-bit ARM defaults to softfp for Windows binary compatibility,
        // which breaks hardfp toolchains; forward the compiler defaults
        if let Some(abi) = probe.compiler_target_default(&compiler, "mfloat-abi").await {
            extra_configure_args.push(format!("--with-float-abi={abi}"));
        }
        if let Some(fpu) = probe.compiler_target_default(&compiler, "mfpu").await {
            extra_configure_args.push(format!("--with-fpu={fpu}"));
        }
    }

    // SDK environment scripts inject a cross pkg-config ahead of the
    // host one on PATH; pin the full path so configure keeps using it
    let mut extra_env = Vec::new();
    if let Some(pkg_config) = probe.find_program("pkg-config") {
        extra_env.push(("PKG_CONFIG".to_string(), pkg_config.display().to_string()));
    }

    Ok(ToolchainDecision {
        kind,
        host_build_required: kind == ToolchainKind::PokySdk,
        target_arch: Some(target_arch),
        regen_configure: true,
        extra_configure_args,
        extra_env,
    })
}

fn compiler_not_found(prefix: &str) -> Error {
    ToolchainError::CompilerNotFound {
        prefix: prefix.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct FakeProbe {
        programs: Vec<String>,
        machine: String,
        target_defaults: HashMap<String, String>,
    }

    impl FakeProbe {
        fn new(programs: &[&str], machine: &str) -> Self {
            Self {
                programs: programs.iter().map(ToString::to_string).collect(),
                machine: machine.to_string(),
                target_defaults: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl ToolchainProbe for FakeProbe {
        fn find_program(&self, name: &str) -> Option<PathBuf> {
            self.programs
                .iter()
                .any(|p| p == name)
                .then(|| PathBuf::from("/usr/bin").join(name))
        }

        async fn compiler_machine(&self, _compiler: &str) -> Result<String, Error> {
            Ok(self.machine.clone())
        }

        async fn compiler_target_default(&self, _compiler: &str, flag: &str) -> Option<String> {
            self.target_defaults.get(flag).cloned()
        }
    }

    #[tokio::test]
    async fn no_prefix_means_native() {
        let probe = FakeProbe::new(&[], "");
        let decision = detect(None, false, &probe).await.unwrap();
        assert_eq!(decision, ToolchainDecision::native());
        assert!(!decision.is_cross());
    }

    #[tokio::test]
    async fn mingw_compiler_on_path_selects_cross() {
        let probe = FakeProbe::new(&["aarch64-w64-mingw32-clang"], "aarch64-w64-mingw32");
        let decision = detect(Some("aarch64-w64-mingw32-"), false, &probe)
            .await
            .unwrap();
        assert_eq!(decision.kind, ToolchainKind::LlvmMingw);
        assert!(!decision.host_build_required);
        assert_eq!(decision.target_arch, Some(Arch::Aarch64));
        assert!(decision.regen_configure);
        assert!(decision
            .extra_configure_args
            .contains(&"--host=aarch64-w64-mingw32".to_string()));
    }

    #[tokio::test]
    async fn disable_mingw_selects_sdk_with_host_build() {
        let probe = FakeProbe::new(&["aarch64-poky-linux-gcc"], "aarch64-poky-linux");
        let decision = detect(Some("aarch64-poky-linux-"), true, &probe)
            .await
            .unwrap();
        assert_eq!(decision.kind, ToolchainKind::PokySdk);
        assert!(decision.host_build_required);
        assert_eq!(decision.target_arch, Some(Arch::Aarch64));
    }

    #[tokio::test]
    async fn missing_compiler_is_a_hard_error() {
        let probe = FakeProbe::new(&[], "");
        let err = detect(Some("aarch64-poky-linux-"), false, &probe)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Toolchain(ToolchainError::CompilerNotFound { .. })
        ));
        // same for the SDK path
        let err = detect(Some("aarch64-poky-linux-"), true, &probe)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Toolchain(ToolchainError::CompilerNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn intel_cross_target_is_rejected() {
        let probe = FakeProbe::new(&["x86_64-w64-mingw32-clang"], "x86_64-w64-mingw32");
        let err = detect(Some("x86_64-w64-mingw32-"), false, &probe)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Toolchain(ToolchainError::UnsupportedTarget { .. })
        ));
    }

    #[tokio::test]
    async fn arm_forwards_float_abi_defaults() {
        let mut probe = FakeProbe::new(&["armv7l-poky-linux-gcc"], "armv7l-poky-linux-gnueabihf");
        probe
            .target_defaults
            .insert("mfloat-abi".to_string(), "hard".to_string());
        probe
            .target_defaults
            .insert("mfpu".to_string(), "neon".to_string());

        let decision = detect(Some("armv7l-poky-linux-"), true, &probe).await.unwrap();
        assert_eq!(decision.target_arch, Some(Arch::Arm));
        assert!(decision
            .extra_configure_args
            .contains(&"--with-float-abi=hard".to_string()));
        assert!(decision
            .extra_configure_args
            .contains(&"--with-fpu=neon".to_string()));
    }

    #[tokio::test]
    async fn cross_pins_pkg_config_to_full_path() {
        let probe = FakeProbe::new(
            &["aarch64-w64-mingw32-clang", "pkg-config"],
            "aarch64-w64-mingw32",
        );
        let decision = detect(Some("aarch64-w64-mingw32-"), false, &probe)
            .await
            .unwrap();
        assert!(decision
            .extra_env
            .contains(&("PKG_CONFIG".to_string(), "/usr/bin/pkg-config".to_string())));

        // no pkg-config found leaves the environment untouched
        let probe = FakeProbe::new(&["aarch64-w64-mingw32-clang"], "aarch64-w64-mingw32");
        let decision = detect(Some("aarch64-w64-mingw32-"), false, &probe)
            .await
            .unwrap();
        assert!(decision.extra_env.is_empty());
    }
}
