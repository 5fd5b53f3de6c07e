//! Build plan construction
//!
//! A [`BuildPlan`] is built once per invocation and consumed exactly
//! once; steps are never reordered or retried. Ranged builds recompute
//! the plan per version - a plan never outlives its request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vintner_errors::{BuildError, Error};
use vintner_layout::ArtifactLayout;
use vintner_source::SelectedSource;
use vintner_toolchain::ToolchainDecision;
use vintner_types::{Arch, BuildRequest};

/// Kind of an external-process step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    ApplyPatches,
    Autoreconf,
    /// Regenerate the wineserver protocol files (`tools/make_requests`).
    MakeRequests,
    Configure,
    Make,
    MakeInstall,
    /// Create the `lib32 -> lib` symlink `winegcc -m32` expects.
    LinkLib32,
}

impl StepKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplyPatches => "apply-patches",
            Self::Autoreconf => "autoreconf",
            Self::MakeRequests => "make-requests",
            Self::Configure => "configure",
            Self::Make => "make",
            Self::MakeInstall => "make-install",
            Self::LinkLib32 => "link-lib32",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external-process step of a build plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    /// Target architecture; `None` for architecture-independent steps
    /// (patch application, autoreconf).
    pub arch: Option<Arch>,
    pub working_dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for this step only (`CFLAGS`, `MAKEFLAGS`).
    pub env: Vec<(String, String)>,
}

impl Step {
    /// Rendered command line for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Ordered step list plus the directories the steps populate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub steps: Vec<Step>,
    pub build_dirs: BTreeMap<Arch, PathBuf>,
    pub install_dirs: BTreeMap<Arch, PathBuf>,
}

/// Compose the ordered build plan for one invocation.
///
/// Step order: apply-patches, a single autoreconf plus make_requests
/// pair (if any trigger fires), the native host-tools sub-build (SDK
/// cross only), then per architecture configure, make, make-install -
/// 32-bit strictly before 64-bit so the 64-bit configure can reference
/// the finished 32-bit tree for the combined WoW64 layout. A 32-bit
/// install is followed by the `lib32 -> lib` symlink step.
///
/// # Errors
///
/// Returns an error when the request carries no architectures.
pub fn build_plan(
    root: &Path,
    request: &BuildRequest,
    layout: &ArtifactLayout,
    selected: &SelectedSource,
    decision: &ToolchainDecision,
    common_cflags: &str,
) -> Result<BuildPlan, Error> {
    if request.architectures.is_empty() {
        return Err(BuildError::EmptyPlan.into());
    }

    let mut steps = Vec::new();
    let jobs = request.jobs.count();
    let makeflags = format!("-j{jobs} -l{jobs}");

    if let Some(patch_set) = &selected.patch_set {
        let mut args = vec!["apply".to_string(), "--whitespace=nowarn".to_string()];
        args.extend(patch_set.files.iter().map(|f| f.display().to_string()));
        steps.push(Step {
            kind: StepKind::ApplyPatches,
            arch: None,
            working_dir: selected.source_dir.clone(),
            program: "git".to_string(),
            args,
            env: Vec::new(),
        });
    }

    // regeneration is idempotent; two triggers still mean one step
    if request.force_autoconf || decision.regen_configure {
        steps.push(Step {
            kind: StepKind::Autoreconf,
            arch: None,
            working_dir: selected.source_dir.clone(),
            program: "autoreconf".to_string(),
            args: vec!["-f".to_string()],
            env: Vec::new(),
        });
        // the wineserver protocol files are generated too and go stale
        // together with configure
        steps.push(Step {
            kind: StepKind::MakeRequests,
            arch: None,
            working_dir: selected.source_dir.clone(),
            program: "./tools/make_requests".to_string(),
            args: Vec::new(),
            env: Vec::new(),
        });
    }

    // SDK cross toolchains cannot run cross-built tools on the build
    // machine, so build native host tools first
    let host_tools_dir = decision.host_build_required.then(|| {
        root.join(vintner_layout::build_dir_name(
            request.variant,
            request.version,
            Arch::X86_64,
        ))
    });
    if let Some(host_dir) = &host_tools_dir {
        let configure = layout.source_dir.join("configure").display().to_string();
        let mut env = vec![("CFLAGS".to_string(), common_cflags.to_string())];
        env.extend(decision.extra_env.iter().cloned());
        steps.push(Step {
            kind: StepKind::Configure,
            arch: Some(Arch::X86_64),
            working_dir: host_dir.clone(),
            program: configure,
            args: vec![
                "--enable-win64".to_string(),
                "--disable-tests".to_string(),
                "--disable-mscoree".to_string(),
            ],
            env,
        });
        let mut env = vec![("MAKEFLAGS".to_string(), makeflags.clone())];
        env.extend(decision.extra_env.iter().cloned());
        steps.push(Step {
            kind: StepKind::Make,
            arch: Some(Arch::X86_64),
            working_dir: host_dir.clone(),
            program: "make".to_string(),
            args: Vec::new(),
            env,
        });
    }

    // fixed fan-out order: 32-bit before 64-bit
    let mut arches = request.architectures.clone();
    arches.sort_by_key(Arch::is_64bit);

    for &arch in &arches {
        let build_dir = layout
            .build_dirs
            .get(&arch)
            .ok_or_else(|| Error::internal(format!("layout missing build dir for {arch}")))?
            .clone();
        let install_dir = layout
            .install_dirs
            .get(&arch)
            .ok_or_else(|| Error::internal(format!("layout missing install dir for {arch}")))?;
        let configure = layout.source_dir.join("configure").display().to_string();

        let mut args = vec![format!("--prefix={}", install_dir.display())];
        if request.enable_tests {
            args.push("--enable-tests".to_string());
        } else {
            args.push("--disable-tests".to_string());
        }
        if request.enable_mscoree {
            args.push("--enable-mscoree".to_string());
        } else {
            args.push("--disable-mscoree".to_string());
        }
        if arch.is_64bit() {
            args.push("--enable-win64".to_string());
            // the 64-bit configure links against the finished 32-bit
            // tree to form the shared WoW64 install
            if let Some(dir32) = layout.build_dirs.get(&Arch::X86) {
                args.push(format!("--with-wine32={}", dir32.display()));
            }
        }
        if let Some(host_dir) = &host_tools_dir {
            args.push(format!("--with-wine-tools={}", host_dir.display()));
        }
        args.extend(decision.extra_configure_args.iter().cloned());
        args.extend(selected.extra_configure_args.iter().cloned());

        let mut configure_env = vec![(
            "CFLAGS".to_string(),
            cflags_for(arch, common_cflags, request.enable_nopic),
        )];
        configure_env.extend(decision.extra_env.iter().cloned());
        let mut make_env = vec![("MAKEFLAGS".to_string(), makeflags.clone())];
        make_env.extend(decision.extra_env.iter().cloned());

        steps.push(Step {
            kind: StepKind::Configure,
            arch: Some(arch),
            working_dir: build_dir.clone(),
            program: configure,
            args,
            env: configure_env,
        });
        steps.push(Step {
            kind: StepKind::Make,
            arch: Some(arch),
            working_dir: build_dir.clone(),
            program: "make".to_string(),
            args: Vec::new(),
            env: make_env,
        });
        steps.push(Step {
            kind: StepKind::MakeInstall,
            arch: Some(arch),
            working_dir: build_dir,
            program: "make".to_string(),
            args: vec!["install".to_string()],
            env: decision.extra_env.clone(),
        });
        if !arch.is_64bit() {
            // winegcc -m32 looks for lib32 in the prefix; relative so
            // the prefix can be moved around
            steps.push(Step {
                kind: StepKind::LinkLib32,
                arch: Some(arch),
                working_dir: install_dir.clone(),
                program: "ln".to_string(),
                args: vec!["-snf".to_string(), "lib".to_string(), "lib32".to_string()],
                env: Vec::new(),
            });
        }
    }

    Ok(BuildPlan {
        steps,
        build_dirs: layout.build_dirs.clone(),
        install_dirs: layout.install_dirs.clone(),
    })
}

fn cflags_for(arch: Arch, common: &str, nopic: bool) -> String {
    match arch {
        // X18 is the TEB register on 64-bit ARM Windows and must stay
        // reserved (Wine bug #38719)
        Arch::Aarch64 => format!("{common} -ffixed-x18"),
        Arch::X86_64 if nopic => format!("{common} -fno-PIC -mcmodel=large"),
        Arch::X86 if nopic => format!("{common} -fno-PIC"),
        _ => common.to_string(),
    }
}
