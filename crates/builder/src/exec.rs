//! Build plan execution
//!
//! Runs a [`BuildPlan`] strictly in order with fail-fast semantics: the
//! first non-zero exit stops the run and no later step is attempted.
//! Step stdout/stderr is inherited so compiler output streams straight
//! to the terminal; progress events carry the structure.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use tokio::process::Command;
use vintner_errors::{BuildError, Error};
use vintner_events::{BuildEvent, EventEmitter, EventSender};
use vintner_types::Arch;

use crate::plan::{BuildPlan, Step};

/// Identity of the step that stopped a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedStep {
    /// Zero-based position in the plan.
    pub index: usize,
    pub step: String,
    pub arch: Option<Arch>,
    pub exit_code: Option<i32>,
}

/// Result of driving a plan to completion or first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub succeeded: bool,
    pub failed_step: Option<FailedStep>,
    /// Install prefixes per architecture; empty unless the whole plan
    /// succeeded.
    pub install_paths: BTreeMap<Arch, PathBuf>,
}

/// Drives plan steps as external processes, one at a time.
pub struct ExecutionDriver {
    events: Option<EventSender>,
}

impl EventEmitter for ExecutionDriver {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl Default for ExecutionDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionDriver {
    #[must_use]
    pub fn new() -> Self {
        Self { events: None }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Execute every step of the plan in order.
    ///
    /// With `clean_first`, the plan's build and install directories are
    /// removed before the first step; source checkouts are never
    /// touched. A step's non-zero exit is reported in the returned
    /// [`BuildOutcome`], not as an `Err` - only environmental failures
    /// (spawn, clean) error out.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty plan, a failed directory wipe, or
    /// a step program that could not be spawned.
    pub async fn execute(&self, plan: &BuildPlan, clean_first: bool) -> Result<BuildOutcome, Error> {
        if plan.steps.is_empty() {
            return Err(BuildError::EmptyPlan.into());
        }

        if clean_first {
            self.clean(plan).await?;
        }

        let total = plan.steps.len();
        for (index, step) in plan.steps.iter().enumerate() {
            // build dirs exist only once their configure step runs
            tokio::fs::create_dir_all(&step.working_dir)
                .await
                .map_err(|e| Error::io_with_path(&e, &step.working_dir))?;

            self.emit(
                BuildEvent::StepStarted {
                    index,
                    total,
                    step: step.kind.to_string(),
                    arch: step.arch,
                    command: step.command_line(),
                }
                .into(),
            );

            let status = run_step(step).await?;
            if !status.success() {
                let failed = FailedStep {
                    index,
                    step: step.kind.to_string(),
                    arch: step.arch,
                    exit_code: status.code(),
                };
                self.emit(
                    BuildEvent::StepFailed {
                        index,
                        step: failed.step.clone(),
                        arch: failed.arch,
                        exit_code: failed.exit_code,
                    }
                    .into(),
                );
                return Ok(BuildOutcome {
                    succeeded: false,
                    failed_step: Some(failed),
                    install_paths: BTreeMap::new(),
                });
            }

            self.emit(
                BuildEvent::StepCompleted {
                    index,
                    step: step.kind.to_string(),
                    arch: step.arch,
                }
                .into(),
            );
        }

        self.emit(
            BuildEvent::Completed {
                install_paths: plan
                    .install_dirs
                    .iter()
                    .map(|(arch, path)| (*arch, path.clone()))
                    .collect(),
            }
            .into(),
        );

        Ok(BuildOutcome {
            succeeded: true,
            failed_step: None,
            install_paths: plan.install_dirs.clone(),
        })
    }

    /// Remove the plan's build and install directories. Missing
    /// directories are fine; the wipe is idempotent.
    async fn clean(&self, plan: &BuildPlan) -> Result<(), Error> {
        let mut cleaned = Vec::new();
        for dir in plan.build_dirs.values().chain(plan.install_dirs.values()) {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => cleaned.push(dir.clone()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(BuildError::CleanFailed {
                        path: dir.display().to_string(),
                        message: e.to_string(),
                    }
                    .into());
                }
            }
        }
        if !cleaned.is_empty() {
            self.emit(BuildEvent::Cleaned { paths: cleaned }.into());
        }
        Ok(())
    }
}

async fn run_step(step: &Step) -> Result<std::process::ExitStatus, Error> {
    Command::new(&step.program)
        .args(&step.args)
        .envs(step.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&step.working_dir)
        .status()
        .await
        .map_err(|e| {
            BuildError::SpawnFailed {
                program: step.program.clone(),
                message: e.to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::StepKind;
    use std::path::Path;

    fn shell_step(dir: &Path, script: &str) -> Step {
        Step {
            kind: StepKind::Make,
            arch: Some(Arch::X86_64),
            working_dir: dir.to_path_buf(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: Vec::new(),
        }
    }

    fn plan_of(steps: Vec<Step>) -> BuildPlan {
        BuildPlan {
            steps,
            build_dirs: BTreeMap::new(),
            install_dirs: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn empty_plan_is_an_error() {
        let driver = ExecutionDriver::new();
        let err = driver.execute(&plan_of(Vec::new()), false).await.unwrap_err();
        assert!(matches!(err, Error::Build(BuildError::EmptyPlan)));
    }

    #[tokio::test]
    async fn stops_at_first_failing_step() {
        let dir = tempfile::tempdir().unwrap();
        let steps = vec![
            shell_step(dir.path(), "touch ran-1"),
            shell_step(dir.path(), "touch ran-2"),
            shell_step(dir.path(), "exit 7"),
            shell_step(dir.path(), "touch ran-4"),
            shell_step(dir.path(), "touch ran-5"),
        ];
        let driver = ExecutionDriver::new();
        let outcome = driver.execute(&plan_of(steps), false).await.unwrap();

        assert!(!outcome.succeeded);
        let failed = outcome.failed_step.unwrap();
        assert_eq!(failed.index, 2);
        assert_eq!(failed.exit_code, Some(7));
        assert!(outcome.install_paths.is_empty());

        assert!(dir.path().join("ran-1").exists());
        assert!(dir.path().join("ran-2").exists());
        assert!(!dir.path().join("ran-4").exists());
        assert!(!dir.path().join("ran-5").exists());
    }

    #[tokio::test]
    async fn failing_patch_step_is_identified() {
        let dir = tempfile::tempdir().unwrap();
        let steps = vec![
            Step {
                kind: StepKind::ApplyPatches,
                arch: None,
                working_dir: dir.path().to_path_buf(),
                program: "git".to_string(),
                args: vec!["apply".to_string(), "no-such.patch".to_string()],
                env: Vec::new(),
            },
            shell_step(dir.path(), "touch configured"),
        ];
        let outcome = ExecutionDriver::new()
            .execute(&plan_of(steps), false)
            .await
            .unwrap();

        let failed = outcome.failed_step.unwrap();
        assert_eq!(failed.step, "apply-patches");
        assert_eq!(failed.arch, None);
        // nothing past the patch step ran
        assert!(!dir.path().join("configured").exists());
    }

    #[tokio::test]
    async fn success_reports_install_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = plan_of(vec![shell_step(dir.path(), "true")]);
        plan.install_dirs
            .insert(Arch::X86_64, dir.path().join("install-64"));

        let (tx, mut rx) = vintner_events::channel();
        let driver = ExecutionDriver::new().with_events(tx);
        let outcome = driver.execute(&plan, false).await.unwrap();

        assert!(outcome.succeeded);
        assert_eq!(
            outcome.install_paths.get(&Arch::X86_64),
            Some(&dir.path().join("install-64"))
        );

        let mut saw_completed = false;
        while let Ok(event) = rx.try_recv() {
            if let vintner_events::AppEvent::Build(BuildEvent::Completed { install_paths }) = event
            {
                assert_eq!(install_paths.len(), 1);
                saw_completed = true;
            }
        }
        assert!(saw_completed);
    }

    #[tokio::test]
    async fn clean_wipes_volatile_dirs_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("mainline-build-10.0-x86_64");
        let install = dir.path().join("mainline-install-10.0-x86_64");
        tokio::fs::create_dir_all(build.join("nested")).await.unwrap();
        tokio::fs::create_dir_all(&install).await.unwrap();

        let mut plan = plan_of(vec![shell_step(dir.path(), "true")]);
        plan.build_dirs.insert(Arch::X86_64, build.clone());
        plan.install_dirs.insert(Arch::X86_64, install.clone());

        let driver = ExecutionDriver::new();
        driver.execute(&plan, true).await.unwrap();
        assert!(!build.exists());
        assert!(!install.exists());

        // second wipe finds nothing and still succeeds
        driver.execute(&plan, true).await.unwrap();
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let step = Step {
            kind: StepKind::Configure,
            arch: None,
            working_dir: dir.path().to_path_buf(),
            program: "definitely-not-a-real-program".to_string(),
            args: Vec::new(),
            env: Vec::new(),
        };
        let driver = ExecutionDriver::new();
        let err = driver.execute(&plan_of(vec![step]), false).await.unwrap_err();
        assert!(matches!(err, Error::Build(BuildError::SpawnFailed { .. })));
    }
}
