//! Domain-grouped event definitions

use serde::Serialize;
use std::path::PathBuf;
use vintner_types::Arch;

/// Top-level event type, grouped by domain.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "domain", content = "event", rename_all = "lowercase")]
pub enum AppEvent {
    General(GeneralEvent),
    Source(SourceEvent),
    Build(BuildEvent),
}

impl From<GeneralEvent> for AppEvent {
    fn from(event: GeneralEvent) -> Self {
        Self::General(event)
    }
}

impl From<SourceEvent> for AppEvent {
    fn from(event: SourceEvent) -> Self {
        Self::Source(event)
    }
}

impl From<BuildEvent> for AppEvent {
    fn from(event: BuildEvent) -> Self {
        Self::Build(event)
    }
}

/// Cross-cutting events without a dedicated domain.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneralEvent {
    Debug { message: String },
    Warning { message: String },
    Error { message: String },
    OperationStarted { operation: String },
    OperationCompleted { operation: String, success: bool },
}

/// Source acquisition and preparation events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceEvent {
    /// Cloning a repository (upstream or a local mirror).
    Cloning { uri: String, dest: PathBuf },
    /// Hard reset of a working tree to a ref.
    Reset { path: PathBuf, reference: String },
    /// A build fixup commit was cherry-picked into the tree.
    FixupApplied { commit: String },
    /// Staging patch set resolved for a release.
    PatchSetResolved { version: String, patches: usize },
}

/// Build planning and execution events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildEvent {
    /// A plan was computed; `steps` is its total length.
    PlanComputed { steps: usize },
    /// Build/install directories were wiped before replanning.
    Cleaned { paths: Vec<PathBuf> },
    StepStarted {
        index: usize,
        total: usize,
        step: String,
        arch: Option<Arch>,
        command: String,
    },
    StepCompleted {
        index: usize,
        step: String,
        arch: Option<Arch>,
    },
    StepFailed {
        index: usize,
        step: String,
        arch: Option<Arch>,
        exit_code: Option<i32>,
    },
    /// Whole invocation succeeded; install paths per architecture.
    Completed { install_paths: Vec<(Arch, PathBuf)> },
}
