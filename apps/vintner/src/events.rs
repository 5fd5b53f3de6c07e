//! Event rendering for the terminal and for JSON consumers

use std::path::PathBuf;
use vintner_events::{AppEvent, BuildEvent, GeneralEvent, SourceEvent};
use vintner_types::Arch;

/// Renders pipeline events as human-readable lines or JSON lines.
pub struct EventHandler {
    json: bool,
    debug: bool,
}

impl EventHandler {
    pub fn new(json: bool, debug: bool) -> Self {
        Self { json, debug }
    }

    /// Render one event.
    pub fn handle(&self, event: &AppEvent) {
        if self.json {
            // Serialization of these event types cannot fail; fall back
            // to the debug representation if it somehow does.
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(_) => println!("{event:?}"),
            }
            return;
        }

        match event {
            AppEvent::General(event) => self.handle_general(event),
            AppEvent::Source(event) => Self::handle_source(event),
            AppEvent::Build(event) => Self::handle_build(event),
        }
    }

    fn handle_general(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Debug { message } => {
                if self.debug {
                    eprintln!("debug: {message}");
                }
            }
            GeneralEvent::Warning { message } => eprintln!("warning: {message}"),
            GeneralEvent::Error { message } => eprintln!("error: {message}"),
            GeneralEvent::OperationStarted { operation } => println!("{operation}..."),
            GeneralEvent::OperationCompleted { operation, success } => {
                if *success {
                    println!("{operation} done");
                } else {
                    eprintln!("{operation} failed");
                }
            }
        }
    }

    fn handle_source(event: &SourceEvent) {
        match event {
            SourceEvent::Cloning { uri, dest } => {
                println!("Cloning {uri} into {}", dest.display());
            }
            SourceEvent::Reset { path, reference } => {
                println!("Resetting {} to {reference}", path.display());
            }
            SourceEvent::FixupApplied { commit } => {
                println!("Applied build fixup {commit}");
            }
            SourceEvent::PatchSetResolved { version, patches } => {
                println!("Staging {version}: {patches} patches");
            }
        }
    }

    fn handle_build(event: &BuildEvent) {
        match event {
            BuildEvent::PlanComputed { steps } => println!("Planned {steps} steps"),
            BuildEvent::Cleaned { paths } => {
                for path in paths {
                    println!("Removed {}", path.display());
                }
            }
            BuildEvent::StepStarted {
                index,
                total,
                step,
                arch,
                command,
            } => {
                let target = arch.map_or_else(String::new, |a| format!(" [{a}]"));
                println!("[{}/{total}] {step}{target}: {command}", index + 1);
            }
            BuildEvent::StepCompleted { .. } => {}
            BuildEvent::StepFailed {
                index,
                step,
                arch,
                exit_code,
            } => {
                let target = arch.map_or_else(String::new, |a| format!(" [{a}]"));
                let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                eprintln!("step {} ({step}{target}) failed with exit code {code}", index + 1);
            }
            BuildEvent::Completed { install_paths } => {
                println!("Build complete");
                for (arch, path) in install_paths {
                    println!("  {arch}: {}", path.display());
                }
                if let Some(hint) = path_export_hint(install_paths) {
                    println!("{hint}");
                }
            }
        }
    }
}

/// Shell line that puts the built Wine on PATH, using the last (64-bit
/// for a WoW64 pair) install prefix.
fn path_export_hint(install_paths: &[(Arch, PathBuf)]) -> Option<String> {
    let (_, prefix) = install_paths.last()?;
    Some(format!(
        "Run the following to use this Wine variant:\n  export PATH={}/bin:$PATH",
        prefix.display()
    ))
}
