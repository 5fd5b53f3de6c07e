//! vintner - Wine build matrix orchestrator
//!
//! The binary wires the pipeline together: load configuration, detect
//! the toolchain, resolve the artifact layout, select and prepare the
//! source tree, compute the build plan, and drive it to completion.
//! All progress flows through the event channel; the library crates
//! never print.

mod cli;
mod events;

use crate::cli::Cli;
use crate::events::EventHandler;
use clap::Parser;
use std::path::Path;
use std::process;
use tracing::{debug, error};
use vintner_builder::{build_plan, ExecutionDriver};
use vintner_config::Config;
use vintner_errors::{BuildError, Error, UserFacingError};
use vintner_events::{BuildEvent, EventEmitter, EventSender};
use vintner_source::SourceSelector;
use vintner_toolchain::SystemProbe;
use vintner_types::BuildRequest;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        error!("{e}");
        eprintln!("error: {}", e.user_message());
        if let Some(hint) = e.user_hint() {
            eprintln!("hint: {hint}");
        }
        process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    // Precedence: defaults < config file < environment < CLI flags
    let mut config = Config::load_or_default(cli.config.as_deref()).await?;
    config.merge_env()?;
    if let Some(root) = &cli.workspace_root {
        config.paths.workspace_root = Some(root.clone());
    }

    let request = cli.to_request(config.build.jobs)?;
    let root = config.workspace_root();
    debug!("workspace root: {}", root.display());

    let (tx, mut rx) = vintner_events::channel();
    let handler = EventHandler::new(cli.json, cli.debug);
    let renderer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            handler.handle(&event);
        }
    });

    let result = run_pipeline(&root, &config, request, cli.fetch, tx).await;

    // tx dropped inside the pipeline; drain the channel before reporting
    let _ = renderer.await;
    result
}

async fn run_pipeline(
    root: &Path,
    config: &Config,
    mut request: BuildRequest,
    fetch: bool,
    tx: EventSender,
) -> Result<(), Error> {
    let decision = vintner_toolchain::detect(
        request.cross_compile_prefix.as_deref(),
        request.disable_mingw,
        &SystemProbe,
    )
    .await?;
    if let Some(target) = decision.target_arch {
        request.architectures = vec![target];
    }
    request.apply_mscoree_default(config.build.enable_mscoree_for_releases);

    let layout = vintner_layout::resolve(
        root,
        request.variant,
        request.version,
        &request.architectures,
        decision.is_cross(),
    )?;

    let selector = SourceSelector::new(root, config.repos.clone()).with_events(tx.clone());
    if fetch {
        selector.materialize(request.variant, request.version).await?;
    }
    let selected = selector
        .select(&layout, request.variant, request.version)
        .await?;
    selector
        .prepare(&selected, request.variant, request.version)
        .await?;

    let plan = build_plan(
        root,
        &request,
        &layout,
        &selected,
        &decision,
        &config.build.common_cflags,
    )?;
    tx.emit(
        BuildEvent::PlanComputed {
            steps: plan.steps.len(),
        }
        .into(),
    );

    let driver = ExecutionDriver::new().with_events(tx);
    let outcome = driver.execute(&plan, request.clean).await?;

    match outcome.failed_step {
        None => Ok(()),
        Some(failed) => Err(BuildError::StepFailed {
            step: failed.step,
            arch: failed
                .arch
                .map_or_else(|| "all".to_string(), |a| a.to_string()),
            code: failed.exit_code,
        }
        .into()),
    }
}
