// src/lib.rs

//! Coordinator for long-running asynchronous commands.
//!
//! An [`AsyncCommand`] gates execution so only one run is in flight, hands
//! the operation a cancellation token, observes the resulting future through
//! a [`TaskObserver`] and publishes every state change through a
//! [`Dispatcher`]. The `cmdgate` binary drives synthetic scenarios through
//! the same machinery.

pub mod cli;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod gate;
pub mod logging;
pub mod notify;
pub mod observer;
pub mod progress;
pub mod scenario;

mod sync;

pub use command::{
    AsyncCommand, CancelCommand, Command, CommandEvent, ProgressiveAsyncCommand, SyncCommand,
};
pub use dispatch::{Dispatcher, DispatchLoop, InlineDispatcher, LoopDispatcher};
pub use errors::OperationError;
pub use gate::CancellationGate;
pub use notify::{Notifier, SubscriptionId};
pub use observer::{TaskFault, TaskObserver, TaskProperty, TaskStatus};
pub use progress::ProgressChannel;
pub use tokio_util::sync::CancellationToken;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile, DispatcherKind, ScenarioConfig};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and scenario selection
/// - the notification dispatcher
/// - one command execution per scenario
/// - Ctrl-C handling (cancels the running scenario and skips the rest)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    let selected = scenario::select(&cfg, args.scenario.as_deref())?;

    if args.dry_run {
        print_dry_run(&cfg, &selected);
        return Ok(());
    }

    let dispatcher: Arc<dyn Dispatcher> = match cfg.config.dispatcher {
        DispatcherKind::Loop => Arc::new(LoopDispatcher::spawn()),
        DispatcherKind::Inline => Arc::new(InlineDispatcher),
    };
    info!(dispatcher = %cfg.config.dispatcher, scenarios = selected.len(), "starting");

    // Ctrl-C → cancel whatever is running.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            shutdown.cancel();
        });
    }

    for (name, scenario) in selected {
        if shutdown.is_cancelled() {
            info!(scenario = %name, "shutdown requested; skipping scenario");
            continue;
        }
        let report =
            scenario::run_scenario(name, scenario, Arc::clone(&dispatcher), shutdown.clone())
                .await?;
        println!("{report}");
    }

    Ok(())
}

/// Print the validated scenarios without running anything.
fn print_dry_run(cfg: &ConfigFile, selected: &[(&str, &ScenarioConfig)]) {
    println!("cmdgate dry-run");
    println!("  config.dispatcher = {}", cfg.config.dispatcher);
    println!();

    println!("scenarios ({}):", selected.len());
    for (name, scenario) in selected {
        println!("  - {name}");
        println!("      steps: {}", scenario.steps);
        println!("      step_delay_ms: {}", scenario.step_delay_ms);
        println!("      outcome: {}", scenario.outcome);
        if let Some(ref error) = scenario.error {
            println!("      error: {error}");
        }
        if let Some(ms) = scenario.cancel_after_ms {
            println!("      cancel_after_ms: {ms}");
        }
        if let Some(ms) = scenario.timeout_ms {
            println!("      timeout_ms: {ms}");
        }
    }

    debug!("dry-run complete (no execution)");
}
