// src/scenario.rs

//! Synthetic scenarios driven through a [`ProgressiveAsyncCommand`].
//!
//! Each configured scenario becomes one command execution: a step-wise
//! operation that sleeps, reports `step/total` progress and then ends as
//! configured. The runner wires the cancel command to the optional
//! `cancel_after_ms` trigger, a timeout and a shutdown token, then waits for
//! the task observer to reach a terminal status.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::ProgressiveAsyncCommand;
use crate::config::{ConfigFile, Outcome, ScenarioConfig};
use crate::dispatch::{self, Dispatcher};
use crate::errors::{CmdgateError, OperationError, Result};
use crate::observer::TaskStatus;
use crate::progress::ProgressChannel;
use crate::sync::lock;

/// One progress report of a synthetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProgress {
    pub step: u32,
    pub total: u32,
}

impl fmt::Display for StepProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.step, self.total)
    }
}

/// How a scenario ended.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub status: TaskStatus,
    /// Steps the operation completed, when it succeeded.
    pub result: Option<u32>,
    pub error: Option<String>,
    /// Progress in the order the handler received it.
    pub progress: Vec<StepProgress>,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.status)?;
        if let Some(steps) = self.result {
            write!(f, " (steps = {steps})")?;
        }
        if let Some(ref error) = self.error {
            write!(f, " (error = {error})")?;
        }
        write!(f, " [progress reports: {}]", self.progress.len())
    }
}

/// Pick the scenarios to run: the named one, or all of them in name order.
pub fn select<'a>(
    cfg: &'a ConfigFile,
    only: Option<&str>,
) -> Result<Vec<(&'a str, &'a ScenarioConfig)>> {
    match only {
        Some(name) => cfg
            .scenario
            .get_key_value(name)
            .map(|(name, scenario)| vec![(name.as_str(), scenario)])
            .ok_or_else(|| CmdgateError::ScenarioNotFound(name.to_string())),
        None => Ok(cfg
            .scenario
            .iter()
            .map(|(name, scenario)| (name.as_str(), scenario))
            .collect()),
    }
}

/// The synthetic operation behind every scenario.
///
/// Sleeps `step_delay_ms` before each step and reports it. Returns
/// [`OperationError::Canceled`] as soon as the token fires.
pub async fn step_operation(
    scenario: ScenarioConfig,
    token: CancellationToken,
    progress: ProgressChannel<StepProgress>,
) -> std::result::Result<u32, OperationError> {
    let delay = Duration::from_millis(scenario.step_delay_ms);

    for step in 1..=scenario.steps {
        tokio::select! {
            _ = token.cancelled() => return Err(OperationError::Canceled),
            _ = tokio::time::sleep(delay) => {}
        }
        progress.report(StepProgress {
            step,
            total: scenario.steps,
        });
    }

    match scenario.outcome {
        Outcome::Succeed => Ok(scenario.steps),
        Outcome::Fail => {
            let message = scenario.error.unwrap_or_default();
            Err(anyhow!(message)
                .context(format!("synthetic operation failed after {} steps", scenario.steps))
                .into())
        }
        Outcome::Cancel => Err(OperationError::Canceled),
    }
}

/// Run one scenario to its end and describe the outcome.
///
/// Operation failures and cancellations are part of the report, not errors.
/// `shutdown` cancels the running operation the same way the cancel command
/// would.
pub async fn run_scenario(
    name: &str,
    scenario: &ScenarioConfig,
    dispatcher: Arc<dyn Dispatcher>,
    shutdown: CancellationToken,
) -> Result<ScenarioReport> {
    let received = Arc::new(Mutex::new(Vec::new()));

    let command: ProgressiveAsyncCommand<ScenarioConfig, StepProgress, u32> = {
        let received = Arc::clone(&received);
        let scenario_name = name.to_string();
        ProgressiveAsyncCommand::builder(step_operation)
            .name(name)
            .progress_handler(move |progress: StepProgress| {
                info!(scenario = %scenario_name, %progress, "progress");
                lock(&received).push(progress);
            })
            .build(Arc::clone(&dispatcher))
    };

    let scenario_name = name.to_string();
    command.events().subscribe(move |event| {
        debug!(scenario = %scenario_name, ?event, "command event");
    });
    let scenario_name = name.to_string();
    command.task_events().subscribe(move |property| {
        debug!(scenario = %scenario_name, ?property, "task property changed");
    });

    info!(scenario = %name, steps = scenario.steps, outcome = %scenario.outcome, "running scenario");

    let handle = command
        .execute(scenario.clone())
        .ok_or_else(|| anyhow!("scenario '{name}' could not be started"))?;
    let observer = command
        .execution()
        .ok_or_else(|| anyhow!("scenario '{name}' started without an observer"))?;

    let canceller = scenario.cancel_after_ms.map(|ms| {
        let cancel = command.cancel_command().clone();
        let scenario_name = name.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            if cancel.cancel() {
                info!(scenario = %scenario_name, after_ms = ms, "cancel command triggered");
            }
        })
    });

    let status = tokio::select! {
        status = observer.completion() => status,
        _ = deadline(scenario.timeout_ms) => {
            warn!(scenario = %name, timeout_ms = ?scenario.timeout_ms, "scenario timed out; cancelling");
            command.cancel_command().cancel();
            observer.completion().await
        }
        _ = shutdown.cancelled() => {
            warn!(scenario = %name, "shutdown requested; cancelling");
            command.cancel_command().cancel();
            observer.completion().await
        }
    };

    if let Some(canceller) = canceller {
        canceller.abort();
    }
    handle.await.map_err(anyhow::Error::from)?;

    // Progress reports are still queued on the dispatcher until it drains.
    dispatch::flush(dispatcher.as_ref()).await;

    let report = ScenarioReport {
        name: name.to_string(),
        status,
        result: observer.result(),
        error: observer.error_message(),
        progress: lock(&received).clone(),
    };
    info!(scenario = %name, status = %report.status, "scenario finished");

    Ok(report)
}

fn deadline(timeout_ms: Option<u64>) -> impl Future<Output = ()> {
    async move {
        match timeout_ms {
            Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            None => std::future::pending::<()>().await,
        }
    }
}
