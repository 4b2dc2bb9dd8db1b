// src/observer/task.rs

//! Observation of a single operation future.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::status::{TaskFault, TaskStatus};
use super::{started_properties, terminal_properties, TaskProperty};
use crate::errors::OperationError;
use crate::notify::{Notifier, SubscriptionId};
use crate::sync::panic_message;

/// Future that drives an observation to its end. It resolves once the
/// observed operation has reached a terminal state, and never fails.
pub type ObservationFuture = BoxFuture<'static, ()>;

struct Snapshot<R> {
    status: TaskStatus,
    result: Option<R>,
    fault: Option<TaskFault>,
}

/// Wraps one operation and republishes its outcome as readable state.
///
/// Created through [`TaskObserver::observe`]; the observer starts `Pending`
/// and records exactly one terminal outcome. Operation errors and panics are
/// captured here and never propagate to whoever awaits the observation.
pub struct TaskObserver<R> {
    state: watch::Sender<Snapshot<R>>,
    notifier: Notifier<TaskProperty>,
}

impl<R> fmt::Debug for TaskObserver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.state.borrow();
        f.debug_struct("TaskObserver")
            .field("status", &snap.status)
            .field("fault", &snap.fault)
            .finish_non_exhaustive()
    }
}

impl<R> TaskObserver<R>
where
    R: Send + Sync + 'static,
{
    /// Start observing `future`.
    ///
    /// Returns the observer together with the future that drives the
    /// observation. The operation only makes progress while that future is
    /// polled. A "started" batch is published right away; the terminal batch
    /// is published once the operation ends, even if it had already finished
    /// before this call. Dropping the observation future before the operation
    /// ends records the run as `Canceled`.
    pub fn observe<F>(notifier: Notifier<TaskProperty>, future: F) -> (Arc<Self>, ObservationFuture)
    where
        F: Future<Output = Result<R, OperationError>> + Send + 'static,
    {
        let (observer, observation) = Self::observe_silently(notifier, future);
        observer.publish_started();
        (observer, observation)
    }

    /// Like [`TaskObserver::observe`], but the caller publishes the started
    /// batch through [`TaskObserver::publish_started`] once the observer is
    /// reachable from wherever subscribers will look for it.
    pub(crate) fn observe_silently<F>(
        notifier: Notifier<TaskProperty>,
        future: F,
    ) -> (Arc<Self>, ObservationFuture)
    where
        F: Future<Output = Result<R, OperationError>> + Send + 'static,
    {
        let (state, _) = watch::channel(Snapshot {
            status: TaskStatus::Pending,
            result: None,
            fault: None,
        });

        let observer = Arc::new(Self { state, notifier });

        // Captured by the observation so it also fires when the observation
        // is dropped before its first poll.
        let guard = AbandonGuard {
            observer: Arc::clone(&observer),
        };
        let observation = async move {
            let guard = guard;
            let outcome = AssertUnwindSafe(future).catch_unwind().await;
            guard.observer.finish(outcome);
        }
        .boxed();

        (observer, observation)
    }

    fn finish(&self, outcome: std::thread::Result<Result<R, OperationError>>) {
        let (status, result, fault) = match outcome {
            Ok(Ok(value)) => (TaskStatus::RanToCompletion, Some(value), None),
            Ok(Err(ref err)) if err.is_cancellation() => (TaskStatus::Canceled, None, None),
            Ok(Err(OperationError::Failed(err))) => {
                (TaskStatus::Faulted, None, Some(TaskFault::new(err)))
            }
            Ok(Err(OperationError::Canceled)) => (TaskStatus::Canceled, None, None),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(panic = %message, "operation panicked; recording as faulted");
                (TaskStatus::Faulted, None, Some(TaskFault::new(anyhow::anyhow!(message))))
            }
        };

        if !self.record(status, result, fault) {
            warn!(?status, "observer already terminal; ignoring outcome");
            return;
        }
        debug!(?status, "observed operation finished");
    }
}

impl<R> TaskObserver<R> {
    pub(crate) fn publish_started(&self) {
        self.notifier.publish_batch(started_properties());
    }

    /// Record `Canceled` if the operation was dropped before it finished.
    /// No-op once a terminal status is recorded.
    pub(crate) fn abandon(&self) {
        if self.record(TaskStatus::Canceled, None, None) {
            debug!("observation dropped before the operation finished; recorded as canceled");
        }
    }

    /// Store a terminal outcome and publish the terminal batch. Returns
    /// `false` if an outcome was already recorded.
    fn record(&self, status: TaskStatus, result: Option<R>, fault: Option<TaskFault>) -> bool {
        let recorded = self.state.send_if_modified(|snap| {
            if snap.status.is_terminal() {
                return false;
            }
            snap.status = status;
            snap.result = result;
            snap.fault = fault;
            true
        });

        if recorded {
            self.notifier.publish_batch(terminal_properties(status));
        }
        recorded
    }
}

/// Held by the observation future; marks the run abandoned when dropped.
struct AbandonGuard<R> {
    observer: Arc<TaskObserver<R>>,
}

impl<R> Drop for AbandonGuard<R> {
    fn drop(&mut self) {
        self.observer.abandon();
    }
}

impl<R> TaskObserver<R> {
    pub fn status(&self) -> TaskStatus {
        self.state.borrow().status
    }

    pub fn is_running(&self) -> bool {
        !self.status().is_terminal()
    }

    pub fn is_not_running(&self) -> bool {
        !self.is_running()
    }

    /// Completed in any way, including canceled and faulted.
    pub fn is_completed(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn is_not_completed(&self) -> bool {
        !self.is_completed()
    }

    pub fn is_canceled(&self) -> bool {
        self.status() == TaskStatus::Canceled
    }

    pub fn is_not_canceled(&self) -> bool {
        !self.is_canceled()
    }

    pub fn is_successfully_completed(&self) -> bool {
        self.status() == TaskStatus::RanToCompletion
    }

    pub fn is_faulted(&self) -> bool {
        self.status() == TaskStatus::Faulted
    }

    /// The captured fault; `None` unless the status is `Faulted`.
    pub fn error(&self) -> Option<TaskFault> {
        self.state.borrow().fault.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().fault.as_ref().map(TaskFault::message)
    }

    /// Wait until the observed operation has reached a terminal status.
    pub async fn completion(&self) -> TaskStatus {
        let mut rx = self.state.subscribe();
        let status = rx
            .wait_for(|snap| snap.status.is_terminal())
            .await
            .map(|snap| snap.status);
        status.unwrap_or_else(|_| self.status())
    }
}

impl<R: Clone> TaskObserver<R> {
    /// The value produced by the operation; `None` unless it succeeded.
    pub fn result(&self) -> Option<R> {
        self.state.borrow().result.clone()
    }
}

impl<R> TaskObserver<R>
where
    R: Send + Sync + 'static,
{
    /// Subscribe to state-changed notifications of this observer.
    ///
    /// Observers created by the same command share one registry, so a
    /// subscription made here keeps receiving events for later runs too.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&TaskProperty) + Send + Sync + 'static,
    {
        self.notifier.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}
