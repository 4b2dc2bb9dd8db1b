// src/command/async_command.rs

//! The asynchronous command coordinator.

use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cancel::CancelCommand;
use super::{Command, CommandEvent, Predicate};
use crate::dispatch::Dispatcher;
use crate::errors::OperationError;
use crate::gate::CancellationGate;
use crate::notify::Notifier;
use crate::observer::{ObservationFuture, TaskObserver, TaskProperty};
use crate::sync::{lock, panic_message};

/// Boxed future returned by an operation function.
pub type OperationFuture<R> = BoxFuture<'static, Result<R, OperationError>>;

type Operation<P, R> = Arc<dyn Fn(P, CancellationToken) -> OperationFuture<R> + Send + Sync>;

/// Runs one asynchronous operation at a time and exposes its lifecycle.
///
/// - `can_execute` is false while an execution is in flight, or when the
///   optional predicate rejects the parameter.
/// - `execute` / `execute_async` are no-ops when `can_execute` is false.
///   Neither ever fails: operation errors, panics and cancellations end up
///   as state on the current [`TaskObserver`].
/// - [`AsyncCommand::cancel_command`] cancels the running operation's token.
///
/// Cloning gives another handle to the same command.
pub struct AsyncCommand<P, R = ()> {
    shared: Arc<Shared<P, R>>,
}

struct Shared<P, R> {
    name: String,
    operation: Operation<P, R>,
    can_execute: Option<Predicate<P>>,
    gate: Arc<CancellationGate>,
    cancel: CancelCommand,
    execution: Mutex<Option<Arc<TaskObserver<R>>>>,
    events: Notifier<CommandEvent>,
    task_events: Notifier<TaskProperty>,
}

impl<P, R> Clone for AsyncCommand<P, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P, R> fmt::Debug for AsyncCommand<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCommand")
            .field("name", &self.shared.name)
            .field("executing", &self.shared.gate.is_executing())
            .field(
                "cancellation_requested",
                &self.shared.gate.is_cancellation_requested(),
            )
            .field("execution", &*lock(&self.shared.execution))
            .finish_non_exhaustive()
    }
}

/// Configures an [`AsyncCommand`] before it is bound to a dispatcher.
pub struct AsyncCommandBuilder<P, R> {
    name: String,
    operation: Operation<P, R>,
    can_execute: Option<Predicate<P>>,
}

impl<P, R> AsyncCommandBuilder<P, R>
where
    P: Send + 'static,
    R: Send + Sync + 'static,
{
    /// Name used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Extra precondition consulted on top of "not already running".
    pub fn can_execute<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.can_execute = Some(Arc::new(predicate));
        self
    }

    pub fn build(self, dispatcher: Arc<dyn Dispatcher>) -> AsyncCommand<P, R> {
        let events = Notifier::new(Arc::clone(&dispatcher));
        let task_events = Notifier::new(dispatcher);
        let gate = Arc::new(CancellationGate::new(events.clone()));
        let cancel = CancelCommand::new(Arc::clone(&gate), events.clone());

        AsyncCommand {
            shared: Arc::new(Shared {
                name: self.name,
                operation: self.operation,
                can_execute: self.can_execute,
                gate,
                cancel,
                execution: Mutex::new(None),
                events,
                task_events,
            }),
        }
    }
}

impl<P, R> AsyncCommand<P, R>
where
    P: Send + 'static,
    R: Send + Sync + 'static,
{
    /// Command without a predicate, delivering events on `dispatcher`.
    pub fn new<F, Fut>(dispatcher: Arc<dyn Dispatcher>, operation: F) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, OperationError>> + Send + 'static,
    {
        Self::builder(operation).build(dispatcher)
    }

    pub fn builder<F, Fut>(operation: F) -> AsyncCommandBuilder<P, R>
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, OperationError>> + Send + 'static,
    {
        let operation: Operation<P, R> =
            Arc::new(move |parameter: P, token: CancellationToken| -> OperationFuture<R> {
                Box::pin(operation(parameter, token))
            });

        AsyncCommandBuilder {
            name: "command".to_string(),
            operation,
            can_execute: None,
        }
    }

    /// Command whose operation does not look at the cancellation token.
    ///
    /// The cancel command still works: it cancels the token, but it is up to
    /// the operation to stop, so such runs usually end as they would anyway.
    pub fn new_without_token<F, Fut>(dispatcher: Arc<dyn Dispatcher>, operation: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, OperationError>> + Send + 'static,
    {
        Self::builder(move |parameter: P, _token: CancellationToken| operation(parameter))
            .build(dispatcher)
    }

    pub fn can_execute(&self, parameter: &P) -> bool {
        !self.shared.gate.is_executing() && self.predicate_allows(parameter)
    }

    /// Start the operation and wait until it has finished.
    ///
    /// Returns immediately if the command cannot execute. Dropping the
    /// returned future before it resolves drops the operation as well and
    /// still returns the command to idle.
    pub async fn execute_async(&self, parameter: P) {
        if let Some(run) = self.start(parameter) {
            run.complete().await;
        }
    }

    /// Start the operation and let it run in the background.
    ///
    /// The command is already running (and its new observer installed) when
    /// this returns. The remaining work is spawned on the current Tokio
    /// runtime; the handle may be ignored. Returns `None` if nothing was
    /// started, including when called outside a runtime.
    pub fn execute(&self, parameter: P) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                command = %self.shared.name,
                "execute called outside a Tokio runtime; ignoring"
            );
            return None;
        };

        let run = self.start(parameter)?;
        Some(runtime.spawn(run.complete()))
    }

    /// Observer of the current (or most recent) execution.
    pub fn execution(&self) -> Option<Arc<TaskObserver<R>>> {
        lock(&self.shared.execution).clone()
    }

    /// Steps that happen synchronously on every accepted execute request:
    /// gate the request, issue the token, invoke the operation and install a
    /// fresh observer.
    fn start(&self, parameter: P) -> Option<Run<P, R>> {
        let shared = &self.shared;

        if !self.predicate_allows(&parameter) {
            debug!(command = %shared.name, "can_execute predicate rejected parameter; ignoring");
            return None;
        }

        let Some(token) = shared.gate.notify_starting() else {
            debug!(command = %shared.name, "command already executing; ignoring execute request");
            return None;
        };

        info!(command = %shared.name, "starting command execution");

        let future = invoke(&shared.operation, parameter, token);
        let (observer, observation) =
            TaskObserver::observe_silently(shared.task_events.clone(), future);
        *lock(&shared.execution) = Some(Arc::clone(&observer));
        // Subscribers reacting to the started batch must already see this run.
        observer.publish_started();

        let finish = FinishGuard {
            shared: Arc::clone(shared),
            observer,
        };

        shared.events.publish_batch(vec![
            CommandEvent::ExecutionChanged,
            CommandEvent::CanExecuteChanged,
        ]);

        Some(Run {
            observation,
            _finish: finish,
        })
    }
}

impl<P, R> AsyncCommand<P, R> {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn is_executing(&self) -> bool {
        self.shared.gate.is_executing()
    }

    pub fn cancel_command(&self) -> &CancelCommand {
        &self.shared.cancel
    }

    pub fn events(&self) -> &Notifier<CommandEvent> {
        &self.shared.events
    }

    /// Task-state notifications of every execution of this command.
    pub fn task_events(&self) -> &Notifier<TaskProperty> {
        &self.shared.task_events
    }

    /// Tell subscribers to re-query `can_execute`, e.g. after state the
    /// predicate depends on has changed.
    pub fn raise_can_execute_changed(&self) {
        self.shared.events.publish(CommandEvent::CanExecuteChanged);
    }

    fn predicate_allows(&self, parameter: &P) -> bool {
        self.shared
            .can_execute
            .as_ref()
            .is_none_or(|predicate| predicate(parameter))
    }
}

impl<P, R> Command<P> for AsyncCommand<P, R>
where
    P: Send + 'static,
    R: Send + Sync + 'static,
{
    fn can_execute(&self, parameter: &P) -> bool {
        AsyncCommand::can_execute(self, parameter)
    }

    fn execute(&self, parameter: P) {
        let _ = AsyncCommand::execute(self, parameter);
    }

    fn events(&self) -> &Notifier<CommandEvent> {
        &self.shared.events
    }
}

/// An accepted execution that still has to be driven to its end.
struct Run<P, R> {
    observation: ObservationFuture,
    _finish: FinishGuard<P, R>,
}

impl<P, R> Run<P, R> {
    async fn complete(self) {
        let Run { observation, _finish } = self;
        observation.await;
    }
}

/// Returns the command to idle when dropped, whether the run completed or
/// was abandoned half-way.
struct FinishGuard<P, R> {
    shared: Arc<Shared<P, R>>,
    observer: Arc<TaskObserver<R>>,
}

impl<P, R> Drop for FinishGuard<P, R> {
    fn drop(&mut self) {
        // The observer is terminal before the command reports itself idle.
        self.observer.abandon();
        self.shared.gate.notify_finished();
        self.shared.events.publish(CommandEvent::CanExecuteChanged);
        debug!(command = %self.shared.name, "command execution finished");
    }
}

/// Call the operation function, turning a panic during the call itself into
/// a failed future.
fn invoke<P, R>(operation: &Operation<P, R>, parameter: P, token: CancellationToken) -> OperationFuture<R>
where
    R: Send + 'static,
{
    match catch_unwind(AssertUnwindSafe(|| operation(parameter, token))) {
        Ok(future) => future,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(panic = %message, "operation function panicked before returning a future");
            Box::pin(async move { Err(OperationError::Failed(anyhow::anyhow!(message))) })
        }
    }
}
