// src/command/progressive.rs

//! Async command whose operation reports typed progress.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::async_command::{AsyncCommand, OperationFuture};
use super::cancel::CancelCommand;
use super::{Command, CommandEvent, Predicate};
use crate::dispatch::Dispatcher;
use crate::errors::OperationError;
use crate::notify::Notifier;
use crate::observer::{TaskObserver, TaskProperty};
use crate::progress::{ProgressChannel, ProgressHandler};

type ProgressiveOperation<P, T, R> =
    Arc<dyn Fn(P, CancellationToken, ProgressChannel<T>) -> OperationFuture<R> + Send + Sync>;

/// An [`AsyncCommand`] whose operation also receives a [`ProgressChannel`].
///
/// The channel is created once, together with the command, and handed to
/// every execution. Reports reach the handler on the command's dispatcher.
pub struct ProgressiveAsyncCommand<P, T, R = ()> {
    command: AsyncCommand<P, R>,
    progress: ProgressChannel<T>,
}

impl<P, T, R> Clone for ProgressiveAsyncCommand<P, T, R> {
    fn clone(&self) -> Self {
        Self {
            command: self.command.clone(),
            progress: self.progress.clone(),
        }
    }
}

impl<P, T, R> fmt::Debug for ProgressiveAsyncCommand<P, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressiveAsyncCommand")
            .field("command", &self.command)
            .field("progress", &self.progress)
            .finish()
    }
}

pub struct ProgressiveCommandBuilder<P, T, R> {
    name: String,
    operation: ProgressiveOperation<P, T, R>,
    handler: Option<ProgressHandler<T>>,
    can_execute: Option<Predicate<P>>,
}

impl<P, T, R> ProgressiveCommandBuilder<P, T, R>
where
    P: Send + 'static,
    T: Send + 'static,
    R: Send + Sync + 'static,
{
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Handler receiving progress reports. Without one, reports are dropped.
    pub fn progress_handler<H>(mut self, handler: H) -> Self
    where
        H: Fn(T) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn can_execute<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.can_execute = Some(Arc::new(predicate));
        self
    }

    pub fn build(self, dispatcher: Arc<dyn Dispatcher>) -> ProgressiveAsyncCommand<P, T, R> {
        let progress = ProgressChannel::from_handler(Arc::clone(&dispatcher), self.handler);

        let channel = progress.clone();
        let operation = self.operation;
        let mut builder = AsyncCommand::builder(move |parameter: P, token: CancellationToken| {
            operation(parameter, token, channel.clone())
        })
        .name(self.name);

        if let Some(predicate) = self.can_execute {
            builder = builder.can_execute(move |parameter: &P| predicate(parameter));
        }

        ProgressiveAsyncCommand {
            command: builder.build(dispatcher),
            progress,
        }
    }
}

impl<P, T, R> ProgressiveAsyncCommand<P, T, R>
where
    P: Send + 'static,
    T: Send + 'static,
    R: Send + Sync + 'static,
{
    pub fn new<F, Fut, H>(dispatcher: Arc<dyn Dispatcher>, operation: F, handler: H) -> Self
    where
        F: Fn(P, CancellationToken, ProgressChannel<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, OperationError>> + Send + 'static,
        H: Fn(T) + Send + Sync + 'static,
    {
        Self::builder(operation)
            .progress_handler(handler)
            .build(dispatcher)
    }

    /// Command whose operation only needs the parameter and the progress
    /// channel.
    pub fn new_without_token<F, Fut, H>(
        dispatcher: Arc<dyn Dispatcher>,
        operation: F,
        handler: H,
    ) -> Self
    where
        F: Fn(P, ProgressChannel<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, OperationError>> + Send + 'static,
        H: Fn(T) + Send + Sync + 'static,
    {
        Self::builder(
            move |parameter: P, _token: CancellationToken, progress: ProgressChannel<T>| {
                operation(parameter, progress)
            },
        )
        .progress_handler(handler)
        .build(dispatcher)
    }

    pub fn builder<F, Fut>(operation: F) -> ProgressiveCommandBuilder<P, T, R>
    where
        F: Fn(P, CancellationToken, ProgressChannel<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, OperationError>> + Send + 'static,
    {
        let operation: ProgressiveOperation<P, T, R> = Arc::new(
            move |parameter: P,
                  token: CancellationToken,
                  progress: ProgressChannel<T>|
                  -> OperationFuture<R> { Box::pin(operation(parameter, token, progress)) },
        );

        ProgressiveCommandBuilder {
            name: "command".to_string(),
            operation,
            handler: None,
            can_execute: None,
        }
    }

    pub fn can_execute(&self, parameter: &P) -> bool {
        self.command.can_execute(parameter)
    }

    pub async fn execute_async(&self, parameter: P) {
        self.command.execute_async(parameter).await;
    }

    pub fn execute(&self, parameter: P) -> Option<JoinHandle<()>> {
        self.command.execute(parameter)
    }

    pub fn execution(&self) -> Option<Arc<TaskObserver<R>>> {
        self.command.execution()
    }
}

impl<P, T, R> ProgressiveAsyncCommand<P, T, R> {
    /// The underlying command.
    pub fn command(&self) -> &AsyncCommand<P, R> {
        &self.command
    }

    pub fn progress(&self) -> &ProgressChannel<T> {
        &self.progress
    }

    pub fn name(&self) -> &str {
        self.command.name()
    }

    pub fn is_executing(&self) -> bool {
        self.command.is_executing()
    }

    pub fn cancel_command(&self) -> &CancelCommand {
        self.command.cancel_command()
    }

    pub fn events(&self) -> &Notifier<CommandEvent> {
        self.command.events()
    }

    pub fn task_events(&self) -> &Notifier<TaskProperty> {
        self.command.task_events()
    }

    pub fn raise_can_execute_changed(&self) {
        self.command.raise_can_execute_changed();
    }
}

impl<P, T, R> Command<P> for ProgressiveAsyncCommand<P, T, R>
where
    P: Send + 'static,
    T: Send + 'static,
    R: Send + Sync + 'static,
{
    fn can_execute(&self, parameter: &P) -> bool {
        self.command.can_execute(parameter)
    }

    fn execute(&self, parameter: P) {
        let _ = self.command.execute(parameter);
    }

    fn events(&self) -> &Notifier<CommandEvent> {
        self.command.events()
    }
}
