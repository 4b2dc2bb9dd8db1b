// src/command/mod.rs

//! Invokable commands.
//!
//! - [`async_command`] holds [`AsyncCommand`], the coordinator that gates,
//!   starts and observes one asynchronous operation at a time.
//! - [`progressive`] wraps it for operations that report typed progress.
//! - [`cancel`] is the nested command that cancels the running operation.
//! - [`sync_command`] is the plain synchronous delegate command.
//!
//! All of them implement [`Command`], so a consumer can wire a button (or
//! anything else) to any of them the same way: query `can_execute`, call
//! `execute`, and re-query whenever `CanExecuteChanged` is published.

pub mod async_command;
pub mod cancel;
pub mod progressive;
pub mod sync_command;

pub use async_command::{AsyncCommand, AsyncCommandBuilder, OperationFuture};
pub use cancel::CancelCommand;
pub use progressive::{ProgressiveAsyncCommand, ProgressiveCommandBuilder};
pub use sync_command::SyncCommand;

use std::sync::Arc;

use crate::notify::Notifier;

/// Events published on a command's notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandEvent {
    /// `can_execute` of the command itself may have changed.
    CanExecuteChanged,
    /// `can_execute` of the nested cancel command may have changed.
    CancelCanExecuteChanged,
    /// A new task observer replaced the previous one.
    ExecutionChanged,
}

/// Common invocation surface of every command.
pub trait Command<P> {
    fn can_execute(&self, parameter: &P) -> bool;

    /// Run the command if `can_execute` allows it; otherwise do nothing.
    fn execute(&self, parameter: P);

    /// Where `CommandEvent`s for this command are published.
    fn events(&self) -> &Notifier<CommandEvent>;
}

type Predicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;
