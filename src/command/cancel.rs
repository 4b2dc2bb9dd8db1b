// src/command/cancel.rs

use std::sync::Arc;

use super::{Command, CommandEvent};
use crate::gate::CancellationGate;
use crate::notify::Notifier;

/// Command that cancels the running operation of its parent command.
///
/// It can execute only while the parent is running and has not been asked
/// to cancel yet. Its capability changes are published on the parent's
/// notifier as [`CommandEvent::CancelCanExecuteChanged`].
#[derive(Debug, Clone)]
pub struct CancelCommand {
    gate: Arc<CancellationGate>,
    events: Notifier<CommandEvent>,
}

impl CancelCommand {
    pub(crate) fn new(gate: Arc<CancellationGate>, events: Notifier<CommandEvent>) -> Self {
        Self { gate, events }
    }

    /// Request cancellation. Returns whether a request was actually made.
    pub fn cancel(&self) -> bool {
        self.gate.request_cancellation()
    }

    pub fn can_cancel(&self) -> bool {
        self.gate.can_request_cancellation()
    }
}

impl Command<()> for CancelCommand {
    fn can_execute(&self, _parameter: &()) -> bool {
        self.can_cancel()
    }

    fn execute(&self, _parameter: ()) {
        self.cancel();
    }

    fn events(&self) -> &Notifier<CommandEvent> {
        &self.events
    }
}
