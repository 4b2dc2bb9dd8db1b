// src/gate.rs

//! Cancellation and "is executing" state of one command.
//!
//! The gate pairs a cancellation token with the executing flag. A token that
//! was cancelled is kept until the next run starts, so a cancel requested
//! right as a run finishes is still visible on that run's token. Only
//! [`CancellationGate::notify_starting`] swaps in a fresh token.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::CommandEvent;
use crate::notify::Notifier;
use crate::sync::lock;

#[derive(Debug)]
struct GateState {
    source: CancellationToken,
    executing: bool,
}

#[derive(Debug)]
pub struct CancellationGate {
    state: Mutex<GateState>,
    events: Notifier<CommandEvent>,
}

impl CancellationGate {
    pub fn new(events: Notifier<CommandEvent>) -> Self {
        Self {
            state: Mutex::new(GateState {
                source: CancellationToken::new(),
                executing: false,
            }),
            events,
        }
    }

    /// Mark a run as started and return the token it must observe.
    ///
    /// Returns `None`, and changes nothing, if a run is already in flight.
    /// If the held token was cancelled by the previous run, a fresh one is
    /// issued.
    pub fn notify_starting(&self) -> Option<CancellationToken> {
        let token = {
            let mut state = lock(&self.state);
            if state.executing {
                return None;
            }
            state.executing = true;
            if state.source.is_cancelled() {
                debug!("previous run was cancelled; issuing fresh cancellation token");
                state.source = CancellationToken::new();
            }
            state.source.clone()
        };

        self.events.publish(CommandEvent::CancelCanExecuteChanged);
        Some(token)
    }

    /// Mark the current run as finished. The token is left as is.
    pub fn notify_finished(&self) {
        lock(&self.state).executing = false;
        self.events.publish(CommandEvent::CancelCanExecuteChanged);
    }

    /// Cancel the running operation's token.
    ///
    /// Returns `false` (and does nothing) when no run is in flight or the
    /// current one was already asked to cancel.
    pub fn request_cancellation(&self) -> bool {
        {
            let state = lock(&self.state);
            if !state.executing || state.source.is_cancelled() {
                return false;
            }
            state.source.cancel();
        }

        debug!("cancellation requested for running operation");
        self.events.publish(CommandEvent::CancelCanExecuteChanged);
        true
    }

    pub fn can_request_cancellation(&self) -> bool {
        let state = lock(&self.state);
        state.executing && !state.source.is_cancelled()
    }

    pub fn is_executing(&self) -> bool {
        lock(&self.state).executing
    }

    pub fn is_cancellation_requested(&self) -> bool {
        lock(&self.state).source.is_cancelled()
    }

    /// Token of the current (or most recent) run.
    #[cfg(test)]
    fn token(&self) -> CancellationToken {
        lock(&self.state).source.clone()
    }
}
