// src/command/sync_command.rs

use std::fmt;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::notify::Notifier;

use super::{Command, CommandEvent, Predicate};

type Action<P> = Arc<dyn Fn(P) + Send + Sync>;

/// Synchronous delegate command: an action plus an optional predicate.
pub struct SyncCommand<P> {
    action: Action<P>,
    can_execute: Option<Predicate<P>>,
    events: Notifier<CommandEvent>,
}

impl<P> Clone for SyncCommand<P> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            can_execute: self.can_execute.clone(),
            events: self.events.clone(),
        }
    }
}

impl<P> fmt::Debug for SyncCommand<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCommand")
            .field("has_predicate", &self.can_execute.is_some())
            .field("events", &self.events)
            .finish()
    }
}

impl<P> SyncCommand<P>
where
    P: 'static,
{
    pub fn new<F>(dispatcher: Arc<dyn Dispatcher>, action: F) -> Self
    where
        F: Fn(P) + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            can_execute: None,
            events: Notifier::new(dispatcher),
        }
    }

    pub fn with_can_execute<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.can_execute = Some(Arc::new(predicate));
        self
    }

    pub fn can_execute(&self, parameter: &P) -> bool {
        self.can_execute
            .as_ref()
            .is_none_or(|predicate| predicate(parameter))
    }

    /// Run the action if allowed, then tell subscribers to re-query
    /// `can_execute`. Returns whether the action ran.
    ///
    /// Unlike a bare delegate command, the predicate is re-checked here, so
    /// calling `execute` directly cannot bypass it.
    pub fn execute(&self, parameter: P) -> bool {
        if !self.can_execute(&parameter) {
            return false;
        }
        (self.action)(parameter);
        self.raise_can_execute_changed();
        true
    }

    pub fn raise_can_execute_changed(&self) {
        self.events.publish(CommandEvent::CanExecuteChanged);
    }

    pub fn events(&self) -> &Notifier<CommandEvent> {
        &self.events
    }
}

impl<P> Command<P> for SyncCommand<P>
where
    P: 'static,
{
    fn can_execute(&self, parameter: &P) -> bool {
        SyncCommand::can_execute(self, parameter)
    }

    fn execute(&self, parameter: P) {
        SyncCommand::execute(self, parameter);
    }

    fn events(&self) -> &Notifier<CommandEvent> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::dispatch::InlineDispatcher;

    #[test]
    fn runs_action_only_when_allowed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let command = SyncCommand::new(Arc::new(InlineDispatcher), move |v: i32| {
            s.lock().unwrap().push(v)
        })
        .with_can_execute(|v: &i32| *v > 0);

        assert!(command.execute(4));
        assert!(!command.execute(-1));
        assert_eq!(*seen.lock().unwrap(), vec![4]);
    }

    #[test]
    fn successful_execute_publishes_can_execute_changed() {
        let raised = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&raised);
        let command = SyncCommand::new(Arc::new(InlineDispatcher), |_: ()| {});
        command.events().subscribe(move |event: &CommandEvent| {
            if *event == CommandEvent::CanExecuteChanged {
                r.fetch_add(1, Ordering::SeqCst);
            }
        });

        Command::execute(&command, ());
        assert_eq!(raised.load(Ordering::SeqCst), 1);
    }
}
