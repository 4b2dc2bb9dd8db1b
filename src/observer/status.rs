// src/observer/status.rs

use std::fmt;
use std::sync::Arc;

/// Lifecycle of one observed operation.
///
/// `Pending` moves to exactly one of the other three and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    RanToCompletion,
    Canceled,
    Faulted,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::RanToCompletion => "succeeded",
            TaskStatus::Canceled => "canceled",
            TaskStatus::Faulted => "faulted",
        };
        f.write_str(s)
    }
}

/// The failure captured from a faulted operation.
///
/// The full error chain is kept, but the reported message is the one of the
/// root cause, so context layers added on the way up do not hide what
/// actually went wrong.
#[derive(Clone)]
pub struct TaskFault {
    error: Arc<anyhow::Error>,
}

impl TaskFault {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self {
            error: Arc::new(error),
        }
    }

    /// Message of the root cause.
    pub fn message(&self) -> String {
        self.root_cause().to_string()
    }

    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        self.error.root_cause()
    }

    /// The error as returned by the operation, outermost context first.
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    pub fn chain(&self) -> anyhow::Chain<'_> {
        self.error.chain()
    }
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl fmt::Debug for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFault")
            .field("message", &self.message())
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn message_is_root_cause() {
        let err = Err::<(), _>(anyhow!("disk full"))
            .context("copying report.pdf")
            .context("copy batch")
            .unwrap_err();
        let fault = TaskFault::new(err);

        assert_eq!(fault.message(), "disk full");
        assert_eq!(fault.error().to_string(), "copy batch");
        assert_eq!(fault.chain().count(), 3);
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::RanToCompletion.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
        assert!(TaskStatus::Faulted.is_terminal());
    }
}
