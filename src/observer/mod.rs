// src/observer/mod.rs

//! Observable task state.
//!
//! - [`status`] holds the status enum and the captured fault type.
//! - [`task`] contains [`TaskObserver`], which wraps one operation future and
//!   republishes its transitions as [`TaskProperty`] change notifications.

pub mod status;
pub mod task;

pub use status::{TaskFault, TaskStatus};
pub use task::{ObservationFuture, TaskObserver};

/// Named fields of a [`TaskObserver`] that a state-changed event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskProperty {
    Status,
    IsRunning,
    IsNotRunning,
    IsCompleted,
    IsNotCompleted,
    IsCanceled,
    IsNotCanceled,
    IsSuccessfullyCompleted,
    IsFaulted,
    Error,
    ErrorMessage,
    Result,
}

const LIFECYCLE: [TaskProperty; 5] = [
    TaskProperty::Status,
    TaskProperty::IsRunning,
    TaskProperty::IsNotRunning,
    TaskProperty::IsCompleted,
    TaskProperty::IsNotCompleted,
];

/// Published when observation begins.
pub(crate) fn started_properties() -> Vec<TaskProperty> {
    LIFECYCLE.to_vec()
}

/// Published once the terminal status is recorded: lifecycle fields first,
/// then the fields specific to the outcome.
pub(crate) fn terminal_properties(status: TaskStatus) -> Vec<TaskProperty> {
    let mut props = LIFECYCLE.to_vec();
    match status {
        TaskStatus::Pending => {}
        TaskStatus::RanToCompletion => {
            props.extend([TaskProperty::IsSuccessfullyCompleted, TaskProperty::Result]);
        }
        TaskStatus::Canceled => {
            props.extend([TaskProperty::IsCanceled, TaskProperty::IsNotCanceled]);
        }
        TaskStatus::Faulted => {
            props.extend([
                TaskProperty::IsFaulted,
                TaskProperty::Error,
                TaskProperty::ErrorMessage,
            ]);
        }
    }
    props
}
