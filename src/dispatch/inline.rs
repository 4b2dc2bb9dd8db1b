// src/dispatch/inline.rs

use super::{Dispatcher, Job};

/// Runs every job synchronously on the thread that dispatched it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}
