// src/dispatch/event_loop.rs

//! Channel-backed dispatcher and the loop that drains it.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::{Dispatcher, Job};
use crate::sync::panic_message;

/// Sending half of a dispatch loop. Cheap to clone; all clones feed the same
/// loop, so jobs from one clone keep their relative order.
#[derive(Debug, Clone)]
pub struct LoopDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving half: executes queued jobs one at a time.
#[derive(Debug)]
pub struct DispatchLoop {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl LoopDispatcher {
    /// Create a dispatcher and the loop it feeds. Nothing runs until the
    /// caller drives the loop with [`DispatchLoop::run`] or
    /// [`DispatchLoop::run_pending`].
    pub fn channel() -> (Self, DispatchLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, DispatchLoop { rx })
    }

    /// Create a dispatcher whose loop runs as a background Tokio task.
    ///
    /// Must be called from within a Tokio runtime. The loop stops once every
    /// clone of the returned dispatcher has been dropped.
    pub fn spawn() -> Self {
        let (dispatcher, dispatch_loop) = Self::channel();
        tokio::spawn(dispatch_loop.run());
        dispatcher
    }

    /// Whether the loop side is gone (jobs would be dropped).
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Dispatcher for LoopDispatcher {
    fn dispatch(&self, job: Job) {
        if self.tx.send(job).is_err() {
            debug!("dispatch loop closed; dropping job");
        }
    }
}

impl DispatchLoop {
    /// Execute jobs until every dispatcher handle has been dropped.
    pub async fn run(mut self) {
        info!("dispatch loop started");

        while let Some(job) = self.rx.recv().await {
            run_job(job);
        }

        info!("dispatch loop finished (all dispatchers dropped)");
    }

    /// Execute every job that is already queued, without waiting for more.
    ///
    /// Returns the number of jobs executed. Jobs queued by the executed jobs
    /// themselves are picked up in the same call.
    pub fn run_pending(&mut self) -> usize {
        let mut executed = 0;
        while let Ok(job) = self.rx.try_recv() {
            run_job(job);
            executed += 1;
        }
        executed
    }
}

/// A panicking subscriber must not take the whole delivery context down.
fn run_job(job: Job) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
        error!(
            panic = %panic_message(payload.as_ref()),
            "dispatched callback panicked; continuing with next job"
        );
    }
}
