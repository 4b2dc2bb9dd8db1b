// src/dispatch/mod.rs

//! Delivery of notifications onto a designated single-threaded context.
//!
//! Commands, observers and progress channels never invoke subscriber code
//! directly from whatever thread finished an operation. They hand a [`Job`]
//! to the [`Dispatcher`] injected at construction, and the dispatcher decides
//! where it runs:
//!
//! - [`InlineDispatcher`] runs the job immediately on the calling thread.
//!   Good enough for hosts without a UI thread.
//! - [`LoopDispatcher`] queues jobs onto a [`DispatchLoop`] that executes them
//!   one at a time, in submission order. The host owns the loop and decides
//!   where it runs (its main task, a `LocalSet`, a spawned task, ...).

use std::fmt;

use tokio::sync::oneshot;

pub mod event_loop;
pub mod inline;

pub use event_loop::{DispatchLoop, LoopDispatcher};
pub use inline::InlineDispatcher;

/// A unit of work to run on the designated context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to the designated single-threaded delivery context.
///
/// Implementations must run jobs submitted through one handle in FIFO order.
/// Submitting never blocks; if the context has shut down the job is dropped.
pub trait Dispatcher: Send + Sync + fmt::Debug {
    fn dispatch(&self, job: Job);
}

/// Wait until every job dispatched before this call has run.
///
/// With a [`LoopDispatcher`] this only resolves while its [`DispatchLoop`] is
/// being driven; it resolves immediately if the loop has already shut down.
pub async fn flush(dispatcher: &dyn Dispatcher) {
    let (tx, rx) = oneshot::channel::<()>();
    dispatcher.dispatch(Box::new(move || {
        let _ = tx.send(());
    }));
    let _ = rx.await;
}
