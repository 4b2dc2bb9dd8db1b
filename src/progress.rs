// src/progress.rs

//! Typed progress reporting from an operation to a handler.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::Dispatcher;

pub(crate) type ProgressHandler<T> = Arc<dyn Fn(T) + Send + Sync>;

/// One-way sink from operation code to a progress handler.
///
/// Reports are handed to the dispatcher and the handler runs there, so the
/// reporting side never waits on it. Reports from one channel arrive in the
/// order they were made. Cloning yields another handle to the same channel.
pub struct ProgressChannel<T> {
    handler: Option<ProgressHandler<T>>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl<T> Clone for ProgressChannel<T> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<T> fmt::Debug for ProgressChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressChannel")
            .field("has_handler", &self.handler.is_some())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl<T> ProgressChannel<T>
where
    T: Send + 'static,
{
    pub fn new<F>(dispatcher: Arc<dyn Dispatcher>, handler: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            handler: Some(Arc::new(handler)),
            dispatcher,
        }
    }

    pub(crate) fn from_handler(
        dispatcher: Arc<dyn Dispatcher>,
        handler: Option<ProgressHandler<T>>,
    ) -> Self {
        Self { handler, dispatcher }
    }

    /// A channel with nobody listening; every report is dropped.
    pub fn detached(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            handler: None,
            dispatcher,
        }
    }

    pub fn report(&self, value: T) {
        let Some(handler) = &self.handler else {
            return;
        };
        let handler = Arc::clone(handler);
        self.dispatcher.dispatch(Box::new(move || handler(value)));
    }
}
