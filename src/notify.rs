// src/notify.rs

//! Subscription registry used for every "something changed" event.
//!
//! A [`Notifier`] holds a list of handlers and a [`Dispatcher`]. Publishing a
//! batch of events posts a single job to the dispatcher; when the job runs,
//! each event of the batch is delivered in order to every handler registered
//! at that moment. Handlers subscribed between publish and delivery therefore
//! still see the batch.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::dispatch::Dispatcher;
use crate::sync::lock;

/// Identifies one subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Cloneable handle to a shared handler registry.
pub struct Notifier<E> {
    inner: Arc<Registry<E>>,
}

struct Registry<E> {
    dispatcher: Arc<dyn Dispatcher>,
    handlers: Mutex<Vec<(SubscriptionId, Handler<E>)>>,
    next_id: AtomicU64,
}

impl<E> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("dispatcher", &self.inner.dispatcher)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E> Notifier<E> {
    /// The dispatcher events are delivered on.
    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.inner.dispatcher
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.handlers).len()
    }
}

impl<E> Notifier<E>
where
    E: Send + Sync + 'static,
{
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            inner: Arc::new(Registry {
                dispatcher,
                handlers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.handlers).push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = lock(&self.inner.handlers);
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn publish(&self, event: E) {
        self.publish_batch(vec![event]);
    }

    /// Deliver `events`, in order, as one job on the dispatcher.
    pub fn publish_batch(&self, events: Vec<E>) {
        if events.is_empty() {
            return;
        }

        let registry = Arc::clone(&self.inner);
        self.inner.dispatcher.dispatch(Box::new(move || {
            // Snapshot so handlers may (un)subscribe while being invoked.
            let handlers: Vec<Handler<E>> = lock(&registry.handlers)
                .iter()
                .map(|(_, h)| Arc::clone(h))
                .collect();

            for event in &events {
                for handler in &handlers {
                    handler(event);
                }
            }
        }));
    }
}
