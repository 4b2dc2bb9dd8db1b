use std::sync::{Arc, Mutex};

use cmdgate::{Notifier, SubscriptionId};

/// Records every event delivered through the notifiers it is attached to.
#[derive(Debug)]
pub struct EventRecorder<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E> Clone for EventRecorder<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> Default for EventRecorder<E> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E> EventRecorder<E>
where
    E: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, notifier: &Notifier<E>) -> SubscriptionId {
        let events = Arc::clone(&self.events);
        notifier.subscribe(move |event: &E| events.lock().unwrap().push(event.clone()))
    }

    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &E) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
