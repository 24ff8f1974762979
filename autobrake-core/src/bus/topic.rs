use parking_lot::RwLock;

use super::Handler;

/// Ordered handler list for a single event kind.
///
/// Dispatch takes a recursive read lock so a handler may publish onto the
/// same topic. Subscribing from inside a handler of the same topic deadlocks.
pub(crate) struct Topic<E> {
    handlers: RwLock<Vec<Handler<E>>>,
}

impl<E> Topic<E> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, handler: Handler<E>) {
        self.handlers.write().push(handler);
    }

    /// Runs every handler in subscription order. Returns how many ran.
    pub(crate) fn dispatch(&self, event: &E) -> usize {
        let handlers = self.handlers.read_recursive();
        for handler in handlers.iter() {
            handler(event);
        }
        handlers.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.read().len()
    }
}

impl<E> Default for Topic<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn dispatches_in_subscription_order() {
        let topic: Topic<u32> = Topic::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for id in 0..3 {
            let order = order.clone();
            topic.subscribe(Box::new(move |value: &u32| {
                order.lock().push((id, *value))
            }));
        }

        assert_eq!(topic.dispatch(&7), 3);
        assert_eq!(*order.lock(), vec![(0, 7), (1, 7), (2, 7)]);
    }

    #[test]
    fn empty_topic_dispatches_to_nobody() {
        let topic: Topic<u32> = Topic::default();
        assert_eq!(topic.dispatch(&1), 0);
        assert_eq!(topic.len(), 0);
    }

    #[test]
    fn handler_may_republish_on_same_topic() {
        let topic: Arc<Topic<u32>> = Arc::new(Topic::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let inner = Arc::downgrade(&topic);
        let counter = seen.clone();
        topic.subscribe(Box::new(move |value: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            if *value > 0 {
                if let Some(topic) = inner.upgrade() {
                    topic.dispatch(&(value - 1));
                }
            }
        }));

        topic.dispatch(&2);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
