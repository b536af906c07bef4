//! Single-threaded publish/subscribe.
//!
//! Handlers run synchronously inside `publish`, in the order they were
//! subscribed. There is no buffering or back-pressure: a publish with no
//! listeners on the topic is simply dropped.

use std::collections::HashMap;
use std::hash::Hash;

/// Returned by `subscribe`; pass to `unsubscribe` to detach the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<P> = Box<dyn FnMut(&P)>;

pub struct EventBus<T, P> {
    topics: HashMap<T, Vec<(SubscriptionId, Handler<P>)>>,
    next_id: u64,
}

impl<T: Eq + Hash, P> EventBus<T, P> {
    pub fn new() -> Self {
        Self {
            topics: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(&mut self, topic: T, handler: impl FnMut(&P) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.topics
            .entry(topic)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Detach a handler. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.topics.values_mut() {
            if let Some(idx) = handlers.iter().position(|(sid, _)| *sid == id) {
                drop(handlers.remove(idx));
                return true;
            }
        }
        false
    }

    /// Invoke every current handler of `topic` once. Returns how many ran.
    pub fn publish(&mut self, topic: &T, payload: &P) -> usize {
        match self.topics.get_mut(topic) {
            Some(handlers) => {
                for (_, handler) in handlers.iter_mut() {
                    handler(payload);
                }
                handlers.len()
            }
            None => 0,
        }
    }

    /// Number of handlers subscribed to `topic`.
    pub fn subscriber_count(&self, topic: &T) -> usize {
        self.topics.get(topic).map_or(0, Vec::len)
    }
}

impl<T: Eq + Hash, P> Default for EventBus<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Topic {
        Collision,
        Score,
    }

    #[test]
    fn delivers_in_subscription_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        bus.subscribe(Topic::Score, move |runs: &u32| first.borrow_mut().push(("first", *runs)));
        let second = Rc::clone(&log);
        bus.subscribe(Topic::Score, move |runs: &u32| second.borrow_mut().push(("second", *runs)));

        assert_eq!(bus.publish(&Topic::Score, &6), 2);
        assert_eq!(*log.borrow(), vec![("first", 6), ("second", 6)]);
    }

    #[test]
    fn topics_are_isolated() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        bus.subscribe(Topic::Collision, move |_: &u32| *counter.borrow_mut() += 1);

        assert_eq!(bus.publish(&Topic::Score, &4), 0);
        assert_eq!(*hits.borrow(), 0);
        bus.publish(&Topic::Collision, &0);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unsubscribe_detaches_handler() {
        let mut bus: EventBus<Topic, u32> = EventBus::new();
        let id = bus.subscribe(Topic::Score, |_| {});
        assert_eq!(bus.subscriber_count(&Topic::Score), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(&Topic::Score), 0);
        assert_eq!(bus.publish(&Topic::Score, &1), 0);
    }
}
