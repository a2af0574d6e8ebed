use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Events that can be routed by topic.
///
/// Components publish values of a single event enum; the topic is the
/// variant tag, so subscribers pick which variants they care about without
/// the hub knowing anything about the payload.
pub trait Topical {
    type Topic: Copy + Eq + Hash;

    fn topic(&self) -> Self::Topic;
}

/// Shared handler invoked with a borrowed event
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// Token returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Minimal synchronous publish/subscribe hub.
///
/// Handlers for a topic run in subscription order, on the publisher's call
/// stack. The handler list is snapshotted before dispatch, so a handler may
/// subscribe, unsubscribe, or publish re-entrantly; such changes take effect
/// from the next publish.
pub struct EventHub<E: Topical> {
    next_id: Cell<u64>,
    handlers: RefCell<HashMap<E::Topic, Vec<(SubscriptionId, Handler<E>)>>>,
}

impl<E: Topical> EventHub<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            handlers: RefCell::new(HashMap::new()),
        }
    }

    /// Subscribe a closure to one topic
    pub fn subscribe(&self, topic: E::Topic, handler: impl Fn(&E) + 'static) -> SubscriptionId {
        self.subscribe_handler(topic, Rc::new(handler))
    }

    /// Subscribe an already-shared handler to one topic
    pub fn subscribe_handler(&self, topic: E::Topic, handler: Handler<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.handlers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push((id, handler));
        id
    }

    /// Remove a subscription. Unknown ids are a no-op.
    pub fn unsubscribe(&self, topic: E::Topic, id: SubscriptionId) {
        if let Some(list) = self.handlers.borrow_mut().get_mut(&topic) {
            list.retain(|(sub_id, _)| *sub_id != id);
        }
    }

    /// Publish an event to the subscribers of its topic
    pub fn publish(&self, event: &E) {
        // Snapshot under the borrow, dispatch after releasing it
        let snapshot: Vec<Handler<E>> = match self.handlers.borrow().get(&event.topic()) {
            Some(list) => list.iter().map(|(_, h)| Rc::clone(h)).collect(),
            None => return,
        };

        for handler in snapshot {
            handler(event);
        }
    }
}

impl<E: Topical> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Ping {
        One(u32),
        Two(u32),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum PingTopic {
        One,
        Two,
    }

    impl Topical for Ping {
        type Topic = PingTopic;

        fn topic(&self) -> PingTopic {
            match self {
                Ping::One(_) => PingTopic::One,
                Ping::Two(_) => PingTopic::Two,
            }
        }
    }

    #[test]
    fn test_publish_reaches_topic_subscribers_only() {
        let hub: EventHub<Ping> = EventHub::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_one = Rc::clone(&seen);
        hub.subscribe(PingTopic::One, move |e| {
            if let Ping::One(n) = e {
                seen_one.borrow_mut().push(*n);
            }
        });

        hub.publish(&Ping::One(1));
        hub.publish(&Ping::Two(2));
        hub.publish(&Ping::One(3));

        assert_eq!(*seen.borrow(), vec![1, 3]);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let hub: EventHub<Ping> = EventHub::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            hub.subscribe(PingTopic::One, move |_| order.borrow_mut().push(tag));
        }

        hub.publish(&Ping::One(0));
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unsubscribe() {
        let hub: EventHub<Ping> = EventHub::new();
        let count = Rc::new(Cell::new(0u32));

        let count_sub = Rc::clone(&count);
        let id = hub.subscribe(PingTopic::One, move |_| {
            count_sub.set(count_sub.get() + 1);
        });

        hub.publish(&Ping::One(0));
        hub.unsubscribe(PingTopic::One, id);
        hub.publish(&Ping::One(0));

        assert_eq!(count.get(), 1);

        // Unsubscribing again (or on the wrong topic) is a no-op
        hub.unsubscribe(PingTopic::One, id);
        hub.unsubscribe(PingTopic::Two, id);
    }

    #[test]
    fn test_reentrant_subscribe_does_not_affect_current_publish() {
        let hub = Rc::new(EventHub::<Ping>::new());
        let count = Rc::new(Cell::new(0u32));

        let hub_inner = Rc::clone(&hub);
        let count_inner = Rc::clone(&count);
        hub.subscribe(PingTopic::One, move |_| {
            count_inner.set(count_inner.get() + 1);
            let count_new = Rc::clone(&count_inner);
            hub_inner.subscribe(PingTopic::One, move |_| {
                count_new.set(count_new.get() + 1);
            });
        });

        // First publish runs one handler and registers a second
        hub.publish(&Ping::One(0));
        assert_eq!(count.get(), 1);

        // Second publish runs both
        hub.publish(&Ping::One(0));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_reentrant_publish() {
        let hub = Rc::new(EventHub::<Ping>::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_two = Rc::clone(&seen);
        hub.subscribe(PingTopic::Two, move |e| {
            if let Ping::Two(n) = e {
                seen_two.borrow_mut().push(*n);
            }
        });

        let hub_inner = Rc::clone(&hub);
        hub.subscribe(PingTopic::One, move |e| {
            if let Ping::One(n) = e {
                hub_inner.publish(&Ping::Two(n * 10));
            }
        });

        hub.publish(&Ping::One(4));
        assert_eq!(*seen.borrow(), vec![40]);
    }
}
