use std::cell::RefCell;
use std::rc::Rc;

use super::types::{KeyEvent, PassThrough};

/// Identifies a subscription on an [`InputBus`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&KeyEvent) -> PassThrough>;

struct Slot {
    id: u64,
    /// `None` while the listener is executing.
    listener: Option<Listener>,
}

#[derive(Default)]
struct Listeners {
    slots: Vec<Slot>,
    next_id: u64,
}

/// Key-down event source.
///
/// The runtime dispatches every translated key press here; components subscribe
/// for the span of their lifetime and unsubscribe explicitly. Cloning shares
/// the same bus.
#[derive(Clone, Default)]
pub struct InputBus {
    inner: Rc<RefCell<Listeners>>,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&KeyEvent) -> PassThrough + 'static,
    {
        let mut listeners = self.inner.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.slots.push(Slot {
            id,
            listener: Some(Box::new(listener)),
        });
        Subscription(id)
    }

    /// Removes a subscription. Unknown or already removed subscriptions are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) {
        let removed = {
            let mut listeners = self.inner.borrow_mut();
            listeners
                .slots
                .iter()
                .position(|s| s.id == subscription.0)
                .map(|idx| listeners.slots.remove(idx))
        };
        drop(removed);
    }

    pub fn is_subscribed(&self, subscription: Subscription) -> bool {
        self.inner
            .borrow()
            .slots
            .iter()
            .any(|s| s.id == subscription.0)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to subscribers in subscription order.
    ///
    /// Returns `Consume` if a subscriber consumed it; later subscribers are then
    /// skipped. Subscribers added during dispatch see the next event, not this one.
    pub fn dispatch(&self, event: &KeyEvent) -> PassThrough {
        let ids: Vec<u64> = self.inner.borrow().slots.iter().map(|s| s.id).collect();

        for id in ids {
            let Some(mut listener) = self.take_listener(id) else {
                continue;
            };

            let decision = listener(event);

            let leftover = {
                let mut listeners = self.inner.borrow_mut();
                match listeners.slots.iter_mut().find(|s| s.id == id) {
                    Some(slot) => {
                        slot.listener = Some(listener);
                        None
                    }
                    None => Some(listener),
                }
            };
            drop(leftover);

            if decision == PassThrough::Consume {
                log::trace!("{:?} consumed by subscription {id}", event.key);
                return PassThrough::Consume;
            }
        }

        PassThrough::Forward
    }

    fn take_listener(&self, id: u64) -> Option<Listener> {
        self.inner
            .borrow_mut()
            .slots
            .iter_mut()
            .find(|s| s.id == id)
            .and_then(|s| s.listener.take())
    }
}

impl std::fmt::Debug for InputBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    fn recorder(
        log: &Rc<RefCell<Vec<(&'static str, Key)>>>,
        name: &'static str,
        decision: PassThrough,
    ) -> impl FnMut(&KeyEvent) -> PassThrough + 'static {
        let log = log.clone();
        move |ev| {
            log.borrow_mut().push((name, ev.key));
            decision
        }
    }

    #[test]
    fn forward_reaches_every_subscriber_in_order() {
        let bus = InputBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(recorder(&log, "a", PassThrough::Forward));
        bus.subscribe(recorder(&log, "b", PassThrough::Forward));

        assert_eq!(bus.dispatch(&KeyEvent::press(Key::P)), PassThrough::Forward);
        assert_eq!(*log.borrow(), vec![("a", Key::P), ("b", Key::P)]);
    }

    #[test]
    fn consume_stops_delivery() {
        let bus = InputBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(recorder(&log, "a", PassThrough::Consume));
        bus.subscribe(recorder(&log, "b", PassThrough::Forward));

        assert_eq!(bus.dispatch(&KeyEvent::press(Key::Q)), PassThrough::Consume);
        assert_eq!(*log.borrow(), vec![("a", Key::Q)]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let bus = InputBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = bus.subscribe(recorder(&log, "a", PassThrough::Forward));
        let b = bus.subscribe(recorder(&log, "b", PassThrough::Forward));

        bus.unsubscribe(a);
        bus.unsubscribe(a);
        assert!(!bus.is_subscribed(a));
        assert!(bus.is_subscribed(b));

        bus.dispatch(&KeyEvent::press(Key::A));
        assert_eq!(*log.borrow(), vec![("b", Key::A)]);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let bus = InputBus::new();
        let hits = Rc::new(RefCell::new(0));
        let me: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let (b, h, m) = (bus.clone(), hits.clone(), me.clone());
        let sub = bus.subscribe(move |_| {
            *h.borrow_mut() += 1;
            if let Some(s) = *m.borrow() {
                b.unsubscribe(s);
            }
            PassThrough::Forward
        });
        *me.borrow_mut() = Some(sub);

        bus.dispatch(&KeyEvent::press(Key::A));
        bus.dispatch(&KeyEvent::press(Key::A));
        assert_eq!(*hits.borrow(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn dispatch_without_subscribers_forwards() {
        let bus = InputBus::new();
        assert_eq!(bus.dispatch(&KeyEvent::press(Key::Escape)), PassThrough::Forward);
    }
}
