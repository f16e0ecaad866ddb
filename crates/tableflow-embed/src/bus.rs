//! Single-threaded message bus standing in for the host window.
//!
//! [`MessageBus`] fans every posted JSON message out to each registered
//! listener. It is cheap to clone; clones share the same listener registry.
//! Posting from inside a listener never recurses: the message is queued and
//! delivered by the dispatch loop that is already running.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Handle returned by [`MessageBus::subscribe`].
pub type ListenerId = u64;

type Listener = Rc<RefCell<dyn FnMut(&Value)>>;

#[derive(Default)]
struct BusInner {
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    queue: RefCell<VecDeque<Value>>,
    dispatching: Cell<bool>,
    next_id: Cell<ListenerId>,
}

#[derive(Clone, Default)]
pub struct MessageBus {
    inner: Rc<BusInner>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a message to every listener registered at delivery time.
    pub fn post(&self, message: Value) {
        self.inner.queue.borrow_mut().push_back(message);
        if self.inner.dispatching.get() {
            return;
        }

        self.inner.dispatching.set(true);
        let _guard = DispatchGuard(&self.inner);

        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(message) = next else {
                break;
            };

            let snapshot: Vec<(ListenerId, Listener)> = self.inner.listeners.borrow().clone();
            for (id, listener) in snapshot {
                // A listener removed by an earlier one in this round is skipped.
                if !self.is_registered(id) {
                    continue;
                }
                let Ok(mut callback) = listener.try_borrow_mut() else {
                    continue;
                };
                (&mut *callback)(&message);
            }
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub(crate) fn subscribe(&self, listener: impl FnMut(&Value) + 'static) -> ListenerId {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener. Returns false when it was already gone.
    pub(crate) fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.inner
            .listeners
            .borrow()
            .iter()
            .any(|(listener_id, _)| *listener_id == id)
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("listeners", &self.listener_count())
            .field("queued", &self.inner.queue.borrow().len())
            .field("dispatching", &self.inner.dispatching.get())
            .finish()
    }
}

/// Ends a dispatch round. Messages still queued when a listener panics are
/// dropped so the next post starts from an empty queue.
struct DispatchGuard<'a>(&'a BusInner);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.dispatching.set(false);
        self.0.queue.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fans_out_to_every_listener() {
        let bus = MessageBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |message| seen.borrow_mut().push((tag, message.clone())));
        }
        bus.post(json!(1));

        assert_eq!(*seen.borrow(), vec![("a", json!(1)), ("b", json!(1))]);
    }

    #[test]
    fn nested_posts_are_delivered_after_the_current_message() {
        let bus = MessageBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner_bus = bus.clone();
        let record = Rc::clone(&seen);
        bus.subscribe(move |message| {
            record.borrow_mut().push(message.clone());
            if message == &json!("first") {
                inner_bus.post(json!("second"));
            }
        });
        bus.post(json!("first"));

        assert_eq!(*seen.borrow(), vec![json!("first"), json!("second")]);
    }

    #[test]
    fn panicking_listener_discards_pending_messages() {
        let bus = MessageBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner_bus = bus.clone();
        let record = Rc::clone(&seen);
        bus.subscribe(move |message| {
            record.borrow_mut().push(message.clone());
            if message == &json!("first") {
                inner_bus.post(json!("second"));
                panic!("listener failed");
            }
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            bus.post(json!("first"));
        }));
        assert!(result.is_err());

        bus.post(json!("third"));
        assert_eq!(*seen.borrow(), vec![json!("first"), json!("third")]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let bus = MessageBus::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.listener_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 0);
    }
}
