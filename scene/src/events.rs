//! Ordered publish/subscribe lists.
//!
//! Listeners are kept in registration order and live as long as the list.
//! There is no unsubscribe. `publish` delivers to a snapshot of the list taken
//! when it starts, so a listener registered from inside a callback first hears
//! the next value, and nothing stays borrowed while callbacks run.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::RefCell;
use std::rc::Rc;

type Listener<T> = Rc<dyn Fn(&T)>;

/// Insertion-ordered listener list. Clones share the same list.
pub struct Subscribers<T> {
    listeners: Rc<RefCell<Vec<Listener<T>>>>,
}

impl<T> Subscribers<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { listeners: Rc::new(RefCell::new(Vec::new())) }
    }

    /// Append a listener. It receives every value published from now on.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Deliver `value` to every listener in registration order.
    ///
    /// Returns the number of listeners invoked.
    pub fn publish(&self, value: &T) -> usize {
        let listeners: Vec<Listener<T>> = self.listeners.borrow().clone();
        for listener in &listeners {
            listener(value);
        }
        listeners.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self { listeners: Rc::clone(&self.listeners) }
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}
