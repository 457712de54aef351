#![forbid(unsafe_code)]

//! Observer lists with RAII subscriptions.
//!
//! # Design
//!
//! An observer list stores subscriber callbacks as `Weak` references; the
//! matching strong `Rc` lives in the [`Subscription`] guard handed back to the
//! caller. Dropping the guard unsubscribes. Dead entries are pruned lazily
//! the next time the list fires.
//!
//! Lists are `Rc`-based and therefore `!Send`: a widget that owns one is
//! confined to the UI thread that created it.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. A callback whose guard was dropped is never called again.
//! 3. Subscribing from inside a callback is allowed; the new subscriber is
//!    first called on the next notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

type ChangeCallback<S> = dyn Fn(&S);
type PropertyCallback<S, T> = dyn Fn(&S, &T, &T);

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` makes the callback unreachable.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Keep the callback alive for the rest of the program.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Shared subscriber storage.
struct Subscribers<F: ?Sized> {
    list: RefCell<Vec<Weak<F>>>,
}

impl<F: ?Sized + 'static> Subscribers<F> {
    fn new() -> Self {
        Self {
            list: RefCell::new(Vec::new()),
        }
    }

    fn add(&self, strong: Rc<F>) -> Subscription {
        self.list.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Prune dead entries and return the live callbacks.
    fn live(&self) -> Vec<Rc<F>> {
        let mut list = self.list.borrow_mut();
        list.retain(|weak| weak.strong_count() > 0);
        list.iter().filter_map(Weak::upgrade).collect()
    }

    fn len(&self) -> usize {
        self.list
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Observers notified that a source object changed.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use sprig_core::ChangeObservers;
///
/// let observers = ChangeObservers::<&str>::new();
/// let hits = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&hits);
/// let subscription = observers.subscribe(move |_| counter.set(counter.get() + 1));
///
/// observers.notify(&"source");
/// drop(subscription);
/// observers.notify(&"source");
/// assert_eq!(hits.get(), 1);
/// ```
pub struct ChangeObservers<S> {
    subscribers: Subscribers<ChangeCallback<S>>,
}

impl<S: 'static> ChangeObservers<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Subscribers::new(),
        }
    }

    /// Register `callback`; it runs until the returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&S) + 'static) -> Subscription {
        let strong: Rc<ChangeCallback<S>> = Rc::new(callback);
        self.subscribers.add(strong)
    }

    /// Call every live subscriber with `source`.
    pub fn notify(&self, source: &S) {
        let callbacks = self.subscribers.live();
        trace!(subscribers = callbacks.len(), "change observers notified");
        for callback in &callbacks {
            callback(source);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: 'static> Default for ChangeObservers<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> fmt::Debug for ChangeObservers<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeObservers")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Observers notified with the old and new value of a property.
pub struct PropertyObservers<S, T> {
    subscribers: Subscribers<PropertyCallback<S, T>>,
}

impl<S: 'static, T: 'static> PropertyObservers<S, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Subscribers::new(),
        }
    }

    /// Register `callback(source, old, new)`.
    pub fn subscribe(&self, callback: impl Fn(&S, &T, &T) + 'static) -> Subscription {
        let strong: Rc<PropertyCallback<S, T>> = Rc::new(callback);
        self.subscribers.add(strong)
    }

    /// Call every live subscriber with the transition `old -> new`.
    pub fn notify(&self, source: &S, old: &T, new: &T) {
        let callbacks = self.subscribers.live();
        trace!(subscribers = callbacks.len(), "property observers notified");
        for callback in &callbacks {
            callback(source, old, new);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: 'static, T: 'static> Default for PropertyObservers<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static, T: 'static> fmt::Debug for PropertyObservers<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyObservers")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn notifies_in_registration_order() {
        let observers = ChangeObservers::<u8>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = {
            let log = Rc::clone(&log);
            observers.subscribe(move |v| log.borrow_mut().push(("a", *v)))
        };
        let b = {
            let log = Rc::clone(&log);
            observers.subscribe(move |v| log.borrow_mut().push(("b", *v)))
        };
        observers.notify(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
        drop((a, b));
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let observers = ChangeObservers::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let sub = {
            let hits = Rc::clone(&hits);
            observers.subscribe(move |_| hits.set(hits.get() + 1))
        };
        assert_eq!(observers.len(), 1);
        drop(sub);
        assert!(observers.is_empty());
        observers.notify(&());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn detached_subscription_stays_alive() {
        let observers = ChangeObservers::<()>::new();
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            observers
                .subscribe(move |_| hits.set(hits.get() + 1))
                .detach();
        }
        observers.notify(&());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn property_observers_receive_old_and_new() {
        let observers = PropertyObservers::<&str, Option<u32>>::new();
        let seen = Rc::new(RefCell::new(None));
        let _sub = {
            let seen = Rc::clone(&seen);
            observers.subscribe(move |src, old, new| {
                *seen.borrow_mut() = Some((src.to_string(), *old, *new));
            })
        };
        observers.notify(&"focus", &None, &Some(3));
        assert_eq!(
            *seen.borrow(),
            Some(("focus".to_string(), None, Some(3)))
        );
    }
}
