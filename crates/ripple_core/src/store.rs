//! Reactive stores
//!
//! A [`Store`] is a shared, single-threaded value cell. Writing to it notifies
//! every subscriber synchronously. Stores are cheap handles: cloning a store
//! clones the handle, not the value.
//!
//! Subscribers are only told about *changes*; subscribing does not replay the
//! current value. Read it with [`Readable::get`] first if needed.
//!
//! # Re-entrancy
//!
//! A subscriber may write to the store it is observing. The write lands
//! immediately, and once the current notification pass finishes every
//! subscriber is notified again with the latest value. Callbacks are never
//! invoked recursively.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

new_key_type! {
    /// Identifier for a store subscriber
    pub struct SubscriberId;
}

type Callback<T> = Rc<RefCell<Box<dyn FnMut(&T)>>>;

/// A value that can be read synchronously and observed for changes
pub trait Readable<T> {
    /// Get a copy of the current value
    fn get(&self) -> T;

    /// Register a callback invoked after every change
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped.
    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription;
}

/// Handle to a registered subscriber
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `unsubscribe` when released
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription with nothing to release
    pub fn empty() -> Self {
        Self { unsubscribe: None }
    }

    /// Unsubscribe now
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the subscriber registered for the lifetime of the source
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

struct Shared<T> {
    value: RefCell<T>,
    subscribers: RefCell<SlotMap<SubscriberId, Callback<T>>>,
    /// Set while a notification pass is running
    notifying: Cell<bool>,
    /// Set when the value changed during a notification pass
    dirty: Cell<bool>,
}

/// A writable reactive value
pub struct Store<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Clone + 'static> Store<T> {
    /// Create a store holding `value`
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                subscribers: RefCell::new(SlotMap::with_key()),
                notifying: Cell::new(false),
                dirty: Cell::new(false),
            }),
        }
    }

    /// Get a copy of the current value
    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Borrow the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.value.borrow())
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        *self.shared.value.borrow_mut() = value;
        self.notify();
    }

    /// Compute the next value from the current one and notify subscribers
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with(f);
        self.set(next);
    }

    /// Register a change callback
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.subscribe_boxed(Box::new(callback))
    }

    /// A handle that can read and observe this store but not write to it
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly {
            store: self.clone(),
        }
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    fn subscribe_boxed(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        let id = self
            .shared
            .subscribers
            .borrow_mut()
            .insert(Rc::new(RefCell::new(callback)));

        let weak: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.subscribers.borrow_mut().remove(id);
            }
        })
    }

    fn notify(&self) {
        let shared = &self.shared;
        if shared.notifying.replace(true) {
            // An outer pass is running; it will pick up the latest value.
            shared.dirty.set(true);
            return;
        }

        loop {
            shared.dirty.set(false);

            let snapshot: SmallVec<[(SubscriberId, Callback<T>); 4]> = shared
                .subscribers
                .borrow()
                .iter()
                .map(|(id, callback)| (id, Rc::clone(callback)))
                .collect();
            let value = self.get();

            for (id, callback) in snapshot {
                // Skip subscribers removed earlier in this pass
                if !shared.subscribers.borrow().contains_key(id) {
                    continue;
                }
                match callback.try_borrow_mut() {
                    Ok(mut callback) => (&mut **callback)(&value),
                    Err(_) => tracing::warn!("store subscriber is already running, skipping"),
                }
            }

            if !shared.dirty.get() {
                break;
            }
        }

        shared.notifying.set(false);
    }
}

impl<T: Default + Clone + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("value", &*self.shared.value.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T: Clone + 'static> Readable<T> for Store<T> {
    fn get(&self) -> T {
        Store::get(self)
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        self.subscribe_boxed(callback)
    }
}

/// Read-only view of a [`Store`]
pub struct ReadOnly<T> {
    store: Store<T>,
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: Clone + 'static> ReadOnly<T> {
    /// Get a copy of the current value
    pub fn get(&self) -> T {
        self.store.get()
    }

    /// Borrow the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.store.with(f)
    }

    /// Register a change callback
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.store.subscribe(callback)
    }
}

impl<T: Clone + 'static> Readable<T> for ReadOnly<T> {
    fn get(&self) -> T {
        self.store.get()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        self.store.subscribe_boxed(callback)
    }
}

/// A read-only value computed from another readable
///
/// The mapping runs once on creation and again after every source change.
pub struct Derived<T> {
    output: Store<T>,
    _upstream: Subscription,
}

/// Map a readable through `f`
pub fn derived<S, T, F>(source: &impl Readable<S>, f: F) -> Derived<T>
where
    S: 'static,
    T: Clone + 'static,
    F: Fn(&S) -> T + 'static,
{
    let output = Store::new(f(&source.get()));
    let sink = output.clone();
    let upstream = source.subscribe(Box::new(move |value: &S| sink.set(f(value))));

    Derived {
        output,
        _upstream: upstream,
    }
}

impl<T: Clone + 'static> Derived<T> {
    /// Get a copy of the current value
    pub fn get(&self) -> T {
        self.output.get()
    }

    /// Register a change callback
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.output.subscribe(callback)
    }
}

impl<T: Clone + 'static> Readable<T> for Derived<T> {
    fn get(&self) -> T {
        self.output.get()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        self.output.subscribe_boxed(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = Store::new(1);
        assert_eq!(store.get(), 1);

        store.set(2);
        assert_eq!(store.get(), 2);

        store.update(|n| n * 10);
        assert_eq!(store.get(), 20);
    }

    #[test]
    fn test_subscribe_notifies_on_change_only() {
        let store = Store::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _sub = store.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        // Subscribing does not replay the current value
        assert!(seen.borrow().is_empty());

        store.set(1);
        store.set(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_drop_subscription_unsubscribes() {
        let store = Store::new(0);
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let sub = store.subscribe(move |_| count_clone.set(count_clone.get() + 1));
        assert_eq!(store.subscriber_count(), 1);

        store.set(1);
        drop(sub);
        store.set(2);

        assert_eq!(count.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_detached_subscription_stays_registered() {
        let store = Store::new(0);
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        store
            .subscribe(move |_| count_clone.set(count_clone.get() + 1))
            .detach();

        store.set(1);
        store.set(2);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_reentrant_set_renotifies_with_latest_value() {
        let store = Store::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        // Clamp anything above 10 back down to 10 from inside a subscriber
        let clamp_store = store.clone();
        let _clamp = store.subscribe(move |v| {
            if *v > 10 {
                clamp_store.set(10);
            }
        });

        let seen_clone = seen.clone();
        let _observer = store.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        store.set(42);

        assert_eq!(store.get(), 10);
        // First pass sees the raw write, second pass sees the clamped value
        assert_eq!(*seen.borrow(), vec![42, 10]);
    }

    #[test]
    fn test_unsubscribe_during_notification_skips_callback() {
        let store = Store::new(0);
        let late_calls = Rc::new(Cell::new(0));

        let late_sub: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let late_sub_clone = late_sub.clone();
        let _first = store.subscribe(move |_| {
            late_sub_clone.borrow_mut().take();
        });

        let late_calls_clone = late_calls.clone();
        *late_sub.borrow_mut() =
            Some(store.subscribe(move |_| late_calls_clone.set(late_calls_clone.get() + 1)));

        store.set(1);
        assert_eq!(late_calls.get(), 0);
    }

    #[test]
    fn test_read_only_view_observes_writes() {
        let store = Store::new("a".to_string());
        let reader = store.read_only();
        let seen = Rc::new(RefCell::new(String::new()));
        let seen_clone = seen.clone();

        let _sub = reader.subscribe(move |v: &String| *seen_clone.borrow_mut() = v.clone());
        store.set("b".to_string());

        assert_eq!(reader.get(), "b");
        assert_eq!(*seen.borrow(), "b");
    }

    #[test]
    fn test_derived_tracks_source() {
        let source = Store::new(3);
        let squared = derived(&source, |n| n * n);
        assert_eq!(squared.get(), 9);

        source.set(4);
        assert_eq!(squared.get(), 16);

        drop(squared);
        assert_eq!(source.subscriber_count(), 0);
    }
}
