//! Filtered values

use crate::store::{Readable, Store, Subscription};

/// The most recent source value that satisfied a predicate
pub struct Filtered<T> {
    output: Store<T>,
    _upstream: Subscription,
}

/// Keep only source values for which `predicate` holds
///
/// Starts with the source's current value if it passes, otherwise with
/// `fallback`. Rejected changes leave the output untouched and notify nobody.
pub fn filtered<T, P>(source: &impl Readable<T>, predicate: P, fallback: T) -> Filtered<T>
where
    T: Clone + 'static,
    P: Fn(&T) -> bool + 'static,
{
    let current = source.get();
    let initial = if predicate(&current) { current } else { fallback };
    let output = Store::new(initial);

    let sink = output.clone();
    let upstream = source.subscribe(Box::new(move |value: &T| {
        if predicate(value) {
            sink.set(value.clone());
        }
    }));

    Filtered {
        output,
        _upstream: upstream,
    }
}

impl<T: Clone + 'static> Filtered<T> {
    /// Latest accepted value
    pub fn get(&self) -> T {
        self.output.get()
    }

    /// Register a callback for accepted values
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.output.subscribe(callback)
    }
}

impl<T: Clone + 'static> Readable<T> for Filtered<T> {
    fn get(&self) -> T {
        self.output.get()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        Readable::subscribe(&self.output, callback)
    }
}
