//! Debounced values

use crate::host::{Host, TimerId};
use crate::store::{Readable, Store, Subscription};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct DebounceState<T> {
    host: Rc<dyn Host>,
    wait_ms: f64,
    timer: Option<TimerId>,
    pending: Option<T>,
}

/// A value that follows its source once the source has been quiet for a while
pub struct Debounced<T> {
    output: Store<T>,
    state: Rc<RefCell<DebounceState<T>>>,
    _upstream: Subscription,
}

/// Follow `source`, committing a change only after `wait_ms` without
/// further changes
pub fn debounced<T: Clone + 'static>(
    host: Rc<dyn Host>,
    source: &impl Readable<T>,
    wait_ms: f64,
) -> Debounced<T> {
    let output = Store::new(source.get());
    let state = Rc::new(RefCell::new(DebounceState {
        host,
        wait_ms,
        timer: None,
        pending: None,
    }));

    let weak = Rc::downgrade(&state);
    let sink = output.clone();
    let upstream = source.subscribe(Box::new(move |value: &T| {
        if let Some(state) = weak.upgrade() {
            restart(&state, &sink, value.clone());
        }
    }));

    Debounced {
        output,
        state,
        _upstream: upstream,
    }
}

fn restart<T: Clone + 'static>(state_rc: &Rc<RefCell<DebounceState<T>>>, sink: &Store<T>, value: T) {
    let mut state = state_rc.borrow_mut();
    if let Some(id) = state.timer.take() {
        state.host.clear_timeout(id);
    }
    state.pending = Some(value);

    let weak: Weak<RefCell<DebounceState<T>>> = Rc::downgrade(state_rc);
    let sink = sink.clone();
    let id = state.host.set_timeout(
        state.wait_ms,
        Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let pending = {
                let mut state = state.borrow_mut();
                state.timer = None;
                state.pending.take()
            };
            if let Some(value) = pending {
                sink.set(value);
            }
        }),
    );
    state.timer = Some(id);
}

impl<T: Clone + 'static> Debounced<T> {
    /// Current settled value
    pub fn get(&self) -> T {
        self.output.get()
    }

    /// Whether a change is waiting for the quiet period to end
    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Commit a waiting change immediately
    pub fn flush(&self) {
        let pending = {
            let mut state = self.state.borrow_mut();
            if let Some(id) = state.timer.take() {
                state.host.clear_timeout(id);
            }
            state.pending.take()
        };
        if let Some(value) = pending {
            self.output.set(value);
        }
    }

    /// Register a callback for settled changes
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.output.subscribe(callback)
    }
}

impl<T: Clone + 'static> Readable<T> for Debounced<T> {
    fn get(&self) -> T {
        self.output.get()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        Readable::subscribe(&self.output, callback)
    }
}

impl<T> Drop for Debounced<T> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if let Some(id) = state.timer.take() {
                state.host.clear_timeout(id);
            }
        }
    }
}
