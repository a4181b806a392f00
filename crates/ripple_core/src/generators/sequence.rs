//! Sequence cursors

use crate::error::{CoreError, Result};
use crate::store::{Readable, Store, Subscription};

/// A cursor over a fixed, non-empty list
///
/// The current item is reactive; moving the cursor notifies subscribers.
/// With `wrap` the cursor cycles past either end, otherwise it stops there.
pub struct Sequence<T> {
    items: Vec<T>,
    index: usize,
    wrap: bool,
    current: Store<T>,
}

impl<T: Clone + 'static> Sequence<T> {
    /// Create a cursor at the first item
    pub fn new(items: Vec<T>, wrap: bool) -> Result<Self> {
        let first = items.first().cloned().ok_or(CoreError::EmptySequence)?;
        Ok(Self {
            items,
            index: 0,
            wrap,
            current: Store::new(first),
        })
    }

    /// Current position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; sequences are never empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the cursor wraps around at the ends
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// The current item
    pub fn current(&self) -> &T {
        &self.items[self.index]
    }

    /// All items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// True on the first item
    pub fn is_at_start(&self) -> bool {
        self.index == 0
    }

    /// True on the last item
    pub fn is_at_end(&self) -> bool {
        self.index + 1 == self.items.len()
    }

    /// Move forward one item
    pub fn advance(&mut self) -> &T {
        let next = if self.is_at_end() {
            if self.wrap {
                0
            } else {
                self.index
            }
        } else {
            self.index + 1
        };
        self.move_to(next);
        self.current()
    }

    /// Move back one item
    pub fn retreat(&mut self) -> &T {
        let prev = if self.is_at_start() {
            if self.wrap {
                self.items.len() - 1
            } else {
                self.index
            }
        } else {
            self.index - 1
        };
        self.move_to(prev);
        self.current()
    }

    /// Jump to `index`. Returns false and stays put when out of range.
    pub fn seek(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.move_to(index);
        true
    }

    /// Return to the first item
    pub fn reset(&mut self) {
        self.move_to(0);
    }

    /// Register a callback for cursor moves
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.current.subscribe(callback)
    }

    fn move_to(&mut self, index: usize) {
        if index == self.index {
            return;
        }
        self.index = index;
        self.current.set(self.items[index].clone());
    }
}

impl<T: Clone + 'static> Readable<T> for Sequence<T> {
    fn get(&self) -> T {
        self.current.get()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        Readable::subscribe(&self.current, callback)
    }
}
