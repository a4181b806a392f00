//! Real-time host on a tokio `LocalSet`
//!
//! Timers are local tasks sleeping on the tokio clock. There is no display
//! to sync with, so frames always use the fallback timer cadence.

use super::{Host, TimerCallback, TimerId};
use slotmap::SlotMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

type TaskMap = RefCell<SlotMap<TimerId, JoinHandle<()>>>;

/// Host backed by tokio timers
///
/// Must be used from inside a [`tokio::task::LocalSet`]: callbacks are not
/// `Send` and are spawned with [`tokio::task::spawn_local`].
pub struct TokioHost {
    origin: Instant,
    tasks: Rc<TaskMap>,
}

impl TokioHost {
    /// Create a host whose clock starts at zero now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            tasks: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    /// A shared trait-object handle to a new host
    pub fn shared() -> Rc<dyn Host> {
        Rc::new(Self::new())
    }

    /// Number of timers that have not fired yet
    pub fn pending_timers(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl Default for TokioHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TokioHost {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> TimerId {
        let deadline = Instant::now() + Duration::from_secs_f64(delay_ms.max(0.0) / 1000.0);
        let tasks: Weak<TaskMap> = Rc::downgrade(&self.tasks);

        self.tasks.borrow_mut().insert_with_key(|id| {
            tokio::task::spawn_local(async move {
                tokio::time::sleep_until(deadline).await;
                if let Some(tasks) = tasks.upgrade() {
                    tasks.borrow_mut().remove(id);
                }
                callback();
            })
        })
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(task) = self.tasks.borrow_mut().remove(id) {
            task.abort();
        }
    }
}

impl Drop for TokioHost {
    fn drop(&mut self) {
        for (_, task) in self.tasks.borrow_mut().drain() {
            task.abort();
        }
    }
}
