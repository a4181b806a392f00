//! Clock-driven values

use crate::error::{CoreError, Result};
use crate::host::{Host, TimerId};
use crate::store::{Readable, Store, Subscription};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct IntervalState {
    host: Rc<dyn Host>,
    period_ms: f64,
    timer: Option<TimerId>,
}

/// A counter that increments every period
///
/// Stops when dropped.
pub struct Interval {
    count: Store<u64>,
    state: Rc<RefCell<IntervalState>>,
}

/// Start a counter that ticks every `period_ms`
pub fn interval(host: Rc<dyn Host>, period_ms: f64) -> Result<Interval> {
    if !(period_ms > 0.0) {
        return Err(CoreError::InvalidPeriod(period_ms));
    }

    let interval = Interval {
        count: Store::new(0),
        state: Rc::new(RefCell::new(IntervalState {
            host,
            period_ms,
            timer: None,
        })),
    };
    arm(&interval.state, &interval.count);
    Ok(interval)
}

fn arm(state: &Rc<RefCell<IntervalState>>, count: &Store<u64>) {
    let (host, period_ms) = {
        let state = state.borrow();
        (Rc::clone(&state.host), state.period_ms)
    };

    let weak: Weak<RefCell<IntervalState>> = Rc::downgrade(state);
    let count_sink = count.clone();
    let id = host.set_timeout(
        period_ms,
        Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.borrow_mut().timer = None;
            // Re-arm first so subscribers that stop the interval win
            arm(&state, &count_sink);
            count_sink.update(|n| n + 1);
        }),
    );
    state.borrow_mut().timer = Some(id);
}

impl Interval {
    /// Ticks elapsed so far
    pub fn count(&self) -> u64 {
        self.count.get()
    }

    /// Whether another tick is scheduled
    pub fn is_running(&self) -> bool {
        self.state.borrow().timer.is_some()
    }

    /// Stop ticking. The count keeps its last value.
    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.timer.take() {
            state.host.clear_timeout(id);
        }
    }

    /// Register a callback for every tick
    pub fn subscribe(&self, callback: impl FnMut(&u64) + 'static) -> Subscription {
        self.count.subscribe(callback)
    }
}

impl Readable<u64> for Interval {
    fn get(&self) -> u64 {
        self.count.get()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&u64)>) -> Subscription {
        Readable::subscribe(&self.count, callback)
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if let Some(id) = state.timer.take() {
                state.host.clear_timeout(id);
            }
        }
    }
}

/// A flag that becomes `true` once after a delay
///
/// Cancelled when dropped.
pub struct Timeout {
    elapsed: Store<bool>,
    host: Rc<dyn Host>,
    timer: Rc<RefCell<Option<TimerId>>>,
}

/// Start a one-shot timer flag
pub fn timeout(host: Rc<dyn Host>, delay_ms: f64) -> Timeout {
    let elapsed = Store::new(false);
    let timer = Rc::new(RefCell::new(None));

    let sink = elapsed.clone();
    let slot = Rc::downgrade(&timer);
    let id = host.set_timeout(
        delay_ms,
        Box::new(move || {
            if let Some(slot) = slot.upgrade() {
                slot.borrow_mut().take();
            }
            sink.set(true);
        }),
    );
    *timer.borrow_mut() = Some(id);

    Timeout {
        elapsed,
        host,
        timer,
    }
}

impl Timeout {
    /// Whether the delay has passed
    pub fn is_elapsed(&self) -> bool {
        self.elapsed.get()
    }

    /// Whether the timer is still waiting
    pub fn is_pending(&self) -> bool {
        self.timer.borrow().is_some()
    }

    /// Cancel the timer; the flag stays `false` if it had not fired
    pub fn cancel(&self) {
        if let Some(id) = self.timer.borrow_mut().take() {
            self.host.clear_timeout(id);
        }
    }

    /// Register a callback for when the flag flips
    pub fn subscribe(&self, callback: impl FnMut(&bool) + 'static) -> Subscription {
        self.elapsed.subscribe(callback)
    }
}

impl Readable<bool> for Timeout {
    fn get(&self) -> bool {
        self.elapsed.get()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&bool)>) -> Subscription {
        Readable::subscribe(&self.elapsed, callback)
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use std::cell::Cell;

    #[test]
    fn test_interval_counts_ticks() {
        let host = HeadlessHost::new();
        let ticker = interval(host.shared(), 100.0).unwrap();

        host.advance(350.0);
        assert_eq!(ticker.count(), 3);
        assert!(ticker.is_running());
    }

    #[test]
    fn test_interval_rejects_bad_period() {
        let host = HeadlessHost::new();
        assert_eq!(
            interval(host.shared(), 0.0).err(),
            Some(CoreError::InvalidPeriod(0.0))
        );
        assert!(interval(host.shared(), f64::NAN).is_err());
    }

    #[test]
    fn test_interval_stop_and_drop_clear_timer() {
        let host = HeadlessHost::new();
        let ticker = interval(host.shared(), 10.0).unwrap();
        host.advance(25.0);
        ticker.stop();
        host.advance(100.0);
        assert_eq!(ticker.count(), 2);
        assert!(host.is_idle());

        let dropped = interval(host.shared(), 10.0).unwrap();
        assert_eq!(host.pending_timers(), 1);
        drop(dropped);
        assert!(host.is_idle());
    }

    #[test]
    fn test_interval_stopped_from_subscriber() {
        let host = HeadlessHost::new();
        let ticker = Rc::new(interval(host.shared(), 10.0).unwrap());

        let weak = Rc::downgrade(&ticker);
        let _sub = ticker.subscribe(move |n| {
            if *n == 2 {
                if let Some(ticker) = weak.upgrade() {
                    ticker.stop();
                }
            }
        });

        host.advance(100.0);
        assert_eq!(ticker.count(), 2);
        assert!(!ticker.is_running());
    }

    #[test]
    fn test_timeout_flips_once() {
        let host = HeadlessHost::new();
        let flag = timeout(host.shared(), 50.0);
        let flips = Rc::new(Cell::new(0));

        let flips_clone = flips.clone();
        let _sub = flag.subscribe(move |_| flips_clone.set(flips_clone.get() + 1));

        host.advance(49.0);
        assert!(!flag.is_elapsed());
        assert!(flag.is_pending());

        host.advance(1.0);
        assert!(flag.is_elapsed());
        assert!(!flag.is_pending());
        assert_eq!(flips.get(), 1);
    }

    #[test]
    fn test_timeout_cancel() {
        let host = HeadlessHost::new();
        let flag = timeout(host.shared(), 50.0);
        flag.cancel();
        host.advance(100.0);
        assert!(!flag.get());
        assert!(host.is_idle());
    }
}
