//! Deterministic headless host
//!
//! Time only moves when [`HeadlessHost::advance`] (or one of its siblings) is
//! called, which makes animation runs reproducible in tests and in the CLI.

use super::{fallback_frame, FrameCallback, FrameHandle, FrameId, Host, TimerCallback, TimerId};
use slotmap::SlotMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Smallest native frame interval the host accepts
const MIN_FRAME_INTERVAL_MS: f64 = 1.0;

/// How the headless host serves frame requests
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameMode {
    /// Frames fire on vsync boundaries every `interval_ms`
    Native { interval_ms: f64 },
    /// No native frames; requests become fallback timers
    Fallback,
}

impl Default for FrameMode {
    fn default() -> Self {
        FrameMode::Native { interval_ms: 16.0 }
    }
}

struct Timer {
    due: f64,
    seq: u64,
    callback: TimerCallback,
}

struct HeadlessState {
    now: f64,
    seq: u64,
    timers: SlotMap<TimerId, Timer>,
    frames: SlotMap<FrameId, FrameCallback>,
    frame_mode: FrameMode,
}

enum Event {
    Timer(TimerId),
    Frames,
}

/// A simulated clock with a timer queue and optional native frames
///
/// Cloning yields another handle to the same clock.
#[derive(Clone)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    /// Create a host at t=0 with 16ms native frames
    pub fn new() -> Self {
        Self::with_frame_mode(FrameMode::default())
    }

    /// Create a host at t=0 with the given frame mode
    pub fn with_frame_mode(frame_mode: FrameMode) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                now: 0.0,
                seq: 0,
                timers: SlotMap::with_key(),
                frames: SlotMap::with_key(),
                frame_mode: sanitize(frame_mode),
            })),
        }
    }

    /// Create a host with native frames every `interval_ms`
    pub fn with_frame_interval(interval_ms: f64) -> Self {
        Self::with_frame_mode(FrameMode::Native { interval_ms })
    }

    /// Create a host without native frames
    pub fn fallback() -> Self {
        Self::with_frame_mode(FrameMode::Fallback)
    }

    /// A shared trait-object handle to this host
    pub fn shared(&self) -> Rc<dyn Host> {
        Rc::new(self.clone())
    }

    /// The active frame mode
    pub fn frame_mode(&self) -> FrameMode {
        self.state.borrow().frame_mode
    }

    /// Change how future frame requests are served
    pub fn set_frame_mode(&self, frame_mode: FrameMode) {
        self.state.borrow_mut().frame_mode = sanitize(frame_mode);
    }

    /// Number of timers waiting to fire, fallback frames included
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Number of native frame callbacks waiting for the next vsync
    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// True when nothing is scheduled
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.timers.is_empty() && state.frames.is_empty()
    }

    /// Move the clock forward by `delta_ms`, firing everything due on the way
    pub fn advance(&self, delta_ms: f64) {
        let target = self.now() + delta_ms.max(0.0);
        self.advance_to(target);
    }

    /// Move the clock to `target_ms`, firing everything due on the way
    ///
    /// Events fire in time order. Timers due at the same instant as a vsync
    /// fire before the frame callbacks.
    pub fn advance_to(&self, target_ms: f64) {
        while let Some((at, event)) = self.next_event() {
            if at > target_ms {
                break;
            }
            self.fire(at, event);
        }

        let mut state = self.state.borrow_mut();
        if target_ms > state.now {
            state.now = target_ms;
        }
    }

    /// Fire events until nothing is scheduled or `limit_ms` of simulated time
    /// has passed. Returns true if the host went idle.
    pub fn run_until_idle(&self, limit_ms: f64) -> bool {
        let deadline = self.now() + limit_ms.max(0.0);
        while let Some((at, event)) = self.next_event() {
            if at > deadline {
                self.advance_to(deadline);
                return false;
            }
            self.fire(at, event);
        }
        true
    }

    fn next_event(&self) -> Option<(f64, Event)> {
        let state = self.state.borrow();

        let timer = state
            .timers
            .iter()
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(id, timer)| (timer.due, Event::Timer(id)));

        let frames = if state.frames.is_empty() {
            None
        } else {
            let interval = match state.frame_mode {
                FrameMode::Native { interval_ms } => interval_ms,
                // Frames requested before switching modes still need a vsync
                FrameMode::Fallback => super::FALLBACK_FRAME_MS,
            };
            Some((next_vsync(state.now, interval), Event::Frames))
        };

        match (timer, frames) {
            (Some(timer), Some(frames)) => {
                if timer.0 <= frames.0 {
                    Some(timer)
                } else {
                    Some(frames)
                }
            }
            (timer, frames) => timer.or(frames),
        }
    }

    fn fire(&self, at: f64, event: Event) {
        match event {
            Event::Timer(id) => {
                let timer = {
                    let mut state = self.state.borrow_mut();
                    state.now = state.now.max(at);
                    state.timers.remove(id)
                };
                if let Some(timer) = timer {
                    tracing::trace!(due = timer.due, "headless timer fired");
                    (timer.callback)();
                }
            }
            Event::Frames => {
                // Only frames requested before this vsync run now; requests
                // made by these callbacks wait for the next one.
                let batch: Vec<FrameId> = {
                    let mut state = self.state.borrow_mut();
                    state.now = state.now.max(at);
                    state.frames.keys().collect()
                };
                for id in batch {
                    let callback = self.state.borrow_mut().frames.remove(id);
                    if let Some(callback) = callback {
                        callback(at);
                    }
                }
            }
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for HeadlessHost {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.seq += 1;
        let timer = Timer {
            due: state.now + delay_ms.max(0.0),
            seq: state.seq,
            callback,
        };
        state.timers.insert(timer)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state.borrow_mut().timers.remove(id);
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let frame_mode = self.state.borrow().frame_mode;
        match frame_mode {
            FrameMode::Native { .. } => {
                FrameHandle::Native(self.state.borrow_mut().frames.insert(callback))
            }
            FrameMode::Fallback => fallback_frame(self, callback),
        }
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        match handle {
            FrameHandle::Native(id) => {
                self.state.borrow_mut().frames.remove(id);
            }
            FrameHandle::Timer(id) => self.clear_timeout(id),
        }
    }
}

fn sanitize(frame_mode: FrameMode) -> FrameMode {
    match frame_mode {
        FrameMode::Native { interval_ms } if !(interval_ms >= MIN_FRAME_INTERVAL_MS) => {
            FrameMode::Native {
                interval_ms: MIN_FRAME_INTERVAL_MS,
            }
        }
        mode => mode,
    }
}

/// First vsync boundary strictly after `now`
fn next_vsync(now: f64, interval: f64) -> f64 {
    let next = ((now / interval).floor() + 1.0) * interval;
    if next <= now {
        next + interval
    } else {
        next
    }
}
