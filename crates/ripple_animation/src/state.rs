//! Per-run animation state

/// Mutable record for one animation run
///
/// Created when a run starts stepping and handed to the motion's step
/// function on every frame. `custom` holds motion-specific fields such as a
/// spring's velocity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationState<S = ()> {
    /// Set by the step function once the run has reached its target
    pub is_done: bool,
    /// Progress toward the target, usually in `[0, 1]`
    pub progress: f64,
    /// Host time when stepping began (ms)
    pub time_start: f64,
    /// Host time of the current step (ms)
    pub time_current: f64,
    /// `time_current - time_start` (ms)
    pub time_elapsed: f64,
    /// Time since the previous step (ms)
    pub time_delta: f64,
    pub custom: S,
}

impl<S: Default> AnimationState<S> {
    /// Fresh state for a run starting at `now`
    pub fn new(now: f64) -> Self {
        Self {
            is_done: false,
            progress: 0.0,
            time_start: now,
            time_current: now,
            time_elapsed: 0.0,
            time_delta: 0.0,
            custom: S::default(),
        }
    }

    /// Move the clock to `now` and refresh the derived timings
    pub(crate) fn tick(&mut self, now: f64) {
        self.time_delta = now - self.time_current;
        self.time_current = now;
        self.time_elapsed = now - self.time_start;
    }
}

/// Lifecycle of the most recent run of an animated value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing has been requested yet
    #[default]
    Idle,
    /// Waiting out the configured delay
    Delayed,
    /// Stepping on every frame
    Running,
    /// Reached the target
    Done,
    /// Torn down before finishing
    Superseded,
}

impl RunPhase {
    /// True while the run may still write to the output
    pub fn is_active(&self) -> bool {
        matches!(self, RunPhase::Delayed | RunPhase::Running)
    }
}
