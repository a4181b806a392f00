//! Spring physics
//!
//! Progress is simulated as a damped spring pulling toward 1, integrated
//! with semi-implicit Euler using the real time between frames.

use crate::motion::{Motion, MotionOptions, Overrides};
use crate::state::AnimationState;
use serde::{Deserialize, Serialize};

/// Spring motion
#[derive(Clone, Copy, Debug, Default)]
pub struct Spring;

/// Spring-specific run state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpringState {
    /// Progress units per second
    pub velocity: f64,
}

/// Spring options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringOptions {
    /// Delay before the spring starts (ms)
    pub delay: f64,
    pub stiffness: f64,
    pub damping: f64,
    /// Settling threshold for both distance and velocity
    pub precision: f64,
    /// Reflect instead of overshooting the target
    pub clamp: bool,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            stiffness: 100.0,
            damping: 10.0,
            precision: 0.001,
            clamp: false,
        }
    }
}

impl SpringOptions {
    /// Create a spring with custom parameters
    pub fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness,
            damping,
            ..Default::default()
        }
    }

    /// Gentle, slow spring
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0)
    }

    /// Snappy, responsive spring
    pub fn snappy() -> Self {
        Self::new(300.0, 20.0)
    }

    /// Stiff, quick spring with minimal overshoot
    pub fn stiff() -> Self {
        Self::new(400.0, 30.0)
    }

    /// Wobbly, bouncy spring
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0)
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }
}

/// Partial [`SpringOptions`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpringOverrides {
    pub delay: Option<f64>,
    pub stiffness: Option<f64>,
    pub damping: Option<f64>,
    pub precision: Option<f64>,
    pub clamp: Option<bool>,
}

impl SpringOverrides {
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = Some(stiffness);
        self
    }

    pub fn damping(mut self, damping: f64) -> Self {
        self.damping = Some(damping);
        self
    }

    pub fn precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn clamp(mut self, clamp: bool) -> Self {
        self.clamp = Some(clamp);
        self
    }
}

impl MotionOptions for SpringOptions {
    type Overrides = SpringOverrides;

    fn delay(&self) -> f64 {
        self.delay
    }

    fn apply(&mut self, overrides: &SpringOverrides) {
        if let Some(delay) = overrides.delay {
            self.delay = delay;
        }
        if let Some(stiffness) = overrides.stiffness {
            self.stiffness = stiffness;
        }
        if let Some(damping) = overrides.damping {
            self.damping = damping;
        }
        if let Some(precision) = overrides.precision {
            self.precision = precision;
        }
        if let Some(clamp) = overrides.clamp {
            self.clamp = clamp;
        }
    }
}

impl<T> From<SpringOverrides> for Overrides<T, SpringOverrides> {
    fn from(options: SpringOverrides) -> Self {
        Self::new(options)
    }
}

impl Motion for Spring {
    type Options = SpringOptions;
    type State = SpringState;

    fn step(&self, state: &mut AnimationState<SpringState>, options: &SpringOptions) {
        let dt = state.time_delta / 1000.0;
        let velocity = state.custom.velocity;

        let force = -options.stiffness * (state.progress - 1.0);
        let damping = options.damping * velocity;
        let velocity = velocity + (force - damping) * dt;
        state.progress += velocity * dt;
        state.custom.velocity = velocity;

        // With dt == 0 the velocity bound is infinite and only distance counts
        let settled = (1.0 - state.progress).abs() < options.precision
            && velocity.abs() <= options.precision / dt;

        if settled {
            state.progress = 1.0;
            state.is_done = true;
        } else {
            state.is_done = false;
            if options.clamp && state.progress > 1.0 {
                state.progress = 2.0 - state.progress;
                state.custom.velocity = -velocity + damping * dt;
            }
        }
    }
}
