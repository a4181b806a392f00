//! Duration-based transitions

use crate::easing::Easing;
use crate::motion::{Motion, MotionOptions, Overrides};
use crate::state::AnimationState;
use serde::{Deserialize, Serialize};

/// Tween motion: eased progress over a fixed duration
#[derive(Clone, Copy, Debug, Default)]
pub struct Tween;

/// Tween options
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenOptions {
    /// Delay before the transition starts (ms)
    pub delay: f64,
    /// Transition length (ms)
    pub duration: f64,
    pub easing: Easing,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            duration: 400.0,
            easing: Easing::Linear,
        }
    }
}

impl TweenOptions {
    /// Linear tween lasting `duration` ms
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Partial [`TweenOptions`]
#[derive(Clone, Copy, Debug, Default)]
pub struct TweenOverrides {
    pub delay: Option<f64>,
    pub duration: Option<f64>,
    pub easing: Option<Easing>,
}

impl TweenOverrides {
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }
}

impl MotionOptions for TweenOptions {
    type Overrides = TweenOverrides;

    fn delay(&self) -> f64 {
        self.delay
    }

    fn apply(&mut self, overrides: &TweenOverrides) {
        if let Some(delay) = overrides.delay {
            self.delay = delay;
        }
        if let Some(duration) = overrides.duration {
            self.duration = duration;
        }
        if let Some(easing) = overrides.easing {
            self.easing = easing;
        }
    }
}

impl<T> From<TweenOverrides> for Overrides<T, TweenOverrides> {
    fn from(options: TweenOverrides) -> Self {
        Self::new(options)
    }
}

impl Motion for Tween {
    type Options = TweenOptions;
    type State = ();

    fn step(&self, state: &mut AnimationState, options: &TweenOptions) {
        let time_progress = if options.duration > 0.0 {
            (state.time_elapsed / options.duration).min(1.0)
        } else {
            1.0
        };
        state.progress = options.easing.apply(time_progress);
        state.is_done = time_progress >= 1.0;
    }
}
