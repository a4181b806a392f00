//! Motion traits and option merging
//!
//! A [`Motion`] is the step function of an animation flavor: given the run
//! state and the effective options, it advances `progress` and decides when
//! the run is done. Tweens and springs are the built-in motions; any other
//! behavior can be plugged in by implementing the trait or by wrapping a
//! closure in [`StepFn`].

use crate::interpolate::Interpolator;
use crate::state::AnimationState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Persistent options of a motion, with a partial form for per-call overrides
pub trait MotionOptions: Clone + 'static {
    /// Same fields, all optional. Defined fields win when merged.
    type Overrides: Clone + Default + 'static;

    /// Milliseconds to wait before stepping starts
    fn delay(&self) -> f64;

    /// Overwrite every field that `overrides` defines
    fn apply(&mut self, overrides: &Self::Overrides);

    /// A copy of these options with `overrides` applied
    fn merged(&self, overrides: &Self::Overrides) -> Self {
        let mut options = self.clone();
        options.apply(overrides);
        options
    }
}

/// Step function of an animation flavor
pub trait Motion: 'static {
    type Options: MotionOptions;
    /// Motion-specific fields kept in [`AnimationState::custom`]
    type State: Default + 'static;

    /// Advance `state` to `state.time_current`
    ///
    /// Must set `progress` and `is_done`. Called once when the run begins
    /// (with zero elapsed time) and then once per frame until done.
    fn step(&self, state: &mut AnimationState<Self::State>, options: &Self::Options);
}

/// Partial options type of a motion
pub type OverridesOf<M> = <<M as Motion>::Options as MotionOptions>::Overrides;

/// Options for motions that only know about a start delay
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayOptions {
    pub delay: f64,
}

/// Partial [`DelayOptions`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DelayOverrides {
    pub delay: Option<f64>,
}

impl MotionOptions for DelayOptions {
    type Overrides = DelayOverrides;

    fn delay(&self) -> f64 {
        self.delay
    }

    fn apply(&mut self, overrides: &DelayOverrides) {
        if let Some(delay) = overrides.delay {
            self.delay = delay;
        }
    }
}

/// A closure used as a motion
///
/// ```rust
/// use ripple_animation::{AnimationState, DelayOptions, StepFn};
///
/// // Jump halfway on the first step, finish on the next one
/// let halves = StepFn::new(|state: &mut AnimationState, _: &DelayOptions| {
///     state.progress = if state.time_elapsed > 0.0 { 1.0 } else { 0.5 };
///     state.is_done = state.progress >= 1.0;
/// });
/// # let _ = halves;
/// ```
pub struct StepFn<F, O = DelayOptions, S = ()> {
    step: F,
    _marker: PhantomData<fn() -> (O, S)>,
}

impl<F, O, S> StepFn<F, O, S>
where
    F: Fn(&mut AnimationState<S>, &O) + 'static,
{
    pub fn new(step: F) -> Self {
        Self {
            step,
            _marker: PhantomData,
        }
    }
}

impl<F, O, S> Motion for StepFn<F, O, S>
where
    F: Fn(&mut AnimationState<S>, &O) + 'static,
    O: MotionOptions,
    S: Default + 'static,
{
    type Options = O;
    type State = S;

    fn step(&self, state: &mut AnimationState<S>, options: &O) {
        (self.step)(state, options)
    }
}

/// Per-call overrides for a single run
///
/// `options` is merged over the animated value's defaults. `interpolator`
/// replaces the default interpolator for this run only.
pub struct Overrides<T, P> {
    pub options: P,
    pub interpolator: Option<Interpolator<T>>,
}

impl<T, P> Overrides<T, P> {
    pub fn new(options: P) -> Self {
        Self {
            options,
            interpolator: None,
        }
    }

    /// Use `interpolator` for this run
    pub fn with_interpolator(mut self, interpolator: Interpolator<T>) -> Self {
        self.interpolator = Some(interpolator);
        self
    }
}

impl<T, P: Default> Default for Overrides<T, P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<T, P: Clone> Clone for Overrides<T, P> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            interpolator: self.interpolator.clone(),
        }
    }
}

impl<T, P: fmt::Debug> fmt::Debug for Overrides<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("options", &self.options)
            .field("interpolator", &self.interpolator)
            .finish()
    }
}

impl<T> From<DelayOverrides> for Overrides<T, DelayOverrides> {
    fn from(options: DelayOverrides) -> Self {
        Self::new(options)
    }
}
