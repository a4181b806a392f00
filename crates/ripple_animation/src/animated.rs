//! Animated values
//!
//! [`Animated`] is a writable value that moves toward each new target over
//! time. [`Follow`] is its read-only sibling that chases another reactive
//! value. Both expose the live interpolated value through a store.

use crate::engine::Engine;
use crate::error::Result;
use crate::interpolate::{Interpolate, Interpolator};
use crate::motion::{Motion, Overrides, OverridesOf};
use crate::spring::{Spring, SpringOptions};
use crate::state::RunPhase;
use crate::tween::{Tween, TweenOptions};
use ripple_core::{Host, ReadOnly, Readable, Subscription};
use std::rc::Rc;

/// A value that animates toward every target it is given
///
/// Setting a target starts a new run from wherever the value currently is;
/// any run still in flight is dropped. Dropping the value stops it and
/// releases every timer and frame it holds on the host.
pub struct Animated<T: Clone + 'static, M: Motion> {
    engine: Engine<T, M>,
}

/// Tweened value
pub type Tweened<T> = Animated<T, Tween>;

/// Spring-driven value
pub type Springy<T> = Animated<T, Spring>;

impl<T: Interpolate, M: Motion> Animated<T, M> {
    /// Create an animated value resting at `initial`
    ///
    /// Fails if `T` has no built-in interpolation for the shape of `initial`.
    pub fn new(host: Rc<dyn Host>, initial: T, motion: M, options: M::Options) -> Result<Self> {
        let interpolator = Interpolator::for_sample(&initial)?;
        Ok(Self::with_interpolator(
            host,
            initial,
            motion,
            options,
            interpolator,
        ))
    }
}

impl<T: Clone + 'static, M: Motion> Animated<T, M> {
    /// Create an animated value that blends with `interpolator`
    pub fn with_interpolator(
        host: Rc<dyn Host>,
        initial: T,
        motion: M,
        options: M::Options,
        interpolator: Interpolator<T>,
    ) -> Self {
        Self {
            engine: Engine::new(host, initial, motion, options, interpolator),
        }
    }

    /// Current value, mid-flight or settled
    pub fn value(&self) -> T {
        self.engine.output().get()
    }

    /// The most recently requested target
    pub fn target(&self) -> T {
        self.engine.target()
    }

    /// Animate toward `target` with the default options
    pub fn set(&self, target: T) {
        self.engine.start(target, Overrides::default());
    }

    /// Animate toward `target`, overriding options for this run only
    pub fn set_with(&self, target: T, overrides: impl Into<Overrides<T, OverridesOf<M>>>) {
        self.engine.start(target, overrides.into());
    }

    /// Animate toward a target computed from the last requested target
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.update_with(f, Overrides::<T, OverridesOf<M>>::default());
    }

    /// [`Animated::update`] with per-run overrides
    pub fn update_with(
        &self,
        f: impl FnOnce(&T) -> T,
        overrides: impl Into<Overrides<T, OverridesOf<M>>>,
    ) {
        let current = self.engine.target();
        self.engine.start(f(&current), overrides.into());
    }

    /// Change the defaults used by future runs
    pub fn set_options(&self, overrides: &OverridesOf<M>) {
        self.engine.set_options(overrides);
    }

    /// Current default options
    pub fn options(&self) -> M::Options {
        self.engine.options()
    }

    /// Register a callback for every committed value
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.engine.output().subscribe(callback)
    }

    /// Read-only handle to the live value
    pub fn reader(&self) -> ReadOnly<T> {
        self.engine.output().read_only()
    }

    pub fn phase(&self) -> RunPhase {
        self.engine.phase()
    }

    /// Number of runs started so far, plus one if destroyed
    pub fn epoch(&self) -> u64 {
        self.engine.epoch()
    }

    /// True while a run is delayed or stepping
    pub fn is_animating(&self) -> bool {
        self.engine.phase().is_active()
    }

    /// Stop animating and release host registrations
    pub fn destroy(self) {
        drop(self);
    }
}

impl<T: Clone + 'static, M: Motion> Drop for Animated<T, M> {
    fn drop(&mut self) {
        self.engine.destroy();
    }
}

impl<T: Clone + 'static, M: Motion> Readable<T> for Animated<T, M> {
    fn get(&self) -> T {
        self.value()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        Readable::subscribe(&self.engine.output(), callback)
    }
}

/// A read-only value that animates toward another reactive value
///
/// Every change of the source starts a new run with the default options.
/// Dropping a `Follow` stops it and unsubscribes from the source.
pub struct Follow<T: Clone + 'static, M: Motion> {
    engine: Engine<T, M>,
    _upstream: Subscription,
}

impl<T: Interpolate, M: Motion> Follow<T, M> {
    /// Start at the source's current value and chase its changes
    pub fn new(
        host: Rc<dyn Host>,
        source: &impl Readable<T>,
        motion: M,
        options: M::Options,
    ) -> Result<Self> {
        let initial = source.get();
        let interpolator = Interpolator::for_sample(&initial)?;
        Ok(Self::build(host, source, initial, motion, options, interpolator))
    }
}

impl<T: Clone + 'static, M: Motion> Follow<T, M> {
    /// [`Follow::new`] with a custom interpolator
    pub fn with_interpolator(
        host: Rc<dyn Host>,
        source: &impl Readable<T>,
        motion: M,
        options: M::Options,
        interpolator: Interpolator<T>,
    ) -> Self {
        Self::build(host, source, source.get(), motion, options, interpolator)
    }

    fn build(
        host: Rc<dyn Host>,
        source: &impl Readable<T>,
        initial: T,
        motion: M,
        options: M::Options,
        interpolator: Interpolator<T>,
    ) -> Self {
        let engine = Engine::new(host, initial, motion, options, interpolator);
        let weak = engine.downgrade();
        let upstream = source.subscribe(Box::new(move |value: &T| {
            if let Some(engine) = weak.upgrade() {
                engine.start(value.clone(), Overrides::default());
            }
        }));

        Self {
            engine,
            _upstream: upstream,
        }
    }

    /// Current value, mid-flight or settled
    pub fn value(&self) -> T {
        self.engine.output().get()
    }

    /// The latest source value
    pub fn target(&self) -> T {
        self.engine.target()
    }

    /// Change the defaults used by future runs
    pub fn set_options(&self, overrides: &OverridesOf<M>) {
        self.engine.set_options(overrides);
    }

    pub fn options(&self) -> M::Options {
        self.engine.options()
    }

    /// Register a callback for every committed value
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.engine.output().subscribe(callback)
    }

    /// Read-only handle to the live value
    pub fn reader(&self) -> ReadOnly<T> {
        self.engine.output().read_only()
    }

    pub fn phase(&self) -> RunPhase {
        self.engine.phase()
    }

    pub fn epoch(&self) -> u64 {
        self.engine.epoch()
    }

    pub fn is_animating(&self) -> bool {
        self.engine.phase().is_active()
    }

    /// Stop following and release host registrations
    pub fn destroy(self) {
        drop(self);
    }
}

impl<T: Clone + 'static, M: Motion> Drop for Follow<T, M> {
    fn drop(&mut self) {
        // The upstream subscription is released after this, with the fields
        self.engine.destroy();
    }
}

impl<T: Clone + 'static, M: Motion> Readable<T> for Follow<T, M> {
    fn get(&self) -> T {
        self.value()
    }

    fn subscribe(&self, callback: Box<dyn FnMut(&T)>) -> Subscription {
        Readable::subscribe(&self.engine.output(), callback)
    }
}

/// Create a tweened value
pub fn tweened<T: Interpolate>(
    host: Rc<dyn Host>,
    initial: T,
    options: TweenOptions,
) -> Result<Tweened<T>> {
    Animated::new(host, initial, Tween, options)
}

/// Create a spring-driven value
pub fn spring<T: Interpolate>(
    host: Rc<dyn Host>,
    initial: T,
    options: SpringOptions,
) -> Result<Springy<T>> {
    Animated::new(host, initial, Spring, options)
}

/// Tween toward every change of `source`
pub fn follow_tweened<T: Interpolate>(
    host: Rc<dyn Host>,
    source: &impl Readable<T>,
    options: TweenOptions,
) -> Result<Follow<T, Tween>> {
    Follow::new(host, source, Tween, options)
}

/// Spring toward every change of `source`
pub fn follow_spring<T: Interpolate>(
    host: Rc<dyn Host>,
    source: &impl Readable<T>,
    options: SpringOptions,
) -> Result<Follow<T, Spring>> {
    Follow::new(host, source, Spring, options)
}
