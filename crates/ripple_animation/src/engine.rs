//! Stepping engine
//!
//! Drives runs of a [`Motion`] against a host clock and commits interpolated
//! values to an output store. Every call to `start` opens a new epoch; timer
//! and frame callbacks capture the epoch they were scheduled for and do
//! nothing once it is stale. The inner borrow is always released before
//! committing, since subscribers may start a new run synchronously.
//!
//! User code (step functions, interpolators, the host) can run while the
//! engine is borrowed. If it drops the animated value there, `destroy` is
//! deferred and carried out once the borrow is released.

use crate::interpolate::Interpolator;
use crate::motion::{Motion, MotionOptions, Overrides, OverridesOf};
use crate::state::{AnimationState, RunPhase};
use ripple_core::{FrameHandle, Host, Store, TimerId};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct Run<T, M: Motion> {
    state: AnimationState<M::State>,
    options: M::Options,
    target: T,
    lerp: Box<dyn Fn(f64) -> T>,
}

struct EngineInner<T, M: Motion> {
    host: Rc<dyn Host>,
    motion: M,
    output: Store<T>,
    /// Last requested target
    target: T,
    defaults: M::Options,
    interpolator: Interpolator<T>,
    epoch: u64,
    phase: RunPhase,
    delay_timer: Option<TimerId>,
    frame: Option<FrameHandle>,
    run: Option<Run<T, M>>,
}

impl<T, M: Motion> EngineInner<T, M> {
    fn cancel_pending(&mut self) {
        if let Some(id) = self.delay_timer.take() {
            self.host.clear_timeout(id);
        }
        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
        }
    }
}

struct EngineCell<T, M: Motion> {
    state: RefCell<EngineInner<T, M>>,
    /// Set when `destroy` ran while `state` was borrowed
    destroy_deferred: Cell<bool>,
}

/// Shared handle to one animated value's engine
pub(crate) struct Engine<T, M: Motion> {
    shared: Rc<EngineCell<T, M>>,
}

impl<T, M: Motion> Clone for Engine<T, M> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

/// Non-owning engine handle held by scheduled callbacks and upstream
/// subscriptions
pub(crate) struct WeakEngine<T, M: Motion> {
    shared: Weak<EngineCell<T, M>>,
}

impl<T, M: Motion> WeakEngine<T, M> {
    pub(crate) fn upgrade(&self) -> Option<Engine<T, M>> {
        self.shared.upgrade().map(|shared| Engine { shared })
    }
}

impl<T: Clone + 'static, M: Motion> Engine<T, M> {
    pub(crate) fn new(
        host: Rc<dyn Host>,
        initial: T,
        motion: M,
        defaults: M::Options,
        interpolator: Interpolator<T>,
    ) -> Self {
        Self {
            shared: Rc::new(EngineCell {
                state: RefCell::new(EngineInner {
                    host,
                    motion,
                    output: Store::new(initial.clone()),
                    target: initial,
                    defaults,
                    interpolator,
                    epoch: 0,
                    phase: RunPhase::Idle,
                    delay_timer: None,
                    frame: None,
                    run: None,
                }),
                destroy_deferred: Cell::new(false),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakEngine<T, M> {
        WeakEngine {
            shared: Rc::downgrade(&self.shared),
        }
    }

    pub(crate) fn output(&self) -> Store<T> {
        self.shared.state.borrow().output.clone()
    }

    pub(crate) fn target(&self) -> T {
        self.shared.state.borrow().target.clone()
    }

    pub(crate) fn phase(&self) -> RunPhase {
        self.shared.state.borrow().phase
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.shared.state.borrow().epoch
    }

    pub(crate) fn options(&self) -> M::Options {
        self.shared.state.borrow().defaults.clone()
    }

    pub(crate) fn set_options(&self, overrides: &OverridesOf<M>) {
        self.shared.state.borrow_mut().defaults.apply(overrides);
    }

    /// Begin a new run from the current output toward `target`
    pub(crate) fn start(&self, target: T, overrides: Overrides<T, OverridesOf<M>>) {
        let (epoch, delay) = {
            let mut guard = self.shared.state.borrow_mut();
            let inner = &mut *guard;

            if inner.phase.is_active() {
                tracing::debug!(epoch = inner.epoch, "animation superseded");
            }
            inner.epoch += 1;
            inner.cancel_pending();

            let prior = inner.output.get();
            let options = inner.defaults.merged(&overrides.options);
            let interpolator = overrides
                .interpolator
                .unwrap_or_else(|| inner.interpolator.clone());
            let lerp = interpolator.between(&prior, &target);
            let delay = options.delay();

            inner.target = target.clone();
            inner.run = Some(Run {
                state: AnimationState::new(inner.host.now()),
                options,
                target,
                lerp,
            });
            (inner.epoch, delay)
        };
        if self.finish_deferred_destroy() {
            return;
        }

        if delay > 0.0 {
            {
                let weak = self.downgrade();
                let mut inner = self.shared.state.borrow_mut();
                inner.phase = RunPhase::Delayed;
                let id = inner.host.set_timeout(
                    delay,
                    Box::new(move || {
                        if let Some(engine) = weak.upgrade() {
                            engine.on_delay_elapsed(epoch);
                        }
                    }),
                );
                inner.delay_timer = Some(id);
                tracing::debug!(epoch, delay, "animation delayed");
            }
            self.finish_deferred_destroy();
        } else {
            self.begin_run(epoch);
        }
    }

    fn on_delay_elapsed(&self, epoch: u64) {
        {
            let mut inner = self.shared.state.borrow_mut();
            if inner.epoch != epoch {
                return;
            }
            inner.delay_timer = None;
        }
        self.begin_run(epoch);
    }

    fn begin_run(&self, epoch: u64) {
        let (output, value, done) = {
            let mut guard = self.shared.state.borrow_mut();
            let inner = &mut *guard;
            if inner.epoch != epoch {
                return;
            }
            let now = inner.host.now();
            let Some(run) = inner.run.as_mut() else {
                return;
            };

            run.state = AnimationState::new(now);
            inner.motion.step(&mut run.state, &run.options);

            let done = run.state.is_done;
            let value = if done {
                run.target.clone()
            } else {
                (run.lerp)(run.state.progress)
            };

            if done {
                inner.run = None;
                inner.phase = RunPhase::Done;
                tracing::debug!(epoch, "animation finished immediately");
            } else {
                inner.phase = RunPhase::Running;
                tracing::debug!(epoch, "animation started");
            }
            (inner.output.clone(), value, done)
        };
        if self.finish_deferred_destroy() {
            return;
        }

        output.set(value);
        if !done {
            self.schedule_frame(epoch);
        }
    }

    fn schedule_frame(&self, epoch: u64) {
        {
            let weak = self.downgrade();
            let mut inner = self.shared.state.borrow_mut();
            // A subscriber may have started a new run during the last commit
            if inner.epoch != epoch || inner.run.is_none() {
                return;
            }
            let handle = inner.host.request_frame(Box::new(move |_timestamp| {
                if let Some(engine) = weak.upgrade() {
                    engine.on_frame(epoch);
                }
            }));
            inner.frame = Some(handle);
        }
        self.finish_deferred_destroy();
    }

    fn on_frame(&self, epoch: u64) {
        let (output, value, done) = {
            let mut guard = self.shared.state.borrow_mut();
            let inner = &mut *guard;
            if inner.epoch != epoch {
                tracing::trace!(epoch, current = inner.epoch, "stale frame ignored");
                return;
            }
            inner.frame = None;
            let now = inner.host.now();
            let Some(run) = inner.run.as_mut() else {
                return;
            };

            run.state.tick(now);
            inner.motion.step(&mut run.state, &run.options);
            tracing::trace!(
                epoch,
                elapsed = run.state.time_elapsed,
                progress = run.state.progress,
                "animation frame"
            );

            let value = (run.lerp)(run.state.progress);
            let done = run.state.is_done;
            if done {
                let elapsed = run.state.time_elapsed;
                inner.run = None;
                inner.phase = RunPhase::Done;
                tracing::debug!(epoch, elapsed, "animation finished");
            }
            (inner.output.clone(), value, done)
        };
        if self.finish_deferred_destroy() {
            return;
        }

        output.set(value);
        if !done {
            self.schedule_frame(epoch);
        }
    }

    /// Stop for good: invalidate callbacks and release host registrations
    pub(crate) fn destroy(&self) {
        let Ok(mut inner) = self.shared.state.try_borrow_mut() else {
            tracing::debug!("engine busy, destroy deferred");
            self.shared.destroy_deferred.set(true);
            return;
        };
        self.shared.destroy_deferred.set(false);
        inner.epoch += 1;
        inner.cancel_pending();
        inner.run = None;
        if inner.phase.is_active() {
            inner.phase = RunPhase::Superseded;
        }
        tracing::debug!(epoch = inner.epoch, "animation destroyed");
    }

    /// Run a `destroy` that arrived while the state was borrowed. Returns
    /// true if the engine is now destroyed.
    fn finish_deferred_destroy(&self) -> bool {
        if !self.shared.destroy_deferred.get() {
            return false;
        }
        self.destroy();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::{Tween, TweenOptions, TweenOverrides};
    use ripple_core::HeadlessHost;

    fn engine(host: &HeadlessHost, options: TweenOptions) -> Engine<f64, Tween> {
        Engine::new(
            host.shared(),
            0.0,
            Tween,
            options,
            Interpolator::for_sample(&0.0).unwrap(),
        )
    }

    #[test]
    fn test_run_commits_first_value_synchronously() {
        let host = HeadlessHost::with_frame_interval(10.0);
        let engine = engine(&host, TweenOptions::new(100.0));
        let commits = Rc::new(std::cell::Cell::new(0));

        let commits_clone = commits.clone();
        let _sub = engine
            .output()
            .subscribe(move |_| commits_clone.set(commits_clone.get() + 1));

        engine.start(10.0, Overrides::default());
        assert_eq!(commits.get(), 1);
        assert_eq!(engine.phase(), RunPhase::Running);
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn test_zero_duration_skips_frames() {
        let host = HeadlessHost::new();
        let engine = engine(&host, TweenOptions::new(0.0));

        engine.start(3.0, Overrides::default());
        assert_eq!(engine.output().get(), 3.0);
        assert_eq!(engine.phase(), RunPhase::Done);
        assert!(host.is_idle());
    }

    #[test]
    fn test_restart_cancels_pending_registrations() {
        let host = HeadlessHost::with_frame_interval(10.0);
        let engine = engine(&host, TweenOptions::new(100.0));

        engine.start(1.0, TweenOverrides::default().delay(50.0).into());
        assert_eq!(host.pending_timers(), 1);
        assert_eq!(engine.phase(), RunPhase::Delayed);

        engine.start(2.0, Overrides::default());
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(engine.epoch(), 2);
        assert_eq!(engine.target(), 2.0);
    }

    #[test]
    fn test_destroy_releases_host() {
        let host = HeadlessHost::with_frame_interval(10.0);
        let engine = engine(&host, TweenOptions::new(100.0));

        engine.start(1.0, Overrides::default());
        host.advance(30.0);
        engine.destroy();

        assert!(host.is_idle());
        assert_eq!(engine.phase(), RunPhase::Superseded);
    }
}
