//! End-to-end animation scenarios on the headless host
//!
//! These tests verify that:
//! - Tweens and springs reach their targets on simulated time
//! - Delays hold the previous value until stepping starts
//! - A new target supersedes the run in flight
//! - Destroyed values go quiet and leave nothing scheduled
//! - Follow mode chases an upstream store

use ripple_animation::{
    follow_spring, spring, tweened, Animated, AnimationError, AnimationState, DelayOptions, Easing,
    Motion, RunPhase, SpringOptions, StepFn, TweenOptions, TweenOverrides,
};
use ripple_core::{HeadlessHost, Host, Store};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Collect every value committed to `value`
fn record<M: Motion>(value: &Animated<f64, M>) -> Rc<RefCell<Vec<f64>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    value
        .subscribe(move |v| seen_clone.borrow_mut().push(*v))
        .detach();
    seen
}

#[test]
fn test_linear_tween_reaches_target() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = tweened(host.shared(), 1.0_f64, TweenOptions::new(400.0)).unwrap();

    value.set(5.0);
    host.advance(200.0);
    assert!((value.value() - 3.0).abs() < 1e-9);
    assert_eq!(value.phase(), RunPhase::Running);

    host.advance(200.0);
    assert_eq!(value.value(), 5.0);
    assert_eq!(value.phase(), RunPhase::Done);
    assert_eq!(host.pending_frames(), 0);
    assert!(host.is_idle());

    // Nothing moves once done
    host.advance(1_000.0);
    assert_eq!(value.value(), 5.0);
}

#[test]
fn test_delay_holds_prior_value() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = tweened(
        host.shared(),
        1.0_f64,
        TweenOptions::new(500.0).with_delay(500.0),
    )
    .unwrap();
    let seen = record(&value);

    value.set(5.0);
    assert_eq!(value.phase(), RunPhase::Delayed);

    for _ in 0..49 {
        host.advance(10.0);
        assert_eq!(value.value(), 1.0);
    }
    assert!(seen.borrow().iter().all(|v| *v == 1.0));

    host.advance(10.0);
    assert_eq!(value.phase(), RunPhase::Running);
    assert_eq!(value.value(), 1.0);

    host.advance(250.0);
    assert!((value.value() - 3.0).abs() < 1e-9);

    host.advance(250.0);
    assert_eq!(value.value(), 5.0);
    assert!(host.is_idle());
}

#[test]
fn test_underdamped_spring_converges() {
    let host = HeadlessHost::with_frame_interval(16.0);
    let value = spring(host.shared(), 1.0_f64, SpringOptions::new(100.0, 3.0)).unwrap();
    let seen = record(&value);

    value.set(5.0);
    host.advance(10_000.0);

    assert!((value.value() - 5.0).abs() < 0.001 * 4.0);
    assert_eq!(value.phase(), RunPhase::Done);
    assert!(host.is_idle());
    // Overshoots past the target on the way
    assert!(seen.borrow().iter().any(|v| *v > 5.0));
}

#[test]
fn test_destroy_mid_run_goes_quiet() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = tweened(host.shared(), 0.0_f64, TweenOptions::new(400.0)).unwrap();
    let seen = record(&value);
    let reader = value.reader();

    value.set(100.0);
    host.advance(100.0);
    let commits = seen.borrow().len();
    let frozen = reader.get();

    value.destroy();
    assert!(host.is_idle());

    host.advance(1_000.0);
    assert_eq!(seen.borrow().len(), commits);
    assert_eq!(reader.get(), frozen);
}

#[test]
fn test_destroy_during_delay_clears_timer() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = spring(
        host.shared(),
        0.0_f64,
        SpringOptions::default().with_delay(300.0),
    )
    .unwrap();

    value.set(1.0);
    assert_eq!(host.pending_timers(), 1);

    drop(value);
    assert!(host.is_idle());
}

#[test]
fn test_latest_target_wins() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = Rc::new(tweened(host.shared(), 0.0_f64, TweenOptions::new(100.0)).unwrap());
    let samples = Rc::new(RefCell::new(Vec::new()));

    let clock = host.clone();
    let samples_clone = samples.clone();
    value
        .subscribe(move |v| samples_clone.borrow_mut().push((clock.now(), *v)))
        .detach();

    value.set(10.0);
    value.set(20.0);
    assert_eq!(value.epoch(), 2);
    host.run_until_idle(1_000.0);

    // Every committed value sits on the 0 -> 20 trajectory
    for (now, v) in samples.borrow().iter() {
        let expected = 20.0 * (now / 100.0).min(1.0);
        assert!((v - expected).abs() < 1e-9, "at {now}ms got {v}");
    }
    assert_eq!(value.value(), 20.0);
}

#[test]
fn test_retarget_mid_flight_starts_from_current_value() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = tweened(host.shared(), 0.0_f64, TweenOptions::new(100.0)).unwrap();

    value.set(10.0);
    host.advance(50.0);
    assert!((value.value() - 5.0).abs() < 1e-9);

    value.set(0.0);
    // No jump: the new run starts where the old one was
    assert!((value.value() - 5.0).abs() < 1e-9);

    host.advance(50.0);
    assert!((value.value() - 2.5).abs() < 1e-9);
}

#[test]
fn test_value_is_idempotent_between_frames() {
    let host = HeadlessHost::with_frame_interval(16.0);
    let value = tweened(host.shared(), 0.0_f64, TweenOptions::new(300.0)).unwrap();
    let seen = record(&value);

    value.set(1.0);
    host.advance(40.0);

    let commits = seen.borrow().len();
    let first = value.value();
    let second = value.value();
    assert_eq!(first, second);
    assert_eq!(seen.borrow().len(), commits);
}

#[test]
fn test_subscriber_retargets_during_commit() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = Rc::new(tweened(host.shared(), 0.0_f64, TweenOptions::new(100.0)).unwrap());

    // Bounce back to zero the first time the value passes 5
    let weak = Rc::downgrade(&value);
    let bounced = Rc::new(std::cell::Cell::new(false));
    let bounced_clone = bounced.clone();
    value
        .subscribe(move |v| {
            if *v > 5.0 && !bounced_clone.get() {
                bounced_clone.set(true);
                if let Some(value) = weak.upgrade() {
                    value.set(0.0);
                }
            }
        })
        .detach();

    value.set(10.0);
    host.run_until_idle(1_000.0);

    assert!(bounced.get());
    assert_eq!(value.target(), 0.0);
    assert_eq!(value.value(), 0.0);
    assert_eq!(value.epoch(), 2);
    assert!(host.is_idle());
}

#[test]
fn test_fallback_frames_without_native_vsync() {
    let host = HeadlessHost::fallback();
    let value = tweened(host.shared(), 0.0_f64, TweenOptions::new(100.0)).unwrap();

    value.set(100.0);
    assert_eq!(host.pending_timers(), 1);
    assert_eq!(host.pending_frames(), 0);

    host.advance(99.0);
    assert!((value.value() - 99.0).abs() < 1e-9);

    host.advance(33.0);
    assert_eq!(value.value(), 100.0);
    assert!(host.is_idle());
}

#[test]
fn test_follow_spring_chases_store() {
    let host = HeadlessHost::new();
    let source = Store::new(0.0_f64);
    let follow = follow_spring(host.shared(), &source, SpringOptions::stiff()).unwrap();

    source.set(10.0);
    host.advance(16.0);
    let moving = follow.value();
    assert!(moving > 0.0 && moving < 10.0);

    source.set(-10.0);
    assert_eq!(follow.target(), -10.0);
    host.run_until_idle(10_000.0);
    assert_eq!(follow.value(), -10.0);
}

#[test]
fn test_custom_step_fn_never_finishes() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let motion = StepFn::new(|state: &mut AnimationState, _: &DelayOptions| {
        state.progress = 0.5;
        state.is_done = false;
    });
    let value = Animated::new(host.shared(), 0.0_f64, motion, DelayOptions::default()).unwrap();

    value.set(8.0);
    assert!(!host.run_until_idle(1_000.0));
    assert_eq!(value.value(), 4.0);
    assert_eq!(value.phase(), RunPhase::Running);
    assert_eq!(host.pending_frames(), 1);

    value.destroy();
    assert!(host.is_idle());
}

#[test]
fn test_json_values() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = tweened(
        host.shared(),
        json!({"x": 0, "y": 0}),
        TweenOptions::new(100.0),
    )
    .unwrap();

    value.set(json!({"x": 10, "y": -10, "z": 1}));
    host.advance(50.0);
    assert_eq!(value.value(), json!({"x": 5.0, "y": -5.0, "z": 1}));

    host.advance(50.0);
    assert_eq!(value.value(), json!({"x": 10, "y": -10, "z": 1}));
}

#[test]
fn test_json_first_commit_keeps_source_value() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = tweened(host.shared(), json!({"x": 1}), TweenOptions::new(100.0)).unwrap();

    value.set(json!({"x": 5}));
    // The synchronous commit has not moved yet
    assert_eq!(value.value(), json!({"x": 1}));

    host.run_until_idle(1_000.0);
    assert_eq!(value.value(), json!({"x": 5}));
}

#[test]
fn test_unsupported_shape_fails_at_construction() {
    let host = HeadlessHost::new();
    let err = tweened(host.shared(), json!("red"), TweenOptions::default()).err();
    assert!(matches!(
        err,
        Some(AnimationError::UnsupportedShape { found: "string" })
    ));
}

#[test]
fn test_per_call_overrides() {
    let host = HeadlessHost::with_frame_interval(10.0);
    let value = tweened(host.shared(), 0.0_f64, TweenOptions::new(1_000.0)).unwrap();

    value.set_with(
        1.0,
        TweenOverrides::default()
            .duration(100.0)
            .easing(Easing::EaseOutQuad),
    );
    host.advance(50.0);
    assert!((value.value() - 0.75).abs() < 1e-9);

    host.advance(50.0);
    assert_eq!(value.value(), 1.0);
    assert_eq!(value.options().duration, 1_000.0);
}
