//! Integration tests for generators composed on a shared host
//!
//! These tests verify that:
//! - Generators chain through the `Readable` trait
//! - Clock-driven generators share one simulated timeline
//! - Dropping a generator releases its timers and upstream subscriptions

use ripple_core::{
    debounced, derived, filtered, interval, timeout, CoreError, HeadlessHost, Readable, Sequence,
    Store,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_interval_feeds_filter_and_derived() {
    let host = HeadlessHost::new();
    let ticks = interval(host.shared(), 100.0).unwrap();
    let even = filtered(&ticks, |n| n % 2 == 0, 0);
    let label = derived(&even, |n| format!("tick {n}"));

    host.advance(350.0);
    assert_eq!(ticks.get(), 3);
    assert_eq!(even.get(), 2);
    assert_eq!(label.get(), "tick 2");

    host.advance(50.0);
    assert_eq!(label.get(), "tick 4");
}

#[test]
fn test_debounce_collapses_bursts() {
    let host = HeadlessHost::new();
    let input = Store::new(String::new());
    let settled = debounced(host.shared(), &input, 200.0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_clone = seen.clone();
    let _sub = settled.subscribe(move |s: &String| seen_clone.borrow_mut().push(s.clone()));

    for text in ["r", "ri", "rip"] {
        input.set(text.to_string());
        host.advance(50.0);
    }
    assert!(settled.is_pending());
    assert_eq!(settled.get(), "");

    host.advance(200.0);
    assert_eq!(*seen.borrow(), vec!["rip".to_string()]);

    input.set("ripple".to_string());
    settled.flush();
    assert_eq!(settled.get(), "ripple");
    assert!(host.is_idle());
}

#[test]
fn test_sequence_stepped_by_interval() {
    let host = HeadlessHost::new();
    let ticks = interval(host.shared(), 250.0).unwrap();
    let sequence = Rc::new(RefCell::new(Sequence::new(vec!["red", "amber", "green"], true).unwrap()));
    let shown = Rc::new(RefCell::new(Vec::new()));

    let shown_clone = shown.clone();
    let _shown = sequence
        .borrow()
        .subscribe(move |colour: &&str| shown_clone.borrow_mut().push(*colour));

    let sequence_clone = sequence.clone();
    let _advance = ticks.subscribe(move |_| {
        sequence_clone.borrow_mut().advance();
    });

    host.advance(1_000.0);
    assert_eq!(*shown.borrow(), vec!["amber", "green", "red", "amber"]);
    assert_eq!(sequence.borrow().index(), 1);
}

#[test]
fn test_timeout_and_stop_share_timeline() {
    let host = HeadlessHost::new();
    let ticks = interval(host.shared(), 10.0).unwrap();
    let deadline = timeout(host.shared(), 55.0);

    let stopper = Rc::new(ticks);
    let stopper_clone = stopper.clone();
    let _stop = deadline.subscribe(move |elapsed| {
        if *elapsed {
            stopper_clone.stop();
        }
    });

    host.advance(500.0);
    assert!(deadline.is_elapsed());
    assert_eq!(stopper.get(), 5);
    assert!(!stopper.is_running());
    assert!(host.is_idle());
}

#[test]
fn test_dropped_generators_release_host_and_source() {
    let host = HeadlessHost::new();
    let source = Store::new(1);

    let ticks = interval(host.shared(), 10.0).unwrap();
    let waiting = timeout(host.shared(), 10.0);
    let settled = debounced(host.shared(), &source, 10.0);
    source.set(2);

    assert_eq!(host.pending_timers(), 3);
    assert_eq!(source.subscriber_count(), 1);

    drop(ticks);
    drop(waiting);
    drop(settled);

    assert!(host.is_idle());
    assert_eq!(source.subscriber_count(), 0);
}

#[test]
fn test_invalid_arguments() {
    let host = HeadlessHost::new();
    assert!(matches!(
        interval(host.shared(), 0.0).err(),
        Some(CoreError::InvalidPeriod(_))
    ));
    assert!(matches!(
        interval(host.shared(), f64::NAN).err(),
        Some(CoreError::InvalidPeriod(_))
    ));
    assert_eq!(
        Sequence::<u8>::new(vec![], true).err(),
        Some(CoreError::EmptySequence)
    );
}
