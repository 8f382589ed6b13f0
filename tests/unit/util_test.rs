//! Tests for utility functions

use prometheus_work_queue::util::{
    duration_to_us, init_tracing, Clock, ManualClock, MonotonicClock, ShutdownSignal,
};
use std::time::Duration;

#[test]
fn test_manual_clock_set_and_advance() {
    let clock = ManualClock::new(100);
    assert_eq!(clock.now_us(), 100);
    assert_eq!(clock.advance(50), 150);
    clock.set(10);
    assert_eq!(clock.now_us(), 10);
}

#[test]
fn test_monotonic_clock_never_goes_backwards() {
    let clock = MonotonicClock::new();
    let first = clock.now_us();
    std::thread::sleep(Duration::from_millis(2));
    let second = clock.now_us();
    assert!(second >= first + 1_000);
}

#[test]
fn test_clock_as_trait_object() {
    let clock: Box<dyn Clock> = Box::new(ManualClock::new(7));
    assert_eq!(clock.now_us(), 7);
}

#[test]
fn test_duration_to_us() {
    assert_eq!(duration_to_us(Duration::from_millis(3)), 3_000);
    assert_eq!(duration_to_us(Duration::from_nanos(999)), 0);
    assert_eq!(duration_to_us(Duration::MAX), u64::MAX);
}

#[test]
fn test_shutdown_signal_shared_between_clones() {
    let signal = ShutdownSignal::new();
    let observer = signal.clone();
    assert!(!observer.is_requested());
    assert!(signal.request());
    assert!(!signal.request());
    assert!(observer.is_requested());
    observer.reset();
    assert!(!signal.is_requested());
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
