//! Tests for work queue builders

use prometheus_work_queue::builders::{build_work_queue, WorkQueueBuilder};
use prometheus_work_queue::config::WorkQueueConfig;
use prometheus_work_queue::core::WorkQueueError;
use prometheus_work_queue::util::{ManualClock, ShutdownSignal};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_builder_applies_config() {
    let cfg = WorkQueueConfig::new().with_max_items(2).with_stats_dump_interval(0);
    let queue = WorkQueueBuilder::new().config(cfg.clone()).build().unwrap();
    assert_eq!(queue.config(), &cfg);

    queue.register(Duration::from_micros(10), || {}).unwrap();
    queue.register(Duration::from_micros(10), || {}).unwrap();
    let err = queue.register(Duration::from_micros(10), || {}).unwrap_err();
    assert_eq!(err, WorkQueueError::CapacityExceeded { max: 2 });
}

#[test]
fn test_builder_rejects_invalid_config() {
    let cfg = WorkQueueConfig::new().with_thread_name("");
    let err = build_work_queue(&cfg).unwrap_err();
    assert!(matches!(err, WorkQueueError::InvalidConfig(_)));
}

#[test]
fn test_builder_uses_injected_clock() {
    let clock = Arc::new(ManualClock::new(0));
    let queue = WorkQueueBuilder::new().clock(clock.clone()).build().unwrap();
    let handle = queue.register_scheduled(Duration::from_micros(10), || {}).unwrap();

    clock.set(25);
    let mut next = u64::MAX;
    assert_eq!(queue.process_expired_work_items(&mut next), 1);
    assert_eq!(queue.baseline_us(handle).unwrap(), 10);
    assert_eq!(next, 20);
}

#[test]
fn test_shared_shutdown_signal_stops_processing() {
    let signal = ShutdownSignal::new();
    let clock = Arc::new(ManualClock::new(0));
    let queue = WorkQueueBuilder::new()
        .clock(clock.clone())
        .shutdown_signal(signal.clone())
        .build()
        .unwrap();
    queue.register_scheduled(Duration::from_micros(10), || {}).unwrap();

    signal.request();
    clock.set(100);
    let mut next = u64::MAX;
    assert_eq!(queue.process_expired_work_items(&mut next), 0);
}
