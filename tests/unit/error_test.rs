//! Tests for error types

use prometheus_work_queue::core::WorkQueueError;

#[test]
fn test_invalid_period_error() {
    let err = WorkQueueError::InvalidPeriod;
    assert_eq!(format!("{}", err), "period must be at least 1us");
}

#[test]
fn test_stale_handle_error() {
    let err = WorkQueueError::StaleHandle {
        index: 3,
        generation: 7,
    };
    assert_eq!(
        format!("{}", err),
        "stale work item handle: index 3, generation 7"
    );
}

#[test]
fn test_capacity_exceeded_error() {
    let err = WorkQueueError::CapacityExceeded { max: 4 };
    assert_eq!(format!("{}", err), "work item capacity exceeded: max 4");
}

#[test]
fn test_invalid_config_error() {
    let err = WorkQueueError::InvalidConfig("max_items must be greater than 0 when set".into());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: max_items must be greater than 0 when set"
    );
}

#[test]
fn test_driver_spawn_error() {
    let err = WorkQueueError::DriverSpawn("resource temporarily unavailable".into());
    assert_eq!(
        format!("{}", err),
        "failed to spawn driver: resource temporarily unavailable"
    );
}

#[test]
fn test_errors_compare_by_value() {
    assert_eq!(WorkQueueError::InvalidPeriod, WorkQueueError::InvalidPeriod.clone());
    assert_ne!(
        WorkQueueError::CapacityExceeded { max: 1 },
        WorkQueueError::CapacityExceeded { max: 2 }
    );
}
