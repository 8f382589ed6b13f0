//! Tests for configuration validation and loading

use prometheus_work_queue::config::work_queue::{
    ENV_DRIVER_THREAD, ENV_IDLE_WAKEUP_US, ENV_MAX_ITEMS, ENV_STATS_DUMP_INTERVAL,
};
use prometheus_work_queue::config::{DriverConfig, WorkQueueConfig};
use std::io::Write;

#[test]
fn test_work_queue_config_validation() {
    let valid = WorkQueueConfig {
        stats_dump_interval: 10,
        max_items: Some(64),
        initial_capacity: 8,
        driver: DriverConfig::default(),
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_work_queue_config_invalid_max_items() {
    let invalid = WorkQueueConfig::new().with_max_items(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_driver_config_invalid_idle_wakeup() {
    let invalid = DriverConfig {
        idle_wakeup_us: 0,
        ..DriverConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_driver_config_invalid_thread_name() {
    let invalid = DriverConfig {
        thread_name: "   ".into(),
        ..DriverConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_driver_config_invalid_stack_size() {
    let invalid = DriverConfig {
        thread_stack_size: 1024,
        ..DriverConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_zero_dump_interval_is_valid() {
    let cfg = WorkQueueConfig::new().with_stats_dump_interval(0);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_from_json_str_fills_defaults() {
    let cfg = WorkQueueConfig::from_json_str(r#"{"stats_dump_interval": 5, "driver": {"idle_wakeup_us": 1000}}"#).unwrap();
    assert_eq!(cfg.stats_dump_interval, 5);
    assert_eq!(cfg.max_items, None);
    assert_eq!(cfg.driver.idle_wakeup_us, 1_000);
    assert_eq!(cfg.driver.thread_name, DriverConfig::default().thread_name);
}

#[test]
fn test_from_json_str_rejects_invalid_values() {
    let err = WorkQueueConfig::from_json_str(r#"{"max_items": 0}"#).unwrap_err();
    assert!(err.contains("max_items"));
    assert!(WorkQueueConfig::from_json_str("not json").is_err());
}

#[test]
fn test_json_roundtrip_preserves_config() {
    let cfg = WorkQueueConfig::new()
        .with_max_items(12)
        .with_thread_name("pump");
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(WorkQueueConfig::from_json_str(&json).unwrap(), cfg);
}

#[test]
fn test_from_json_file() {
    let path = std::env::temp_dir().join(format!("wq-config-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"initial_capacity": 3}}"#).unwrap();
    }
    let cfg = WorkQueueConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(cfg.initial_capacity, 3);
}

#[test]
fn test_from_json_file_missing_reports_path() {
    let err = WorkQueueConfig::from_json_file("/nonexistent/wq.json").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/wq.json"));
}

#[test]
fn test_from_lookup_reads_every_variable() {
    let cfg = WorkQueueConfig::from_lookup(|key| match key {
        k if k == ENV_STATS_DUMP_INTERVAL => Some("0".into()),
        k if k == ENV_MAX_ITEMS => Some("9".into()),
        k if k == ENV_IDLE_WAKEUP_US => Some("750".into()),
        k if k == ENV_DRIVER_THREAD => Some("ticker".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.stats_dump_interval, 0);
    assert_eq!(cfg.max_items, Some(9));
    assert_eq!(cfg.driver.idle_wakeup_us, 750);
    assert_eq!(cfg.driver.thread_name, "ticker");
}

#[test]
fn test_from_lookup_validates_result() {
    let result = WorkQueueConfig::from_lookup(|key| (key == ENV_IDLE_WAKEUP_US).then(|| "0".to_string()));
    assert!(result.is_err());
}
