//! Configuration models for the work queue and its drivers.

pub mod work_queue;

pub use work_queue::{DriverConfig, WorkQueueConfig};
