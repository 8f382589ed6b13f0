//! Builders to construct work queues from configuration.

pub mod work_queue_builder;

pub use work_queue_builder::{build_work_queue, WorkQueueBuilder};
