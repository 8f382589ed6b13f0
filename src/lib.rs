//! # Prometheus Work Queue
//!
//! A drift-corrected periodic work queue with per-item jitter statistics.
//!
//! The queue keeps a set of periodic callbacks. Each time it is ticked it
//! fires every item whose period has elapsed, advances that item's baseline
//! by exactly one period, and reports the earliest upcoming deadline back to
//! whatever loop drives it.
//!
//! ## Key Features
//!
//! - **Drift-free rescheduling**: baselines advance by one period per firing,
//!   never reset to "now", so late ticks do not accumulate skew
//! - **Reentrant callbacks**: the queue lock is released while a callback
//!   runs, so callbacks may schedule, unschedule or release items
//! - **Cursor-stable schedule list**: entries removed while a tick is in its
//!   unlocked window are skipped, never invalidating the traversal
//! - **Generation-tagged handles**: a released or finalized registration can
//!   never be confused with a later one in the same slot
//! - **Jitter statistics**: running min/max/average/count of firing delays
//! - **Pluggable drivers**: a dedicated OS thread or a tokio task
//!
//! ## Example
//!
//! ```rust
//! use prometheus_work_queue::config::WorkQueueConfig;
//! use prometheus_work_queue::core::WorkQueue;
//! use prometheus_work_queue::runtime::TickDriver;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let queue = Arc::new(WorkQueue::new(WorkQueueConfig::default()).unwrap());
//!
//! let hits = Arc::new(AtomicU32::new(0));
//! let counter = Arc::clone(&hits);
//! let handle = queue
//!     .register(Duration::from_millis(5), move || {
//!         counter.fetch_add(1, Ordering::Relaxed);
//!     })
//!     .unwrap();
//! queue.schedule(handle).unwrap();
//!
//! let driver = TickDriver::spawn(Arc::clone(&queue)).unwrap();
//! std::thread::sleep(Duration::from_millis(30));
//! driver.stop();
//!
//! assert!(queue.stats(handle).unwrap().count > 0);
//! ```
//!
//! Driving the queue by hand with a manual clock:
//!
//! ```rust
//! use prometheus_work_queue::core::WorkQueue;
//! use prometheus_work_queue::util::ManualClock;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let queue = WorkQueue::builder().clock(clock.clone()).build().unwrap();
//! let handle = queue.register_scheduled(Duration::from_micros(1_000), || {}).unwrap();
//!
//! clock.set(2_500);
//! let mut next = u64::MAX;
//! queue.process_expired_work_items(&mut next);
//! assert_eq!(queue.baseline_us(handle).unwrap(), 1_000);
//! assert_eq!(next, 2_000);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: work items, registry, schedule list and queue.
pub mod core;
/// Configuration models for the queue and its drivers.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Drivers that repeatedly tick a queue.
pub mod runtime;
/// Shared utilities: clocks, shutdown signal, telemetry.
pub mod util;

pub use crate::config::WorkQueueConfig;
pub use crate::core::{WorkItemHandle, WorkItemStats, WorkQueue, WorkQueueError};
pub use crate::runtime::TickDriver;
