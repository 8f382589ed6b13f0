//! Core scheduling abstractions: work items, registry, schedule list and the queue.

pub mod error;
pub mod registry;
pub mod schedule_list;
pub mod stats;
pub mod wakeup;
pub mod work_item;
pub mod work_queue;

pub use error::{AppResult, WorkQueueError};
pub use registry::Registry;
pub use schedule_list::{Cursor, ScheduleList};
pub use stats::WorkItemStats;
pub use wakeup::Wakeup;
pub use work_item::{WorkCallback, WorkItem, WorkItemHandle};
pub use work_queue::WorkQueue;
