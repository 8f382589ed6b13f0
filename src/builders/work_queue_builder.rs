//! Builder assembling a [`WorkQueue`] from configuration and collaborators.

use std::sync::Arc;

use tracing::info;

use crate::config::WorkQueueConfig;
use crate::core::{WorkQueue, WorkQueueError};
use crate::util::clock::{Clock, MonotonicClock};
use crate::util::shutdown::ShutdownSignal;

/// Builder for [`WorkQueue`].
///
/// Defaults: [`WorkQueueConfig::default`], a fresh [`MonotonicClock`] and a
/// private [`ShutdownSignal`].
#[derive(Default)]
pub struct WorkQueueBuilder {
    config: Option<WorkQueueConfig>,
    clock: Option<Arc<dyn Clock>>,
    shutdown: Option<ShutdownSignal>,
}

impl WorkQueueBuilder {
    /// Builder with every setting at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration.
    #[must_use]
    pub fn config(mut self, config: WorkQueueConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this time source.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing shutdown signal, e.g. one already observed by other loops.
    #[must_use]
    pub fn shutdown_signal(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Validate the configuration and create the queue.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::InvalidConfig` if the configuration is invalid.
    pub fn build(self) -> Result<WorkQueue, WorkQueueError> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(WorkQueueError::InvalidConfig)?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let shutdown = self.shutdown.unwrap_or_default();

        info!(
            stats_dump_interval = config.stats_dump_interval,
            max_items = ?config.max_items,
            initial_capacity = config.initial_capacity,
            "work queue initialized"
        );
        Ok(WorkQueue::from_parts(config, clock, shutdown))
    }
}

/// Build a queue straight from configuration with default collaborators.
///
/// # Errors
///
/// Returns `WorkQueueError::InvalidConfig` if the configuration is invalid.
pub fn build_work_queue(config: &WorkQueueConfig) -> Result<Arc<WorkQueue>, WorkQueueError> {
    WorkQueueBuilder::new().config(config.clone()).build().map(Arc::new)
}
