//! Error types for work queue operations.

use thiserror::Error;

/// Errors produced by the work queue and its drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkQueueError {
    /// Period was zero or shorter than one microsecond.
    #[error("period must be at least 1us")]
    InvalidPeriod,
    /// Handle no longer refers to a live registration.
    #[error("stale work item handle: index {index}, generation {generation}")]
    StaleHandle {
        /// Slot index carried by the handle.
        index: usize,
        /// Generation carried by the handle.
        generation: u64,
    },
    /// Registry already holds the configured maximum number of items.
    #[error("work item capacity exceeded: max {max}")]
    CapacityExceeded {
        /// Configured maximum.
        max: usize,
    },
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The driver thread could not be started.
    #[error("failed to spawn driver: {0}")]
    DriverSpawn(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
