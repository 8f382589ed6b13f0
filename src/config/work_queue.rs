//! Work queue and driver configuration structures.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Environment variable overriding [`WorkQueueConfig::stats_dump_interval`].
pub const ENV_STATS_DUMP_INTERVAL: &str = "WORK_QUEUE_STATS_DUMP_INTERVAL";
/// Environment variable overriding [`WorkQueueConfig::max_items`].
pub const ENV_MAX_ITEMS: &str = "WORK_QUEUE_MAX_ITEMS";
/// Environment variable overriding [`DriverConfig::idle_wakeup_us`].
pub const ENV_IDLE_WAKEUP_US: &str = "WORK_QUEUE_IDLE_WAKEUP_US";
/// Environment variable overriding [`DriverConfig::thread_name`].
pub const ENV_DRIVER_THREAD: &str = "WORK_QUEUE_DRIVER_THREAD";

/// Tick driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Longest the driver sleeps when nothing is scheduled sooner.
    pub idle_wakeup_us: u64,
    /// Name of the driver thread.
    pub thread_name: String,
    /// Stack size of the driver thread in bytes.
    pub thread_stack_size: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            idle_wakeup_us: 100_000,
            thread_name: "work-queue-driver".into(),
            thread_stack_size: 256 * 1024,
        }
    }
}

impl DriverConfig {
    /// Validate driver configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_wakeup_us == 0 {
            return Err("idle_wakeup_us must be greater than 0".into());
        }
        if self.thread_name.trim().is_empty() {
            return Err("thread_name must not be empty".into());
        }
        if self.thread_stack_size < 16 * 1024 {
            return Err("thread_stack_size must be at least 16 KiB".into());
        }
        Ok(())
    }
}

/// Root work queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkQueueConfig {
    /// Emit a statistics dump every this many firings of an item. 0 disables.
    pub stats_dump_interval: u64,
    /// Upper bound on simultaneously registered items. `None` is unbounded.
    pub max_items: Option<usize>,
    /// Slots preallocated in the registry and schedule list.
    pub initial_capacity: usize,
    /// Driver settings.
    pub driver: DriverConfig,
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        Self {
            stats_dump_interval: 100,
            max_items: None,
            initial_capacity: 16,
            driver: DriverConfig::default(),
        }
    }
}

impl WorkQueueConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the statistics dump interval.
    #[must_use]
    pub const fn with_stats_dump_interval(mut self, interval: u64) -> Self {
        self.stats_dump_interval = interval;
        self
    }

    /// Bound the number of registered items.
    #[must_use]
    pub const fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Set the preallocated capacity.
    #[must_use]
    pub const fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the driver's idle wakeup.
    #[must_use]
    pub const fn with_idle_wakeup_us(mut self, idle_wakeup_us: u64) -> Self {
        self.driver.idle_wakeup_us = idle_wakeup_us;
        self
    }

    /// Set the driver thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.driver.thread_name = name.into();
        self
    }

    /// Validate all values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_items == Some(0) {
            return Err("max_items must be greater than 0 when set".into());
        }
        self.driver
            .validate()
            .map_err(|e| format!("driver invalid: {e}"))
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading work queue config {}", path.display()))?;
        Self::from_json_str(&raw)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("loading work queue config {}", path.display()))
    }

    /// Defaults overridden by `WORK_QUEUE_*` environment variables, after
    /// loading a `.env` file if one is present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or the
    /// resulting configuration is invalid.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values returned from `lookup`, keyed by the
    /// `WORK_QUEUE_*` variable names.
    ///
    /// # Errors
    ///
    /// Same as [`WorkQueueConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_STATS_DUMP_INTERVAL) {
            cfg.stats_dump_interval = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_STATS_DUMP_INTERVAL}={raw}"))?;
        }
        if let Some(raw) = lookup(ENV_MAX_ITEMS) {
            cfg.max_items = Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{ENV_MAX_ITEMS}={raw}"))?,
            );
        }
        if let Some(raw) = lookup(ENV_IDLE_WAKEUP_US) {
            cfg.driver.idle_wakeup_us = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_IDLE_WAKEUP_US}={raw}"))?;
        }
        if let Some(raw) = lookup(ENV_DRIVER_THREAD) {
            cfg.driver.thread_name = raw;
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}
