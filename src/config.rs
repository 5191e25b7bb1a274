//! # Queue configuration.
//!
//! Provides [`Config`], centralized settings for a [`PriorityQueue`](crate::PriorityQueue).
//!
//! Config is used in two ways:
//! 1. **Queue creation**: `PriorityQueue::builder(config).build()`
//! 2. **Spec defaults**: `OperationSpec::with_defaults(id, op, priority, &config)`
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → clamped to 1 (the queue always runs something)
//! - `max_concurrent`, `bus_capacity` above the runtime limits → clamped down
//! - `timeout = 0s` → no timeout (treated as `None` by `OperationSpec::with_defaults`)

use std::time::Duration;

use tokio::sync::Semaphore;

use crate::events::Bus;
use crate::policies::BackoffPolicy;

/// Configuration for the priority queue runtime.
///
/// ## Field semantics
/// - `max_concurrent`: operations allowed to run at once across all priorities (min 1)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `backoff`: delay schedule between retries
/// - `timeout`: default per-attempt timeout (`0s` = no timeout)
/// - `max_retries`: default retry budget for specs built with defaults
/// - `grace`: default wait used by [`PriorityQueue::shutdown_default`](crate::PriorityQueue::shutdown_default)
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of operations executing simultaneously.
    ///
    /// Applied globally: a critical operation jumps the queue, never this cap.
    pub max_concurrent: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Backoff schedule applied between failed attempts.
    pub backoff: BackoffPolicy,

    /// Default per-attempt timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = deadline applied to each attempt
    pub timeout: Duration,

    /// Default number of retries after the first failed attempt.
    pub max_retries: u32,

    /// Time to wait for running operations during shutdown.
    pub grace: Duration,
}

impl Config {
    /// Returns the concurrency cap, clamped to `1..=Semaphore::MAX_PERMITS`.
    #[inline]
    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrent.clamp(1, Semaphore::MAX_PERMITS)
    }

    /// Returns the default per-attempt timeout as an `Option`.
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the bus capacity clamped to `1..=Bus::MAX_CAPACITY`.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.clamp(1, Bus::MAX_CAPACITY)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_concurrent = 3`
    /// - `bus_capacity = 1024`
    /// - `backoff = BackoffPolicy::default()` (1s doubling, capped at 30s)
    /// - `timeout = 0s` (no timeout)
    /// - `max_retries = 0` (single attempt)
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            bus_capacity: 1024,
            backoff: BackoffPolicy::default(),
            timeout: Duration::ZERO,
            max_retries: 0,
            grace: Duration::from_secs(30),
        }
    }
}
