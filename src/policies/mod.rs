//! Retry policies.
//!
//! This module groups the knobs that control **whether** a failed operation is
//! attempted again and **how long** it waits before re-entering its bucket.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//! - [`RetryDecision`] outcome of the retry controller for one failed attempt
//!
//! ## Quick wiring
//! ```text
//! OperationSpec { max_retries, .. } + Config { backoff, .. }
//!      └─► the queue decides after each failed attempt:
//!           - RetryDecision::decide(attempt, max_retries, &err, &backoff)
//!           - Retry { delay } → sleep, then push to the tail of the same bucket
//!           - Exhausted       → permanent failure, logged and dropped
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=30s, jitter=None.
//! - `JitterPolicy::None` by default; consider `Equal` when many writers share a store.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryDecision;
