//! # opqueue
//!
//! **opqueue** is a priority operation queue for async save/write work.
//!
//! Callers submit operations tagged with one of four priorities. The queue runs at
//! most `max_concurrent` of them at a time, always picking the most urgent waiting
//! operation (FIFO within a priority), retries failures with exponential backoff,
//! abandons attempts that exceed their deadline, and lets a critical operation push
//! every queued non-critical operation out of the way.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   OperationSpec     OperationSpec     OperationSpec
//!   (critical)        (high)            (low)
//!        │                 │                 │
//!        ▼                 ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PriorityQueue                                                │
//! │  - Buckets [critical | high | medium | low] (FIFO each)       │
//! │  - Semaphore (max_concurrent slots)                           │
//! │  - running set, backing-off count                             │
//! │  - Bus (broadcast events)                                     │
//! └──────┬──────────────────┬──────────────────┬──────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │ attempt  │       │ attempt  │       │ attempt  │   (one per slot)
//!   │ +timeout │       │ +timeout │       │ +timeout │
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘
//!        │ OperationStarting / Completed / Failed / TimeoutHit /
//!        │ RetryScheduled / PermanentFailure / OperationDiscarded
//!        ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   Bus (broadcast channel)                     │
//! └──────────────┬───────────────────────────────┬────────────────┘
//!                ▼                               ▼
//!      subscriber listener               queue.subscribe()
//!                ▼                        (tests, app code)
//!          SubscriberSet
//!       ┌────────┼────────┐
//!       ▼        ▼        ▼
//!   LogWriter  metrics  custom
//! ```
//!
//! ### Lifecycle of one operation
//! ```text
//! add(spec) ─► [critical: discard queued high/medium/low] ─► tail of bucket
//!
//! dispatch: free slot + most urgent head ─► attempt += 1 ─► run_attempt
//!   ├─ Ok                       ─► OperationCompleted, done
//!   ├─ deadline elapsed         ─► token cancelled, TimeoutHit ─┐
//!   └─ Err (fail / panic)       ─► OperationFailed ─────────────┤
//!                                                               ▼
//!        attempt <= max_retries ─► RetryScheduled, slot freed, sleep(backoff),
//!                                  tail of the same bucket
//!        otherwise              ─► PermanentFailure, dropped
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Queue**         | Priority buckets, bounded concurrency, preemption, stats.    | [`PriorityQueue`], [`QueueStats`]           |
//! | **Operations**    | Define work as closures or trait objects.                    | [`Operation`], [`OperationFn`], [`OperationSpec`] |
//! | **Policies**      | Retry budget and backoff schedule.                           | [`BackoffPolicy`], [`JitterPolicy`]         |
//! | **Subscriber API**| Hook into queue events (logging, metrics, custom).           | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors for operations, submission and shutdown.        | [`OperationError`], [`AddError`], [`RuntimeError`] |
//! | **Configuration** | Centralize queue settings.                                   | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use opqueue::{Config, LogWriter, OperationError, OperationSpec, PriorityQueue, Priority, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config { max_concurrent: 2, ..Config::default() };
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
//!     let queue = PriorityQueue::builder(cfg).with_subscribers(subs).build();
//!
//!     let save = OperationSpec::builder("save-roster")
//!         .id("roster-7")
//!         .priority(Priority::High)
//!         .timeout(Duration::from_secs(5))
//!         .max_retries(3)
//!         .build(|ctx: CancellationToken| async move {
//!             if ctx.is_cancelled() {
//!                 return Err(OperationError::Canceled);
//!             }
//!             Ok(())
//!         });
//!
//!     queue.add(save)?;
//!     queue.wait_idle().await;
//!     queue.shutdown(Duration::from_secs(1)).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod operations;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use self::core::{PriorityQueue, QueueBuilder, QueueStats};
pub use error::{AddError, OperationError, RuntimeError};
pub use events::{Bus, DiscardReason, Event, EventKind};
pub use operations::{Operation, OperationFn, OperationRef, OperationSpec, OperationSpecBuilder, Priority};
pub use policies::{BackoffPolicy, JitterPolicy, RetryDecision};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
