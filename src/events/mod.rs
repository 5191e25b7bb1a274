//! Queue events: types and broadcast bus.
//!
//! Every observable step of the queue (enqueue, start, retry, timeout, permanent
//! failure, discard, clear, shutdown) is published as an [`Event`] on a [`Bus`].
//! Logging is one consumer of that stream: see [`LogWriter`](crate::LogWriter).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PriorityQueue` (add/clear/shutdown), `core::runner` (attempt outcomes),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the queue's subscriber listener (fans out to `SubscriberSet`) and any
//!   receiver obtained from [`PriorityQueue::subscribe`](crate::PriorityQueue::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{DiscardReason, Event, EventKind};
