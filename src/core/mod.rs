//! Queue core: buckets, dispatch and the attempt runner.
//!
//! The public API from this module is [`PriorityQueue`] (with [`QueueBuilder`] and
//! the [`QueueStats`] snapshot).
//!
//! Internal modules:
//! - [`buckets`]: the four per-priority FIFO queues;
//! - [`queue`]: dispatch under one lock, preemption, retry re-insertion, shutdown;
//! - [`runner`]: executes one attempt under its deadline and publishes the outcome;
//! - [`builder`]: wires the bus and subscriber listener.

mod buckets;
mod builder;
mod queue;
mod runner;
mod stats;

pub use builder::QueueBuilder;
pub use queue::PriorityQueue;
pub use stats::QueueStats;
