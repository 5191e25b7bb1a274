//! # Event subscribers.
//!
//! Subscribers are how the queue's events reach logs, metrics or application code.
//!
//! ```text
//! runner / PriorityQueue ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                     │
//!                                                     ┌───────────────┼──────────┐
//!                                                     ▼               ▼          ▼
//!                                                 LogWriter        Metrics     Custom
//! ```
//!
//! - [`Subscribe`] the extension trait
//! - [`SubscriberSet`] per-subscriber bounded queues and worker tasks
//! - [`LogWriter`] renders events through `tracing`

mod log;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::panic_message;
