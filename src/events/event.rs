//! # Events emitted by the priority queue.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (operation name and id, priority, attempt, delays, reason).
//!
//! ## Ordering guarantees
//! Each event gets a process-wide sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use opqueue::{Event, EventKind, Priority};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_operation("save-roster", "roster-1")
//!     .with_priority(Priority::High)
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(400));
//!
//! assert_eq!(ev.operation.as_deref(), Some("save-roster"));
//! assert_eq!(ev.delay_ms, Some(400));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::operations::Priority;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of queue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Submission ===
    /// Operation appended to its bucket.
    ///
    /// Sets: `operation`, `operation_id`, `priority`
    OperationEnqueued,

    /// Queued operation removed without running.
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `discard_reason`
    OperationDiscarded,

    // === Attempt lifecycle ===
    /// Attempt dispatched into a free slot.
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `attempt`
    OperationStarting,

    /// Attempt succeeded; the operation is done.
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `attempt`
    OperationCompleted,

    /// Attempt returned an error (timeouts are reported as [`EventKind::TimeoutHit`] instead).
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `attempt`, `reason`
    OperationFailed,

    /// Attempt exceeded its deadline and was abandoned.
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `attempt`, `timeout_ms`
    TimeoutHit,

    /// Failed operation will re-enter its bucket after a delay.
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `attempt` (the failed one), `delay_ms`, `reason`
    RetryScheduled,

    /// Retry budget exhausted or fatal error; the operation is dropped.
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `attempt`, `reason`
    PermanentFailure,

    /// Operation gave up after observing cancellation.
    ///
    /// Sets: `operation`, `operation_id`, `priority`, `attempt`
    OperationCanceled,

    // === Queue management ===
    /// All buckets emptied by `clear()`.
    ///
    /// Sets: `count` (operations discarded)
    QueueCleared,

    /// `shutdown()` started.
    ShutdownRequested,

    /// Every running operation finished within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded with operations still running.
    ///
    /// Sets: `count` (operations still running)
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked while handling an event.
    ///
    /// Sets: `operation` (subscriber name), `reason` (panic message)
    SubscriberPanicked,

    /// Subscriber queue full or closed, or the subscriber listener fell behind the bus;
    /// events were dropped.
    ///
    /// Sets: `operation` (subscriber name or `subscriber-listener`), `reason`,
    /// `count` (events skipped, listener lag only)
    SubscriberOverflow,
}

/// Why a queued operation was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// A critical operation arrived.
    Preempted,
    /// `clear()` was called.
    Cleared,
    /// The queue is shutting down (queued work or a pending retry).
    Shutdown,
}

impl DiscardReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscardReason::Preempted => "preempted",
            DiscardReason::Cleared => "cleared",
            DiscardReason::Shutdown => "shutdown",
        }
    }
}

/// Queue event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Monotonic sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Operation name (or subscriber name for subscriber events).
    pub operation: Option<Arc<str>>,
    /// Caller-supplied operation id.
    pub operation_id: Option<Arc<str>>,
    /// Operation priority.
    pub priority: Option<Priority>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Attempt deadline in milliseconds.
    pub timeout_ms: Option<u32>,
    /// Backoff delay in milliseconds.
    pub delay_ms: Option<u32>,
    /// Human-readable reason (error text, overflow details).
    pub reason: Option<Arc<str>>,
    /// Why a queued operation was dropped.
    pub discard_reason: Option<DiscardReason>,
    /// Number of operations affected (clear, grace exceeded).
    pub count: Option<usize>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            operation: None,
            operation_id: None,
            priority: None,
            attempt: None,
            timeout_ms: None,
            delay_ms: None,
            reason: None,
            discard_reason: None,
            count: None,
        }
    }

    /// Attaches the operation name and id.
    #[inline]
    pub fn with_operation(mut self, name: impl Into<Arc<str>>, id: impl Into<Arc<str>>) -> Self {
        self.operation = Some(name.into());
        self.operation_id = Some(id.into());
        self
    }

    #[inline]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_discard_reason(mut self, reason: DiscardReason) -> Self {
        self.discard_reason = Some(reason);
        self
    }

    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Creates a subscriber overflow event.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.operation = Some(subscriber.into());
        ev
    }

    /// Creates the event reporting `skipped` bus events lost by the subscriber listener.
    pub fn listener_lagged(skipped: u64) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber=subscriber-listener reason=lagged skipped={skipped}"))
            .with_count(usize::try_from(skipped).unwrap_or(usize::MAX));
        ev.operation = Some("subscriber-listener".into());
        ev
    }

    /// Creates a subscriber panic event.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.operation = Some(subscriber.into());
        ev
    }

    /// Whether this event reports an error condition (rendered at error level).
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            EventKind::OperationFailed
                | EventKind::TimeoutHit
                | EventKind::PermanentFailure
                | EventKind::GraceExceeded
                | EventKind::SubscriberPanicked
                | EventKind::SubscriberOverflow
        )
    }
}
