//! # Event bus for queue events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so that the queue, its runners and the
//! subscriber workers can publish without blocking.
//!
//! ```text
//! Publishers (many):                  Receivers:
//!   PriorityQueue ──┐
//!   runner        ──┼──► Bus ──► subscriber listener ──► SubscriberSet
//!   SubscriberSet ──┘     └────► PriorityQueue::subscribe() receivers
//! ```
//!
//! ## Rules
//! - `publish()` never blocks.
//! - One ring buffer of `capacity` events is shared by all receivers.
//! - Slow receivers get `RecvError::Lagged(n)` and skip the `n` oldest events.
//! - Events published while nobody listens are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for queue events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Largest ring buffer the bus will allocate.
    pub const MAX_CAPACITY: usize = 1 << 20;

    /// Creates a bus with the given capacity (clamped to `1..=MAX_CAPACITY`).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.clamp(1, Self::MAX_CAPACITY));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver observing events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_after_subscribing() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::QueueCleared));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ShutdownRequested));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ShutdownRequested);
        assert!(rx.try_recv().is_err());
    }
}
