use std::sync::Arc;

use tokio::select;
use tokio::sync::broadcast::{
    Receiver,
    error::{RecvError, TryRecvError},
};
use tokio_util::sync::CancellationToken;

use super::queue::PriorityQueue;
use crate::{
    config::Config,
    events::{Bus, Event},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for a [`PriorityQueue`] with optional subscribers.
pub struct QueueBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl QueueBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Each subscriber gets its own bounded queue and worker; a slow or panicking
    /// subscriber never blocks the dispatcher.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds a single subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the queue.
    ///
    /// With subscribers attached this spawns the bus listener, so it must be called
    /// from within a Tokio runtime.
    pub fn build(self) -> PriorityQueue {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener_stop = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(bus.subscribe(), set, listener_stop.clone());
        }
        PriorityQueue::from_parts(self.cfg, bus, listener_stop)
    }
}

/// Forwards bus events to the subscriber set until the queue is dropped.
///
/// Events lost to bus lag are reported to the subscribers as one `SubscriberOverflow`
/// carrying the skipped count.
fn subscriber_listener(mut rx: Receiver<Event>, set: SubscriberSet, stop: CancellationToken) {
    tokio::spawn(async move {
        loop {
            select! {
                res = rx.recv() => match res {
                    Ok(ev) => set.emit_arc(Arc::new(ev)),
                    Err(RecvError::Lagged(skipped)) => {
                        set.emit_arc(Arc::new(Event::listener_lagged(skipped)));
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit_arc(Arc::new(ev)),
                            Err(TryRecvError::Lagged(skipped)) => {
                                set.emit_arc(Arc::new(Event::listener_lagged(skipped)));
                            }
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::operations::OperationSpec;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl Recorder {
        fn kinds(&self) -> Vec<EventKind> {
            self.0.lock().iter().map(|e| e.kind).collect()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().push(ev.clone());
        }
    }

    #[tokio::test]
    async fn subscribers_see_the_operation_lifecycle() {
        let rec = Arc::new(Recorder::default());
        let queue = QueueBuilder::new(Config::default())
            .with_subscriber(rec.clone())
            .build();

        let spec = OperationSpec::builder("save").build(|_ctx| async { Ok(()) });
        queue.add(spec).unwrap();
        queue.wait_idle().await;
        queue.shutdown(std::time::Duration::from_secs(1)).await.unwrap();

        // Delivery is asynchronous; poll briefly for the last event.
        for _ in 0..100 {
            if rec.kinds().contains(&EventKind::AllStoppedWithin) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let seen = rec.kinds();
        assert_eq!(
            &seen[..3],
            &[
                EventKind::OperationEnqueued,
                EventKind::OperationStarting,
                EventKind::OperationCompleted
            ]
        );
        assert!(seen.contains(&EventKind::ShutdownRequested));
    }

    #[tokio::test]
    async fn listener_lag_is_reported_to_subscribers() {
        let rec = Arc::new(Recorder::default());
        let queue = QueueBuilder::new(Config {
            max_concurrent: 1,
            bus_capacity: 16,
            ..Config::default()
        })
        .with_subscriber(rec.clone())
        .build();

        // The listener cannot run until the test yields, so the burst overruns the bus.
        for i in 0..100 {
            let spec = OperationSpec::builder(format!("burst-{i}")).build(|_ctx| async { Ok(()) });
            queue.add(spec).unwrap();
        }
        assert_eq!(queue.clear(), 99);
        queue.wait_idle().await;

        let mut skipped = 0;
        for _ in 0..100 {
            skipped = rec
                .0
                .lock()
                .iter()
                .filter(|e| {
                    e.kind == EventKind::SubscriberOverflow
                        && e.operation.as_deref() == Some("subscriber-listener")
                })
                .filter_map(|e| e.count)
                .sum::<usize>();
            if skipped > 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(skipped > 0);

        let lagged = Event::listener_lagged(skipped as u64);
        assert!(lagged.is_error());
        assert!(crate::LogWriter::render(&lagged).contains("lagged"));
    }
}
