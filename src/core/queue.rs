//! # PriorityQueue: bounded-concurrency dispatcher.
//!
//! The queue owns four priority buckets, a semaphore capping concurrent attempts,
//! and the event bus. All bucket and running-set mutation happens under one short
//! lock; dispatch runs inside that lock every time something changes.
//!
//! ## Architecture
//! ```text
//! add(spec) ──► lock ──► [critical? discard high/medium/low] ──► push tail ──► dispatch
//!
//! dispatch (under lock):
//!   while buckets not empty and a slot permit is free:
//!     pop head of most urgent bucket ─► attempt += 1 ─► running.insert
//!     spawn drive(pending, permit)
//!
//! drive:
//!   run_attempt (timeout supervisor)
//!     ├─ Ok            ─► done
//!     └─ Err           ─► RetryDecision
//!          ├─ Retry    ─► RetryScheduled
//!          ├─ Exhausted─► PermanentFailure
//!          └─ Abandon  ─► OperationCanceled
//!   release (lock): running.remove, drop permit, dispatch
//!   if Retry: sleep(delay) ─► requeue (lock): push tail, dispatch
//! ```
//!
//! ## Rules
//! - Running attempts never exceed `Config::max_concurrent`; critical work jumps the
//!   queue, never the cap.
//! - A bucket is considered only when every more urgent bucket is empty.
//! - Retries re-enter at the tail of their own bucket.
//! - Preemption and `clear()` only touch queued operations; running ones are left alone.
//! - No operation outcome is returned to the `add()` caller; everything is published.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore, broadcast};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use super::{
    buckets::{Buckets, Pending},
    builder::QueueBuilder,
    runner::{attempt_event, operation_event, run_attempt},
    stats::QueueStats,
};
use crate::{
    config::Config,
    error::{AddError, OperationError, RuntimeError},
    events::{Bus, DiscardReason, Event, EventKind},
    operations::{OperationSpec, Priority},
    policies::RetryDecision,
};

#[derive(Default)]
struct State {
    buckets: Buckets,
    /// Running attempts by sequence number.
    running: HashMap<u64, Arc<str>>,
    /// Failed operations sleeping before they re-enter a bucket.
    backing_off: usize,
    closed: bool,
}

impl State {
    fn is_idle(&self) -> bool {
        self.buckets.is_empty() && self.running.is_empty() && self.backing_off == 0
    }
}

struct Inner {
    cfg: Config,
    state: Mutex<State>,
    slots: Arc<Semaphore>,
    bus: Bus,
    /// Parent of every attempt token; cancelled by shutdown.
    token: CancellationToken,
    idle: Notify,
    next_seq: AtomicU64,
    /// Stops the subscriber listener once the last handle is gone.
    listener_stop: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.listener_stop.cancel();
    }
}

/// Priority operation queue.
///
/// Cheap to clone; all clones share the same buckets, slots and event bus.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use opqueue::{Config, OperationSpec, PriorityQueue, Priority};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let queue = PriorityQueue::new(Config { max_concurrent: 2, ..Config::default() });
///
///     let spec = OperationSpec::builder("save-roster")
///         .priority(Priority::High)
///         .timeout(Duration::from_secs(5))
///         .max_retries(2)
///         .build(|_ctx| async { Ok(()) });
///
///     queue.add(spec).unwrap();
///     queue.wait_idle().await;
///     assert_eq!(queue.stats().total_queued, 0);
/// }
/// ```
#[derive(Clone)]
pub struct PriorityQueue {
    inner: Arc<Inner>,
}

impl PriorityQueue {
    /// Starts a builder (use it to attach subscribers).
    pub fn builder(cfg: Config) -> QueueBuilder {
        QueueBuilder::new(cfg)
    }

    /// Creates a queue without subscribers.
    pub fn new(cfg: Config) -> Self {
        QueueBuilder::new(cfg).build()
    }

    pub(super) fn from_parts(cfg: Config, bus: Bus, listener_stop: CancellationToken) -> Self {
        let slots = Arc::new(Semaphore::new(cfg.concurrency_limit()));
        Self {
            inner: Arc::new(Inner {
                cfg,
                state: Mutex::new(State::default()),
                slots,
                bus,
                token: CancellationToken::new(),
                idle: Notify::new(),
                next_seq: AtomicU64::new(0),
                listener_stop,
            }),
        }
    }

    /// Enqueues an operation and returns as soon as it sits in its bucket.
    ///
    /// A critical operation first discards every queued high, medium and low
    /// operation. If a slot is free the operation starts before this returns.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn add(&self, spec: OperationSpec) -> Result<(), AddError> {
        let inner = &self.inner;
        let mut st = inner.state.lock();
        if st.closed {
            return Err(AddError::Closed);
        }

        if spec.priority() == Priority::Critical {
            for dropped in st.buckets.discard_below_critical() {
                inner.publish_discard(&dropped, DiscardReason::Preempted);
            }
        }

        inner
            .bus
            .publish(operation_event(EventKind::OperationEnqueued, &spec));
        st.buckets.push_back(Pending {
            seq: inner.next_seq.fetch_add(1, Ordering::Relaxed),
            spec,
            attempt: 0,
        });
        inner.dispatch(&mut st);
        Ok(())
    }

    /// Returns queue depths and the running count from one consistent snapshot.
    pub fn stats(&self) -> QueueStats {
        let st = self.inner.state.lock();
        QueueStats {
            critical: st.buckets.depth(Priority::Critical),
            high: st.buckets.depth(Priority::High),
            medium: st.buckets.depth(Priority::Medium),
            low: st.buckets.depth(Priority::Low),
            running: st.running.len(),
            total_queued: st.buckets.total(),
        }
    }

    /// Discards every queued operation and returns how many were dropped.
    ///
    /// Running operations and pending retries are not touched.
    pub fn clear(&self) -> usize {
        let inner = &self.inner;
        let mut st = inner.state.lock();
        let dropped = st.buckets.drain_all();
        for pending in &dropped {
            inner.publish_discard(pending, DiscardReason::Cleared);
        }
        inner
            .bus
            .publish(Event::new(EventKind::QueueCleared).with_count(dropped.len()));
        inner.notify_if_idle(&st);
        dropped.len()
    }

    /// True when nothing is queued, running or waiting to retry.
    pub fn is_idle(&self) -> bool {
        self.inner.state.lock().is_idle()
    }

    /// Resolves once the queue is idle.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Receives every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Configuration the queue was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Stops the queue.
    ///
    /// New `add()` calls fail with [`AddError::Closed`], queued operations and pending
    /// retries are discarded, running attempts get their tokens cancelled, and the call
    /// waits up to `grace` for them to finish.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), RuntimeError> {
        let inner = &self.inner;
        inner.bus.publish(Event::new(EventKind::ShutdownRequested));
        {
            let mut st = inner.state.lock();
            st.closed = true;
            for pending in st.buckets.drain_all() {
                inner.publish_discard(&pending, DiscardReason::Shutdown);
            }
            inner.notify_if_idle(&st);
        }
        inner.token.cancel();

        if time::timeout(grace, self.wait_idle()).await.is_ok() {
            inner.bus.publish(Event::new(EventKind::AllStoppedWithin));
            return Ok(());
        }

        let mut stuck: Vec<String> = {
            let st = inner.state.lock();
            st.running.values().map(|name| name.to_string()).collect()
        };
        stuck.sort();
        inner.bus.publish(
            Event::new(EventKind::GraceExceeded)
                .with_count(stuck.len())
                .with_reason(stuck.join(",")),
        );
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// [`shutdown`](Self::shutdown) with `Config::grace`.
    pub async fn shutdown_default(&self) -> Result<(), RuntimeError> {
        self.shutdown(self.inner.cfg.grace).await
    }
}

impl Inner {
    /// Fills free slots from the most urgent non-empty bucket.
    fn dispatch(self: &Arc<Self>, st: &mut State) {
        while !st.buckets.is_empty() {
            let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
                break;
            };
            let Some(mut pending) = st.buckets.pop_next() else {
                break;
            };
            pending.attempt += 1;
            st.running
                .insert(pending.seq, Arc::from(pending.spec.name()));
            self.bus.publish(attempt_event(
                EventKind::OperationStarting,
                &pending.spec,
                pending.attempt,
            ));
            tokio::spawn(Arc::clone(self).drive(pending, permit));
        }
    }

    /// Runs one attempt, reports the outcome, frees the slot, and schedules a retry.
    async fn drive(self: Arc<Self>, pending: Pending, permit: OwnedSemaphorePermit) {
        let attempt = pending.attempt;
        let delay = match run_attempt(&pending.spec, attempt, &self.token, &self.bus).await {
            Ok(()) => None,
            Err(err) => {
                let decision = RetryDecision::decide(
                    attempt,
                    pending.spec.max_retries(),
                    &err,
                    &self.cfg.backoff,
                );
                self.report(&pending.spec, attempt, &err, decision);
                match decision {
                    RetryDecision::Retry { delay } => Some(delay),
                    RetryDecision::Exhausted | RetryDecision::Abandon => None,
                }
            }
        };

        self.release(pending.seq, permit, delay.is_some());

        if let Some(delay) = delay {
            select! {
                _ = time::sleep(delay) => self.requeue(pending),
                _ = self.token.cancelled() => self.abandon_retry(pending),
            }
        }
    }

    fn report(&self, spec: &OperationSpec, attempt: u32, err: &OperationError, decision: RetryDecision) {
        let ev = match decision {
            RetryDecision::Retry { delay } => attempt_event(EventKind::RetryScheduled, spec, attempt)
                .with_delay(delay)
                .with_reason(err.to_string()),
            RetryDecision::Exhausted => {
                attempt_event(EventKind::PermanentFailure, spec, attempt).with_reason(err.to_string())
            }
            RetryDecision::Abandon => attempt_event(EventKind::OperationCanceled, spec, attempt),
        };
        self.bus.publish(ev);
    }

    fn release(self: &Arc<Self>, seq: u64, permit: OwnedSemaphorePermit, retrying: bool) {
        let mut st = self.state.lock();
        st.running.remove(&seq);
        drop(permit);
        if retrying {
            st.backing_off += 1;
        }
        self.dispatch(&mut st);
        self.notify_if_idle(&st);
    }

    fn requeue(self: &Arc<Self>, pending: Pending) {
        let mut st = self.state.lock();
        st.backing_off = st.backing_off.saturating_sub(1);
        if st.closed {
            self.publish_discard(&pending, DiscardReason::Shutdown);
        } else {
            self.bus.publish(attempt_event(
                EventKind::OperationEnqueued,
                &pending.spec,
                pending.attempt,
            ));
            st.buckets.push_back(pending);
            self.dispatch(&mut st);
        }
        self.notify_if_idle(&st);
    }

    fn abandon_retry(&self, pending: Pending) {
        let mut st = self.state.lock();
        st.backing_off = st.backing_off.saturating_sub(1);
        self.publish_discard(&pending, DiscardReason::Shutdown);
        self.notify_if_idle(&st);
    }

    fn publish_discard(&self, pending: &Pending, reason: DiscardReason) {
        self.bus.publish(
            operation_event(EventKind::OperationDiscarded, &pending.spec)
                .with_discard_reason(reason),
        );
    }

    fn notify_if_idle(&self, st: &State) {
        if st.is_idle() {
            self.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn cfg(max_concurrent: usize) -> Config {
        Config {
            max_concurrent,
            backoff: crate::BackoffPolicy::constant(Duration::from_millis(10)),
            ..Config::default()
        }
    }

    fn gated(name: &'static str, priority: Priority) -> (OperationSpec, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel::<()>();
        let rx = Mutex::new(Some(rx));
        let spec = OperationSpec::builder(name)
            .priority(priority)
            .build(move |_ctx| {
                let rx = rx.lock().take();
                async move {
                    if let Some(rx) = rx {
                        let _ = rx.await;
                    }
                    Ok(())
                }
            });
        (spec, tx)
    }

    #[tokio::test]
    async fn add_dispatches_before_returning() {
        let queue = PriorityQueue::new(cfg(1));
        let (spec, gate) = gated("first", Priority::Low);
        queue.add(spec).unwrap();

        let stats = queue.stats();
        assert_eq!(stats.running, 1);
        assert_eq!(stats.total_queued, 0);

        gate.send(()).unwrap();
        queue.wait_idle().await;
        assert_eq!(queue.stats(), QueueStats::default());
    }

    #[tokio::test]
    async fn critical_waits_for_a_slot_like_everyone_else() {
        let queue = PriorityQueue::new(cfg(1));
        let (busy, gate) = gated("busy", Priority::Low);
        queue.add(busy).unwrap();

        let (crit, crit_gate) = gated("urgent", Priority::Critical);
        queue.add(crit).unwrap();

        let stats = queue.stats();
        assert_eq!(stats.running, 1);
        assert_eq!(stats.critical, 1);

        gate.send(()).unwrap();
        crit_gate.send(()).unwrap();
        queue.wait_idle().await;
    }

    #[tokio::test]
    async fn oversized_concurrency_builds_a_working_queue() {
        let queue = PriorityQueue::new(Config {
            max_concurrent: usize::MAX,
            ..Config::default()
        });
        let spec = OperationSpec::builder("unbounded").build(|_ctx| async { Ok(()) });
        queue.add(spec).unwrap();
        queue.wait_idle().await;
        assert_eq!(queue.stats(), QueueStats::default());
    }

    #[tokio::test]
    async fn add_after_shutdown_is_rejected() {
        let queue = PriorityQueue::new(cfg(1));
        queue.shutdown(Duration::from_millis(10)).await.unwrap();

        let spec = OperationSpec::builder("late").build(|_ctx| async { Ok(()) });
        assert_eq!(queue.add(spec), Err(AddError::Closed));
    }
}
