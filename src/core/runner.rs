//! # Run a single attempt under the timeout supervisor.
//!
//! - The operation runs as its own Tokio task with a child cancellation token.
//! - With a timeout, the task's join handle races a deadline. If the deadline wins,
//!   the token is cancelled, `TimeoutHit` is published and the handle is dropped: the
//!   task is detached, not aborted, and its eventual result is ignored.
//! - A panic inside `run()` surfaces as a `JoinError` and becomes
//!   [`OperationError::Panicked`].
//!
//! ## Event flow
//! ```text
//! Ok                         → OperationCompleted
//! Err(Fail/Fatal/Panicked)   → OperationFailed
//! deadline elapsed           → TimeoutHit (no OperationFailed)
//! Err(Canceled)              → nothing here; the caller reports OperationCanceled
//! ```

use tokio::{task::JoinError, time};
use tokio_util::sync::CancellationToken;

use crate::{
    error::OperationError,
    events::{Bus, Event, EventKind},
    operations::OperationSpec,
    subscribers::panic_message,
};

/// Executes attempt number `attempt` of `spec`.
pub(crate) async fn run_attempt(
    spec: &OperationSpec,
    attempt: u32,
    parent: &CancellationToken,
    bus: &Bus,
) -> Result<(), OperationError> {
    let child = parent.child_token();
    let op = spec.operation().clone();
    let ctx = child.clone();
    let mut handle = tokio::spawn(async move { op.run(ctx).await });

    let res = match spec.timeout() {
        Some(dur) => match time::timeout(dur, &mut handle).await {
            Ok(joined) => flatten(joined),
            Err(_elapsed) => {
                child.cancel();
                drop(handle);
                bus.publish(attempt_event(EventKind::TimeoutHit, spec, attempt).with_timeout(dur));
                return Err(OperationError::Timeout { timeout: dur });
            }
        },
        None => flatten(handle.await),
    };

    match &res {
        Ok(()) => bus.publish(attempt_event(EventKind::OperationCompleted, spec, attempt)),
        Err(OperationError::Canceled) => {}
        Err(e) => bus.publish(
            attempt_event(EventKind::OperationFailed, spec, attempt).with_reason(e.to_string()),
        ),
    }
    res
}

fn flatten(joined: Result<Result<(), OperationError>, JoinError>) -> Result<(), OperationError> {
    match joined {
        Ok(res) => res,
        Err(e) if e.is_panic() => Err(OperationError::Panicked {
            info: panic_message(e.into_panic().as_ref()),
        }),
        Err(_) => Err(OperationError::Canceled),
    }
}

/// Event skeleton naming `spec`.
pub(crate) fn operation_event(kind: EventKind, spec: &OperationSpec) -> Event {
    Event::new(kind)
        .with_operation(spec.name(), spec.id_arc())
        .with_priority(spec.priority())
}

/// Event skeleton for an attempt of `spec`.
pub(crate) fn attempt_event(kind: EventKind, spec: &OperationSpec, attempt: u32) -> Event {
    operation_event(kind, spec).with_attempt(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Priority;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_wins_over_hung_operation() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let saw_cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&saw_cancel);

        let spec = OperationSpec::builder("hang")
            .priority(Priority::Medium)
            .timeout(Duration::from_millis(1000))
            .build(move |ctx: CancellationToken| {
                let flag = Arc::clone(&flag);
                async move {
                    ctx.cancelled().await;
                    flag.store(true, Ordering::SeqCst);
                    std::future::pending::<()>().await;
                    Ok(())
                }
            });

        let started = time::Instant::now();
        let res = run_attempt(&spec, 1, &CancellationToken::new(), &bus).await;
        assert!(matches!(res, Err(OperationError::Timeout { .. })));
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(drain(&mut rx), vec![EventKind::TimeoutHit]);

        // The abandoned attempt still receives the cooperative signal.
        time::sleep(Duration::from_millis(1)).await;
        assert!(saw_cancel.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn success_and_failure_are_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();

        let ok = OperationSpec::builder("ok").build(|_ctx| async { Ok(()) });
        assert!(run_attempt(&ok, 1, &token, &bus).await.is_ok());

        let bad = OperationSpec::builder("bad")
            .build(|_ctx| async { Err(OperationError::fail("disk full")) });
        let err = run_attempt(&bad, 1, &token, &bus).await.unwrap_err();
        assert_eq!(err.as_label(), "operation_failed");

        assert_eq!(
            drain(&mut rx),
            vec![EventKind::OperationCompleted, EventKind::OperationFailed]
        );
    }

    fn explode() -> Result<(), OperationError> {
        panic!("missing execute")
    }

    #[tokio::test]
    async fn panic_becomes_a_failure() {
        let bus = Bus::new(16);
        let spec = OperationSpec::builder("broken").build(|_ctx| async { explode() });

        let err = run_attempt(&spec, 1, &CancellationToken::new(), &bus)
            .await
            .unwrap_err();
        match err {
            OperationError::Panicked { info } => assert_eq!(info, "missing execute"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
