//! # LogWriter: events to `tracing`
//!
//! Renders queue events as log lines. Failures, timeouts and permanent failures go
//! to `error!`; everything else goes to `debug!`. Operation name, id and priority
//! are attached as structured fields and repeated in the message.
//!
//! ## Example output
//! ```text
//! DEBUG enqueued operation="save-roster" id=roster-1 priority=high
//! ERROR [TIMEOUT] operation="save-roster" id=roster-1 priority=high attempt=1 timeout=1000ms
//! DEBUG retry operation="save-roster" id=roster-1 priority=high attempt=1 delay=1000ms err=timed out after 1s
//! ERROR permanent failure operation="save-roster" id=roster-1 priority=high attempts=4 err=...
//! DEBUG queue cleared discarded=3
//! ```

use async_trait::async_trait;
use tracing::{debug, error};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that writes every event through `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Formats the message part of the log line for `e`.
    pub fn render(e: &Event) -> String {
        let op = format!(
            "operation={:?} id={} priority={}",
            e.operation.as_deref().unwrap_or("?"),
            e.operation_id.as_deref().unwrap_or("?"),
            e.priority.map(|p| p.as_str()).unwrap_or("?"),
        );
        let attempt = e.attempt.unwrap_or(0);
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::OperationEnqueued => format!("enqueued {op}"),
            EventKind::OperationDiscarded => format!(
                "discarded {op} reason={}",
                e.discard_reason.map(|r| r.as_str()).unwrap_or("?")
            ),
            EventKind::OperationStarting => format!("starting {op} attempt={attempt}"),
            EventKind::OperationCompleted => format!("completed {op} attempt={attempt}"),
            EventKind::OperationFailed => format!("failed {op} attempt={attempt} err={reason}"),
            EventKind::TimeoutHit => format!(
                "[TIMEOUT] {op} attempt={attempt} timeout={}ms",
                e.timeout_ms.unwrap_or(0)
            ),
            EventKind::RetryScheduled => format!(
                "retry {op} attempt={attempt} delay={}ms err={reason}",
                e.delay_ms.unwrap_or(0)
            ),
            EventKind::PermanentFailure => {
                format!("permanent failure {op} attempts={attempt} err={reason}")
            }
            EventKind::OperationCanceled => format!("canceled {op} attempt={attempt}"),
            EventKind::QueueCleared => format!("queue cleared discarded={}", e.count.unwrap_or(0)),
            EventKind::ShutdownRequested => "shutdown requested".to_string(),
            EventKind::AllStoppedWithin => "all operations stopped within grace".to_string(),
            EventKind::GraceExceeded => format!(
                "grace exceeded still_running={} names={reason}",
                e.count.unwrap_or(0)
            ),
            EventKind::SubscriberOverflow => format!("subscriber overflow {reason}"),
            EventKind::SubscriberPanicked => format!(
                "subscriber panicked subscriber={} info={reason}",
                e.operation.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let line = Self::render(e);
        let operation = e.operation.as_deref().unwrap_or("");
        let id = e.operation_id.as_deref().unwrap_or("");

        if e.is_error() {
            error!(seq = e.seq, operation, id, "{line}");
        } else {
            debug!(seq = e.seq, operation, id, "{line}");
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DiscardReason;
    use crate::operations::Priority;
    use std::time::Duration;

    #[test]
    fn timeout_line_is_tagged() {
        let ev = Event::new(EventKind::TimeoutHit)
            .with_operation("save-roster", "r-1")
            .with_priority(Priority::High)
            .with_attempt(1)
            .with_timeout(Duration::from_millis(1000));
        let line = LogWriter::render(&ev);
        assert!(line.starts_with("[TIMEOUT]"));
        assert!(line.contains("save-roster"));
        assert!(line.contains("timeout=1000ms"));
    }

    #[test]
    fn only_timeouts_carry_the_timeout_tag() {
        let failed = Event::new(EventKind::OperationFailed)
            .with_operation("save", "1")
            .with_reason("execution failed: disk full");
        let fatal = Event::new(EventKind::PermanentFailure)
            .with_operation("save", "1")
            .with_reason("timed out after 1s");
        assert!(!LogWriter::render(&failed).contains("TIMEOUT"));
        assert!(!LogWriter::render(&fatal).contains("TIMEOUT"));
    }

    #[test]
    fn discard_line_names_the_reason() {
        let ev = Event::new(EventKind::OperationDiscarded)
            .with_operation("autosave", "a-9")
            .with_priority(Priority::Low)
            .with_discard_reason(DiscardReason::Preempted);
        assert_eq!(
            LogWriter::render(&ev),
            "discarded operation=\"autosave\" id=a-9 priority=low reason=preempted"
        );
    }
}
