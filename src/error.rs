//! Error types used by the queue runtime and by operations.
//!
//! This module defines three enums:
//!
//! - [`OperationError`]: errors raised by a single operation attempt.
//! - [`AddError`]: rejection of a new operation by [`PriorityQueue::add`](crate::PriorityQueue::add).
//! - [`RuntimeError`]: errors raised by the queue runtime itself (shutdown).
//!
//! Every enum provides `as_label` (stable snake_case string for logs/metrics).
//! [`OperationError::is_retryable`] tells the retry controller whether another attempt may follow.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the queue runtime.
///
/// These represent failures of the scheduler itself, such as a shutdown
/// sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some operations were still running.
    #[error("shutdown timeout {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of operations that had not finished in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use opqueue::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// Error returned by [`PriorityQueue::add`](crate::PriorityQueue::add).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddError {
    /// The queue is shutting down and no longer accepts operations.
    #[error("queue closed")]
    Closed,
}

impl AddError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AddError::Closed => "add_closed",
        }
    }
}

/// # Errors produced by an operation attempt.
///
/// `Fail`, `Timeout` and `Panicked` count toward the operation's retry budget.
/// `Fatal` and `Canceled` end the operation without further attempts.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum OperationError {
    /// Attempt did not settle before its deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// Attempt failed but may succeed if retried.
    #[error("execution failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// The operation panicked inside `run()`; treated like an ordinary failure.
    #[error("operation panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Non-recoverable error; the operation fails permanently without retry.
    #[error("fatal error (no retry): {reason}")]
    Fatal {
        /// The underlying error message.
        reason: String,
    },

    /// The operation observed its cancellation token and gave up.
    #[error("operation cancelled")]
    Canceled,
}

impl OperationError {
    /// Convenience constructor for [`OperationError::Fail`].
    pub fn fail(reason: impl Into<String>) -> Self {
        OperationError::Fail {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`OperationError::Fatal`].
    pub fn fatal(reason: impl Into<String>) -> Self {
        OperationError::Fatal {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use opqueue::OperationError;
    /// use std::time::Duration;
    ///
    /// let err = OperationError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "operation_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            OperationError::Timeout { .. } => "operation_timeout",
            OperationError::Fail { .. } => "operation_failed",
            OperationError::Panicked { .. } => "operation_panicked",
            OperationError::Fatal { .. } => "operation_fatal",
            OperationError::Canceled => "operation_canceled",
        }
    }

    /// Indicates whether another attempt may follow this error.
    ///
    /// # Example
    /// ```
    /// use opqueue::OperationError;
    ///
    /// assert!(OperationError::fail("disk busy").is_retryable());
    /// assert!(!OperationError::fatal("schema mismatch").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OperationError::Fail { .. }
                | OperationError::Timeout { .. }
                | OperationError::Panicked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panics_and_timeouts_are_retryable() {
        assert!(
            OperationError::Panicked {
                info: "boom".into()
            }
            .is_retryable()
        );
        assert!(
            OperationError::Timeout {
                timeout: Duration::from_millis(5)
            }
            .is_retryable()
        );
        assert!(!OperationError::Canceled.is_retryable());
    }

    #[test]
    fn display_carries_reason() {
        let err = OperationError::fail("connection reset");
        assert_eq!(err.to_string(), "execution failed: connection reset");
        assert_eq!(AddError::Closed.to_string(), "queue closed");
    }
}
