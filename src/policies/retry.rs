//! # Retry controller decision.
//!
//! After a failed attempt the queue asks [`RetryDecision::decide`] what happens next.
//! The attempt counter has already been incremented for the failed attempt, so
//! `attempt` is 1 after the first failure.
//!
//! ```text
//! err not retryable (Fatal)        → Exhausted
//! err is Canceled                  → Abandon
//! attempt <= max_retries           → Retry { delay = backoff.delay_for(attempt) }
//! attempt >  max_retries           → Exhausted
//! ```

use std::time::Duration;

use crate::error::OperationError;
use crate::policies::BackoffPolicy;

/// What to do with an operation whose attempt just failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then push the operation to the tail of its bucket.
    Retry {
        /// Backoff before re-entering the queue.
        delay: Duration,
    },
    /// Retry budget spent (or error not retryable): permanent failure.
    Exhausted,
    /// The operation gave up on cancellation; drop it without a failure report.
    Abandon,
}

impl RetryDecision {
    /// Decides the fate of failed attempt number `attempt`.
    pub fn decide(
        attempt: u32,
        max_retries: u32,
        err: &OperationError,
        backoff: &BackoffPolicy,
    ) -> Self {
        if matches!(err, OperationError::Canceled) {
            return RetryDecision::Abandon;
        }
        if !err.is_retryable() || attempt > max_retries {
            return RetryDecision::Exhausted;
        }
        RetryDecision::Retry {
            delay: backoff.delay_for(attempt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff() -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(10),
            ..BackoffPolicy::default()
        }
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let err = OperationError::fail("nope");
        assert_eq!(
            RetryDecision::decide(1, 0, &err, &backoff()),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn retries_until_budget_is_spent() {
        let err = OperationError::fail("nope");
        let b = backoff();
        assert_eq!(
            RetryDecision::decide(1, 2, &err, &b),
            RetryDecision::Retry {
                delay: Duration::from_millis(10)
            }
        );
        assert_eq!(
            RetryDecision::decide(2, 2, &err, &b),
            RetryDecision::Retry {
                delay: Duration::from_millis(20)
            }
        );
        assert_eq!(RetryDecision::decide(3, 2, &err, &b), RetryDecision::Exhausted);
    }

    #[test]
    fn timeouts_share_the_budget() {
        let err = OperationError::Timeout {
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            RetryDecision::decide(1, 1, &err, &backoff()),
            RetryDecision::Retry { .. }
        ));
        assert_eq!(
            RetryDecision::decide(2, 1, &err, &backoff()),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn fatal_and_canceled_skip_retry() {
        assert_eq!(
            RetryDecision::decide(1, 5, &OperationError::fatal("bad"), &backoff()),
            RetryDecision::Exhausted
        );
        assert_eq!(
            RetryDecision::decide(1, 5, &OperationError::Canceled, &backoff()),
            RetryDecision::Abandon
        );
    }
}
