//! # Backoff policy for retried operations.
//!
//! [`BackoffPolicy`] computes the wait inserted before a failed operation
//! re-enters its priority bucket. For the `n`-th failed attempt (1-based) the
//! base delay is `first × factor^(n-1)`, clamped to `max`, then jitter is applied.
//! The base is derived from the attempt number alone, so a jittered delay never
//! feeds into the next one.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use opqueue::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay_for(3), Duration::from_millis(400));
//!
//! // 100ms × 2^10 = 102.4s → capped
//! assert_eq!(backoff.delay_for(11), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Exponential retry backoff.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Ceiling for any single delay.
    pub max: Duration,
    /// Multiplicative growth factor (`2.0` doubles the delay per attempt).
    pub factor: f64,
    /// Randomization applied on top of the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 1s`, `factor = 2.0`, `max = 30s`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Returns a policy with a fixed delay (`factor = 1.0`).
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay that follows failed attempt number `attempt` (1-based).
    ///
    /// `attempt = 0` is treated like `1`. Non-finite or overflowing products clamp to `max`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling(first_ms: u64, max: Duration, jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max,
            factor: 2.0,
            jitter,
        }
    }

    #[test]
    fn doubles_per_failed_attempt() {
        let policy = doubling(50, Duration::from_secs(30), JitterPolicy::None);
        let got: Vec<u128> = (1..=5).map(|a| policy.delay_for(a).as_millis()).collect();
        assert_eq!(got, vec![50, 100, 200, 400, 800]);
    }

    #[test]
    fn attempt_zero_behaves_like_first() {
        let policy = doubling(50, Duration::from_secs(30), JitterPolicy::None);
        assert_eq!(policy.delay_for(0), policy.delay_for(1));
    }

    #[test]
    fn ceiling_applies() {
        let policy = doubling(100, Duration::from_secs(1), JitterPolicy::None);
        assert_eq!(policy.delay_for(12), Duration::from_secs(1));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(1));

        let inverted = BackoffPolicy {
            first: Duration::from_secs(10),
            ..doubling(0, Duration::from_secs(2), JitterPolicy::None)
        };
        assert_eq!(inverted.delay_for(1), Duration::from_secs(2));
    }

    #[test]
    fn constant_policy_never_grows() {
        let policy = BackoffPolicy::constant(Duration::from_millis(20));
        for attempt in 1..8 {
            assert_eq!(policy.delay_for(attempt), Duration::from_millis(20));
        }
    }

    #[test]
    fn full_jitter_stays_under_base() {
        let policy = doubling(100, Duration::from_secs(30), JitterPolicy::Full);
        for attempt in 1..10 {
            let base = Duration::from_millis(100 * 2u64.pow(attempt - 1)).min(policy.max);
            assert!(policy.delay_for(attempt) <= base);
        }
    }

    #[test]
    fn equal_jitter_keeps_half() {
        let policy = doubling(200, Duration::from_secs(30), JitterPolicy::Equal);
        for attempt in 1..10 {
            let base = Duration::from_millis(200 * 2u64.pow(attempt - 1)).min(policy.max);
            let delay = policy.delay_for(attempt);
            assert!(delay >= base / 2, "attempt {attempt}: {delay:?} < {:?}", base / 2);
            assert!(delay <= base);
        }
    }

    #[test]
    fn decorrelated_jitter_respects_floor_and_cap() {
        let policy = doubling(100, Duration::from_secs(5), JitterPolicy::Decorrelated);
        for _ in 0..50 {
            let delay = policy.delay_for(9);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_secs(5));
        }
    }
}
