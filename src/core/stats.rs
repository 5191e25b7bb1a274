use std::fmt;

use crate::operations::Priority;

/// Snapshot of queue depths and running count.
///
/// Taken under the same lock the dispatcher uses, so the numbers are consistent
/// with each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Queued critical operations (rank 1).
    pub critical: usize,
    /// Queued high operations (rank 2).
    pub high: usize,
    /// Queued medium operations (rank 3).
    pub medium: usize,
    /// Queued low operations (rank 4).
    pub low: usize,
    /// Operations currently executing.
    pub running: usize,
    /// Sum of the four bucket depths.
    pub total_queued: usize,
}

impl QueueStats {
    /// Queued count for one priority.
    pub fn queued(&self, priority: Priority) -> usize {
        match priority {
            Priority::Critical => self.critical,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

impl fmt::Display for QueueStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "priority_1={} priority_2={} priority_3={} priority_4={} running={} total_queued={}",
            self.critical, self.high, self.medium, self.low, self.running, self.total_queued
        )
    }
}
