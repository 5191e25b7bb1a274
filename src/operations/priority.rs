use std::fmt;

/// Urgency of an operation. Lower rank is more urgent.
///
/// Dispatch always drains a more urgent bucket before looking at a less urgent one.
/// Adding a [`Priority::Critical`] operation discards every queued operation of
/// any other priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    /// Rank 1. Preempts queued work of every other priority.
    Critical = 1,
    /// Rank 2.
    High = 2,
    /// Rank 3.
    Medium = 3,
    /// Rank 4.
    Low = 4,
}

impl Priority {
    /// All priorities in dispatch order (most urgent first).
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Numeric rank (1 = critical … 4 = low).
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Zero-based bucket index.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }

    /// Parses a numeric rank.
    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Priority::Critical),
            2 => Some(Priority::High),
            3 => Some(Priority::Medium),
            4 => Some(Priority::Low),
            _ => None,
        }
    }

    /// Short lowercase label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
