//! # Priority buckets.
//!
//! Four FIFO queues, one per [`Priority`]. Only queued (not running) operations live
//! here. `pop_next` scans buckets from critical to low and takes the head of the
//! first non-empty one; that scan is the only tie-break rule.

use std::collections::VecDeque;

use crate::operations::{OperationSpec, Priority};

/// An operation waiting in a bucket, with its attempt counter.
pub(crate) struct Pending {
    /// Scheduler-assigned sequence number, unique per queue.
    pub seq: u64,
    pub spec: OperationSpec,
    /// Attempts made so far.
    pub attempt: u32,
}

impl Pending {
    pub fn priority(&self) -> Priority {
        self.spec.priority()
    }
}

#[derive(Default)]
pub(crate) struct Buckets {
    queues: [VecDeque<Pending>; 4],
}

impl Buckets {
    /// Appends to the tail of the operation's bucket.
    pub fn push_back(&mut self, pending: Pending) {
        self.queues[pending.priority().index()].push_back(pending);
    }

    /// Removes the head of the most urgent non-empty bucket.
    pub fn pop_next(&mut self) -> Option<Pending> {
        self.queues.iter_mut().find_map(|q| q.pop_front())
    }

    /// Empties every non-critical bucket, returning what was removed (most urgent first).
    pub fn discard_below_critical(&mut self) -> Vec<Pending> {
        Priority::ALL
            .into_iter()
            .filter(|p| *p != Priority::Critical)
            .flat_map(|p| std::mem::take(&mut self.queues[p.index()]))
            .collect()
    }

    /// Empties every bucket.
    pub fn drain_all(&mut self) -> Vec<Pending> {
        self.queues
            .iter_mut()
            .flat_map(std::mem::take)
            .collect()
    }

    pub fn depth(&self, priority: Priority) -> usize {
        self.queues[priority.index()].len()
    }

    pub fn total(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OperationError, OperationFn};
    use tokio_util::sync::CancellationToken;

    fn pending(seq: u64, name: &'static str, priority: Priority) -> Pending {
        let op = OperationFn::arc(name, |_ctx: CancellationToken| async {
            Ok::<(), OperationError>(())
        });
        Pending {
            seq,
            spec: OperationSpec::new(name, op, priority),
            attempt: 0,
        }
    }

    fn names(items: &[Pending]) -> Vec<&str> {
        items.iter().map(|p| p.spec.name()).collect()
    }

    #[test]
    fn pops_most_urgent_first_then_fifo() {
        let mut b = Buckets::default();
        b.push_back(pending(1, "low-a", Priority::Low));
        b.push_back(pending(2, "high-a", Priority::High));
        b.push_back(pending(3, "high-b", Priority::High));
        b.push_back(pending(4, "crit", Priority::Critical));
        b.push_back(pending(5, "medium", Priority::Medium));

        let mut order = Vec::new();
        while let Some(p) = b.pop_next() {
            order.push(p.spec.name().to_string());
        }
        assert_eq!(order, ["crit", "high-a", "high-b", "medium", "low-a"]);
        assert!(b.is_empty());
    }

    #[test]
    fn preemption_keeps_only_critical() {
        let mut b = Buckets::default();
        b.push_back(pending(1, "crit", Priority::Critical));
        b.push_back(pending(2, "low", Priority::Low));
        b.push_back(pending(3, "high", Priority::High));
        b.push_back(pending(4, "medium", Priority::Medium));

        let dropped = b.discard_below_critical();
        assert_eq!(names(&dropped), ["high", "medium", "low"]);
        assert_eq!(b.depth(Priority::Critical), 1);
        assert_eq!(b.total(), 1);
    }

    #[test]
    fn drain_all_empties_everything() {
        let mut b = Buckets::default();
        assert!(b.drain_all().is_empty());

        b.push_back(pending(1, "crit", Priority::Critical));
        b.push_back(pending(2, "low", Priority::Low));
        assert_eq!(b.drain_all().len(), 2);
        assert_eq!(b.total(), 0);
    }
}
