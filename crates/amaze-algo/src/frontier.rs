//! Cost-ordered frontier with FIFO tie-breaking.
//!
//! Entries are stored in a binary heap keyed by `(cost, insertion_order)`.
//! Lower cost pops first; ties are broken by insertion order, which keeps
//! equal-cost expansion deterministic for identical inputs.

use std::collections::BinaryHeap;

/// A frontier entry referencing a node by arena index.
#[derive(Clone, Copy, Eq, PartialEq)]
struct Entry {
    cost: i32,
    /// Monotonically increasing counter used to break ties.
    /// Lower = inserted earlier = popped first among equal costs.
    seq: u64,
    id: usize,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed so BinaryHeap (a max-heap) pops smallest cost first,
        // then smallest seq.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority frontier for the cost-ordered pathfinders.
#[derive(Default)]
pub(crate) struct CostFrontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl CostFrontier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }

    /// Push a node with the given priority cost.
    pub(crate) fn push(&mut self, cost: i32, id: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { cost, seq, id });
    }

    /// Pop the lowest-cost, earliest-inserted node.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|e| e.id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_lowest_cost_first() {
        let mut f = CostFrontier::new();
        f.push(5, 0);
        f.push(1, 1);
        f.push(3, 2);
        assert_eq!(f.pop(), Some(1));
        assert_eq!(f.pop(), Some(2));
        assert_eq!(f.pop(), Some(0));
        assert_eq!(f.pop(), None);
    }

    #[test]
    fn equal_costs_pop_fifo() {
        let mut f = CostFrontier::new();
        for id in 0..10 {
            f.push(7, id);
        }
        let popped: Vec<_> = std::iter::from_fn(|| f.pop()).collect();
        assert_eq!(popped, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn clear_resets_sequencing() {
        let mut f = CostFrontier::new();
        f.push(1, 42);
        f.clear();
        assert!(f.is_empty());
        f.push(2, 7);
        assert_eq!(f.pop(), Some(7));
    }
}
