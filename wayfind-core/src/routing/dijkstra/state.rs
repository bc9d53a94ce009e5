use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

/// Heap entry. `seq` is the insertion counter, so equal-cost entries pop in
/// the order they were pushed and expansion is reproducible.
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) cost: f64,
    pub(super) seq: u64,
    pub(super) node: NodeIndex,
}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost, then by insertion order (reversed from standard Rust BinaryHeap)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn pops_cheapest_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(State { cost: 2.0, seq: 0, node: NodeIndex::new(0) });
        heap.push(State { cost: 1.0, seq: 1, node: NodeIndex::new(1) });
        heap.push(State { cost: 1.0, seq: 2, node: NodeIndex::new(2) });

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop())
            .map(|state| state.node.index())
            .collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
