//! Per-run traversal nodes, stored in an index-addressed arena.
//!
//! Parent references are arena indices rather than live references, so the
//! parent forest is acyclic by construction: a node's parent always has a
//! smaller index.

use amaze_core::Point;

use crate::observer::Observer;

/// Lifecycle state of a traversal node.
///
/// `Germinated` marks a newly reached cell, `Visited` an expanded one, and
/// `Path` a cell confirmed on the final reconstructed path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeState {
    #[default]
    Germinated,
    Visited,
    Path,
}

/// A per-run wrapper binding a cell to a parent pointer and traversal state.
///
/// Equality is cell identity: two nodes are equal when they wrap the same
/// cell, regardless of ancestry or state.
#[derive(Debug, Clone)]
pub struct Node {
    cell: Point,
    parent: Option<usize>,
    state: NodeState,
    /// Cumulative path cost from the run root, +1 per edge.
    cost: i32,
}

impl Node {
    /// The cell this node wraps.
    #[inline]
    pub fn cell(&self) -> Point {
        self.cell
    }

    /// Arena index of the parent node. `None` marks a run root.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Current traversal state.
    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Cumulative cost from the run root.
    #[inline]
    pub fn cost(&self) -> i32 {
        self.cost
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for Node {}

/// Arena of [`Node`]s for one run.
///
/// Each grid cell is claimed by at most one node per run, tracked through a
/// flat slot map indexed like the grid. Clearing the arena between runs
/// discards all nodes without touching cell kinds.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    /// One slot per grid cell: the index of the claiming node, if any.
    slots: Vec<Option<usize>>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new run over a grid of `capacity` cells.
    pub fn reset(&mut self, capacity: usize) {
        self.nodes.clear();
        self.slots.clear();
        self.slots.resize(capacity, None);
    }

    /// Number of nodes allocated this run.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been allocated yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node at `id`.
    #[inline]
    pub fn get(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// The node claiming grid slot `slot`, if any.
    #[inline]
    pub fn claimant(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied().flatten()
    }

    /// Claim grid slot `slot` for a new `Germinated` node.
    ///
    /// Returns the new node's index, or `None` if the slot is already
    /// claimed this run. The observer is notified of the `Germinated`
    /// transition — node creation is itself a unit of observable progress.
    pub fn claim(
        &mut self,
        slot: usize,
        cell: Point,
        parent: Option<usize>,
        cost: i32,
        obs: &mut dyn Observer,
    ) -> Option<usize> {
        if self.slots.get(slot)?.is_some() {
            return None;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            cell,
            parent,
            state: NodeState::Germinated,
            cost,
        });
        self.slots[slot] = Some(id);
        obs.cell_changed(cell, NodeState::Germinated);
        Some(id)
    }

    /// Rebind node `id` to a cheaper route discovered after its creation.
    ///
    /// No state changes and no notification: the node stays on the
    /// frontier, only its ancestry and cost move.
    pub fn relax(&mut self, id: usize, parent: Option<usize>, cost: i32) {
        let node = &mut self.nodes[id];
        node.parent = parent;
        node.cost = cost;
    }

    /// Overwrite the state of node `id`, notifying the observer.
    pub fn set_state(&mut self, id: usize, state: NodeState, obs: &mut dyn Observer) {
        let node = &mut self.nodes[id];
        node.state = state;
        obs.cell_changed(node.cell, state);
    }

    /// Walk parent pointers from `id` to its root, yielding cells in
    /// reverse-discovery order (terminal first). Callers reverse the result
    /// for start→end order.
    ///
    /// Terminates because parent indices strictly decrease along the chain.
    pub fn path_from(&self, id: usize) -> Vec<Point> {
        let mut path = Vec::new();
        let mut cur = Some(id);
        while let Some(i) = cur {
            let node = &self.nodes[i];
            path.push(node.cell);
            cur = node.parent;
        }
        path
    }

    /// Walk parent pointers from `id` to its root, yielding node indices.
    pub(crate) fn chain_from(&self, id: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(i) = cur {
            chain.push(i);
            cur = self.nodes[i].parent;
        }
        chain
    }
}
