//! Observer boundary: per-transition notifications to the view.

use amaze_core::{CellKind, Point};

use crate::node::NodeState;

/// Receives every observable state change of a run, synchronously, in the
/// order it happened.
///
/// The engine's view collaborator implements this to render incrementally;
/// tests implement it to assert on transition order.
pub trait Observer {
    /// A traversal node changed state on the cell at `pos`.
    fn cell_changed(&mut self, pos: Point, state: NodeState);

    /// A cell's kind changed (wall placed by a generator's density bias).
    fn kind_changed(&mut self, pos: Point, kind: CellKind) {
        let _ = (pos, kind);
    }
}

/// Discards all notifications.
pub struct NullObserver;

impl Observer for NullObserver {
    fn cell_changed(&mut self, _pos: Point, _state: NodeState) {}
}

/// Records notifications in arrival order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub cells: Vec<(Point, NodeState)>,
    pub kinds: Vec<(Point, CellKind)>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for Recorder {
    fn cell_changed(&mut self, pos: Point, state: NodeState) {
        self.cells.push((pos, state));
    }

    fn kind_changed(&mut self, pos: Point, kind: CellKind) {
        self.kinds.push((pos, kind));
    }
}
