//! Progress events streamed from the worker thread.

use std::sync::mpsc::Sender;

use amaze_algo::{NodeState, Observer, Outcome, StrategyKind};
use amaze_core::{CellKind, Point};

/// One observable unit of engine progress.
///
/// `Cell` and `Kind` events arrive in the exact order the transitions were
/// applied; `Finished` is always the last event of a run.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// A run began with the given strategy.
    Started { kind: StrategyKind },
    /// A traversal node changed state at `pos`.
    Cell { pos: Point, state: NodeState },
    /// A cell kind changed at `pos` (walls carved or retained, markers moved).
    Kind { pos: Point, kind: CellKind },
    /// The grid was rebuilt at a new dimension.
    Resized { dim: i32 },
    /// All cells were reset to empty and markers cleared.
    Cleared,
    /// The run reached its terminal outcome.
    Finished { outcome: Outcome },
}

/// Adapts the strategy-side [`Observer`] to the engine's event channel.
///
/// Send failures mean the receiver hung up; progress is then dropped
/// silently, the run itself is unaffected.
pub(crate) struct ChannelObserver {
    tx: Sender<EngineEvent>,
}

impl ChannelObserver {
    pub(crate) fn new(tx: Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl Observer for ChannelObserver {
    fn cell_changed(&mut self, pos: Point, state: NodeState) {
        let _ = self.tx.send(EngineEvent::Cell { pos, state });
    }

    fn kind_changed(&mut self, pos: Point, kind: CellKind) {
        let _ = self.tx.send(EngineEvent::Kind { pos, kind });
    }
}
