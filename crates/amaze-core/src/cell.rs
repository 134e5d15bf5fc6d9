//! Per-cell kinds for the grid graph.

use std::fmt;

/// What a grid cell currently is.
///
/// `Start` and `End` are markers layered on top of the topology: at most one
/// of each exists in a [`Maze`](crate::Maze) at any time, enforced by the
/// toggle operations on the grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Start,
    End,
}

impl CellKind {
    /// Whether a traversal may occupy this cell.
    #[inline]
    pub fn passable(self) -> bool {
        !matches!(self, CellKind::Wall)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CellKind::Empty => "empty",
            CellKind::Wall => "wall",
            CellKind::Start => "start",
            CellKind::End => "end",
        };
        f.write_str(s)
    }
}
