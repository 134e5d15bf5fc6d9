//! The grid graph: a square lattice of [`CellKind`] cells with start/end
//! markers and a pure neighbour topology.

use std::fmt;

use crate::cell::CellKind;
use crate::geom::Point;

/// Smallest supported grid side.
pub const DIM_MIN: i32 = 10;
/// Largest supported grid side.
pub const DIM_MAX: i32 = 50;
/// Default grid side.
pub const DIM_DEFAULT: i32 = 20;

/// Neighbour wiring for the lattice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// Cardinal 4-neighbour adjacency.
    #[default]
    FourWay,
    /// Cardinal + diagonal 8-neighbour adjacency.
    EightWay,
}

/// Errors from grid construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Requested side length outside `[DIM_MIN, DIM_MAX]`.
    InvalidDimension(i32),
    /// Position outside the grid.
    OutOfBounds(Point),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension(d) => {
                write!(f, "invalid grid dimension {d} (expected {DIM_MIN}..={DIM_MAX})")
            }
            Self::OutOfBounds(p) => write!(f, "position {p} is outside the grid"),
        }
    }
}

impl std::error::Error for GridError {}

/// A square grid of side `dim` holding one [`CellKind`] per cell, with at
/// most one `Start` and one `End` marker.
///
/// The grid owns only topology and cell kinds. Traversal state (nodes,
/// parent pointers, visit markings) is per-run and lives in `amaze-algo`.
#[derive(Debug, Clone)]
pub struct Maze {
    dim: i32,
    topology: Topology,
    cells: Vec<CellKind>,
    start: Option<Point>,
    end: Option<Point>,
}

impl Maze {
    /// Create an all-empty grid of side `dim` with 4-way adjacency.
    pub fn new(dim: i32) -> Result<Self, GridError> {
        Self::with_topology(dim, Topology::FourWay)
    }

    /// Create an all-empty grid with an explicit topology.
    pub fn with_topology(dim: i32, topology: Topology) -> Result<Self, GridError> {
        validate_dim(dim)?;
        Ok(Self {
            dim,
            topology,
            cells: vec![CellKind::Empty; (dim * dim) as usize],
            start: None,
            end: None,
        })
    }

    /// Side length of the grid.
    #[inline]
    pub fn dim(&self) -> i32 {
        self.dim
    }

    /// Total number of cells (`dim * dim`).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid holds no cells. Never true for a valid grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The neighbour wiring in effect.
    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Current start marker, if any.
    #[inline]
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    /// Current end marker, if any.
    #[inline]
    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.dim && p.y >= 0 && p.y < self.dim
    }

    /// Convert a position to a flat row-major index. `None` if out of bounds.
    #[inline]
    pub fn idx(&self, p: Point) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        Some((p.y * self.dim + p.x) as usize)
    }

    /// Kind of the cell at `p`. `None` if out of bounds.
    #[inline]
    pub fn kind(&self, p: Point) -> Option<CellKind> {
        self.idx(p).map(|i| self.cells[i])
    }

    /// Append the in-bounds neighbours of `p` into `buf`.
    ///
    /// Pure topology query: wall filtering is the caller's concern. The
    /// caller clears `buf` beforehand.
    pub fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        match self.topology {
            Topology::FourWay => {
                for n in p.neighbors_4() {
                    if self.contains(n) {
                        buf.push(n);
                    }
                }
            }
            Topology::EightWay => {
                for n in p.neighbors_8() {
                    if self.contains(n) {
                        buf.push(n);
                    }
                }
            }
        }
    }

    /// Overwrite the kind of a single cell, keeping the start/end marker
    /// bookkeeping consistent.
    ///
    /// Setting `Start` (or `End`) here clears a previous holder back to
    /// `Empty`; overwriting the current holder with anything else drops the
    /// marker. Returns every `(position, new kind)` change made, in
    /// application order.
    pub fn set_kind(
        &mut self,
        p: Point,
        kind: CellKind,
    ) -> Result<Vec<(Point, CellKind)>, GridError> {
        let i = self.idx(p).ok_or(GridError::OutOfBounds(p))?;
        let mut changes = Vec::with_capacity(2);

        // Demote a previous holder of a unique marker.
        if kind == CellKind::Start {
            if let Some(prev) = self.start.take() {
                if prev != p {
                    if let Some(pi) = self.idx(prev) {
                        self.cells[pi] = CellKind::Empty;
                        changes.push((prev, CellKind::Empty));
                    }
                }
            }
            self.start = Some(p);
        }
        if kind == CellKind::End {
            if let Some(prev) = self.end.take() {
                if prev != p {
                    if let Some(pi) = self.idx(prev) {
                        self.cells[pi] = CellKind::Empty;
                        changes.push((prev, CellKind::Empty));
                    }
                }
            }
            self.end = Some(p);
        }

        // Overwriting a marker cell with something else drops the marker.
        if self.cells[i] == CellKind::Start && kind != CellKind::Start {
            self.start = None;
        }
        if self.cells[i] == CellKind::End && kind != CellKind::End {
            self.end = None;
        }

        if self.cells[i] != kind {
            self.cells[i] = kind;
            changes.push((p, kind));
        }
        Ok(changes)
    }

    /// Toggle the start marker at `p`.
    ///
    /// Selecting a new cell moves the marker there (clearing the previous
    /// holder); re-selecting the current holder clears it to `Empty`.
    pub fn select_start(&mut self, p: Point) -> Result<Vec<(Point, CellKind)>, GridError> {
        if self.start == Some(p) {
            self.set_kind(p, CellKind::Empty)
        } else {
            self.set_kind(p, CellKind::Start)
        }
    }

    /// Toggle the end marker at `p`. Same semantics as [`select_start`].
    ///
    /// [`select_start`]: Self::select_start
    pub fn select_end(&mut self, p: Point) -> Result<Vec<(Point, CellKind)>, GridError> {
        if self.end == Some(p) {
            self.set_kind(p, CellKind::Empty)
        } else {
            self.set_kind(p, CellKind::End)
        }
    }

    /// Toggle a wall at `p`: `Wall` becomes `Empty`, anything else becomes
    /// `Wall` (clearing a start/end marker it may have carried).
    pub fn toggle_wall(&mut self, p: Point) -> Result<Vec<(Point, CellKind)>, GridError> {
        match self.kind(p).ok_or(GridError::OutOfBounds(p))? {
            CellKind::Wall => self.set_kind(p, CellKind::Empty),
            _ => self.set_kind(p, CellKind::Wall),
        }
    }

    /// Discard and rebuild the grid at a new side length.
    ///
    /// Clears all walls and both markers. An out-of-range `dim` is rejected
    /// and leaves the existing grid untouched.
    pub fn resize(&mut self, dim: i32) -> Result<(), GridError> {
        validate_dim(dim)?;
        self.dim = dim;
        self.cells.clear();
        self.cells.resize((dim * dim) as usize, CellKind::Empty);
        self.start = None;
        self.end = None;
        Ok(())
    }
}

impl Default for Maze {
    fn default() -> Self {
        Self::new(DIM_DEFAULT).expect("default dimension is valid")
    }
}

fn validate_dim(dim: i32) -> Result<(), GridError> {
    if !(DIM_MIN..=DIM_MAX).contains(&dim) {
        return Err(GridError::InvalidDimension(dim));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_bounds() {
        assert!(Maze::new(DIM_MIN).is_ok());
        assert!(Maze::new(DIM_MAX).is_ok());
        assert!(matches!(Maze::new(9), Err(GridError::InvalidDimension(9))));
        assert!(matches!(Maze::new(51), Err(GridError::InvalidDimension(51))));
        assert!(matches!(Maze::new(-1), Err(GridError::InvalidDimension(-1))));
    }

    #[test]
    fn cell_counts() {
        for dim in [DIM_MIN, DIM_DEFAULT, DIM_MAX] {
            let maze = Maze::new(dim).unwrap();
            assert_eq!(maze.len(), (dim * dim) as usize);
        }
    }

    #[test]
    fn neighbor_counts_four_way() {
        let maze = Maze::new(12).unwrap();
        let mut buf = Vec::new();

        // Corner: 2 neighbours.
        maze.neighbors(Point::new(0, 0), &mut buf);
        assert_eq!(buf.len(), 2);

        // Edge (non-corner): 3 neighbours.
        buf.clear();
        maze.neighbors(Point::new(5, 0), &mut buf);
        assert_eq!(buf.len(), 3);

        // Interior: 4 neighbours.
        buf.clear();
        maze.neighbors(Point::new(5, 5), &mut buf);
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn neighbor_counts_eight_way() {
        let maze = Maze::with_topology(12, Topology::EightWay).unwrap();
        let mut buf = Vec::new();
        maze.neighbors(Point::new(0, 0), &mut buf);
        assert_eq!(buf.len(), 3);
        buf.clear();
        maze.neighbors(Point::new(5, 5), &mut buf);
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn start_toggle_semantics() {
        let mut maze = Maze::new(10).unwrap();
        let a = Point::new(1, 1);
        let b = Point::new(2, 3);

        // Fresh selection.
        let changes = maze.select_start(a).unwrap();
        assert_eq!(changes, vec![(a, CellKind::Start)]);
        assert_eq!(maze.start(), Some(a));

        // Moving the marker reports both cells.
        let changes = maze.select_start(b).unwrap();
        assert_eq!(changes, vec![(a, CellKind::Empty), (b, CellKind::Start)]);
        assert_eq!(maze.start(), Some(b));
        assert_eq!(maze.kind(a), Some(CellKind::Empty));

        // Re-selecting the holder clears it.
        let changes = maze.select_start(b).unwrap();
        assert_eq!(changes, vec![(b, CellKind::Empty)]);
        assert_eq!(maze.start(), None);
    }

    #[test]
    fn start_over_end_drops_end_marker() {
        let mut maze = Maze::new(10).unwrap();
        let p = Point::new(4, 4);
        maze.select_end(p).unwrap();
        assert_eq!(maze.end(), Some(p));
        maze.select_start(p).unwrap();
        assert_eq!(maze.start(), Some(p));
        assert_eq!(maze.end(), None);
        assert_eq!(maze.kind(p), Some(CellKind::Start));
    }

    #[test]
    fn wall_toggle_round_trip() {
        let mut maze = Maze::new(10).unwrap();
        let p = Point::new(3, 3);
        maze.toggle_wall(p).unwrap();
        assert_eq!(maze.kind(p), Some(CellKind::Wall));
        maze.toggle_wall(p).unwrap();
        assert_eq!(maze.kind(p), Some(CellKind::Empty));
    }

    #[test]
    fn wall_over_start_clears_marker() {
        let mut maze = Maze::new(10).unwrap();
        let p = Point::new(0, 9);
        maze.select_start(p).unwrap();
        maze.toggle_wall(p).unwrap();
        assert_eq!(maze.kind(p), Some(CellKind::Wall));
        assert_eq!(maze.start(), None);
    }

    #[test]
    fn resize_rejects_and_preserves() {
        let mut maze = Maze::new(10).unwrap();
        maze.toggle_wall(Point::new(2, 2)).unwrap();

        assert_eq!(maze.resize(-5), Err(GridError::InvalidDimension(-5)));
        assert_eq!(maze.resize(51), Err(GridError::InvalidDimension(51)));
        // Untouched after rejection.
        assert_eq!(maze.dim(), 10);
        assert_eq!(maze.kind(Point::new(2, 2)), Some(CellKind::Wall));
    }

    #[test]
    fn resize_clears_markers() {
        let mut maze = Maze::new(10).unwrap();
        maze.select_start(Point::new(0, 0)).unwrap();
        maze.select_end(Point::new(9, 9)).unwrap();
        maze.toggle_wall(Point::new(5, 5)).unwrap();

        maze.resize(15).unwrap();
        assert_eq!(maze.dim(), 15);
        assert_eq!(maze.len(), 225);
        assert_eq!(maze.start(), None);
        assert_eq!(maze.end(), None);
        assert!((0..15).all(|y| {
            (0..15).all(|x| maze.kind(Point::new(x, y)) == Some(CellKind::Empty))
        }));
    }

    #[test]
    fn out_of_bounds_rejected() {
        let mut maze = Maze::new(10).unwrap();
        let p = Point::new(10, 0);
        assert_eq!(maze.toggle_wall(p), Err(GridError::OutOfBounds(p)));
        assert_eq!(maze.kind(p), None);
    }
}
