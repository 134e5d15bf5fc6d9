//! The closed strategy set and its shared run lifecycle.

use std::fmt;

use amaze_core::{Maze, Point};

use crate::carve::{CarveOrder, Carver};
use crate::observer::Observer;
use crate::pathfind::{PathFinder, SearchOrder};

/// The closed set of pluggable traversal and generation behaviors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyKind {
    Dijkstra,
    Bfs,
    AStar,
    BackTracker,
    Dfs,
    Prim,
}

impl StrategyKind {
    /// All variants, pathfinders first.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Dijkstra,
        StrategyKind::Bfs,
        StrategyKind::AStar,
        StrategyKind::BackTracker,
        StrategyKind::Dfs,
        StrategyKind::Prim,
    ];

    /// Whether this strategy searches for a path (as opposed to carving).
    #[inline]
    pub fn is_pathfinder(self) -> bool {
        matches!(
            self,
            StrategyKind::Dijkstra | StrategyKind::Bfs | StrategyKind::AStar
        )
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::Dijkstra => "dijkstra",
            StrategyKind::Bfs => "bfs",
            StrategyKind::AStar => "astar",
            StrategyKind::BackTracker => "backtracker",
            StrategyKind::Dfs => "dfs",
            StrategyKind::Prim => "prim",
        };
        f.write_str(s)
    }
}

/// Lifecycle phase of a strategy instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Terminal result of a run.
///
/// `Unreachable` is a valid `Completed` outcome, distinct from a found
/// path; `Cancelled` preserves every transition applied before the cut.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Shortest path found, in start→end order (both endpoints included).
    Path(Vec<Point>),
    /// The frontier emptied before the end cell was reached.
    Unreachable,
    /// Generation finished: a spanning tree of `cells` visited cells
    /// linked by `edges` carved parent edges.
    Carved { cells: usize, edges: usize },
    /// The run was cancelled at a step boundary.
    Cancelled,
}

/// Result of one [`Strategy::step`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// One unit of work was performed; the run continues.
    Advanced,
    /// The run reached a terminal phase.
    Done(Outcome),
}

/// Usage and configuration errors raised by the strategy lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyError {
    /// `awake` called while a run is in progress.
    Busy,
    /// The strategy requires a start (or seed) cell and none is set.
    MissingStart,
    /// The pathfinder requires an end cell and none is set.
    MissingEnd,
    /// A configured cell lies outside the grid.
    OutOfBounds(Point),
    /// Wall-retention density outside `[0, 1]`.
    InvalidDensity(f64),
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("a run is already in progress"),
            Self::MissingStart => f.write_str("no start cell configured"),
            Self::MissingEnd => f.write_str("no end cell configured"),
            Self::OutOfBounds(p) => write!(f, "configured cell {p} is outside the grid"),
            Self::InvalidDensity(d) => {
                write!(f, "invalid wall density {d} (expected 0.0..=1.0)")
            }
        }
    }
}

impl std::error::Error for StrategyError {}

/// Tuning knobs shared by the generation strategies.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrategyConfig {
    /// Wall-retention probability in `[0, 1]`; 0 disables the bias.
    pub density: f64,
    /// Fixed RNG seed for reproducible generation runs.
    pub seed: Option<u64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            density: 0.0,
            seed: None,
        }
    }
}

enum Machine {
    Path(PathFinder),
    Carve(Carver),
}

/// A strategy instance: one of the closed [`StrategyKind`] set plus its
/// run-local state, driven through the shared lifecycle
/// `Idle → Running → {Completed, Cancelled}`.
pub struct Strategy {
    kind: StrategyKind,
    phase: Phase,
    outcome: Option<Outcome>,
    machine: Machine,
}

impl Strategy {
    /// Create a strategy with default configuration.
    pub fn new(kind: StrategyKind) -> Self {
        Self::build(kind, StrategyConfig::default())
    }

    /// Create a strategy with explicit generation tuning.
    pub fn with_config(kind: StrategyKind, cfg: StrategyConfig) -> Result<Self, StrategyError> {
        if !(0.0..=1.0).contains(&cfg.density) {
            return Err(StrategyError::InvalidDensity(cfg.density));
        }
        Ok(Self::build(kind, cfg))
    }

    fn build(kind: StrategyKind, cfg: StrategyConfig) -> Self {
        let machine = match kind {
            StrategyKind::Dijkstra => Machine::Path(PathFinder::new(SearchOrder::Dijkstra)),
            StrategyKind::Bfs => Machine::Path(PathFinder::new(SearchOrder::Bfs)),
            StrategyKind::AStar => Machine::Path(PathFinder::new(SearchOrder::AStar)),
            StrategyKind::BackTracker => {
                Machine::Carve(Carver::new(CarveOrder::BackTracker, cfg))
            }
            StrategyKind::Dfs => Machine::Carve(Carver::new(CarveOrder::Dfs, cfg)),
            StrategyKind::Prim => Machine::Carve(Carver::new(CarveOrder::Prim, cfg)),
        };
        Self {
            kind,
            phase: Phase::Idle,
            outcome: None,
            machine,
        }
    }

    /// Which strategy this is.
    #[inline]
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Terminal outcome, once the run has completed or been cancelled.
    #[inline]
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Begin a run: clear prior run artifacts, allocate the root node, and
    /// move to `Running`.
    ///
    /// Valid from `Idle`, `Completed`, or `Cancelled`; calling it while
    /// `Running` is a usage error. Cell kinds (walls, markers) are never
    /// altered here. Pathfinders require both `start` and `end`; generators
    /// require only `start` (the seed).
    pub fn awake(
        &mut self,
        maze: &Maze,
        start: Option<Point>,
        end: Option<Point>,
        obs: &mut dyn Observer,
    ) -> Result<(), StrategyError> {
        if self.phase == Phase::Running {
            return Err(StrategyError::Busy);
        }
        let start = start.ok_or(StrategyError::MissingStart)?;
        match &mut self.machine {
            Machine::Path(pf) => {
                let end = end.ok_or(StrategyError::MissingEnd)?;
                pf.awake(maze, start, end, obs)?;
            }
            Machine::Carve(c) => c.awake(maze, start, obs)?,
        }
        self.outcome = None;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Perform one unit of work.
    ///
    /// In a terminal phase this is a no-op reporting the stored outcome
    /// again; stepping before `awake` reports `Cancelled`.
    pub fn step(&mut self, maze: &mut Maze, obs: &mut dyn Observer) -> Step {
        if self.phase != Phase::Running {
            return Step::Done(self.outcome.clone().unwrap_or(Outcome::Cancelled));
        }
        let done = match &mut self.machine {
            Machine::Path(pf) => pf.step(maze, obs),
            Machine::Carve(c) => c.step(maze, obs),
        };
        match done {
            None => Step::Advanced,
            Some(outcome) => {
                self.phase = Phase::Completed;
                self.outcome = Some(outcome.clone());
                Step::Done(outcome)
            }
        }
    }

    /// Move a `Running` strategy to `Cancelled`.
    ///
    /// Cooperative: the caller invokes this between steps, so a step in
    /// progress always completes. All transitions applied so far are kept.
    pub fn cancel(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Cancelled;
            self.outcome = Some(Outcome::Cancelled);
        }
    }

    /// Drive an awoken strategy to its terminal outcome without pacing.
    pub fn run_to_completion(&mut self, maze: &mut Maze, obs: &mut dyn Observer) -> Outcome {
        loop {
            if let Step::Done(outcome) = self.step(maze, obs) {
                return outcome;
            }
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::node::NodeState;

    #[test]
    fn value_types_round_trip() {
        let kind = StrategyKind::AStar;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(serde_json::from_str::<StrategyKind>(&json).unwrap(), kind);

        let state = NodeState::Path;
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(serde_json::from_str::<NodeState>(&json).unwrap(), state);

        let outcome = Outcome::Path(vec![Point::new(1, 2), Point::new(3, 4)]);
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(serde_json::from_str::<Outcome>(&json).unwrap(), outcome);

        let outcome = Outcome::Carved { cells: 100, edges: 99 };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(serde_json::from_str::<Outcome>(&json).unwrap(), outcome);
    }
}
