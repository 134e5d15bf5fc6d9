//! The pathfinder family: Dijkstra, BFS, and A* over one search machine.
//!
//! All three share the same expansion loop and differ only in frontier
//! discipline. Edges cost 1, so Dijkstra and BFS find identical paths;
//! A* adds an admissible estimate matched to the grid topology. A cell
//! re-discovered on a cheaper route before expansion is relaxed in place
//! and re-pushed; the superseded heap entry is skipped when it surfaces.

use std::collections::VecDeque;

use amaze_core::{Maze, Point, Topology, chebyshev, manhattan};

use crate::frontier::CostFrontier;
use crate::node::{NodeArena, NodeState};
use crate::observer::Observer;
use crate::strategy::{Outcome, StrategyError};

/// Frontier discipline of a pathfinder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SearchOrder {
    /// Priority by cumulative cost, FIFO among ties.
    Dijkstra,
    /// Plain FIFO; equivalent to Dijkstra under uniform edge weight.
    Bfs,
    /// Priority by cumulative cost plus an admissible estimate to the end,
    /// chosen per topology.
    AStar,
}

pub(crate) struct PathFinder {
    order: SearchOrder,
    start: Point,
    end: Point,
    arena: NodeArena,
    heap: CostFrontier,
    queue: VecDeque<usize>,
    nbuf: Vec<Point>,
}

impl PathFinder {
    pub(crate) fn new(order: SearchOrder) -> Self {
        Self {
            order,
            start: Point::ZERO,
            end: Point::ZERO,
            arena: NodeArena::new(),
            heap: CostFrontier::new(),
            queue: VecDeque::new(),
            nbuf: Vec::with_capacity(8),
        }
    }

    /// Reset run artifacts and allocate the root node at `start`.
    pub(crate) fn awake(
        &mut self,
        maze: &Maze,
        start: Point,
        end: Point,
        obs: &mut dyn Observer,
    ) -> Result<(), StrategyError> {
        let start_slot = maze.idx(start).ok_or(StrategyError::OutOfBounds(start))?;
        maze.idx(end).ok_or(StrategyError::OutOfBounds(end))?;

        self.start = start;
        self.end = end;
        self.arena.reset(maze.len());
        self.heap.clear();
        self.queue.clear();

        let root = self
            .arena
            .claim(start_slot, start, None, 0, obs)
            .unwrap_or(0);
        self.enqueue(maze, root, 0);
        Ok(())
    }

    fn enqueue(&mut self, maze: &Maze, id: usize, cost: i32) {
        match self.order {
            SearchOrder::Bfs => self.queue.push_back(id),
            SearchOrder::Dijkstra => self.heap.push(cost, id),
            SearchOrder::AStar => {
                let cell = self.arena.get(id).cell();
                self.heap.push(cost + self.estimate(maze, cell), id);
            }
        }
    }

    /// Admissible distance estimate to the end under the grid's topology.
    /// Manhattan over-estimates once diagonal steps exist, so 8-way grids
    /// use Chebyshev.
    fn estimate(&self, maze: &Maze, cell: Point) -> i32 {
        match maze.topology() {
            Topology::FourWay => manhattan(cell, self.end),
            Topology::EightWay => chebyshev(cell, self.end),
        }
    }

    /// One unit of work: pop one node, mark it visited, expand or finish.
    ///
    /// Returns `Some` with the terminal outcome when the run is over.
    pub(crate) fn step(&mut self, maze: &mut Maze, obs: &mut dyn Observer) -> Option<Outcome> {
        let popped = match self.order {
            SearchOrder::Bfs => self.queue.pop_front(),
            _ => self.heap.pop(),
        };
        let Some(id) = popped else {
            // Frontier exhausted without reaching the end: a valid outcome.
            return Some(Outcome::Unreachable);
        };
        // A relaxed cell sits in the heap once per discovery; copies that
        // surface after it was expanded carry a superseded priority.
        if self.arena.get(id).state() == NodeState::Visited {
            return None;
        }

        self.arena.set_state(id, NodeState::Visited, obs);
        let cell = self.arena.get(id).cell();
        let cost = self.arena.get(id).cost();

        if cell == self.end {
            return Some(self.reconstruct(id, obs));
        }

        self.nbuf.clear();
        maze.neighbors(cell, &mut self.nbuf);
        for i in 0..self.nbuf.len() {
            let np = self.nbuf[i];
            let passable = maze.kind(np).is_some_and(|k| k.passable());
            if !passable {
                continue;
            }
            let Some(slot) = maze.idx(np) else {
                continue;
            };
            let tentative = cost + 1;
            match self.arena.claimant(slot) {
                None => {
                    if let Some(nid) = self.arena.claim(slot, np, Some(id), tentative, obs) {
                        self.enqueue(maze, nid, tentative);
                    }
                }
                Some(nid) => {
                    // Re-discovered on a cheaper route while still on the
                    // frontier: rebind and re-push.
                    let n = self.arena.get(nid);
                    if n.state() != NodeState::Visited && tentative < n.cost() {
                        self.arena.relax(nid, Some(id), tentative);
                        self.enqueue(maze, nid, tentative);
                    }
                }
            }
        }
        None
    }

    /// Mark the parent chain `Path` and build the start→end cell sequence.
    fn reconstruct(&mut self, end_id: usize, obs: &mut dyn Observer) -> Outcome {
        for id in self.arena.chain_from(end_id) {
            self.arena.set_state(id, NodeState::Path, obs);
        }
        let mut path = self.arena.path_from(end_id);
        path.reverse();
        Outcome::Path(path)
    }
}
