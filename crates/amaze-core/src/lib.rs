//! **amaze-core** — core types for the maze algorithm-execution engine.
//!
//! This crate provides the static half of the engine: geometry primitives,
//! per-cell kinds, and the [`Maze`] grid graph that pathfinding and
//! generation strategies traverse. Everything ephemeral (nodes, frontiers,
//! run lifecycles) lives in `amaze-algo`.

pub mod cell;
pub mod geom;
pub mod maze;

pub use cell::CellKind;
pub use geom::{Point, chebyshev, manhattan};
pub use maze::{DIM_DEFAULT, DIM_MAX, DIM_MIN, GridError, Maze, Topology};
