//! **amaze-algo** — the strategy family of the maze engine.
//!
//! This crate provides the ephemeral half of the engine: the per-run
//! [`NodeArena`] of parent-linked traversal nodes, the closed set of
//! pathfinding and generation strategies, and the step-driven run lifecycle
//! (`Idle → Running → {Completed, Cancelled}`).
//!
//! | Strategy | Family | Frontier |
//! |---|---|---|
//! | [`StrategyKind::Dijkstra`] | pathfinder | cost-ordered, FIFO ties |
//! | [`StrategyKind::Bfs`] | pathfinder | plain FIFO |
//! | [`StrategyKind::AStar`] | pathfinder | cost + Manhattan estimate |
//! | [`StrategyKind::BackTracker`] | generator | stack, random carve |
//! | [`StrategyKind::Dfs`] | generator | stack, fixed order |
//! | [`StrategyKind::Prim`] | generator | random frontier edge |
//!
//! Strategies never block: one [`Strategy::step`] call performs one unit of
//! work and returns, leaving pacing and cancellation to the caller (the
//! scheduler in `amaze-engine`).

mod carve;
mod frontier;
mod node;
mod observer;
mod pathfind;
mod strategy;

pub use node::{Node, NodeArena, NodeState};
pub use observer::{NullObserver, Observer, Recorder};
pub use strategy::{Outcome, Phase, Step, Strategy, StrategyConfig, StrategyError, StrategyKind};
