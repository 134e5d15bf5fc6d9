//! Terminal front-end for the amaze engine.
//!
//! Carves a maze with a generator, then (for pathfinder strategies) solves
//! it, streaming progress from the engine's event channel into an ASCII
//! rendering of the final grid.
//!
//! Usage: `mazeview [strategy] [dim] [density] [seed]`

use std::env;
use std::error::Error;
use std::sync::mpsc::Receiver;

use log::info;

use amaze_algo::{NodeState, Outcome, StrategyKind};
use amaze_core::{CellKind, DIM_DEFAULT, Maze, Point};
use amaze_engine::{Engine, EngineEvent};

fn parse_kind(name: &str) -> Option<StrategyKind> {
    StrategyKind::ALL
        .into_iter()
        .find(|k| k.to_string() == name.to_lowercase())
}

/// Per-cell traversal overlay accumulated from `Cell` events.
struct Overlay {
    dim: i32,
    states: Vec<Option<NodeState>>,
}

impl Overlay {
    fn new(dim: i32) -> Self {
        Self {
            dim,
            states: vec![None; (dim * dim) as usize],
        }
    }

    fn set(&mut self, pos: Point, state: NodeState) {
        if pos.x >= 0 && pos.x < self.dim && pos.y >= 0 && pos.y < self.dim {
            self.states[(pos.y * self.dim + pos.x) as usize] = Some(state);
        }
    }

    fn get(&self, pos: Point) -> Option<NodeState> {
        self.states[(pos.y * self.dim + pos.x) as usize]
    }
}

/// Drain events until the run finishes, folding transitions into `overlay`.
fn drain_run(rx: &Receiver<EngineEvent>, overlay: &mut Overlay) -> Result<Outcome, Box<dyn Error>> {
    loop {
        match rx.recv()? {
            EngineEvent::Finished { outcome } => return Ok(outcome),
            EngineEvent::Cell { pos, state } => overlay.set(pos, state),
            _ => {}
        }
    }
}

fn render(maze: &Maze, overlay: &Overlay) {
    for y in 0..maze.dim() {
        let mut line = String::with_capacity(2 * maze.dim() as usize);
        for x in 0..maze.dim() {
            let p = Point::new(x, y);
            let ch = match maze.kind(p) {
                Some(CellKind::Wall) => '#',
                Some(CellKind::Start) => 'S',
                Some(CellKind::End) => 'E',
                _ => match overlay.get(p) {
                    Some(NodeState::Path) => '*',
                    Some(NodeState::Visited) => '.',
                    Some(NodeState::Germinated) => ',',
                    None => ' ',
                },
            };
            line.push(ch);
            line.push(' ');
        }
        println!("{line}");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let kind = match args.next() {
        Some(name) => parse_kind(&name).ok_or_else(|| format!("unknown strategy '{name}'"))?,
        None => StrategyKind::BackTracker,
    };
    let dim: i32 = match args.next() {
        Some(s) => s.parse()?,
        None => DIM_DEFAULT,
    };
    let density: f64 = match args.next() {
        Some(s) => s.parse()?,
        None => 0.15,
    };
    let seed: Option<u64> = match args.next() {
        Some(s) => Some(s.parse()?),
        None => None,
    };

    let (mut engine, rx) = Engine::new(dim)?;
    engine.select_start(Point::new(0, 0))?;
    engine.select_end(Point::new(dim - 1, dim - 1))?;
    engine.set_density(density)?;
    engine.set_seed(seed)?;

    // Pathfinders need something to solve: carve first, then search.
    let carver = if kind.is_pathfinder() {
        StrategyKind::BackTracker
    } else {
        kind
    };

    let mut overlay = Overlay::new(dim);
    engine.run(carver)?;
    let outcome = drain_run(&rx, &mut overlay)?;
    info!("{carver}: {outcome:?}");

    if kind.is_pathfinder() {
        let mut overlay_solve = Overlay::new(dim);
        engine.run(kind)?;
        match drain_run(&rx, &mut overlay_solve)? {
            Outcome::Path(path) => {
                info!("{kind}: path of {} cells", path.len());
            }
            other => info!("{kind}: {other:?}"),
        }
        overlay = overlay_solve;
    }

    render(&engine.snapshot(), &overlay);
    Ok(())
}
