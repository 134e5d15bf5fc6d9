//! The engine: grid ownership, run scheduling, and the worker loop.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};

use amaze_algo::{Outcome, Step, Strategy, StrategyConfig, StrategyError, StrategyKind};
use amaze_core::{CellKind, GridError, Maze, Point};

use crate::context::Context;
use crate::event::{ChannelObserver, EngineEvent};

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Errors raised by engine commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A run is in progress; the command is rejected until it ends.
    RunActive,
    /// No run is in progress to cancel.
    NotRunning,
    /// A grid operation failed.
    Grid(GridError),
    /// A strategy lifecycle or configuration operation failed.
    Strategy(StrategyError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunActive => f.write_str("a run is in progress"),
            Self::NotRunning => f.write_str("no run is in progress"),
            Self::Grid(e) => write!(f, "grid error: {e}"),
            Self::Strategy(e) => write!(f, "strategy error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Strategy(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for EngineError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<StrategyError> for EngineError {
    fn from(e: StrategyError) -> Self {
        Self::Strategy(e)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Grid plus run scheduling state behind the shared mutex.
struct Inner {
    maze: Maze,
    strategy: Option<Strategy>,
    cfg: StrategyConfig,
}

/// Mutex poisoning only means a worker panicked mid-step; the state it
/// guards stays usable, so recover the guard rather than propagate.
fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the grid and schedules strategy runs on a background worker.
///
/// At most one run is live at a time. While a run is live, every grid
/// mutation is rejected with [`EngineError::RunActive`]; only the pacing
/// delay and [`Engine::cancel`] remain available. Progress streams over
/// the [`EngineEvent`] receiver handed out by [`Engine::new`], ending with
/// `Finished` exactly once per run.
pub struct Engine {
    inner: Arc<Mutex<Inner>>,
    running: Arc<AtomicBool>,
    /// Per-step pacing delay in milliseconds; 0 runs unthrottled.
    delay_ms: Arc<AtomicU64>,
    ctx: Context,
    tx: Sender<EngineEvent>,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// Create an engine over a fresh `dim` × `dim` grid, returning the
    /// event receiver alongside it.
    pub fn new(dim: i32) -> Result<(Self, Receiver<EngineEvent>), EngineError> {
        let maze = Maze::new(dim)?;
        let (tx, rx) = mpsc::channel();
        let engine = Self {
            inner: Arc::new(Mutex::new(Inner {
                maze,
                strategy: None,
                cfg: StrategyConfig::default(),
            })),
            running: Arc::new(AtomicBool::new(false)),
            delay_ms: Arc::new(AtomicU64::new(0)),
            ctx: Context::new(),
            tx,
            worker: None,
        };
        Ok((engine, rx))
    }

    /// Whether a run is currently live.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// A copy of the current grid.
    pub fn snapshot(&self) -> Maze {
        lock(&self.inner).maze.clone()
    }

    // -- run lifecycle ------------------------------------------------------

    /// Start a `kind` run on the worker thread.
    ///
    /// Pathfinders take the grid's start and end markers; generators seed
    /// from the start marker alone. The `Started` event and the awakening
    /// transitions are emitted before this returns, so callers observe a
    /// consistent prefix even if they poll immediately.
    pub fn run(&mut self, kind: StrategyKind) -> Result<(), EngineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(EngineError::RunActive);
        }
        // The previous worker has already observed `running == false`;
        // reap it before replacing the cancellation token it watches.
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        let ctx = Context::new();
        self.ctx = ctx.clone();

        if let Err(e) = self.awaken(kind) {
            self.running.store(false, Ordering::SeqCst);
            return Err(e);
        }
        info!("run started: {kind}");

        let inner = Arc::clone(&self.inner);
        let running = Arc::clone(&self.running);
        let delay_ms = Arc::clone(&self.delay_ms);
        let tx = self.tx.clone();
        self.worker = Some(thread::spawn(move || {
            let mut obs = ChannelObserver::new(tx.clone());
            let outcome = loop {
                if ctx.is_done() {
                    if let Some(s) = lock(&inner).strategy.as_mut() {
                        s.cancel();
                    }
                    break Outcome::Cancelled;
                }
                let step = {
                    let mut guard = lock(&inner);
                    let Inner { maze, strategy, .. } = &mut *guard;
                    match strategy.as_mut() {
                        Some(s) => s.step(maze, &mut obs),
                        None => break Outcome::Cancelled,
                    }
                };
                match step {
                    Step::Done(outcome) => break outcome,
                    Step::Advanced => {
                        let ms = delay_ms.load(Ordering::Relaxed);
                        if ms > 0 {
                            thread::sleep(Duration::from_millis(ms));
                        }
                    }
                }
            };
            info!("run finished: {kind}");
            // Order matters: commands must see the engine idle no later
            // than the receiver sees `Finished`.
            running.store(false, Ordering::SeqCst);
            let _ = tx.send(EngineEvent::Finished { outcome });
        }));
        Ok(())
    }

    /// Build the strategy, announce the run, and awaken it under the lock.
    fn awaken(&self, kind: StrategyKind) -> Result<(), EngineError> {
        let mut guard = lock(&self.inner);
        // Validate the markers before announcing anything: a rejected run
        // emits no events at all.
        if guard.maze.start().is_none() {
            return Err(StrategyError::MissingStart.into());
        }
        if kind.is_pathfinder() && guard.maze.end().is_none() {
            return Err(StrategyError::MissingEnd.into());
        }
        let strategy = Strategy::with_config(kind, guard.cfg)?;
        guard.strategy = Some(strategy);

        let _ = self.tx.send(EngineEvent::Started { kind });
        let mut obs = ChannelObserver::new(self.tx.clone());
        let Inner { maze, strategy, .. } = &mut *guard;
        let awoken = match strategy.as_mut() {
            Some(s) => s.awake(maze, maze.start(), maze.end(), &mut obs),
            None => Ok(()),
        };
        if let Err(e) = awoken {
            guard.strategy = None;
            return Err(e.into());
        }
        Ok(())
    }

    /// Request cooperative cancellation of the live run.
    ///
    /// The worker honors the request at the next step boundary and emits
    /// `Finished` with [`Outcome::Cancelled`]; transitions already applied
    /// stay on the grid.
    pub fn cancel(&self) -> Result<(), EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }
        debug!("cancellation requested");
        self.ctx.cancel();
        Ok(())
    }

    // -- pacing and tuning --------------------------------------------------

    /// Set the per-step delay in milliseconds. Takes effect from the next
    /// step; usable mid-run.
    pub fn set_delay(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::Relaxed);
    }

    /// Set the wall-retention density for subsequent generator runs.
    pub fn set_density(&self, density: f64) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::RunActive);
        }
        if !(0.0..=1.0).contains(&density) {
            return Err(StrategyError::InvalidDensity(density).into());
        }
        lock(&self.inner).cfg.density = density;
        Ok(())
    }

    /// Fix (or clear) the RNG seed for subsequent generator runs.
    pub fn set_seed(&self, seed: Option<u64>) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::RunActive);
        }
        lock(&self.inner).cfg.seed = seed;
        Ok(())
    }

    // -- grid mutation ------------------------------------------------------

    /// Toggle a cell between wall and empty.
    pub fn toggle_wall(&self, p: Point) -> Result<(), EngineError> {
        self.mutate(|maze| maze.toggle_wall(p))
    }

    /// Select (or toggle off) the start marker.
    pub fn select_start(&self, p: Point) -> Result<(), EngineError> {
        self.mutate(|maze| maze.select_start(p))
    }

    /// Select (or toggle off) the end marker.
    pub fn select_end(&self, p: Point) -> Result<(), EngineError> {
        self.mutate(|maze| maze.select_end(p))
    }

    /// Rebuild the grid at a new dimension, discarding cells and markers.
    pub fn resize(&self, dim: i32) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::RunActive);
        }
        let mut guard = lock(&self.inner);
        guard.maze.resize(dim)?;
        debug!("grid resized to {dim}x{dim}");
        let _ = self.tx.send(EngineEvent::Resized { dim });
        Ok(())
    }

    /// Reset every cell to empty and clear both markers, keeping the
    /// current dimension.
    pub fn clear(&self) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::RunActive);
        }
        let mut guard = lock(&self.inner);
        let dim = guard.maze.dim();
        guard.maze.resize(dim)?;
        debug!("grid cleared");
        let _ = self.tx.send(EngineEvent::Cleared);
        Ok(())
    }

    /// Apply a grid mutation and stream the resulting kind changes.
    fn mutate<F>(&self, f: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut Maze) -> Result<Vec<(Point, CellKind)>, GridError>,
    {
        if self.is_running() {
            return Err(EngineError::RunActive);
        }
        let mut guard = lock(&self.inner);
        let changes = f(&mut guard.maze)?;
        for (pos, kind) in changes {
            let _ = self.tx.send(EngineEvent::Kind { pos, kind });
        }
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.ctx.cancel();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amaze_algo::NodeState;
    use amaze_core::CellKind;

    const WAIT: Duration = Duration::from_secs(5);

    fn engine_with_endpoints(dim: i32) -> (Engine, Receiver<EngineEvent>) {
        let (engine, rx) = Engine::new(dim).unwrap();
        engine.select_start(Point::new(0, 0)).unwrap();
        engine.select_end(Point::new(dim - 1, dim - 1)).unwrap();
        while rx.try_recv().is_ok() {} // drop the marker events
        (engine, rx)
    }

    fn wait_finished(rx: &Receiver<EngineEvent>) -> (Vec<EngineEvent>, Outcome) {
        let mut events = Vec::new();
        loop {
            match rx.recv_timeout(WAIT).expect("engine stalled") {
                EngineEvent::Finished { outcome } => return (events, outcome),
                ev => events.push(ev),
            }
        }
    }

    #[test]
    fn run_streams_started_transitions_finished() {
        let (mut engine, rx) = engine_with_endpoints(10);
        engine.run(StrategyKind::Bfs).unwrap();

        let (events, outcome) = wait_finished(&rx);
        assert_eq!(
            events[0],
            EngineEvent::Started {
                kind: StrategyKind::Bfs
            }
        );
        // The awakening germination is the first transition.
        assert_eq!(
            events[1],
            EngineEvent::Cell {
                pos: Point::new(0, 0),
                state: NodeState::Germinated
            }
        );
        let Outcome::Path(path) = outcome else {
            panic!("expected a path outcome");
        };
        assert_eq!(path[0], Point::new(0, 0));
        assert_eq!(*path.last().unwrap(), Point::new(9, 9));
        assert!(!engine.is_running());
    }

    #[test]
    fn second_run_rejected_while_active() {
        let (mut engine, rx) = engine_with_endpoints(50);
        engine.set_delay(20);
        engine.run(StrategyKind::Dijkstra).unwrap();

        assert_eq!(
            engine.run(StrategyKind::Bfs).unwrap_err(),
            EngineError::RunActive
        );

        engine.cancel().unwrap();
        let (_, outcome) = wait_finished(&rx);
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[test]
    fn mutations_rejected_while_running() {
        let (mut engine, rx) = engine_with_endpoints(50);
        engine.set_delay(20);
        engine.run(StrategyKind::AStar).unwrap();

        let p = Point::new(5, 5);
        assert_eq!(engine.toggle_wall(p).unwrap_err(), EngineError::RunActive);
        assert_eq!(engine.select_start(p).unwrap_err(), EngineError::RunActive);
        assert_eq!(engine.select_end(p).unwrap_err(), EngineError::RunActive);
        assert_eq!(engine.resize(30).unwrap_err(), EngineError::RunActive);
        assert_eq!(engine.clear().unwrap_err(), EngineError::RunActive);
        assert_eq!(engine.set_density(0.1).unwrap_err(), EngineError::RunActive);
        assert_eq!(engine.set_seed(Some(1)).unwrap_err(), EngineError::RunActive);
        // The pacing delay stays adjustable mid-run.
        engine.set_delay(0);

        let (_, outcome) = wait_finished(&rx);
        assert!(matches!(outcome, Outcome::Path(_)));
    }

    #[test]
    fn cancel_requires_a_live_run() {
        let (engine, _rx) = Engine::new(10).unwrap();
        assert_eq!(engine.cancel().unwrap_err(), EngineError::NotRunning);
    }

    #[test]
    fn cancel_mid_run_finishes_cancelled() {
        let (mut engine, rx) = engine_with_endpoints(50);
        engine.set_delay(20);
        engine.run(StrategyKind::Bfs).unwrap();
        engine.cancel().unwrap();

        let (events, outcome) = wait_finished(&rx);
        assert_eq!(outcome, Outcome::Cancelled);
        // Transitions applied before the cut were streamed, none rolled back.
        assert!(
            events
                .iter()
                .any(|e| matches!(e, EngineEvent::Cell { .. }))
        );
    }

    #[test]
    fn run_without_start_fails_fast() {
        let (mut engine, rx) = Engine::new(10).unwrap();
        assert_eq!(
            engine.run(StrategyKind::Bfs).unwrap_err(),
            EngineError::Strategy(StrategyError::MissingStart)
        );
        assert!(!engine.is_running());
        // A rejected run emits no events.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn generator_run_and_rerun() {
        let (mut engine, rx) = Engine::new(10).unwrap();
        engine.select_start(Point::new(0, 0)).unwrap();
        engine.set_seed(Some(7)).unwrap();
        engine.set_density(0.2).unwrap();
        while rx.try_recv().is_ok() {}

        engine.run(StrategyKind::BackTracker).unwrap();
        let (_, first) = wait_finished(&rx);
        assert!(matches!(first, Outcome::Carved { .. }));

        // The engine is reusable once the worker reports in.
        engine.clear().unwrap();
        engine.select_start(Point::new(3, 3)).unwrap();
        while rx.try_recv().is_ok() {}
        engine.run(StrategyKind::Prim).unwrap();
        let (_, second) = wait_finished(&rx);
        assert!(matches!(second, Outcome::Carved { .. }));
    }

    #[test]
    fn idle_mutations_stream_kind_events() {
        let (engine, rx) = Engine::new(10).unwrap();
        engine.toggle_wall(Point::new(2, 2)).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::Kind {
                pos: Point::new(2, 2),
                kind: CellKind::Wall
            }
        );

        // Moving the start demotes the old holder then promotes the new.
        engine.select_start(Point::new(0, 0)).unwrap();
        engine.select_start(Point::new(1, 1)).unwrap();
        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(events.contains(&EngineEvent::Kind {
            pos: Point::new(0, 0),
            kind: CellKind::Empty
        }));
        assert!(events.contains(&EngineEvent::Kind {
            pos: Point::new(1, 1),
            kind: CellKind::Start
        }));

        engine.resize(15).unwrap();
        assert_eq!(rx.try_recv().unwrap(), EngineEvent::Resized { dim: 15 });
        engine.clear().unwrap();
        assert_eq!(rx.try_recv().unwrap(), EngineEvent::Cleared);
    }

    #[test]
    fn invalid_density_rejected_idle() {
        let (engine, _rx) = Engine::new(10).unwrap();
        assert_eq!(
            engine.set_density(1.5).unwrap_err(),
            EngineError::Strategy(StrategyError::InvalidDensity(1.5))
        );
    }
}
