//! Background-thread run scheduler.
//!
//! [`Engine`] owns the grid and drives one strategy run at a time on a
//! worker thread, pacing steps by a configurable delay and streaming
//! progress to the caller over an [`EngineEvent`] channel. Cancellation is
//! cooperative through a [`Context`] token checked at step boundaries.

mod context;
mod engine;
mod event;

pub use context::Context;
pub use engine::{Engine, EngineError};
pub use event::EngineEvent;
