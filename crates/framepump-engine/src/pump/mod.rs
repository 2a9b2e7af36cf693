//! Fixed-rate frame pump with pause control.
//!
//! [`FrameLoop`] advances a life clock on every tick, forwards the tick interval
//! to the surface only while running, and draws the surface on every tick.
//! The toggle key flips between [`LoopState::Running`] and [`LoopState::Paused`].

mod config;
mod frame_loop;
mod state;

pub use config::LoopConfig;
pub use frame_loop::FrameLoop;
pub use state::{LoopState, LoopStats};
