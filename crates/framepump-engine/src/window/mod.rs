//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop, turns its wake-ups into timer ticks, and routes
//! key presses onto the input bus.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
