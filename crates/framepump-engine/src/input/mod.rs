//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform key events into [`KeyEvent`]s and
//! dispatches them on an [`InputBus`].

mod binding;
mod bus;
mod types;

pub mod platform;

pub use binding::KeyBinding;
pub use bus::{InputBus, Subscription};
pub use types::{Key, KeyEvent, Modifiers, PassThrough};
