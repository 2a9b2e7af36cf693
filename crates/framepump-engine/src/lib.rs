//! framepump engine crate.
//!
//! A fixed-rate frame pump with pause control, and the platform + GPU pieces
//! needed to host it in a window.

pub mod device;
pub mod input;
pub mod logging;
pub mod pump;
pub mod surface;
pub mod time;
pub mod timer;
pub mod window;
