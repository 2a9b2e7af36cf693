//! Host timer abstraction.
//!
//! A single-threaded queue of repeating fixed-rate timers. The runtime calls
//! [`TimerQueue::fire_due`] from its event loop and sleeps until
//! [`TimerQueue::next_deadline`]; tests drive it with synthetic instants.

mod queue;

pub use queue::{TimerHandle, TimerQueue, MAX_CATCH_UP};
