//! Time subsystem.
//!
//! Fixed-rate deadline arithmetic, kept independent of the runtime so it can be
//! driven with synthetic `Instant`s in tests.

mod tick_schedule;

pub use tick_schedule::TickSchedule;
