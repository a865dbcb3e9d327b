//! REPSYNC Time - clocks and debounce deadlines
//!
//! - `Clock`: source of monotonic session time
//! - `MonotonicClock`: backed by the OS monotonic clock
//! - `ManualClock`: stepped explicitly, for replays and tests
//! - `CooldownTimer`: an explicit deadline checked on every evaluation

pub mod clock;
pub mod cooldown;

pub use clock::*;
pub use cooldown::*;
