//! REPSYNC Runtime - dual-stream repetition counting
//!
//! Per-update flow:
//! 1. A camera's pose delivery reaches its stream tracker
//! 2. The tracker classifies and publishes the stream's phase
//! 3. The synchronizer reads both published phases
//! 4. Cross-stream agreement outside cooldown counts one phase event
//! 5. The new count is pushed to presentation subscribers
//!
//! Two phase events (one Extended, one Contracted) make one repetition.

pub mod config;
pub mod driver;
pub mod session;
pub mod sync;
pub mod telemetry;

#[cfg(test)]
mod testutil;

pub use config::*;
pub use driver::*;
pub use session::*;
pub use sync::*;
pub use telemetry::*;
