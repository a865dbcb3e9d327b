//! REPSYNC Pose - geometry over a single frame's landmarks
//!
//! Everything here is stateless and deterministic:
//! - Joint angles from three landmarks
//! - Phase classification from arm angles
//!
//! Nothing in this crate remembers earlier frames. Temporal behavior
//! lives in the state and runtime crates.

pub mod angle;
pub mod classifier;

pub use angle::*;
pub use classifier::*;
