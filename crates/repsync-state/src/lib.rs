//! REPSYNC State - per-camera phase tracking
//!
//! One tracker per camera stream:
//! - Validates the estimator's landmark output
//! - Classifies the frame's phase
//! - Publishes it to a stream state cell that only the tracker writes
//! - Keeps publication ordered by the stream's own frame sequence

pub mod stream;
pub mod tracker;

pub use stream::*;
pub use tracker::*;
