//! REPSYNC Test Harness - reproducible interleavings
//!
//! This crate provides:
//! - Landmark builders for exact arm angles
//! - A seeded two-stream update scheduler
//! - Sequential and threaded replay of a schedule against a session

pub mod scenario;
pub mod interleave;

pub use scenario::*;
pub use interleave::*;
