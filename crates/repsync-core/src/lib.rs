//! REPSYNC Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the rep counting engine:
//! - Identifiers (StreamId, FrameSeq)
//! - Time primitives (SessionTime)
//! - The 33-point body landmark model
//! - Per-frame phases
//! - Error types

pub mod id;
pub mod time;
pub mod landmark;
pub mod phase;
pub mod error;

pub use id::*;
pub use time::*;
pub use landmark::*;
pub use phase::*;
pub use error::*;
