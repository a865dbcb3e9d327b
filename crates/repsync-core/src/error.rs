//! Error types for REPSYNC

use thiserror::Error;

use crate::StreamId;

/// Core REPSYNC errors
///
/// None of these are fatal to a session. Frame-level errors are handed back
/// to the caller and leave tracker and counter state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepError {
    // Frame errors
    #[error("Malformed landmark set: expected {expected} landmarks, got {actual}")]
    MalformedLandmarks { expected: usize, actual: usize },

    #[error("Non-finite coordinate at landmark {index}")]
    NonFiniteLandmark { index: usize },

    // Identity errors
    #[error("Unknown stream: {0}")]
    UnknownStream(String),

    #[error("Stream {0} is no longer accepting frames")]
    StreamClosed(StreamId),

    #[error("Stream {0} frame buffer is full")]
    StreamFull(StreamId),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Telemetry setup failed: {0}")]
    Telemetry(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl RepError {
    /// Frame-level rejection (the frame is dropped, the session continues)
    pub fn is_frame_rejection(&self) -> bool {
        matches!(
            self,
            RepError::MalformedLandmarks { .. } | RepError::NonFiniteLandmark { .. }
        )
    }
}

/// Result type for REPSYNC operations
pub type RepResult<T> = Result<T, RepError>;
