//! Identity types for REPSYNC
//!
//! A session watches exactly two camera streams. The front/side naming
//! follows the usual two-camera exercise setup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RepError;

/// Camera stream identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamId {
    /// Camera facing the subject
    Front,
    /// Camera at the subject's side
    Side,
}

impl StreamId {
    /// Both streams, in index order
    pub const ALL: [StreamId; 2] = [StreamId::Front, StreamId::Side];

    /// Dense index (0 or 1)
    #[inline]
    pub fn index(self) -> usize {
        match self {
            StreamId::Front => 0,
            StreamId::Side => 1,
        }
    }

    /// The other stream of the pair
    #[inline]
    pub fn other(self) -> StreamId {
        match self {
            StreamId::Front => StreamId::Side,
            StreamId::Side => StreamId::Front,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StreamId::Front => "front",
            StreamId::Side => "side",
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StreamId {
    type Err = RepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "1" => Ok(StreamId::Front),
            "side" | "2" => Ok(StreamId::Side),
            other => Err(RepError::UnknownStream(other.to_string())),
        }
    }
}

/// Per-stream frame sequence number, assigned by the frame producer
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSeq(pub u64);

impl FrameSeq {
    pub const ZERO: FrameSeq = FrameSeq(0);

    #[inline]
    pub fn new(seq: u64) -> Self {
        FrameSeq(seq)
    }

    #[inline]
    pub fn next(self) -> Self {
        FrameSeq(self.0.wrapping_add(1))
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FrameSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(#{})", self.0)
    }
}

impl fmt::Display for FrameSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
