//! Stream state cell - latest published phase of one camera

use std::sync::Arc;

use parking_lot::RwLock;
use repsync_core::{FrameSeq, Phase, StreamId};

/// Latest published state of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamState {
    /// Most recent classified phase
    pub phase: Phase,
    /// Sequence of the last frame applied (detection or gap)
    pub last_seq: Option<FrameSeq>,
    /// False after an explicit end-of-stream until restarted
    pub active: bool,
    /// Detection gaps since the last classified frame
    pub consecutive_gaps: u32,
}

impl Default for StreamState {
    fn default() -> Self {
        StreamState {
            phase: Phase::None,
            last_seq: None,
            active: true,
            consecutive_gaps: 0,
        }
    }
}

impl StreamState {
    /// Would a frame with `seq` move publication forward?
    #[inline]
    pub fn accepts(&self, seq: FrameSeq) -> bool {
        self.last_seq.map_or(true, |last| seq > last)
    }
}

pub(crate) type SharedStreamState = Arc<RwLock<StreamState>>;

/// Read-only view of a stream's state
///
/// Handed to the synchronizer and presentation consumers. The owning
/// tracker is the only writer.
#[derive(Debug, Clone)]
pub struct StreamReader {
    stream: StreamId,
    state: SharedStreamState,
}

impl StreamReader {
    pub(crate) fn new(stream: StreamId, state: SharedStreamState) -> Self {
        StreamReader { stream, state }
    }

    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// Consistent copy of the whole state
    #[inline]
    pub fn snapshot(&self) -> StreamState {
        *self.state.read()
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.read().phase
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.read().active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = StreamState::default();
        assert_eq!(state.phase, Phase::None);
        assert!(state.active);
        assert!(state.accepts(FrameSeq::ZERO));
    }

    #[test]
    fn test_accepts_only_newer() {
        let state = StreamState {
            last_seq: Some(FrameSeq::new(10)),
            ..Default::default()
        };
        assert!(!state.accepts(FrameSeq::new(9)));
        assert!(!state.accepts(FrameSeq::new(10)));
        assert!(state.accepts(FrameSeq::new(11)));
    }

    #[test]
    fn test_reader_sees_writes() {
        let shared: SharedStreamState = Arc::new(RwLock::new(StreamState::default()));
        let reader = StreamReader::new(StreamId::Side, shared.clone());

        shared.write().phase = Phase::Contracted;

        assert_eq!(reader.phase(), Phase::Contracted);
        assert_eq!(reader.stream(), StreamId::Side);
    }
}
