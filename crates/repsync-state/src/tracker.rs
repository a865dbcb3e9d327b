//! Stream phase tracker - classify each frame and publish the result

use std::sync::Arc;

use parking_lot::RwLock;
use repsync_core::{FrameSeq, LandmarkSet, Phase, PoseFrame, RepResult, StreamId};
use repsync_pose::PhaseClassifier;
use serde::{Deserialize, Serialize};

use crate::{SharedStreamState, StreamReader, StreamState};

/// What to do with the published phase when the estimator finds no body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Keep the last phase for any number of gaps
    #[default]
    Hold,
    /// Fall back to `Phase::None` after this many consecutive gaps
    DecayAfter(u32),
}

/// Tracker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub gap_policy: GapPolicy,
}

/// Result of feeding one frame to a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// Frame classified and published
    Published { phase: Phase, changed: bool },
    /// No detection in this frame
    Gap { phase: Phase, misses: u32 },
    /// Frame older than what is already published, ignored
    Stale { last_seq: FrameSeq },
}

impl TrackerOutcome {
    /// Did the published state move forward?
    pub fn is_applied(&self) -> bool {
        !matches!(self, TrackerOutcome::Stale { .. })
    }
}

/// Per-camera tracker. Sole writer of its stream state.
#[derive(Debug)]
pub struct StreamPhaseTracker {
    stream: StreamId,
    classifier: PhaseClassifier,
    config: TrackerConfig,
    state: SharedStreamState,
}

impl StreamPhaseTracker {
    pub fn new(stream: StreamId, classifier: PhaseClassifier, config: TrackerConfig) -> Self {
        StreamPhaseTracker {
            stream,
            classifier,
            config,
            state: Arc::new(RwLock::new(StreamState::default())),
        }
    }

    pub fn stream(&self) -> StreamId {
        self.stream
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Read-only handle for the synchronizer and presentation
    pub fn reader(&self) -> StreamReader {
        StreamReader::new(self.stream, Arc::clone(&self.state))
    }

    /// Latest published phase (non-blocking read)
    pub fn current_phase(&self) -> Phase {
        self.state.read().phase
    }

    pub fn snapshot(&self) -> StreamState {
        *self.state.read()
    }

    /// Feed one estimator delivery
    ///
    /// A malformed landmark set is rejected with an error and leaves the
    /// published state untouched.
    pub fn update(&self, frame: PoseFrame) -> RepResult<TrackerOutcome> {
        let seq = frame.seq;
        let Some(raw) = frame.landmarks else {
            return Ok(self.record_gap(seq));
        };

        let landmarks = match LandmarkSet::new(raw) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(stream = %self.stream, seq = seq.value(), error = %e, "rejected landmark set");
                return Err(e);
            }
        };
        let phase = self.classifier.classify(&landmarks);

        let mut state = self.state.write();
        if !state.accepts(seq) {
            return Ok(self.stale(&state, seq));
        }

        let changed = state.phase != phase || !state.active;
        if !state.active {
            tracing::info!(stream = %self.stream, "stream reactivated by detection");
        }
        state.phase = phase;
        state.last_seq = Some(seq);
        state.active = true;
        state.consecutive_gaps = 0;
        drop(state);

        if changed {
            tracing::debug!(stream = %self.stream, seq = seq.value(), %phase, "phase changed");
        }
        Ok(TrackerOutcome::Published { phase, changed })
    }

    fn record_gap(&self, seq: FrameSeq) -> TrackerOutcome {
        let mut state = self.state.write();
        if !state.accepts(seq) {
            return self.stale(&state, seq);
        }

        state.last_seq = Some(seq);
        state.consecutive_gaps = state.consecutive_gaps.saturating_add(1);
        if let GapPolicy::DecayAfter(limit) = self.config.gap_policy {
            if state.consecutive_gaps >= limit && state.phase != Phase::None {
                tracing::debug!(stream = %self.stream, misses = state.consecutive_gaps, "phase decayed after detection gaps");
                state.phase = Phase::None;
            }
        }

        tracing::trace!(stream = %self.stream, seq = seq.value(), "detection gap");
        TrackerOutcome::Gap {
            phase: state.phase,
            misses: state.consecutive_gaps,
        }
    }

    fn stale(&self, state: &StreamState, seq: FrameSeq) -> TrackerOutcome {
        let last_seq = state.last_seq.unwrap_or(FrameSeq::ZERO);
        tracing::debug!(stream = %self.stream, seq = seq.value(), last = last_seq.value(), "stale frame ignored");
        TrackerOutcome::Stale { last_seq }
    }

    /// Explicit end of stream: phase cleared, stream inactive
    pub fn end(&self) {
        let mut state = self.state.write();
        state.phase = Phase::None;
        state.active = false;
        state.consecutive_gaps = 0;
        tracing::info!(stream = %self.stream, "stream ended");
    }

    /// Mark the stream active again without waiting for a detection
    pub fn start(&self) {
        let mut state = self.state.write();
        if !state.active {
            state.active = true;
            tracing::info!(stream = %self.stream, "stream started");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repsync_core::{Joint, Landmark, RepError};

    /// Straight arms: shoulder, elbow, wrist on a vertical line
    fn extended() -> Vec<Landmark> {
        arms(0.2, 0.8)
    }

    /// Wrist folded back next to the shoulder
    fn contracted() -> Vec<Landmark> {
        arms(0.2, 0.25)
    }

    fn arms(shoulder_y: f32, wrist_y: f32) -> Vec<Landmark> {
        let mut raw = vec![Landmark::new(0.5, 0.5); Joint::COUNT];
        for (x, s, e, w) in [
            (0.3, Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist),
            (0.7, Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist),
        ] {
            raw[s.index()] = Landmark::new(x, shoulder_y);
            raw[e.index()] = Landmark::new(x, 0.5);
            raw[w.index()] = Landmark::new(x + 0.01, wrist_y);
        }
        raw
    }

    fn tracker() -> StreamPhaseTracker {
        StreamPhaseTracker::new(StreamId::Front, PhaseClassifier::new(), TrackerConfig::default())
    }

    fn frame(seq: u64, raw: Vec<Landmark>) -> PoseFrame {
        PoseFrame::detected(FrameSeq::new(seq), raw)
    }

    #[test]
    fn test_publish_phase() {
        let t = tracker();
        assert_eq!(t.current_phase(), Phase::None);

        let out = t.update(frame(1, extended())).unwrap();
        assert_eq!(
            out,
            TrackerOutcome::Published {
                phase: Phase::Extended,
                changed: true
            }
        );
        assert_eq!(t.current_phase(), Phase::Extended);

        let out = t.update(frame(2, extended())).unwrap();
        assert_eq!(
            out,
            TrackerOutcome::Published {
                phase: Phase::Extended,
                changed: false
            }
        );

        t.update(frame(3, contracted())).unwrap();
        assert_eq!(t.current_phase(), Phase::Contracted);
    }

    #[test]
    fn test_gap_holds_last_phase() {
        let t = tracker();
        t.update(frame(1, extended())).unwrap();

        let out = t.update(PoseFrame::missing(FrameSeq::new(2))).unwrap();
        assert_eq!(
            out,
            TrackerOutcome::Gap {
                phase: Phase::Extended,
                misses: 1
            }
        );
        for seq in 3..50 {
            t.update(PoseFrame::missing(FrameSeq::new(seq))).unwrap();
        }
        assert_eq!(t.current_phase(), Phase::Extended);
    }

    #[test]
    fn test_gap_decay_policy() {
        let t = StreamPhaseTracker::new(
            StreamId::Side,
            PhaseClassifier::new(),
            TrackerConfig {
                gap_policy: GapPolicy::DecayAfter(3),
            },
        );
        t.update(frame(1, contracted())).unwrap();

        t.update(PoseFrame::missing(FrameSeq::new(2))).unwrap();
        t.update(PoseFrame::missing(FrameSeq::new(3))).unwrap();
        assert_eq!(t.current_phase(), Phase::Contracted);

        t.update(PoseFrame::missing(FrameSeq::new(4))).unwrap();
        assert_eq!(t.current_phase(), Phase::None);

        // A detection resets the miss run
        t.update(frame(5, contracted())).unwrap();
        t.update(PoseFrame::missing(FrameSeq::new(6))).unwrap();
        assert_eq!(t.snapshot().consecutive_gaps, 1);
        assert_eq!(t.current_phase(), Phase::Contracted);
    }

    #[test]
    fn test_malformed_keeps_state() {
        let t = tracker();
        t.update(frame(1, extended())).unwrap();

        let mut short = contracted();
        short.truncate(20);
        let err = t.update(frame(2, short)).unwrap_err();

        assert!(matches!(err, RepError::MalformedLandmarks { actual: 20, .. }));
        assert!(err.is_frame_rejection());
        let state = t.snapshot();
        assert_eq!(state.phase, Phase::Extended);
        assert_eq!(state.last_seq, Some(FrameSeq::new(1)));
    }

    #[test]
    fn test_never_regresses_to_older_frame() {
        let t = tracker();
        t.update(frame(5, extended())).unwrap();

        let out = t.update(frame(4, contracted())).unwrap();
        assert_eq!(
            out,
            TrackerOutcome::Stale {
                last_seq: FrameSeq::new(5)
            }
        );
        assert!(!out.is_applied());
        assert_eq!(t.current_phase(), Phase::Extended);

        let out = t.update(PoseFrame::missing(FrameSeq::new(5))).unwrap();
        assert!(!out.is_applied());
    }

    #[test]
    fn test_end_and_restart() {
        let t = tracker();
        let reader = t.reader();
        t.update(frame(1, extended())).unwrap();

        t.end();
        assert!(!reader.is_active());
        assert_eq!(reader.phase(), Phase::None);

        // Gaps do not bring the stream back
        t.update(PoseFrame::missing(FrameSeq::new(2))).unwrap();
        assert!(!reader.is_active());

        let out = t.update(frame(3, extended())).unwrap();
        assert!(matches!(out, TrackerOutcome::Published { changed: true, .. }));
        assert!(reader.is_active());

        t.end();
        t.start();
        assert!(reader.is_active());
        assert_eq!(reader.phase(), Phase::None);
    }

    #[test]
    fn test_gap_policy_serde() {
        let hold: TrackerConfig = serde_json::from_str(r#"{"gap_policy": "hold"}"#).unwrap();
        assert_eq!(hold.gap_policy, GapPolicy::Hold);

        let decay: TrackerConfig =
            serde_json::from_str(r#"{"gap_policy": {"decay_after": 5}}"#).unwrap();
        assert_eq!(decay.gap_policy, GapPolicy::DecayAfter(5));
    }
}
