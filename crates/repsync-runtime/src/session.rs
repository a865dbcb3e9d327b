//! Session - the public surface of the counting engine
//!
//! One session per workout: two trackers, one synchronizer, per-stream
//! statistics and a watch channel for presentation consumers.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use repsync_core::{Phase, PoseFrame, RepResult, StreamId};
use repsync_pose::PhaseClassifier;
use repsync_state::{StreamPhaseTracker, StreamState, TrackerOutcome};
use repsync_time::Clock;
use tokio::sync::watch;

use crate::{CountSnapshot, DualStreamSynchronizer, SessionConfig, SyncOutcome};

/// Per-stream delivery statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames classified and published
    pub frames: u64,
    /// Deliveries without a detection
    pub gaps: u64,
    /// Out-of-order deliveries ignored
    pub stale: u64,
    /// Deliveries rejected as malformed
    pub malformed: u64,
}

/// Result of one `Session::update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub tracker: TrackerOutcome,
    /// `None` when the frame was stale and nothing was evaluated
    pub sync: Option<SyncOutcome>,
}

impl UpdateOutcome {
    pub fn counted(&self) -> bool {
        matches!(self.sync, Some(SyncOutcome::Counted { .. }))
    }
}

/// Presentation view of one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub stream: StreamId,
    pub state: StreamState,
    pub stats: StreamStats,
}

/// Presentation view of the whole session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub counts: CountSnapshot,
    pub streams: [StreamSummary; 2],
    pub cooldown_remaining: Duration,
}

/// Dual-camera repetition counting session
pub struct Session {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    trackers: [StreamPhaseTracker; 2],
    sync: DualStreamSynchronizer,
    stats: Mutex<[StreamStats; 2]>,
    counts_tx: watch::Sender<CountSnapshot>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("sync", &self.sync)
            .finish()
    }
}

impl Session {
    /// Create a session with a validated configuration
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> RepResult<Self> {
        config.validate()?;

        let classifier = PhaseClassifier::with_config(config.classifier);
        let trackers = StreamId::ALL.map(|stream| {
            StreamPhaseTracker::new(stream, classifier.clone(), config.tracker)
        });
        let sync = DualStreamSynchronizer::new(
            config.sync.clone(),
            trackers[StreamId::Front.index()].reader(),
            trackers[StreamId::Side.index()].reader(),
            Arc::clone(&clock),
        );
        let (counts_tx, _) = watch::channel(CountSnapshot::default());

        tracing::debug!(?config, "session created");
        Ok(Session {
            config,
            clock,
            trackers,
            sync,
            stats: Mutex::new(Default::default()),
            counts_tx,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tracker(&self, stream: StreamId) -> &StreamPhaseTracker {
        &self.trackers[stream.index()]
    }

    /// Feed one pose delivery for `stream`
    ///
    /// Malformed landmark sets come back as `Err` and change nothing but the
    /// stream's `malformed` statistic.
    pub fn update(&self, stream: StreamId, frame: PoseFrame) -> RepResult<UpdateOutcome> {
        let outcome = match self.tracker(stream).update(frame) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.lock()[stream.index()].malformed += 1;
                return Err(e);
            }
        };

        {
            let mut stats = self.stats.lock();
            let stats = &mut stats[stream.index()];
            match outcome {
                TrackerOutcome::Published { .. } => stats.frames += 1,
                TrackerOutcome::Gap { .. } => stats.gaps += 1,
                TrackerOutcome::Stale { .. } => stats.stale += 1,
            }
        }

        if !outcome.is_applied() {
            return Ok(UpdateOutcome {
                tracker: outcome,
                sync: None,
            });
        }

        let sync = self.sync.evaluate();
        if let SyncOutcome::Counted { counts, .. } = sync {
            self.publish(counts);
        }
        Ok(UpdateOutcome {
            tracker: outcome,
            sync: Some(sync),
        })
    }

    /// Completed repetitions
    pub fn current_repetition_count(&self) -> u64 {
        self.sync.repetitions()
    }

    pub fn current_phase_events(&self) -> u64 {
        self.sync.phase_events()
    }

    pub fn current_phase(&self, stream: StreamId) -> Phase {
        self.tracker(stream).current_phase()
    }

    /// Zero the counter and clear the cooldown
    pub fn reset(&self) -> CountSnapshot {
        let counts = self.sync.reset();
        self.publish(counts);
        counts
    }

    /// Explicit end-of-stream: counting suspends until the stream returns
    pub fn end_stream(&self, stream: StreamId) {
        self.tracker(stream).end();
        self.sync.evaluate();
    }

    pub fn start_stream(&self, stream: StreamId) {
        self.tracker(stream).start();
    }

    /// Subscribe to count changes
    pub fn subscribe(&self) -> watch::Receiver<CountSnapshot> {
        self.counts_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.clock.now();
        let stats = self.stats.lock().clone();
        let streams = StreamId::ALL.map(|stream| StreamSummary {
            stream,
            state: self.tracker(stream).snapshot(),
            stats: stats[stream.index()].clone(),
        });
        let cooldown_remaining = self
            .sync
            .cooldown_until(now)
            .map_or(Duration::ZERO, |until| until - now);

        SessionSnapshot {
            counts: self.sync.counts(),
            streams,
            cooldown_remaining,
        }
    }

    /// Publish without letting a slower thread overwrite a newer count
    fn publish(&self, counts: CountSnapshot) {
        self.counts_tx.send_if_modified(|current| {
            if counts.supersedes(current) {
                *current = counts;
                true
            } else {
                false
            }
        });
    }
}
