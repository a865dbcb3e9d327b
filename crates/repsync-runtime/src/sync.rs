//! Dual-stream synchronizer - cross-camera agreement and debounce
//!
//! Every evaluation runs entirely under one mutex: reading both published
//! phases, checking the cooldown, incrementing the counter and arming the
//! next cooldown. Two near-simultaneous updates from different streams
//! therefore see each other's effects and cannot both count.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use repsync_core::{Phase, SessionTime};
use repsync_state::StreamReader;
use repsync_time::{Clock, CooldownTimer};

use crate::SyncConfig;

/// Counter values as seen by presentation consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountSnapshot {
    /// Bumped on every reset
    pub generation: u64,
    pub phase_events: u64,
    pub repetitions: u64,
}

impl CountSnapshot {
    /// Is `self` a later state than `other`?
    pub fn supersedes(&self, other: &CountSnapshot) -> bool {
        (self.generation, self.phase_events) > (other.generation, other.phase_events)
    }
}

/// Result of one synchronizer evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Both streams agreed on a new phase, one phase event counted
    Counted { phase: Phase, counts: CountSnapshot },
    /// Inside the window after the last counted event
    CoolingDown { remaining: Duration },
    /// Agreement continues on the phase that was already counted
    AlreadyCounted { phase: Phase },
    /// Streams disagree, or at least one shows no phase
    NoAgreement,
    /// A stream has ended, counting waits until both are active
    Suspended,
}

#[derive(Debug)]
struct SyncState {
    phase_events: u64,
    generation: u64,
    cooldown: CooldownTimer,
    /// Phase of the agreement episode already counted
    counted_episode: Option<Phase>,
}

/// Owns the repetition counter and cooldown for one session
pub struct DualStreamSynchronizer {
    config: SyncConfig,
    streams: [StreamReader; 2],
    clock: Arc<dyn Clock>,
    state: Mutex<SyncState>,
}

impl std::fmt::Debug for DualStreamSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualStreamSynchronizer")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl DualStreamSynchronizer {
    pub fn new(
        config: SyncConfig,
        front: StreamReader,
        side: StreamReader,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cooldown = CooldownTimer::new(config.cooldown);
        DualStreamSynchronizer {
            config,
            streams: [front, side],
            clock,
            state: Mutex::new(SyncState {
                phase_events: 0,
                generation: 0,
                cooldown,
                counted_episode: None,
            }),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Evaluate both streams' current phases
    ///
    /// Called after any stream publishes. Never blocks on anything but the
    /// synchronizer's own lock and the streams' read locks.
    pub fn evaluate(&self) -> SyncOutcome {
        let mut state = self.state.lock();
        let now = self.clock.now();
        let [a, b] = [self.streams[0].snapshot(), self.streams[1].snapshot()];

        if !a.active || !b.active {
            // An ended stream breaks the current episode
            state.counted_episode = None;
            return SyncOutcome::Suspended;
        }

        if state.cooldown.is_active(now) {
            return SyncOutcome::CoolingDown {
                remaining: state.cooldown.remaining(now),
            };
        }
        state.cooldown.expire(now);

        match Phase::agreement(a.phase, b.phase) {
            None => {
                state.counted_episode = None;
                SyncOutcome::NoAgreement
            }
            Some(phase) if state.counted_episode == Some(phase) => {
                SyncOutcome::AlreadyCounted { phase }
            }
            Some(phase) => {
                state.phase_events += 1;
                state.counted_episode = Some(phase);
                let until = state.cooldown.start(now);
                let counts = self.counts_locked(&state);

                tracing::info!(
                    %phase,
                    phase_events = counts.phase_events,
                    repetitions = counts.repetitions,
                    cooldown_until_ms = until.as_millis(),
                    "phase event counted"
                );
                SyncOutcome::Counted { phase, counts }
            }
        }
    }

    /// Zero the counter, clear cooldown and episode
    pub fn reset(&self) -> CountSnapshot {
        let mut state = self.state.lock();
        state.phase_events = 0;
        state.generation += 1;
        state.cooldown.clear();
        state.counted_episode = None;

        tracing::info!(generation = state.generation, "repetition counter reset");
        self.counts_locked(&state)
    }

    pub fn counts(&self) -> CountSnapshot {
        let state = self.state.lock();
        self.counts_locked(&state)
    }

    pub fn phase_events(&self) -> u64 {
        self.state.lock().phase_events
    }

    /// Completed repetitions: `floor(phase_events / events_per_repetition)`
    pub fn repetitions(&self) -> u64 {
        self.counts().repetitions
    }

    /// End of the current cooldown, if one is running at `now`
    pub fn cooldown_until(&self, now: SessionTime) -> Option<SessionTime> {
        let state = self.state.lock();
        state
            .cooldown
            .deadline()
            .filter(|_| state.cooldown.is_active(now))
    }

    fn counts_locked(&self, state: &SyncState) -> CountSnapshot {
        let per_rep = u64::from(self.config.events_per_repetition.max(1));
        CountSnapshot {
            generation: state.generation,
            phase_events: state.phase_events,
            repetitions: state.phase_events / per_rep,
        }
    }
}
