//! Interleaving simulator - two camera streams in randomized arrival order
//!
//! A schedule is a sequence of rounds. In each round both streams move to
//! the same phase (alternating Extended / Contracted), with detection gaps
//! and late re-deliveries mixed in, and the two streams' frames are merged
//! in a random order. Rounds are spaced further apart than the cooldown,
//! so every round must count exactly one phase event whatever the order.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use repsync_core::{FrameSeq, Phase, PoseFrame, SessionTime, StreamId};
use repsync_runtime::{Session, UpdateOutcome, SyncOutcome};
use repsync_state::TrackerOutcome;
use repsync_time::ManualClock;

use crate::pose_for;

/// Schedule shape
#[derive(Clone, Debug)]
pub struct InterleaveConfig {
    /// Agreement rounds
    pub rounds: u32,
    /// Frames per stream per round
    pub updates_per_stream: u32,
    /// Time between round starts
    pub round_spacing: Duration,
    /// Time between consecutive updates inside a round
    pub step: Duration,
    /// Chance that a frame is a detection gap
    pub gap_rate: f64,
    /// Chance that a frame is followed by a late re-delivery
    pub stale_rate: f64,
}

impl Default for InterleaveConfig {
    fn default() -> Self {
        // 20 rounds x 2 streams x 25 frames = 1000 updates
        InterleaveConfig {
            rounds: 20,
            updates_per_stream: 25,
            round_spacing: Duration::from_millis(1500),
            step: Duration::from_millis(5),
            gap_rate: 0.1,
            stale_rate: 0.05,
        }
    }
}

impl InterleaveConfig {
    /// Phase the streams converge on in `round`
    pub fn phase_of(round: u32) -> Phase {
        if round % 2 == 0 {
            Phase::Extended
        } else {
            Phase::Contracted
        }
    }

    pub fn round_start(&self, round: u32) -> SessionTime {
        SessionTime::ZERO + self.round_spacing * round
    }
}

/// One delivery at a point in session time
#[derive(Clone, Debug)]
pub struct ScheduledUpdate {
    pub round: u32,
    pub at: SessionTime,
    pub stream: StreamId,
    pub frame: PoseFrame,
}

/// Seeded schedule generator
pub struct InterleavingSimulator {
    config: InterleaveConfig,
    rng: StdRng,
    seqs: [u64; 2],
}

impl InterleavingSimulator {
    pub fn new(config: InterleaveConfig, seed: u64) -> Self {
        InterleavingSimulator {
            config,
            rng: StdRng::seed_from_u64(seed),
            seqs: [0; 2],
        }
    }

    pub fn config(&self) -> &InterleaveConfig {
        &self.config
    }

    /// Build the whole schedule
    pub fn generate(&mut self) -> Vec<ScheduledUpdate> {
        let mut schedule = Vec::new();
        for round in 0..self.config.rounds {
            let front = self.stream_round(StreamId::Front, round);
            let side = self.stream_round(StreamId::Side, round);
            self.merge(round, front, side, &mut schedule);
        }
        schedule
    }

    /// One stream's frames for one round, in that stream's order
    fn stream_round(&mut self, stream: StreamId, round: u32) -> Vec<PoseFrame> {
        let phase = InterleaveConfig::phase_of(round);
        let stale_phase = InterleaveConfig::phase_of(round + 1);
        let gap_rate = self.config.gap_rate.clamp(0.0, 1.0);
        let stale_rate = self.config.stale_rate.clamp(0.0, 1.0);
        let n = self.config.updates_per_stream.max(1);

        let mut frames = Vec::with_capacity(n as usize);
        for i in 0..n {
            self.seqs[stream.index()] += 1;
            let seq = self.seqs[stream.index()];

            // The last frame of a round is always a detection
            let is_last = i + 1 == n;
            if !is_last && self.rng.gen_bool(gap_rate) {
                frames.push(PoseFrame::missing(FrameSeq::new(seq)));
            } else {
                frames.push(PoseFrame::detected(FrameSeq::new(seq), pose_for(phase)));
            }

            if self.rng.gen_bool(stale_rate) {
                // Late arrival of an older frame, showing the wrong phase
                frames.push(PoseFrame::detected(
                    FrameSeq::new(seq.saturating_sub(1)),
                    pose_for(stale_phase),
                ));
            }
        }
        frames
    }

    /// Random merge that keeps each stream's own order
    fn merge(
        &mut self,
        round: u32,
        front: Vec<PoseFrame>,
        side: Vec<PoseFrame>,
        out: &mut Vec<ScheduledUpdate>,
    ) {
        let start = self.config.round_start(round);
        let mut front = front.into_iter().peekable();
        let mut side = side.into_iter().peekable();
        let mut k = 0u32;

        loop {
            let pick_front = match (front.peek(), side.peek()) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(_), Some(_)) => self.rng.gen_bool(0.5),
            };
            let (stream, frame) = if pick_front {
                (StreamId::Front, front.next())
            } else {
                (StreamId::Side, side.next())
            };
            let Some(frame) = frame else { break };

            out.push(ScheduledUpdate {
                round,
                at: start + self.config.step * k,
                stream,
                frame,
            });
            k += 1;
        }
    }
}

/// Tally of a replay
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub updates: u64,
    pub counted: u64,
    pub gaps: u64,
    pub stale: u64,
    pub rejected: u64,
    pub phase_events: u64,
    pub repetitions: u64,
}

impl SimulationReport {
    fn record(&mut self, result: &Result<UpdateOutcome, repsync_core::RepError>) {
        self.updates += 1;
        match result {
            Ok(outcome) => {
                match outcome.tracker {
                    TrackerOutcome::Gap { .. } => self.gaps += 1,
                    TrackerOutcome::Stale { .. } => self.stale += 1,
                    TrackerOutcome::Published { .. } => {}
                }
                if matches!(outcome.sync, Some(SyncOutcome::Counted { .. })) {
                    self.counted += 1;
                }
            }
            Err(_) => self.rejected += 1,
        }
    }

    fn absorb(&mut self, other: SimulationReport) {
        self.updates += other.updates;
        self.counted += other.counted;
        self.gaps += other.gaps;
        self.stale += other.stale;
        self.rejected += other.rejected;
    }

    fn finish(mut self, session: &Session) -> Self {
        self.phase_events = session.current_phase_events();
        self.repetitions = session.current_repetition_count();
        self
    }
}

/// Apply a schedule on one thread, in schedule order
pub fn replay(session: &Session, clock: &ManualClock, schedule: &[ScheduledUpdate]) -> SimulationReport {
    let mut report = SimulationReport::default();
    for update in schedule {
        clock.set(update.at);
        let result = session.update(update.stream, update.frame.clone());
        report.record(&result);
    }
    report.finish(session)
}

/// Apply a schedule with one OS thread per stream
///
/// Rounds are barriers: both threads finish a round before the clock moves
/// to the next one. Inside a round the arrival order is up to the scheduler.
pub fn replay_threaded(
    session: &Session,
    clock: &ManualClock,
    schedule: &[ScheduledUpdate],
) -> SimulationReport {
    let mut report = SimulationReport::default();

    for round in schedule.chunk_by_round() {
        if let Some(first) = round.first() {
            clock.set(first.at);
        }
        let per_stream = StreamId::ALL.map(|stream| {
            round
                .iter()
                .filter(|u| u.stream == stream)
                .collect::<Vec<_>>()
        });

        std::thread::scope(|s| {
            let workers: Vec<_> = per_stream
                .iter()
                .map(|updates| {
                    s.spawn(move || {
                        let mut local = SimulationReport::default();
                        for update in updates {
                            local.record(&session.update(update.stream, update.frame.clone()));
                        }
                        local
                    })
                })
                .collect();
            for worker in workers {
                match worker.join() {
                    Ok(local) => report.absorb(local),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });
    }
    report.finish(session)
}

trait ChunkByRound {
    fn chunk_by_round(&self) -> Vec<&[ScheduledUpdate]>;
}

impl ChunkByRound for [ScheduledUpdate] {
    fn chunk_by_round(&self) -> Vec<&[ScheduledUpdate]> {
        let mut chunks = Vec::new();
        let mut start = 0;
        for i in 1..=self.len() {
            if i == self.len() || self[i].round != self[start].round {
                chunks.push(&self[start..i]);
                start = i;
            }
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use repsync_runtime::SessionConfig;
    use std::sync::Arc;

    fn fresh_session() -> (Arc<ManualClock>, Session) {
        let clock = Arc::new(ManualClock::new());
        let session = Session::new(SessionConfig::default(), clock.clone()).unwrap();
        (clock, session)
    }

    fn run(seed: u64) -> SimulationReport {
        let mut sim = InterleavingSimulator::new(InterleaveConfig::default(), seed);
        let schedule = sim.generate();
        let (clock, session) = fresh_session();
        replay(&session, &clock, &schedule)
    }

    #[test]
    fn test_schedule_shape() {
        let mut sim = InterleavingSimulator::new(InterleaveConfig::default(), 1);
        let schedule = sim.generate();

        let fresh = schedule
            .iter()
            .filter(|u| u.frame.seq.value() > 0)
            .count();
        assert!(fresh >= 1000);
        for stream in StreamId::ALL {
            let seqs: Vec<u64> = schedule
                .iter()
                .filter(|u| u.stream == stream)
                .map(|u| u.frame.seq.value())
                .collect();
            assert_eq!(seqs.iter().copied().max(), Some(500));
        }
        // Non-decreasing time
        assert!(schedule.windows(2).all(|w| w[0].at <= w[1].at));
    }

    #[test]
    fn test_one_event_per_round() {
        let report = run(7);
        assert_eq!(report.phase_events, 20);
        assert_eq!(report.counted, 20);
        assert_eq!(report.repetitions, 10);
        assert_eq!(report.rejected, 0);
        assert!(report.gaps > 0);
        assert!(report.stale > 0);
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let a = run(42);
        let b = run(42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_count_independent_of_order() {
        let counts: Vec<(u64, u64)> = (0..16)
            .map(run)
            .map(|r| (r.phase_events, r.repetitions))
            .collect();
        assert!(counts.iter().all(|c| *c == (20, 10)));
    }

    #[test]
    fn test_threaded_matches_sequential() {
        let mut sim = InterleavingSimulator::new(InterleaveConfig::default(), 99);
        let schedule = sim.generate();

        let (clock, session) = fresh_session();
        let sequential = replay(&session, &clock, &schedule);

        for _ in 0..5 {
            let (clock, session) = fresh_session();
            let threaded = replay_threaded(&session, &clock, &schedule);
            assert_eq!(threaded.phase_events, sequential.phase_events);
            assert_eq!(threaded.counted, sequential.counted);
            assert_eq!(threaded.repetitions, 10);
            assert_eq!(threaded.updates, sequential.updates);
        }
    }

    struct BrokenClock;

    impl repsync_time::Clock for BrokenClock {
        fn now(&self) -> SessionTime {
            panic!("clock unavailable")
        }
    }

    #[test]
    #[should_panic(expected = "clock unavailable")]
    fn test_threaded_worker_panic_propagates() {
        let mut sim = InterleavingSimulator::new(InterleaveConfig::default(), 5);
        let schedule = sim.generate();
        let session = Session::new(SessionConfig::default(), Arc::new(BrokenClock)).unwrap();

        replay_threaded(&session, &ManualClock::new(), &schedule);
    }

    #[test]
    fn test_odd_round_count_floors() {
        let config = InterleaveConfig {
            rounds: 7,
            ..Default::default()
        };
        let mut sim = InterleavingSimulator::new(config, 3);
        let schedule = sim.generate();
        let (clock, session) = fresh_session();

        let report = replay(&session, &clock, &schedule);
        assert_eq!(report.phase_events, 7);
        assert_eq!(report.repetitions, 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_any_seed_counts_every_round(seed in any::<u64>()) {
            let report = run(seed);
            prop_assert_eq!(report.phase_events, 20);
            prop_assert_eq!(report.repetitions, 10);
        }
    }
}
