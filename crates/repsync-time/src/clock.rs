//! Clock implementations for REPSYNC

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use repsync_core::SessionTime;

/// Source of session time
/// INVARIANT: successive `now()` calls never go backwards
pub trait Clock: Send + Sync {
    fn now(&self) -> SessionTime;
}

/// Session clock driven by the OS monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> SessionTime {
        let micros = u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX);
        SessionTime::from_micros(micros)
    }
}

/// Clock that only moves when told to
///
/// Shared between threads by reference; all operations are atomic.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(t: SessionTime) -> Self {
        ManualClock {
            micros: AtomicU64::new(t.as_micros()),
        }
    }

    /// Move forward by `dt`, returning the new time
    pub fn advance(&self, dt: Duration) -> SessionTime {
        let step = u64::try_from(dt.as_micros()).unwrap_or(u64::MAX);
        let prev = self
            .micros
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(v.saturating_add(step))
            })
            .unwrap_or_else(|v| v);
        SessionTime::from_micros(prev.saturating_add(step))
    }

    /// Jump to `target`. Only moves forward.
    pub fn set(&self, target: SessionTime) -> SessionTime {
        let prev = self.micros.fetch_max(target.as_micros(), Ordering::AcqRel);
        SessionTime::from_micros(prev.max(target.as_micros()))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SessionTime {
        SessionTime::from_micros(self.micros.load(Ordering::Acquire))
    }
}
