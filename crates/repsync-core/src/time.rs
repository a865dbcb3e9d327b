//! Time primitives for REPSYNC
//!
//! Session time is monotonic and local: microseconds since the session
//! clock was created. It never goes backwards and carries no wall-clock meaning.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Session time - monotonic, local-driven
/// Represented as microseconds since session start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionTime(pub u64);

impl SessionTime {
    pub const ZERO: SessionTime = SessionTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        SessionTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        SessionTime(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        SessionTime((secs.max(0.0) * 1_000_000.0) as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        SessionTime(self.0.saturating_add(duration_micros(duration)))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn since(self, earlier: SessionTime) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

#[inline]
fn duration_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

impl Add<Duration> for SessionTime {
    type Output = SessionTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<SessionTime> for SessionTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: SessionTime) -> Self::Output {
        self.since(rhs)
    }
}

impl std::fmt::Debug for SessionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}
