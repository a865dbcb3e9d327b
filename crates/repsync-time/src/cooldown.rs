//! Cooldown - suppression window after a counted event
//!
//! The deadline is stored and compared against the caller's `now` on every
//! check. There is no deferred task that clears it.

use std::time::Duration;

use repsync_core::SessionTime;

/// Debounce deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownTimer {
    /// Window length
    duration: Duration,
    /// End of the current window, if one was started and not yet expired
    until: Option<SessionTime>,
}

impl CooldownTimer {
    pub fn new(duration: Duration) -> Self {
        CooldownTimer {
            duration,
            until: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Is the window still open at `now`?
    #[inline]
    pub fn is_active(&self, now: SessionTime) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Open a new window starting at `now`
    pub fn start(&mut self, now: SessionTime) -> SessionTime {
        let until = now + self.duration;
        self.until = Some(until);
        until
    }

    /// Drop an elapsed deadline. Returns true if one was dropped.
    pub fn expire(&mut self, now: SessionTime) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.until = None;
    }

    pub fn deadline(&self) -> Option<SessionTime> {
        self.until
    }

    /// Time left in the window at `now`
    pub fn remaining(&self, now: SessionTime) -> Duration {
        self.until.map_or(Duration::ZERO, |until| until - now)
    }
}

impl Default for CooldownTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
