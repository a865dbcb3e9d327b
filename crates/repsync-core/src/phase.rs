//! Phase - discrete posture classification for a single frame

use std::fmt;

use serde::{Deserialize, Serialize};

/// Posture phase derived from one frame's joint angles
///
/// A phase has no memory of earlier frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Both arms straight
    Extended,
    /// Both arms fully bent
    Contracted,
    /// Ambiguous or transitional posture
    #[default]
    None,
}

impl Phase {
    /// True for `Extended` and `Contracted`
    #[inline]
    pub fn is_countable(self) -> bool {
        !matches!(self, Phase::None)
    }

    /// The phase both streams agree on, if any
    #[inline]
    pub fn agreement(a: Phase, b: Phase) -> Option<Phase> {
        match (a, b) {
            (Phase::Extended, Phase::Extended) => Some(Phase::Extended),
            (Phase::Contracted, Phase::Contracted) => Some(Phase::Contracted),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Extended => "extended",
            Phase::Contracted => "contracted",
            Phase::None => "none",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agreement() {
        assert_eq!(
            Phase::agreement(Phase::Extended, Phase::Extended),
            Some(Phase::Extended)
        );
        assert_eq!(
            Phase::agreement(Phase::Contracted, Phase::Contracted),
            Some(Phase::Contracted)
        );
        assert_eq!(Phase::agreement(Phase::Extended, Phase::Contracted), None);
        assert_eq!(Phase::agreement(Phase::None, Phase::None), None);
    }

    #[test]
    fn test_default_is_none() {
        assert_eq!(Phase::default(), Phase::None);
        assert!(!Phase::None.is_countable());
    }
}
