//! Session configuration
//!
//! Defaults reproduce the reference counting behavior: asymmetric
//! Extended thresholds, a one second cooldown and two phase events per
//! repetition. Durations are written as human-readable strings ("1s", "750ms").

use std::path::Path;
use std::time::Duration;

use repsync_core::{RepError, RepResult};
use repsync_pose::ClassifierConfig;
use repsync_state::{GapPolicy, TrackerConfig};
use serde::{Deserialize, Serialize};

/// Synchronizer configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Suppression window after each counted phase event
    #[serde(with = "humantime_duration")]
    pub cooldown: Duration,
    /// Phase events that make one reported repetition
    pub events_per_repetition: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            cooldown: Duration::from_secs(1),
            events_per_repetition: 2,
        }
    }
}

/// Full session configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub classifier: ClassifierConfig,
    pub tracker: TrackerConfig,
    pub sync: SyncConfig,
    /// Frame buffer per stream task
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            classifier: ClassifierConfig::default(),
            tracker: TrackerConfig::default(),
            sync: SyncConfig::default(),
            channel_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// Defaults with a different cooldown
    pub fn with_cooldown(cooldown: Duration) -> Self {
        let mut config = SessionConfig::default();
        config.sync.cooldown = cooldown;
        config
    }

    pub fn from_json_str(json: &str) -> RepResult<Self> {
        let config: SessionConfig =
            serde_json::from_str(json).map_err(|e| RepError::Parse(e.to_string()))?;
        config.validated()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> RepResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RepError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> RepResult<()> {
        self.classifier.validate()?;
        if self.sync.events_per_repetition == 0 {
            return Err(RepError::InvalidConfig(
                "events_per_repetition must be at least 1".into(),
            ));
        }
        if self.tracker.gap_policy == GapPolicy::DecayAfter(0) {
            return Err(RepError::InvalidConfig(
                "decay_after must be at least 1 gap".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(RepError::InvalidConfig(
                "channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn validated(self) -> RepResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".into(),
            json: false,
            with_target: false,
        }
    }
}

impl LogConfig {
    pub fn json() -> Self {
        LogConfig {
            json: true,
            with_target: true,
            ..Default::default()
        }
    }
}

mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::with_cooldown(Duration::from_secs(1));
        assert_eq!(config.sync, SyncConfig::default());
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.classifier.extended_right_min, 170.0);
        assert_eq!(config.classifier.extended_left_min, 160.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_json() {
        let config = SessionConfig::from_json_str(
            r#"{
                "sync": { "cooldown": "750ms" },
                "tracker": { "gap_policy": { "decay_after": 4 } },
                "channel_capacity": 8
            }"#,
        )
        .unwrap();

        assert_eq!(config.sync.cooldown, Duration::from_millis(750));
        assert_eq!(config.sync.events_per_repetition, 2);
        assert_eq!(
            config.tracker.gap_policy,
            repsync_state::GapPolicy::DecayAfter(4)
        );
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn test_duration_roundtrip_is_human_readable() {
        let json = serde_json::to_string(&SyncConfig::default()).unwrap();
        assert!(json.contains(r#""cooldown":"1s""#));
    }

    #[test]
    fn test_rejects_invalid() {
        let err = SessionConfig::from_json_str(
            r#"{ "sync": { "events_per_repetition": 0 }, "channel_capacity": 4 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RepError::InvalidConfig(_)));

        let err = SessionConfig::from_json_str(
            r#"{ "tracker": { "gap_policy": { "decay_after": 0 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RepError::InvalidConfig(_)));

        let mut config = SessionConfig::default();
        config.tracker.gap_policy = GapPolicy::DecayAfter(1);
        assert!(config.validate().is_ok());

        let err = SessionConfig::from_json_str(r#"{ "sync": { "cooldown": "soon" } }"#).unwrap_err();
        assert!(matches!(err, RepError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sync": {{ "cooldown": "2s" }}, "channel_capacity": 16 }}"#).unwrap();

        let config = SessionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.sync.cooldown, Duration::from_secs(2));

        let missing = SessionConfig::from_json_file("/nonexistent/repsync.json");
        assert!(matches!(missing, Err(RepError::Io(_))));
    }
}
