//! Phase classifier - arm angles to a named phase
//!
//! Both arms are measured at the elbow (shoulder-elbow-wrist). The
//! Extended thresholds are deliberately asymmetric between the arms.

use repsync_core::{Joint, LandmarkSet, Phase, RepError, RepResult};
use serde::{Deserialize, Serialize};

use crate::joint_angle;

/// Arm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmSide {
    Left,
    Right,
}

impl ArmSide {
    /// Shoulder, elbow (vertex), wrist
    pub fn chain(self) -> [Joint; 3] {
        match self {
            ArmSide::Right => [Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist],
            ArmSide::Left => [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
        }
    }

    /// Elbow angle for this arm, degrees
    pub fn angle(self, landmarks: &LandmarkSet) -> f32 {
        let [shoulder, elbow, wrist] = self.chain();
        joint_angle(
            landmarks.point(shoulder),
            landmarks.point(elbow),
            landmarks.point(wrist),
        )
    }
}

/// Both elbow angles of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmAngles {
    pub right: f32,
    pub left: f32,
}

impl ArmAngles {
    pub fn new(right: f32, left: f32) -> Self {
        Self { right, left }
    }

    pub fn measure(landmarks: &LandmarkSet) -> Self {
        Self {
            right: ArmSide::Right.angle(landmarks),
            left: ArmSide::Left.angle(landmarks),
        }
    }
}

/// Classifier thresholds, degrees. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Right arm must exceed this for Extended
    pub extended_right_min: f32,
    /// Left arm must exceed this for Extended
    pub extended_left_min: f32,
    /// Right arm must be below this for Contracted
    pub contracted_right_max: f32,
    /// Left arm must be below this for Contracted
    pub contracted_left_max: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            extended_right_min: 170.0,
            extended_left_min: 160.0,
            contracted_right_max: 60.0,
            contracted_left_max: 60.0,
        }
    }
}

impl ClassifierConfig {
    /// Same thresholds for both arms
    pub fn symmetric(extended_min: f32, contracted_max: f32) -> Self {
        ClassifierConfig {
            extended_right_min: extended_min,
            extended_left_min: extended_min,
            contracted_right_max: contracted_max,
            contracted_left_max: contracted_max,
        }
    }

    /// Reject thresholds outside `[0, 180]` or overlapping bands
    pub fn validate(&self) -> RepResult<()> {
        let all = [
            ("extended_right_min", self.extended_right_min),
            ("extended_left_min", self.extended_left_min),
            ("contracted_right_max", self.contracted_right_max),
            ("contracted_left_max", self.contracted_left_max),
        ];
        for (name, value) in all {
            if !(0.0..=180.0).contains(&value) {
                return Err(RepError::InvalidConfig(format!(
                    "{name} must be within [0, 180] degrees, got {value}"
                )));
            }
        }
        if self.contracted_right_max > self.extended_right_min
            || self.contracted_left_max > self.extended_left_min
        {
            return Err(RepError::InvalidConfig(
                "contracted thresholds must not exceed extended thresholds".into(),
            ));
        }
        Ok(())
    }
}

/// Stateless landmark-set → phase mapping
#[derive(Debug, Clone, Default)]
pub struct PhaseClassifier {
    config: ClassifierConfig,
}

impl PhaseClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        PhaseClassifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a complete landmark set
    pub fn classify(&self, landmarks: &LandmarkSet) -> Phase {
        self.classify_angles(ArmAngles::measure(landmarks))
    }

    /// Classify already measured angles
    pub fn classify_angles(&self, angles: ArmAngles) -> Phase {
        let cfg = &self.config;
        if angles.right > cfg.extended_right_min && angles.left > cfg.extended_left_min {
            Phase::Extended
        } else if angles.right < cfg.contracted_right_max && angles.left < cfg.contracted_left_max
        {
            Phase::Contracted
        } else {
            Phase::None
        }
    }
}
