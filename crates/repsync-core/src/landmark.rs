//! Landmark model - the 33-point body pose delivered per frame
//!
//! Coordinates are normalized to the frame: `x` and `y` in `[0, 1]`,
//! origin top-left. The estimator that produces them lives outside this crate.

use serde::{Deserialize, Serialize};

use crate::{FrameSeq, RepError, RepResult};

/// Default capture width in pixels
pub const FRAME_WIDTH: u32 = 640;
/// Default capture height in pixels
pub const FRAME_HEIGHT: u32 = 480;

/// Body landmark index in the 33-point pose model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Joint {
    // Face
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,

    // Arms
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,

    // Hands
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,

    // Legs
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Joint {
    /// Number of landmarks in a complete set
    pub const COUNT: usize = 33;

    /// All joints in index order
    pub fn all() -> &'static [Joint] {
        &[
            Joint::Nose,
            Joint::LeftEyeInner,
            Joint::LeftEye,
            Joint::LeftEyeOuter,
            Joint::RightEyeInner,
            Joint::RightEye,
            Joint::RightEyeOuter,
            Joint::LeftEar,
            Joint::RightEar,
            Joint::MouthLeft,
            Joint::MouthRight,
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftElbow,
            Joint::RightElbow,
            Joint::LeftWrist,
            Joint::RightWrist,
            Joint::LeftPinky,
            Joint::RightPinky,
            Joint::LeftIndex,
            Joint::RightIndex,
            Joint::LeftThumb,
            Joint::RightThumb,
            Joint::LeftHip,
            Joint::RightHip,
            Joint::LeftKnee,
            Joint::RightKnee,
            Joint::LeftAnkle,
            Joint::RightAnkle,
            Joint::LeftHeel,
            Joint::RightHeel,
            Joint::LeftFootIndex,
            Joint::RightFootIndex,
        ]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Joint> {
        Self::all().get(index).copied()
    }
}

/// Plain 2D point in normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

fn full_visibility() -> f32 {
    1.0
}

/// A single tracked body point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth, 0 when the estimator gives none
    #[serde(default)]
    pub z: f32,
    /// Estimator confidence that the point is visible
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    pub fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: 1.0,
        }
    }

    #[inline]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Project onto a frame of the given pixel size
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A complete set of landmarks for one frame
///
/// INVARIANT: exactly `Joint::COUNT` landmarks with finite x/y.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    /// Validate a raw estimator output
    pub fn new(landmarks: Vec<Landmark>) -> RepResult<Self> {
        if landmarks.len() != Joint::COUNT {
            return Err(RepError::MalformedLandmarks {
                expected: Joint::COUNT,
                actual: landmarks.len(),
            });
        }
        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(RepError::NonFiniteLandmark { index });
        }
        Ok(Self { landmarks })
    }

    /// Landmark for a joint (always present)
    #[inline]
    pub fn get(&self, joint: Joint) -> &Landmark {
        &self.landmarks[joint.index()]
    }

    #[inline]
    pub fn point(&self, joint: Joint) -> Point2 {
        self.get(joint).point()
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, &Landmark)> {
        Joint::all().iter().copied().zip(self.landmarks.iter())
    }

    pub fn into_inner(self) -> Vec<Landmark> {
        self.landmarks
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = RepError;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self, Self::Error> {
        LandmarkSet::new(landmarks)
    }
}

/// One delivery from the pose estimator for one camera frame
///
/// `landmarks` is the raw, unvalidated output; `None` means no body was detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub seq: FrameSeq,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl PoseFrame {
    pub fn detected(seq: FrameSeq, landmarks: Vec<Landmark>) -> Self {
        Self {
            seq,
            landmarks: Some(landmarks),
        }
    }

    /// Detection gap
    pub fn missing(seq: FrameSeq) -> Self {
        Self {
            seq,
            landmarks: None,
        }
    }

    pub fn is_detection(&self) -> bool {
        self.landmarks.is_some()
    }
}
