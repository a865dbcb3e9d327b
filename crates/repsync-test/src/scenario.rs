//! Scenario builders - landmark sets with chosen elbow angles

use repsync_core::{Joint, Landmark, Phase};
use repsync_pose::ArmSide;

/// Distance between neighbouring arm joints
const SEGMENT: f32 = 0.15;

/// Place one arm: upper arm straight up from the elbow, forearm rotated by `deg`
fn place_arm(raw: &mut [Landmark], side: ArmSide, elbow_x: f32, deg: f32) {
    let [shoulder, elbow, wrist] = side.chain();
    let rad = deg.to_radians();
    raw[elbow.index()] = Landmark::new(elbow_x, 0.5);
    raw[shoulder.index()] = Landmark::new(elbow_x, 0.5 - SEGMENT);
    raw[wrist.index()] = Landmark::new(elbow_x + SEGMENT * rad.sin(), 0.5 - SEGMENT * rad.cos());
}

/// Complete landmark set with the given right and left elbow angles
pub fn arm_pose(right_deg: f32, left_deg: f32) -> Vec<Landmark> {
    let mut raw = vec![Landmark::new(0.5, 0.5); Joint::COUNT];
    place_arm(&mut raw, ArmSide::Right, 0.35, right_deg);
    place_arm(&mut raw, ArmSide::Left, 0.65, left_deg);
    raw
}

/// A landmark set that classifies as `phase` under default thresholds
pub fn pose_for(phase: Phase) -> Vec<Landmark> {
    match phase {
        Phase::Extended => arm_pose(176.0, 172.0),
        Phase::Contracted => arm_pose(35.0, 40.0),
        Phase::None => arm_pose(95.0, 100.0),
    }
}
