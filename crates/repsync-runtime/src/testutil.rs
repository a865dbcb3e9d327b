//! Landmark fixtures shared by the runtime tests

use repsync_core::{Joint, Landmark};

fn arms(shoulder_y: f32, wrist: (f32, f32)) -> Vec<Landmark> {
    let mut raw = vec![Landmark::new(0.5, 0.5); Joint::COUNT];
    for (x, s, e, w) in [
        (0.3, Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist),
        (0.7, Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist),
    ] {
        raw[s.index()] = Landmark::new(x, shoulder_y);
        raw[e.index()] = Landmark::new(x, 0.5);
        raw[w.index()] = Landmark::new(x + wrist.0, wrist.1);
    }
    raw
}

/// Both arms straight (~178°)
pub fn extended() -> Vec<Landmark> {
    arms(0.2, (0.01, 0.8))
}

/// Both arms folded (~2°)
pub fn contracted() -> Vec<Landmark> {
    arms(0.2, (0.01, 0.25))
}

/// Both arms at a right angle
pub fn neutral() -> Vec<Landmark> {
    arms(0.2, (0.2, 0.5))
}
