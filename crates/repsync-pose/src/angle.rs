//! Joint angle between two rays sharing a vertex

use repsync_core::Point2;

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees
///
/// Computed as the difference of the two `atan2` bearings, reflected into
/// `[0, 180]`. Total: degenerate geometry never panics, and a NaN result
/// (non-finite input) is coerced to 0.
pub fn joint_angle(a: Point2, b: Point2, c: Point2) -> f32 {
    let bearing_a = (a.y - b.y).atan2(a.x - b.x);
    let bearing_c = (c.y - b.y).atan2(c.x - b.x);

    let mut degrees = (bearing_c - bearing_a).to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }

    if degrees.is_nan() {
        return 0.0;
    }
    // f32 rounding can push a full turn a hair past 360
    degrees.clamp(0.0, 180.0)
}
