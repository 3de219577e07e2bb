//! Geometry utilities - stateless joint-angle and distance helpers
//!
//! All functions are total: degenerate input (zero-length segments,
//! coincident joints, non-finite coordinates) resolves to 0.0 instead of
//! NaN so nothing downstream has to special-case it.
//!
//! Angles use the image plane only (x, y). The estimator's z is relative
//! depth with much higher noise and is ignored.

use super::{Joint, Landmark, PoseFrame};

/// Segments shorter than this are treated as undetected
const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// Angle in degrees at `vertex` between the rays to `a` and `c`
///
/// Returns 0.0 if either ray has zero length.
pub fn angle_at(a: &Landmark, vertex: &Landmark, c: &Landmark) -> f32 {
    let (v1x, v1y) = (a.x - vertex.x, a.y - vertex.y);
    let (v2x, v2y) = (c.x - vertex.x, c.y - vertex.y);
    let len1 = (v1x * v1x + v1y * v1y).sqrt();
    let len2 = (v2x * v2x + v2y * v2y).sqrt();

    if !(len1 > MIN_SEGMENT_LENGTH && len2 > MIN_SEGMENT_LENGTH) {
        return 0.0;
    }

    let cos = ((v1x * v2x + v1y * v2y) / (len1 * len2)).clamp(-1.0, 1.0);
    sanitize(cos.acos().to_degrees())
}

/// Inclination of a segment against the horizontal: 90° vertical, 0° horizontal
fn inclination(from: (f32, f32), to: (f32, f32)) -> f32 {
    let dx = (to.0 - from.0).abs();
    let dy = (to.1 - from.1).abs();
    if (dx * dx + dy * dy).sqrt() <= MIN_SEGMENT_LENGTH {
        return 0.0;
    }
    sanitize(dy.atan2(dx).to_degrees())
}

/// Torso inclination from hip midpoint to shoulder midpoint
///
/// 90° is fully upright; smaller values mean more forward lean.
pub fn spine_angle(frame: &PoseFrame) -> f32 {
    let shoulders = midpoint(&frame[Joint::LeftShoulder], &frame[Joint::RightShoulder]);
    let hips = midpoint(&frame[Joint::LeftHip], &frame[Joint::RightHip]);
    inclination(hips, shoulders)
}

/// Neck inclination from shoulder midpoint to nose, same convention as [`spine_angle`]
pub fn neck_angle(frame: &PoseFrame) -> f32 {
    let shoulders = midpoint(&frame[Joint::LeftShoulder], &frame[Joint::RightShoulder]);
    let nose = &frame[Joint::Nose];
    inclination(shoulders, (nose.x, nose.y))
}

/// Shoulder-hip-ankle angle on one side; 180° is a straight body line
pub fn body_line_angle(frame: &PoseFrame, left: bool) -> f32 {
    let (shoulder, hip, ankle) = if left {
        (Joint::LeftShoulder, Joint::LeftHip, Joint::LeftAnkle)
    } else {
        (Joint::RightShoulder, Joint::RightHip, Joint::RightAnkle)
    };
    angle_at(&frame[shoulder], &frame[hip], &frame[ankle])
}

/// Bilateral imbalance signal
pub fn symmetry(left: f32, right: f32) -> f32 {
    sanitize((left - right).abs())
}

pub fn midpoint(a: &Landmark, b: &Landmark) -> (f32, f32) {
    ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    sanitize((dx * dx + dy * dy).sqrt())
}

pub fn horizontal_distance(a: &Landmark, b: &Landmark) -> f32 {
    sanitize((a.x - b.x).abs())
}

/// `numerator / denominator`, or `None` when the baseline is degenerate
pub fn safe_ratio(numerator: f32, denominator: f32) -> Option<f32> {
    if denominator.abs() <= MIN_SEGMENT_LENGTH || !numerator.is_finite() {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

/// Mean displacement of `joints` between two frames
pub fn mean_displacement(previous: &PoseFrame, current: &PoseFrame, joints: &[Joint]) -> f32 {
    if joints.is_empty() {
        return 0.0;
    }
    let total: f32 = joints
        .iter()
        .map(|j| distance(&previous[*j], &current[*j]))
        .sum();
    sanitize(total / joints.len() as f32)
}

/// Signed vertical offset of `point` from the line through `a` and `b`
///
/// Positive when the point lies below the line in image coordinates (y down).
/// Returns 0.0 for a vertical or degenerate line.
pub fn offset_from_line(a: &Landmark, b: &Landmark, point: &Landmark) -> f32 {
    let dx = b.x - a.x;
    if dx.abs() <= MIN_SEGMENT_LENGTH {
        return 0.0;
    }
    let t = (point.x - a.x) / dx;
    let line_y = a.y + t * (b.y - a.y);
    sanitize(point.y - line_y)
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
