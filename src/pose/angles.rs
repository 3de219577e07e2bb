// AngleSet - sparse biomechanical angles for one frame
//
// Angles are indexed by the closed AngleKind enumeration. An angle is
// absent when its joints were not visible enough to compute it; callers
// never see NaN.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::geometry;
use super::{Joint, PoseFrame};

/// Named biomechanical angles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AngleKind {
    #[serde(rename = "left_knee_angle")]
    LeftKnee,
    #[serde(rename = "right_knee_angle")]
    RightKnee,
    #[serde(rename = "left_hip_angle")]
    LeftHip,
    #[serde(rename = "right_hip_angle")]
    RightHip,
    #[serde(rename = "left_elbow_angle")]
    LeftElbow,
    #[serde(rename = "right_elbow_angle")]
    RightElbow,
    #[serde(rename = "left_shoulder_angle")]
    LeftShoulder,
    #[serde(rename = "right_shoulder_angle")]
    RightShoulder,
    #[serde(rename = "left_ankle_angle")]
    LeftAnkle,
    #[serde(rename = "right_ankle_angle")]
    RightAnkle,
    #[serde(rename = "spine_angle")]
    Spine,
    #[serde(rename = "neck_angle")]
    Neck,
    #[serde(rename = "body_line_angle")]
    BodyLine,
}

impl AngleKind {
    pub const COUNT: usize = 13;

    pub const ALL: [AngleKind; AngleKind::COUNT] = [
        AngleKind::LeftKnee,
        AngleKind::RightKnee,
        AngleKind::LeftHip,
        AngleKind::RightHip,
        AngleKind::LeftElbow,
        AngleKind::RightElbow,
        AngleKind::LeftShoulder,
        AngleKind::RightShoulder,
        AngleKind::LeftAnkle,
        AngleKind::RightAnkle,
        AngleKind::Spine,
        AngleKind::Neck,
        AngleKind::BodyLine,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Joints the angle is computed from; limb angles list (end, vertex, end)
    pub fn joints(self) -> &'static [Joint] {
        use Joint::*;
        match self {
            AngleKind::LeftKnee => &[LeftHip, LeftKnee, LeftAnkle],
            AngleKind::RightKnee => &[RightHip, RightKnee, RightAnkle],
            AngleKind::LeftHip => &[LeftShoulder, LeftHip, LeftKnee],
            AngleKind::RightHip => &[RightShoulder, RightHip, RightKnee],
            AngleKind::LeftElbow => &[LeftShoulder, LeftElbow, LeftWrist],
            AngleKind::RightElbow => &[RightShoulder, RightElbow, RightWrist],
            AngleKind::LeftShoulder => &[LeftElbow, LeftShoulder, LeftHip],
            AngleKind::RightShoulder => &[RightElbow, RightShoulder, RightHip],
            AngleKind::LeftAnkle => &[LeftKnee, LeftAnkle, LeftFootIndex],
            AngleKind::RightAnkle => &[RightKnee, RightAnkle, RightFootIndex],
            AngleKind::Spine => &[LeftShoulder, RightShoulder, LeftHip, RightHip],
            AngleKind::Neck => &[Nose, LeftShoulder, RightShoulder],
            AngleKind::BodyLine => &[
                LeftShoulder,
                RightShoulder,
                LeftHip,
                RightHip,
                LeftAnkle,
                RightAnkle,
            ],
        }
    }

    /// Limb angles are single (end, vertex, end) triples; composite angles span both sides
    fn is_limb(self) -> bool {
        !matches!(self, AngleKind::Spine | AngleKind::Neck | AngleKind::BodyLine)
    }

    pub fn key(self) -> &'static str {
        match self {
            AngleKind::LeftKnee => "left_knee_angle",
            AngleKind::RightKnee => "right_knee_angle",
            AngleKind::LeftHip => "left_hip_angle",
            AngleKind::RightHip => "right_hip_angle",
            AngleKind::LeftElbow => "left_elbow_angle",
            AngleKind::RightElbow => "right_elbow_angle",
            AngleKind::LeftShoulder => "left_shoulder_angle",
            AngleKind::RightShoulder => "right_shoulder_angle",
            AngleKind::LeftAnkle => "left_ankle_angle",
            AngleKind::RightAnkle => "right_ankle_angle",
            AngleKind::Spine => "spine_angle",
            AngleKind::Neck => "neck_angle",
            AngleKind::BodyLine => "body_line_angle",
        }
    }
}

/// Sparse mapping from AngleKind to degrees in [0, 180]
///
/// Serialized as a JSON object keyed by angle name, omitting absent angles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<AngleKind, f32>", into = "BTreeMap<AngleKind, f32>")]
pub struct AngleSet {
    values: [Option<f32>; AngleKind::COUNT],
}

impl From<BTreeMap<AngleKind, f32>> for AngleSet {
    fn from(map: BTreeMap<AngleKind, f32>) -> Self {
        let mut set = AngleSet::default();
        for (kind, value) in map {
            set.set(kind, value);
        }
        set
    }
}

impl From<AngleSet> for BTreeMap<AngleKind, f32> {
    fn from(set: AngleSet) -> Self {
        set.iter().collect()
    }
}

impl AngleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: AngleKind) -> Option<f32> {
        self.values[kind.index()]
    }

    /// Store an angle; non-finite values are dropped and finite ones clamped to [0, 180]
    pub fn set(&mut self, kind: AngleKind, degrees: f32) {
        self.values[kind.index()] = degrees.is_finite().then(|| degrees.clamp(0.0, 180.0));
    }

    pub fn clear(&mut self, kind: AngleKind) {
        self.values[kind.index()] = None;
    }

    /// Builder-style variant of [`AngleSet::set`]
    pub fn with(mut self, kind: AngleKind, degrees: f32) -> Self {
        self.set(kind, degrees);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Present angles in AngleKind order
    pub fn iter(&self) -> impl Iterator<Item = (AngleKind, f32)> + '_ {
        AngleKind::ALL
            .iter()
            .filter_map(move |kind| self.get(*kind).map(|v| (*kind, v)))
    }

    /// Derive every computable angle from a frame
    ///
    /// Limb angles require each of their three joints to reach
    /// `min_visibility`; composite angles (spine, neck, body line) require
    /// the mean visibility of their joints to reach it.
    pub fn from_frame(frame: &PoseFrame, min_visibility: f32) -> Self {
        let mut set = AngleSet::default();

        for kind in AngleKind::ALL {
            let joints = kind.joints();
            let visible = if kind.is_limb() {
                joints.iter().all(|j| frame[*j].is_visible(min_visibility))
            } else {
                frame.mean_visibility(joints) >= min_visibility
            };
            if !visible {
                continue;
            }

            let degrees = match kind {
                AngleKind::Spine => geometry::spine_angle(frame),
                AngleKind::Neck => geometry::neck_angle(frame),
                AngleKind::BodyLine => {
                    let left = frame.mean_visibility(&[
                        Joint::LeftShoulder,
                        Joint::LeftHip,
                        Joint::LeftAnkle,
                    ]);
                    let right = frame.mean_visibility(&[
                        Joint::RightShoulder,
                        Joint::RightHip,
                        Joint::RightAnkle,
                    ]);
                    geometry::body_line_angle(frame, left >= right)
                }
                _ => geometry::angle_at(&frame[joints[0]], &frame[joints[1]], &frame[joints[2]]),
            };
            set.set(kind, degrees);
        }

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    #[test]
    fn test_set_clamps_and_drops_nan() {
        let mut set = AngleSet::new();
        set.set(AngleKind::LeftKnee, 200.0);
        set.set(AngleKind::RightKnee, f32::NAN);
        assert_eq!(set.get(AngleKind::LeftKnee), Some(180.0));
        assert_eq!(set.get(AngleKind::RightKnee), None);
    }

    #[test]
    fn test_serde_uses_angle_names() {
        let set = AngleSet::new()
            .with(AngleKind::LeftKnee, 170.0)
            .with(AngleKind::Spine, 85.0);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("left_knee_angle"));
        assert!(json.contains("spine_angle"));
        assert!(!json.contains("right_knee_angle"));

        let parsed: AngleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_from_frame_skips_invisible_joints() {
        let frame = PoseFrame::empty(0)
            .with(Joint::LeftHip, Landmark::visible(0.5, 0.5))
            .with(Joint::LeftKnee, Landmark::visible(0.5, 0.7))
            .with(Joint::LeftAnkle, Landmark::visible(0.5, 0.9));
        let set = AngleSet::from_frame(&frame, 0.5);

        let knee = set.get(AngleKind::LeftKnee).unwrap();
        assert!((knee - 180.0).abs() < 0.1);
        assert_eq!(set.get(AngleKind::RightKnee), None);
        assert_eq!(set.get(AngleKind::Spine), None);
    }

    #[test]
    fn test_from_empty_frame_is_empty() {
        assert!(AngleSet::from_frame(&PoseFrame::empty(0), 0.5).is_empty());
    }
}
