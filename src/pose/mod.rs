// Pose module - landmark data model and pure geometry
//
// A PoseFrame is the per-frame output of the external pose estimator: one
// Landmark per named joint, always all present. Joints the estimator did not
// see carry zero visibility and must be treated as absent by consumers.
//
// Architecture:
// - Joint: closed enumeration in estimator landmark order
// - PoseFrame: Joint-indexed landmark storage plus frame timestamp
// - AngleSet: sparse biomechanical angles derived from a frame
// - geometry: stateless angle/distance helpers
// - view: frontal/profile classification

use std::ops::Index;

use serde::{Deserialize, Serialize};

pub mod angles;
pub mod geometry;
pub mod view;

pub use angles::{AngleKind, AngleSet};
pub use view::{BodyView, ViewClassifier};

/// Single estimated joint position for one frame
///
/// Coordinates are normalized to the frame (x to the right, y downward,
/// both in [0, 1] for on-screen joints). `z` is the estimator's relative
/// depth and is not used for angle computation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    /// Estimator confidence that the joint is visible (0.0-1.0)
    #[serde(default)]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Fully visible landmark on the image plane
    pub fn visible(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    pub fn is_visible(&self, min_visibility: f32) -> bool {
        self.visibility >= min_visibility
    }
}

/// Named body joints in estimator landmark order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Joint {
    pub const COUNT: usize = 33;

    pub const ALL: [Joint; Joint::COUNT] = [
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
    ];

    /// Joints whose visibility decides whether the user is in frame at all
    pub const COMPLETENESS_SET: [Joint; 8] = [
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The same joint on the opposite side of the body (identity for midline joints)
    pub fn mirror(self) -> Joint {
        use Joint::*;
        match self {
            Nose => Nose,
            LeftEyeInner => RightEyeInner,
            LeftEye => RightEye,
            LeftEyeOuter => RightEyeOuter,
            RightEyeInner => LeftEyeInner,
            RightEye => LeftEye,
            RightEyeOuter => LeftEyeOuter,
            LeftEar => RightEar,
            RightEar => LeftEar,
            MouthLeft => MouthRight,
            MouthRight => MouthLeft,
            LeftShoulder => RightShoulder,
            RightShoulder => LeftShoulder,
            LeftElbow => RightElbow,
            RightElbow => LeftElbow,
            LeftWrist => RightWrist,
            RightWrist => LeftWrist,
            LeftPinky => RightPinky,
            RightPinky => LeftPinky,
            LeftIndex => RightIndex,
            RightIndex => LeftIndex,
            LeftThumb => RightThumb,
            RightThumb => LeftThumb,
            LeftHip => RightHip,
            RightHip => LeftHip,
            LeftKnee => RightKnee,
            RightKnee => LeftKnee,
            LeftAnkle => RightAnkle,
            RightAnkle => LeftAnkle,
            LeftHeel => RightHeel,
            RightHeel => LeftHeel,
            LeftFootIndex => RightFootIndex,
            RightFootIndex => LeftFootIndex,
        }
    }
}

/// Complete set of landmarks for one video frame
///
/// Every joint is always present; undetected joints are zero-valued with
/// zero visibility. Deserialization pads short landmark lists the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseFrameRepr")]
pub struct PoseFrame {
    /// Capture timestamp in milliseconds (monotonic within a session)
    pub timestamp_ms: u64,
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize)]
struct PoseFrameRepr {
    #[serde(default)]
    timestamp_ms: u64,
    #[serde(default)]
    landmarks: Vec<Landmark>,
}

impl From<PoseFrameRepr> for PoseFrame {
    fn from(repr: PoseFrameRepr) -> Self {
        PoseFrame::new(repr.timestamp_ms, repr.landmarks)
    }
}

impl PoseFrame {
    /// Build a frame from landmarks in estimator order, padding or truncating to the joint count
    pub fn new(timestamp_ms: u64, mut landmarks: Vec<Landmark>) -> Self {
        landmarks.resize(Joint::COUNT, Landmark::default());
        Self {
            timestamp_ms,
            landmarks,
        }
    }

    /// Frame with every joint undetected
    pub fn empty(timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, Vec::new())
    }

    pub fn get(&self, joint: Joint) -> &Landmark {
        &self.landmarks[joint.index()]
    }

    pub fn set(&mut self, joint: Joint, landmark: Landmark) {
        self.landmarks[joint.index()] = landmark;
    }

    /// Builder-style variant of [`PoseFrame::set`]
    pub fn with(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.set(joint, landmark);
        self
    }

    pub fn visibility(&self, joint: Joint) -> f32 {
        self.get(joint).visibility
    }

    /// Mean visibility over a joint subset (0.0 for an empty subset)
    pub fn mean_visibility(&self, joints: &[Joint]) -> f32 {
        if joints.is_empty() {
            return 0.0;
        }
        joints.iter().map(|j| self.visibility(*j)).sum::<f32>() / joints.len() as f32
    }

    /// Fraction of `joints` whose visibility reaches `min_visibility`
    pub fn visible_ratio(&self, joints: &[Joint], min_visibility: f32) -> f32 {
        if joints.is_empty() {
            return 0.0;
        }
        let visible = joints
            .iter()
            .filter(|j| self.get(**j).is_visible(min_visibility))
            .count();
        visible as f32 / joints.len() as f32
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Copy of this frame with every left/right joint label swapped
    pub fn mirrored(&self) -> Self {
        let mut out = Self::empty(self.timestamp_ms);
        for joint in Joint::ALL {
            out.set(joint.mirror(), *self.get(joint));
        }
        out
    }
}

impl Index<Joint> for PoseFrame {
    type Output = Landmark;

    fn index(&self, joint: Joint) -> &Landmark {
        self.get(joint)
    }
}
