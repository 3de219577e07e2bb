//! View classifier - frontal vs profile presentation to the camera
//!
//! Recomputed every frame; the user may turn mid-session. Frontal and
//! profile views enable disjoint error rules because the geometric signals
//! of one view are unreliable in the other.

use serde::{Deserialize, Serialize};

use super::geometry::horizontal_distance;
use super::{Joint, PoseFrame};
use crate::config::ViewConfig;

/// Orientation of the body relative to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyView {
    Frontal,
    Profile,
}

/// Classifies the view from the horizontal spread of paired landmarks
#[derive(Debug, Clone)]
pub struct ViewClassifier {
    spread_fraction: f32,
    landmark_visibility: f32,
}

impl ViewClassifier {
    pub fn new(config: &ViewConfig, landmark_visibility: f32) -> Self {
        Self {
            spread_fraction: config.profile_spread_fraction,
            landmark_visibility,
        }
    }

    /// Profile when the averaged shoulder/hip spread is narrow and, if the
    /// knees are visible, the knee spread is narrow too
    pub fn classify(&self, frame: &PoseFrame) -> BodyView {
        let shoulder_spread =
            horizontal_distance(&frame[Joint::LeftShoulder], &frame[Joint::RightShoulder]);
        let hip_spread = horizontal_distance(&frame[Joint::LeftHip], &frame[Joint::RightHip]);
        let torso_spread = (shoulder_spread + hip_spread) / 2.0;

        let knees_visible = frame[Joint::LeftKnee].is_visible(self.landmark_visibility)
            && frame[Joint::RightKnee].is_visible(self.landmark_visibility);
        let knees_narrow = !knees_visible
            || horizontal_distance(&frame[Joint::LeftKnee], &frame[Joint::RightKnee])
                < self.spread_fraction;

        if torso_spread < self.spread_fraction && knees_narrow {
            BodyView::Profile
        } else {
            BodyView::Frontal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    fn classifier() -> ViewClassifier {
        ViewClassifier::new(&ViewConfig::default(), 0.5)
    }

    fn frontal_frame() -> PoseFrame {
        PoseFrame::empty(0)
            .with(Joint::LeftShoulder, Landmark::visible(0.62, 0.3))
            .with(Joint::RightShoulder, Landmark::visible(0.38, 0.3))
            .with(Joint::LeftHip, Landmark::visible(0.58, 0.55))
            .with(Joint::RightHip, Landmark::visible(0.42, 0.55))
            .with(Joint::LeftKnee, Landmark::visible(0.59, 0.72))
            .with(Joint::RightKnee, Landmark::visible(0.41, 0.72))
    }

    #[test]
    fn test_frontal_pose() {
        assert_eq!(classifier().classify(&frontal_frame()), BodyView::Frontal);
    }

    #[test]
    fn test_profile_pose() {
        let frame = PoseFrame::empty(0)
            .with(Joint::LeftShoulder, Landmark::visible(0.50, 0.3))
            .with(Joint::RightShoulder, Landmark::visible(0.52, 0.3))
            .with(Joint::LeftHip, Landmark::visible(0.49, 0.55))
            .with(Joint::RightHip, Landmark::visible(0.51, 0.55))
            .with(Joint::LeftKnee, Landmark::visible(0.53, 0.72))
            .with(Joint::RightKnee, Landmark::visible(0.55, 0.72));
        assert_eq!(classifier().classify(&frame), BodyView::Profile);
    }

    #[test]
    fn test_invisible_knees_do_not_block_profile() {
        let frame = PoseFrame::empty(0)
            .with(Joint::LeftShoulder, Landmark::visible(0.50, 0.3))
            .with(Joint::RightShoulder, Landmark::visible(0.52, 0.3))
            .with(Joint::LeftHip, Landmark::visible(0.49, 0.55))
            .with(Joint::RightHip, Landmark::visible(0.51, 0.55))
            .with(Joint::LeftKnee, Landmark::new(0.2, 0.72, 0.0, 0.1))
            .with(Joint::RightKnee, Landmark::new(0.8, 0.72, 0.0, 0.1));
        assert_eq!(classifier().classify(&frame), BodyView::Profile);
    }

    #[test]
    fn test_left_right_swap_keeps_view() {
        let frame = frontal_frame();
        assert_eq!(
            classifier().classify(&frame),
            classifier().classify(&frame.mirrored())
        );
    }
}
