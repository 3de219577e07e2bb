// Rule predicates - one evaluation predicate per ErrorType
//
// Rules are declarative (type + threshold); this module owns the geometry
// each type is judged by. Every predicate is total: a degenerate baseline
// or a missing angle means "no detection", never NaN.

use super::phase::RepetitionPhase;
use crate::pose::geometry::{
    horizontal_distance, offset_from_line, safe_ratio, symmetry,
};
use crate::pose::{AngleKind, AngleSet, BodyView, Joint, PoseFrame};
use crate::profile::{AngleSelector, ErrorRule, ErrorType, ExerciseProfile};

/// Everything a predicate may look at for the current frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub frame: &'a PoseFrame,
    pub angles: &'a AngleSet,
    pub profile: &'a ExerciseProfile,
    pub view: BodyView,
    pub phase: RepetitionPhase,
    pub tracked_angle: Option<f32>,
    /// Smallest tracked angle since the last TOP
    pub rep_min_angle: Option<f32>,
    pub preference_margin: f32,
}

impl<'a> FrameContext<'a> {
    pub fn resolve(&self, selector: AngleSelector) -> Option<f32> {
        selector.resolve(self.angles, self.frame, self.preference_margin)
    }

    /// Whether the left side of the body is at least as visible as the right
    pub fn left_side_dominant(&self) -> bool {
        let left = self
            .frame
            .mean_visibility(&[Joint::LeftShoulder, Joint::LeftHip, Joint::LeftAnkle]);
        let right = self
            .frame
            .mean_visibility(&[Joint::RightShoulder, Joint::RightHip, Joint::RightAnkle]);
        left >= right
    }

    /// Knee spread divided by hip spread
    pub fn knee_hip_ratio(&self) -> Option<f32> {
        let f = self.frame;
        safe_ratio(
            horizontal_distance(&f[Joint::LeftKnee], &f[Joint::RightKnee]),
            horizontal_distance(&f[Joint::LeftHip], &f[Joint::RightHip]),
        )
    }

    /// Elbow spread divided by shoulder spread
    pub fn elbow_shoulder_ratio(&self) -> Option<f32> {
        let f = self.frame;
        safe_ratio(
            horizontal_distance(&f[Joint::LeftElbow], &f[Joint::RightElbow]),
            horizontal_distance(&f[Joint::LeftShoulder], &f[Joint::RightShoulder]),
        )
    }

    /// Signed hip offset from the shoulder-ankle line on the dominant side
    ///
    /// Positive when the hip hangs below the line.
    pub fn hip_line_offset(&self) -> f32 {
        let f = self.frame;
        let (shoulder, hip, ankle) = if self.left_side_dominant() {
            (Joint::LeftShoulder, Joint::LeftHip, Joint::LeftAnkle)
        } else {
            (Joint::RightShoulder, Joint::RightHip, Joint::RightAnkle)
        };
        offset_from_line(&f[shoulder], &f[ankle], &f[hip])
    }

    /// Vertical heel lift on the dominant side (toe below heel in image space)
    pub fn heel_lift(&self) -> f32 {
        let f = self.frame;
        let (heel, toe) = if self.left_side_dominant() {
            (Joint::LeftHeel, Joint::LeftFootIndex)
        } else {
            (Joint::RightHeel, Joint::RightFootIndex)
        };
        let lift = f[toe].y - f[heel].y;
        if lift.is_finite() {
            lift
        } else {
            0.0
        }
    }
}

/// Evaluate a rule's predicate against the current frame
pub fn is_triggered(rule: &ErrorRule, ctx: &FrameContext<'_>) -> bool {
    let t = rule.threshold;
    let f = ctx.frame;
    match rule.error_type {
        ErrorType::KneeValgus => ctx.knee_hip_ratio().map(|r| r < t).unwrap_or(false),
        ErrorType::PoorAlignment => {
            horizontal_distance(&f[Joint::LeftAnkle], &f[Joint::RightAnkle]) < t
        }
        ErrorType::FootLifted => {
            let dy = (f[Joint::LeftAnkle].y - f[Joint::RightAnkle].y).abs();
            dy.is_finite() && dy > t
        }
        ErrorType::SpinalRounding | ErrorType::ExcessiveForwardLean => ctx
            .angles
            .get(AngleKind::Spine)
            .map(|spine| spine < t)
            .unwrap_or(false),
        ErrorType::InsufficientDepth => {
            ctx.phase == RepetitionPhase::Ascending
                && ctx.rep_min_angle.map(|min| min > t).unwrap_or(false)
        }
        ErrorType::HipSag => body_line_below(ctx, t) && ctx.hip_line_offset() > 0.0,
        ErrorType::HipPike => body_line_below(ctx, t) && ctx.hip_line_offset() < 0.0,
        ErrorType::ElbowFlare => ctx.elbow_shoulder_ratio().map(|r| r > t).unwrap_or(false),
        ErrorType::ElbowDrift => ctx
            .resolve(AngleSelector::Bilateral(
                AngleKind::LeftShoulder,
                AngleKind::RightShoulder,
            ))
            .map(|a| a > t)
            .unwrap_or(false),
        ErrorType::KneeOverToe => knee_travel(ctx).map(|d| d > t).unwrap_or(false),
        ErrorType::AsymmetricMovement => match ctx.profile.tracked_angle {
            AngleSelector::Bilateral(left, right) => {
                match (ctx.angles.get(left), ctx.angles.get(right)) {
                    (Some(l), Some(r)) => symmetry(l, r) > t,
                    _ => false,
                }
            }
            AngleSelector::Single(_) => false,
        },
        ErrorType::HeelRise => ctx.heel_lift() > t,
        ErrorType::ButtWink => ctx
            .angles
            .get(AngleKind::Spine)
            .map(|spine| ctx.phase == RepetitionPhase::Bottom && (90.0 - spine) > t)
            .unwrap_or(false),
    }
}

fn body_line_below(ctx: &FrameContext<'_>, threshold: f32) -> bool {
    ctx.angles
        .get(AngleKind::BodyLine)
        .map(|line| line < threshold)
        .unwrap_or(false)
}

/// How far the knee of the more flexed (front) leg travels past its toes
///
/// Facing direction comes from the heel-to-toe vector; negative values mean
/// the knee is behind the toes.
fn knee_travel(ctx: &FrameContext<'_>) -> Option<f32> {
    let left = ctx.angles.get(AngleKind::LeftKnee);
    let right = ctx.angles.get(AngleKind::RightKnee);
    let use_left = match (left, right) {
        (Some(l), Some(r)) => l <= r,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => return None,
    };
    let (knee, heel, toe) = if use_left {
        (Joint::LeftKnee, Joint::LeftHeel, Joint::LeftFootIndex)
    } else {
        (Joint::RightKnee, Joint::RightHeel, Joint::RightFootIndex)
    };
    let f = ctx.frame;
    let facing = f[toe].x - f[heel].x;
    if facing.abs() <= f32::EPSILON || !facing.is_finite() {
        return None;
    }
    let travel = (f[knee].x - f[toe].x) * facing.signum();
    travel.is_finite().then_some(travel)
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
