use super::*;
use crate::pose::Landmark;
use crate::profile::{profile_for, ExerciseType, RuleView};

fn rule(error_type: ErrorType, threshold: f32) -> ErrorRule {
    ErrorRule {
        error_type,
        threshold,
        severity: 5,
        message: String::new(),
        setup_message: String::new(),
        recommendation: String::new(),
        affected_joints: vec![],
        view: RuleView::Any,
    }
}

fn frontal(knee_spread: f32, ankle_spread: f32) -> PoseFrame {
    let c = 0.5;
    PoseFrame::empty(0)
        .with(Joint::LeftShoulder, Landmark::visible(c + 0.12, 0.3))
        .with(Joint::RightShoulder, Landmark::visible(c - 0.12, 0.3))
        .with(Joint::LeftHip, Landmark::visible(c + 0.1, 0.55))
        .with(Joint::RightHip, Landmark::visible(c - 0.1, 0.55))
        .with(Joint::LeftKnee, Landmark::visible(c + knee_spread / 2.0, 0.72))
        .with(Joint::RightKnee, Landmark::visible(c - knee_spread / 2.0, 0.72))
        .with(Joint::LeftAnkle, Landmark::visible(c + ankle_spread / 2.0, 0.9))
        .with(Joint::RightAnkle, Landmark::visible(c - ankle_spread / 2.0, 0.9))
}

fn check(
    rule: &ErrorRule,
    frame: &PoseFrame,
    angles: &AngleSet,
    exercise: ExerciseType,
    phase: RepetitionPhase,
    rep_min_angle: Option<f32>,
) -> bool {
    let profile = profile_for(exercise).unwrap();
    let ctx = FrameContext {
        frame,
        angles,
        profile,
        view: BodyView::Frontal,
        phase,
        tracked_angle: profile.tracked_angle.resolve(angles, frame, 0.1),
        rep_min_angle,
        preference_margin: 0.1,
    };
    is_triggered(rule, &ctx)
}

fn squat(rule: &ErrorRule, frame: &PoseFrame, angles: &AngleSet) -> bool {
    check(rule, frame, angles, ExerciseType::Squat, RepetitionPhase::Top, None)
}

#[test]
fn test_knee_valgus_ratio() {
    let r = rule(ErrorType::KneeValgus, 0.8);
    assert!(squat(&r, &frame_with_knees(0.1), &AngleSet::new()));
    assert!(!squat(&r, &frame_with_knees(0.2), &AngleSet::new()));
}

fn frame_with_knees(spread: f32) -> PoseFrame {
    frontal(spread, 0.25)
}

#[test]
fn test_knee_valgus_degenerate_hips_is_no_detection() {
    let r = rule(ErrorType::KneeValgus, 0.8);
    let frame = frontal(0.0, 0.25)
        .with(Joint::LeftHip, Landmark::visible(0.5, 0.55))
        .with(Joint::RightHip, Landmark::visible(0.5, 0.55));
    assert!(!squat(&r, &frame, &AngleSet::new()));
}

#[test]
fn test_poor_alignment_feet_together() {
    let r = rule(ErrorType::PoorAlignment, 0.15);
    assert!(squat(&r, &frontal(0.2, 0.08), &AngleSet::new()));
    assert!(!squat(&r, &frontal(0.2, 0.25), &AngleSet::new()));
}

#[test]
fn test_foot_lifted() {
    let r = rule(ErrorType::FootLifted, 0.05);
    let frame = frontal(0.2, 0.25).with(Joint::LeftAnkle, Landmark::visible(0.625, 0.82));
    assert!(squat(&r, &frame, &AngleSet::new()));
    assert!(!squat(&r, &frontal(0.2, 0.25), &AngleSet::new()));
}

#[test]
fn test_spine_rules_need_spine_angle() {
    let r = rule(ErrorType::SpinalRounding, 45.0);
    let frame = frontal(0.2, 0.25);
    assert!(!squat(&r, &frame, &AngleSet::new()));
    assert!(squat(&r, &frame, &AngleSet::new().with(AngleKind::Spine, 40.0)));
    assert!(!squat(&r, &frame, &AngleSet::new().with(AngleKind::Spine, 80.0)));
}

#[test]
fn test_insufficient_depth_only_on_the_way_up() {
    let r = rule(ErrorType::InsufficientDepth, 110.0);
    let frame = frontal(0.2, 0.25);
    let angles = AngleSet::new();
    let ascending = RepetitionPhase::Ascending;
    assert!(check(&r, &frame, &angles, ExerciseType::Squat, ascending, Some(125.0)));
    assert!(!check(&r, &frame, &angles, ExerciseType::Squat, ascending, Some(85.0)));
    assert!(!check(
        &r,
        &frame,
        &angles,
        ExerciseType::Squat,
        RepetitionPhase::Descending,
        Some(125.0)
    ));
}

fn plank_frame(hip_y: f32) -> PoseFrame {
    PoseFrame::empty(0)
        .with(Joint::LeftShoulder, Landmark::visible(0.2, 0.5))
        .with(Joint::LeftHip, Landmark::visible(0.5, hip_y))
        .with(Joint::LeftAnkle, Landmark::visible(0.8, 0.5))
}

#[test]
fn test_hip_sag_and_pike_split_on_offset() {
    let sag = rule(ErrorType::HipSag, 165.0);
    let pike = rule(ErrorType::HipPike, 165.0);
    let bent = AngleSet::new().with(AngleKind::BodyLine, 150.0);

    let sagging = plank_frame(0.6);
    assert!(check(&sag, &sagging, &bent, ExerciseType::PushUp, RepetitionPhase::Top, None));
    assert!(!check(&pike, &sagging, &bent, ExerciseType::PushUp, RepetitionPhase::Top, None));

    let piking = plank_frame(0.4);
    assert!(check(&pike, &piking, &bent, ExerciseType::PushUp, RepetitionPhase::Top, None));
    assert!(!check(&sag, &piking, &bent, ExerciseType::PushUp, RepetitionPhase::Top, None));

    let straight = AngleSet::new().with(AngleKind::BodyLine, 175.0);
    assert!(!check(&sag, &sagging, &straight, ExerciseType::PushUp, RepetitionPhase::Top, None));
}

#[test]
fn test_elbow_flare_ratio() {
    let r = rule(ErrorType::ElbowFlare, 1.8);
    let flared = frontal(0.2, 0.25)
        .with(Joint::LeftElbow, Landmark::visible(0.75, 0.4))
        .with(Joint::RightElbow, Landmark::visible(0.25, 0.4));
    let tucked = frontal(0.2, 0.25)
        .with(Joint::LeftElbow, Landmark::visible(0.64, 0.4))
        .with(Joint::RightElbow, Landmark::visible(0.36, 0.4));
    let angles = AngleSet::new();
    let top = RepetitionPhase::Top;
    assert!(check(&r, &flared, &angles, ExerciseType::PushUp, top, None));
    assert!(!check(&r, &tucked, &angles, ExerciseType::PushUp, top, None));
}

#[test]
fn test_asymmetry_uses_tracked_pair() {
    let r = rule(ErrorType::AsymmetricMovement, 15.0);
    let frame = frontal(0.2, 0.25);
    let uneven = AngleSet::new()
        .with(AngleKind::LeftElbow, 90.0)
        .with(AngleKind::RightElbow, 120.0);
    let even = AngleSet::new()
        .with(AngleKind::LeftElbow, 90.0)
        .with(AngleKind::RightElbow, 95.0);
    let top = RepetitionPhase::Top;
    assert!(check(&r, &frame, &uneven, ExerciseType::PushUp, top, None));
    assert!(!check(&r, &frame, &even, ExerciseType::PushUp, top, None));
    // Plank tracks a single angle; asymmetry never applies
    assert!(!check(&r, &frame, &uneven, ExerciseType::Plank, top, None));
}

#[test]
fn test_knee_over_toe_is_directional() {
    let r = rule(ErrorType::KneeOverToe, 0.06);
    let angles = AngleSet::new()
        .with(AngleKind::LeftKnee, 95.0)
        .with(AngleKind::RightKnee, 130.0);
    let base = PoseFrame::empty(0)
        .with(Joint::LeftHeel, Landmark::visible(0.50, 0.9))
        .with(Joint::LeftFootIndex, Landmark::visible(0.58, 0.9));

    let past = base.clone().with(Joint::LeftKnee, Landmark::visible(0.68, 0.7));
    let behind = base.with(Joint::LeftKnee, Landmark::visible(0.52, 0.7));
    let bottom = RepetitionPhase::Bottom;
    assert!(check(&r, &past, &angles, ExerciseType::Lunge, bottom, None));
    assert!(!check(&r, &behind, &angles, ExerciseType::Lunge, bottom, None));
}
