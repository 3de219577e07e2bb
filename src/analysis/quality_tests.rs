use super::*;
use crate::pose::{AngleKind, Joint, Landmark};
use crate::profile::{profile_for, ErrorType, ExerciseType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn error(error_type: ErrorType, severity: u8, confidence: f32) -> PostureError {
    PostureError {
        error_type,
        severity,
        confidence,
        affected_joints: vec![],
        description: String::new(),
        recommendation: String::new(),
        timestamp_ms: 0,
    }
}

fn input<'a>(
    errors: &'a [PostureError],
    angles: &'a AngleSet,
    poses: &'a RollingWindow<PoseFrame>,
    phase: RepetitionPhase,
    tracked_angle: Option<f32>,
    mode: DetectionMode,
) -> QualityInput<'a> {
    QualityInput {
        errors,
        angles,
        profile: profile_for(ExerciseType::Squat).unwrap(),
        phase,
        tracked_angle,
        recent_poses: poses,
        mode,
    }
}

fn scorer() -> QualityScorer {
    QualityScorer::new(QualityConfig::default())
}

#[test]
fn test_clean_frame_without_bonuses_scores_100() {
    let poses = RollingWindow::new(5);
    let angles = AngleSet::new();
    let score = scorer().score(&input(
        &[],
        &angles,
        &poses,
        RepetitionPhase::Top,
        None,
        DetectionMode::RuleBased,
    ));
    assert_eq!(score, 100);
}

#[test]
fn test_rule_penalty_tiers() {
    let poses = RollingWindow::new(5);
    let angles = AngleSet::new();
    let errors = [
        error(ErrorType::KneeValgus, 8, 1.0),
        error(ErrorType::PoorAlignment, 5, 1.0),
        error(ErrorType::InsufficientDepth, 4, 1.0),
    ];
    let score = scorer().score(&input(
        &errors,
        &angles,
        &poses,
        RepetitionPhase::Top,
        None,
        DetectionMode::RuleBased,
    ));
    assert_eq!(score, 100 - 20 - 10 - 5);
}

#[test]
fn test_scientific_penalty_scales_with_confidence() {
    let poses = RollingWindow::new(5);
    let angles = AngleSet::new();
    let errors = [error(ErrorType::KneeValgus, 8, 0.5)];
    let score = scorer().score(&input(
        &errors,
        &angles,
        &poses,
        RepetitionPhase::Top,
        None,
        DetectionMode::Scientific,
    ));
    // 25 * 0.8 * 0.5
    assert_eq!(score, 90);
}

#[test]
fn test_ideal_and_rom_bonuses_offset_penalties() {
    let poses = RollingWindow::new(5);
    let angles = AngleSet::new()
        .with(AngleKind::LeftKnee, 90.0)
        .with(AngleKind::RightKnee, 92.0)
        .with(AngleKind::Spine, 60.0);
    let errors = [error(ErrorType::KneeValgus, 8, 1.0)];
    let score = scorer().score(&input(
        &errors,
        &angles,
        &poses,
        RepetitionPhase::Bottom,
        Some(91.0),
        DetectionMode::RuleBased,
    ));
    // -20 penalty, +3 +3 +1 ideal, no ROM bonus above the 90 degree target
    assert_eq!(score, 87);

    let score = scorer().score(&input(
        &errors,
        &angles,
        &poses,
        RepetitionPhase::Bottom,
        Some(88.0),
        DetectionMode::RuleBased,
    ));
    assert_eq!(score, 92);
}

#[test]
fn test_stability_bonus_rewards_still_feet() {
    let still_frame = |ts: u64| {
        PoseFrame::empty(ts)
            .with(Joint::LeftAnkle, Landmark::visible(0.4, 0.9))
            .with(Joint::RightAnkle, Landmark::visible(0.6, 0.9))
    };
    let mut poses = RollingWindow::new(5);
    for i in 0..5 {
        poses.push(still_frame(i));
    }
    let errors = [error(ErrorType::KneeValgus, 8, 1.0)];
    let angles = AngleSet::new();
    let score = scorer().score(&input(
        &errors,
        &angles,
        &poses,
        RepetitionPhase::Top,
        None,
        DetectionMode::RuleBased,
    ));
    assert_eq!(score, 85);

    let mut shaky = RollingWindow::new(5);
    for i in 0..5 {
        let dx = if i % 2 == 0 { 0.0 } else { 0.05 };
        shaky.push(
            PoseFrame::empty(i)
                .with(Joint::LeftAnkle, Landmark::visible(0.4 + dx, 0.9))
                .with(Joint::RightAnkle, Landmark::visible(0.6 + dx, 0.9)),
        );
    }
    let score = scorer().score(&input(
        &errors,
        &angles,
        &shaky,
        RepetitionPhase::Top,
        None,
        DetectionMode::RuleBased,
    ));
    assert_eq!(score, 80);
}

#[test]
fn test_score_always_within_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let all_types = [
        ErrorType::KneeValgus,
        ErrorType::SpinalRounding,
        ErrorType::HipSag,
        ErrorType::PoorAlignment,
        ErrorType::InsufficientDepth,
    ];
    let mut poses = RollingWindow::new(5);

    for i in 0..500u64 {
        let errors: Vec<PostureError> = (0..rng.gen_range(0..8))
            .map(|_| {
                error(
                    all_types[rng.gen_range(0..all_types.len())],
                    rng.gen_range(1..=10),
                    rng.gen_range(0.0..=1.0),
                )
            })
            .collect();
        let mut angles = AngleSet::new();
        for kind in AngleKind::ALL {
            if rng.gen_bool(0.7) {
                angles.set(kind, rng.gen_range(-50.0..250.0));
            }
        }
        poses.push(PoseFrame::empty(i).with(
            Joint::LeftAnkle,
            Landmark::visible(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)),
        ));
        let mode = if rng.gen_bool(0.5) {
            DetectionMode::RuleBased
        } else {
            DetectionMode::Scientific
        };
        let phase = if rng.gen_bool(0.5) {
            RepetitionPhase::Bottom
        } else {
            RepetitionPhase::Descending
        };
        let tracked = Some(rng.gen_range(0.0..180.0));

        let score = scorer().score(&input(&errors, &angles, &poses, phase, tracked, mode));
        assert!(score <= 100);
    }
}

#[test]
fn test_history_is_bounded_and_averaged() {
    let mut scorer = scorer();
    for _ in 0..60 {
        scorer.record(80);
    }
    assert_eq!(scorer.history_len(), 50);
    assert_eq!(scorer.average(), Some(80.0));
}

#[test]
fn test_trend_compares_recent_slices() {
    let mut scorer = scorer();
    for _ in 0..15 {
        scorer.record(70);
    }
    assert_eq!(scorer.trend(), QualityTrend::Insufficient);

    for _ in 0..10 {
        scorer.record(90);
    }
    assert_eq!(scorer.trend(), QualityTrend::Improving);

    for _ in 0..10 {
        scorer.record(90);
    }
    assert_eq!(scorer.trend(), QualityTrend::Stable);

    for _ in 0..10 {
        scorer.record(60);
    }
    assert_eq!(scorer.trend(), QualityTrend::Declining);
}
