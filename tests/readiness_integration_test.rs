//! Readiness gating through the public analyzer API
//!
//! These tests drive `PostureAnalyzer` with synthetic squat frames and check:
//! - Frames without a visible body never advance readiness
//! - Bad-frame hysteresis while getting ready
//! - A single lost frame does not end an exercising session
//! - Losing the body for too long ends the session and clears the rep count

use form_coach::analysis::{FrameAnalysisResult, RepetitionPhase};
use form_coach::fixtures::synthetic::{
    profile_view_frame, squat_angles, squat_knee_trace, FRAME_INTERVAL_MS,
};
use form_coach::{AppConfig, ExerciseType, PostureAnalyzer, ReadinessState};

fn squat_analyzer() -> PostureAnalyzer {
    PostureAnalyzer::with_exercise(ExerciseType::Squat, AppConfig::default())
        .expect("squat profile is registered")
}

/// Feeds knee angles on consecutive frames starting at `start_frame`
fn feed(
    analyzer: &mut PostureAnalyzer,
    start_frame: u64,
    knees: &[f32],
    visibility: f32,
) -> Vec<FrameAnalysisResult> {
    knees
        .iter()
        .enumerate()
        .map(|(i, knee)| {
            let ts = (start_frame + i as u64) * FRAME_INTERVAL_MS;
            analyzer.analyze(&profile_view_frame(ts, visibility), &squat_angles(*knee))
        })
        .collect()
}

#[test]
fn test_invisible_frames_stay_neutral() {
    let mut analyzer = squat_analyzer();
    let results = feed(&mut analyzer, 0, &[170.0; 40], 0.1);

    for result in &results {
        assert!(result.errors.is_empty());
        assert_eq!(result.phase, RepetitionPhase::Idle);
        assert_eq!(result.repetition_count, 0);
        assert_eq!(result.quality_score, 0);
        assert_eq!(result.readiness, ReadinessState::NotReady);
    }
    assert_eq!(
        analyzer.readiness_message(),
        "Step back so your whole body is visible"
    );
}

#[test]
fn test_single_bad_frame_keeps_getting_ready() {
    let mut analyzer = squat_analyzer();
    feed(&mut analyzer, 0, &[170.0; 7], 1.0);
    assert_eq!(analyzer.readiness_state(), ReadinessState::GettingReady);

    // Knees bent out of the starting range
    feed(&mut analyzer, 7, &[120.0], 1.0);
    assert_eq!(analyzer.readiness_state(), ReadinessState::GettingReady);
    let session = analyzer.session().unwrap();
    assert_eq!(session.readiness().confirm_count(), 7);
    assert_eq!(session.readiness().bad_count(), 1);

    // The eighth good frame still completes confirmation
    feed(&mut analyzer, 8, &[170.0], 1.0);
    assert_eq!(analyzer.readiness_state(), ReadinessState::ReadyToStart);
}

#[test]
fn test_exceeding_bad_frame_tolerance_resets() {
    let tolerance = AppConfig::default().readiness.bad_frame_tolerance as usize;
    let mut analyzer = squat_analyzer();
    feed(&mut analyzer, 0, &[170.0; 7], 1.0);

    feed(&mut analyzer, 7, &vec![120.0; tolerance], 1.0);
    assert_eq!(analyzer.readiness_state(), ReadinessState::GettingReady);

    feed(&mut analyzer, 7 + tolerance as u64, &[120.0], 1.0);
    assert_eq!(analyzer.readiness_state(), ReadinessState::NotReady);
    let readiness = analyzer.session().unwrap().readiness();
    assert_eq!(readiness.confirm_count(), 0);
    assert_eq!(readiness.bad_count(), 0);
}

#[test]
fn test_lost_frame_while_exercising_does_not_reset() {
    let mut analyzer = squat_analyzer();
    let mut knees = vec![170.0; 10];
    knees.push(161.0);
    feed(&mut analyzer, 0, &knees, 1.0);
    assert_eq!(analyzer.readiness_state(), ReadinessState::Exercising);

    let lost = feed(&mut analyzer, 11, &[152.0], 0.0);
    assert_eq!(
        lost[0],
        FrameAnalysisResult::neutral(ReadinessState::Exercising, 0)
    );
    assert_eq!(analyzer.readiness_state(), ReadinessState::Exercising);

    feed(&mut analyzer, 12, &[143.0], 1.0);
    assert_eq!(analyzer.readiness_state(), ReadinessState::Exercising);
}

#[test]
fn test_leaving_exercising_clears_repetitions() {
    let tolerance = AppConfig::default().readiness.exercising_exit_tolerance as usize;
    let mut analyzer = squat_analyzer();
    let knees = squat_knee_trace(1);
    let results = feed(&mut analyzer, 0, &knees, 1.0);
    assert_eq!(results.last().unwrap().repetition_count, 1);

    let start = knees.len() as u64;
    let lost = feed(&mut analyzer, start, &vec![170.0; tolerance], 0.0);
    assert_eq!(lost.last().unwrap().readiness, ReadinessState::Exercising);
    assert_eq!(lost.last().unwrap().repetition_count, 1);

    let exit = feed(&mut analyzer, start + tolerance as u64, &[170.0], 0.0);
    assert_eq!(
        exit[0],
        FrameAnalysisResult::neutral(ReadinessState::NotReady, 0)
    );
    assert_eq!(analyzer.readiness_state(), ReadinessState::NotReady);
    assert_eq!(analyzer.session_stats().unwrap().repetitions, 0);
}

#[test]
fn test_plank_enters_exercising_without_movement() {
    let mut analyzer =
        PostureAnalyzer::with_exercise(ExerciseType::Plank, AppConfig::default()).unwrap();
    let angles = form_coach::fixtures::synthetic::ideal_angles(ExerciseType::Plank);
    for i in 0..12u64 {
        let result = analyzer.analyze(&profile_view_frame(i * FRAME_INTERVAL_MS, 1.0), &angles);
        assert_ne!(result.readiness, ReadinessState::ReadyToStart);
    }
    assert_eq!(analyzer.readiness_state(), ReadinessState::Exercising);
    assert_eq!(analyzer.session_stats().unwrap().repetitions, 0);
}
