//! End-to-end repetition counting on synthetic squat traces
//!
//! Profile-view squats with full visibility; checks cycle ordering and that
//! frontal-only rules stay silent in profile view.

use form_coach::analysis::{FrameAnalysisResult, RepetitionPhase};
use form_coach::fixtures::synthetic::{
    profile_view_frame, squat_angles, squat_knee_trace, FRAME_INTERVAL_MS, STANDING_FRAMES,
};
use form_coach::{AppConfig, DetectionMode, ErrorType, ExerciseType, PostureAnalyzer};

fn run_knees(analyzer: &mut PostureAnalyzer, knees: &[f32]) -> Vec<FrameAnalysisResult> {
    knees
        .iter()
        .enumerate()
        .map(|(i, knee)| {
            let frame = profile_view_frame(i as u64 * FRAME_INTERVAL_MS, 1.0);
            analyzer.analyze(&frame, &squat_angles(*knee))
        })
        .collect()
}

fn squat_analyzer(mode: DetectionMode) -> PostureAnalyzer {
    let mut config = AppConfig::default();
    config.errors.mode = mode;
    PostureAnalyzer::with_exercise(ExerciseType::Squat, config).unwrap()
}

#[test]
fn test_profile_squat_counts_exactly_one_rep() {
    let mut analyzer = squat_analyzer(DetectionMode::RuleBased);
    let results = run_knees(&mut analyzer, &squat_knee_trace(1));

    let last = results.last().unwrap();
    assert_eq!(last.repetition_count, 1);
    assert_eq!(last.phase, RepetitionPhase::Top);

    // The count only changes once, on the way back up
    let first_counted = results
        .iter()
        .position(|r| r.repetition_count == 1)
        .unwrap();
    assert!(first_counted > STANDING_FRAMES + 10);
    assert!(results
        .iter()
        .flat_map(|r| &r.errors)
        .all(|e| e.error_type != ErrorType::KneeValgus));
}

#[test]
fn test_profile_squat_in_scientific_mode_has_no_valgus() {
    let mut analyzer = squat_analyzer(DetectionMode::Scientific);
    let results = run_knees(&mut analyzer, &squat_knee_trace(1));

    assert_eq!(results.last().unwrap().repetition_count, 1);
    assert!(results
        .iter()
        .flat_map(|r| &r.errors)
        .all(|e| e.error_type != ErrorType::KneeValgus));
}

#[test]
fn test_three_cycles_count_three_reps() {
    let mut analyzer = squat_analyzer(DetectionMode::RuleBased);
    let results = run_knees(&mut analyzer, &squat_knee_trace(3));

    assert_eq!(results.last().unwrap().repetition_count, 3);
    let stats = analyzer.session_stats().unwrap();
    assert_eq!(stats.repetitions, 3);
    assert!(stats.average_quality.is_some());
}

#[test]
fn test_shallow_oscillation_never_counts() {
    let mut analyzer = squat_analyzer(DetectionMode::RuleBased);
    let mut knees = vec![170.0; STANDING_FRAMES];
    for _ in 0..3 {
        // Dips to 120°, above the 100° bottom threshold
        knees.extend([161.0, 150.0, 140.0, 130.0, 120.0, 130.0, 140.0, 150.0, 160.0, 170.0]);
    }
    let results = run_knees(&mut analyzer, &knees);

    assert!(results
        .iter()
        .all(|r| r.phase != RepetitionPhase::Bottom));
    assert_eq!(results.last().unwrap().repetition_count, 0);
}

#[test]
fn test_hovering_at_the_bottom_counts_once() {
    let mut analyzer = squat_analyzer(DetectionMode::RuleBased);
    let mut knees = squat_knee_trace(0);
    knees.extend([161.0, 150.0, 140.0, 130.0, 120.0, 110.0, 100.0]);
    knees.extend([85.0; 12]);
    knees.extend([95.0, 110.0, 125.0, 140.0, 155.0, 165.0, 170.0, 170.0, 170.0]);
    let results = run_knees(&mut analyzer, &knees);

    assert_eq!(results.last().unwrap().repetition_count, 1);
}
