//! Deterministic synthetic pose traces.
//!
//! Builders produce frames with stick-figure geometry plus explicit angle
//! sets, so scenarios can be replayed without a camera or estimator. Jitter
//! is drawn from a seeded `StdRng` and therefore identical on every run.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{PoseTrace, TraceExpectations, TraceFrame};
use crate::analysis::RepetitionPhase;
use crate::config::DetectionMode;
use crate::pose::{AngleKind, AngleSet, Joint, Landmark, PoseFrame};
use crate::profile::{profile_for, ErrorType, ExerciseType};

/// ~30 fps capture cadence
pub const FRAME_INTERVAL_MS: u64 = 33;

/// Standing frames before the first repetition
pub const STANDING_FRAMES: usize = 10;

/// Knee angle while standing
pub const STANDING_KNEE: f32 = 170.0;

/// Deepest knee angle of a synthetic repetition
pub const BOTTOM_KNEE: f32 = 80.0;

/// Frames per synthetic repetition (half down, half up)
pub const CYCLE_FRAMES: usize = 20;

const UPRIGHT_SPINE: f32 = 85.0;
const DEFAULT_LATENCY_MS: f32 = 12.0;

/// Side-on standing figure; paired joints sit 0.01 apart horizontally
pub fn profile_view_frame(timestamp_ms: u64, visibility: f32) -> PoseFrame {
    use Joint::*;
    let layout: [(Joint, f32, f32); 33] = [
        (Nose, 0.53, 0.14),
        (LeftEyeInner, 0.525, 0.13),
        (LeftEye, 0.52, 0.13),
        (LeftEyeOuter, 0.515, 0.13),
        (RightEyeInner, 0.535, 0.13),
        (RightEye, 0.53, 0.13),
        (RightEyeOuter, 0.525, 0.13),
        (LeftEar, 0.50, 0.14),
        (RightEar, 0.51, 0.14),
        (MouthLeft, 0.525, 0.16),
        (MouthRight, 0.535, 0.16),
        (LeftShoulder, 0.495, 0.30),
        (RightShoulder, 0.505, 0.30),
        (LeftElbow, 0.495, 0.42),
        (RightElbow, 0.505, 0.42),
        (LeftWrist, 0.515, 0.52),
        (RightWrist, 0.525, 0.52),
        (LeftPinky, 0.515, 0.54),
        (RightPinky, 0.525, 0.54),
        (LeftIndex, 0.52, 0.54),
        (RightIndex, 0.53, 0.54),
        (LeftThumb, 0.52, 0.53),
        (RightThumb, 0.53, 0.53),
        (LeftHip, 0.495, 0.55),
        (RightHip, 0.505, 0.55),
        (LeftKnee, 0.525, 0.72),
        (RightKnee, 0.535, 0.72),
        (LeftAnkle, 0.495, 0.88),
        (RightAnkle, 0.505, 0.88),
        (LeftHeel, 0.475, 0.90),
        (RightHeel, 0.485, 0.90),
        (LeftFootIndex, 0.555, 0.90),
        (RightFootIndex, 0.565, 0.90),
    ];
    build_frame(timestamp_ms, &layout, visibility)
}

/// Front-facing standing figure
///
/// Knees stay at hip width; only the ankle/heel/toe spread varies.
pub fn frontal_frame(timestamp_ms: u64, ankle_spread: f32, visibility: f32) -> PoseFrame {
    use Joint::*;
    let half = ankle_spread / 2.0;
    let layout: [(Joint, f32, f32); 33] = [
        (Nose, 0.50, 0.12),
        (LeftEyeInner, 0.51, 0.11),
        (LeftEye, 0.515, 0.11),
        (LeftEyeOuter, 0.52, 0.11),
        (RightEyeInner, 0.49, 0.11),
        (RightEye, 0.485, 0.11),
        (RightEyeOuter, 0.48, 0.11),
        (LeftEar, 0.53, 0.12),
        (RightEar, 0.47, 0.12),
        (MouthLeft, 0.51, 0.14),
        (MouthRight, 0.49, 0.14),
        (LeftShoulder, 0.62, 0.28),
        (RightShoulder, 0.38, 0.28),
        (LeftElbow, 0.65, 0.40),
        (RightElbow, 0.35, 0.40),
        (LeftWrist, 0.66, 0.51),
        (RightWrist, 0.34, 0.51),
        (LeftPinky, 0.665, 0.53),
        (RightPinky, 0.335, 0.53),
        (LeftIndex, 0.66, 0.535),
        (RightIndex, 0.34, 0.535),
        (LeftThumb, 0.655, 0.525),
        (RightThumb, 0.345, 0.525),
        (LeftHip, 0.58, 0.55),
        (RightHip, 0.42, 0.55),
        (LeftKnee, 0.58, 0.72),
        (RightKnee, 0.42, 0.72),
        (LeftAnkle, 0.50 + half, 0.88),
        (RightAnkle, 0.50 - half, 0.88),
        (LeftHeel, 0.50 + half, 0.90),
        (RightHeel, 0.50 - half, 0.90),
        (LeftFootIndex, 0.51 + half, 0.92),
        (RightFootIndex, 0.49 - half, 0.92),
    ];
    build_frame(timestamp_ms, &layout, visibility)
}

fn build_frame(timestamp_ms: u64, layout: &[(Joint, f32, f32)], visibility: f32) -> PoseFrame {
    let mut frame = PoseFrame::empty(timestamp_ms);
    for (joint, x, y) in layout {
        frame.set(*joint, Landmark::new(*x, *y, 0.0, visibility));
    }
    frame
}

/// Lower-body angles for a squat at `knee` degrees with an upright torso
pub fn squat_angles(knee: f32) -> AngleSet {
    AngleSet::new()
        .with(AngleKind::LeftKnee, knee)
        .with(AngleKind::RightKnee, knee)
        .with(AngleKind::LeftHip, knee)
        .with(AngleKind::RightHip, knee)
        .with(AngleKind::Spine, UPRIGHT_SPINE)
}

/// Every profile threshold held at its ideal value
pub fn ideal_angles(exercise: ExerciseType) -> AngleSet {
    let mut angles = AngleSet::new();
    if let Ok(profile) = profile_for(exercise) {
        for (kind, threshold) in &profile.thresholds {
            angles.set(*kind, threshold.ideal);
        }
    }
    angles
}

/// Standing frames followed by `reps` linear 170° → 80° → 170° cycles
///
/// One cycle steps 9° per frame, reaching the bottom on its tenth frame and
/// the top again on its twentieth.
pub fn squat_knee_trace(reps: usize) -> Vec<f32> {
    let half = CYCLE_FRAMES / 2;
    let step = (STANDING_KNEE - BOTTOM_KNEE) / half as f32;

    let mut knees = vec![STANDING_KNEE; STANDING_FRAMES];
    for _ in 0..reps {
        for i in 1..=CYCLE_FRAMES {
            let knee = if i <= half {
                STANDING_KNEE - step * i as f32
            } else {
                BOTTOM_KNEE + step * (i - half) as f32
            };
            knees.push(knee);
        }
    }
    knees
}

/// Perturb every landmark position by up to `amplitude` in x and y
pub fn jitter(frame: &mut PoseFrame, rng: &mut StdRng, amplitude: f32) {
    if amplitude <= 0.0 {
        return;
    }
    for joint in Joint::ALL {
        let mut landmark = frame[joint];
        landmark.x += rng.gen_range(-amplitude..amplitude);
        landmark.y += rng.gen_range(-amplitude..amplitude);
        frame.set(joint, landmark);
    }
}

/// Declarative synthetic scenario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntheticScenario {
    /// Profile-view squats with upright torso
    SquatCycles { reps: usize },
    /// Frontal-view squats with the feet closer than the stance minimum
    FeetTogether { ankle_spread: f32, reps: usize },
    /// Motionless hold at every threshold's ideal angle
    IdealHold { exercise: ExerciseType, frames: usize },
}

/// Named scenario plus optional landmark jitter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticSpec {
    pub id: String,
    pub scenario: SyntheticScenario,
    #[serde(default)]
    pub jitter: f32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub mode: Option<DetectionMode>,
}

fn default_seed() -> u64 {
    0x5EED_F0C0
}

impl SyntheticSpec {
    pub fn new(id: &str, scenario: SyntheticScenario) -> Self {
        Self {
            id: id.to_string(),
            scenario,
            jitter: 0.0,
            seed: default_seed(),
            mode: None,
        }
    }

    pub fn with_jitter(mut self, amplitude: f32, seed: u64) -> Self {
        self.jitter = amplitude.max(0.0);
        self.seed = seed;
        self
    }

    /// Generate the trace, with expectations matching the scenario
    pub fn build(&self) -> PoseTrace {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let (exercise, frames, expectations) = match &self.scenario {
            SyntheticScenario::SquatCycles { reps } => {
                let frames = squat_knee_trace(*reps)
                    .into_iter()
                    .enumerate()
                    .map(|(i, knee)| {
                        let ts = i as u64 * FRAME_INTERVAL_MS;
                        (profile_view_frame(ts, 1.0), squat_angles(knee))
                    })
                    .collect::<Vec<_>>();
                let expectations = TraceExpectations {
                    repetitions: Some(*reps as u32),
                    final_phase: (*reps > 0).then_some(RepetitionPhase::Top),
                    required_errors: Vec::new(),
                    forbidden_errors: vec![ErrorType::KneeValgus],
                };
                (ExerciseType::Squat, frames, expectations)
            }
            SyntheticScenario::FeetTogether { ankle_spread, reps } => {
                let frames = squat_knee_trace(*reps)
                    .into_iter()
                    .enumerate()
                    .map(|(i, knee)| {
                        let ts = i as u64 * FRAME_INTERVAL_MS;
                        (frontal_frame(ts, *ankle_spread, 1.0), squat_angles(knee))
                    })
                    .collect::<Vec<_>>();
                let expectations = TraceExpectations {
                    repetitions: None,
                    final_phase: None,
                    required_errors: vec![ErrorType::PoorAlignment],
                    forbidden_errors: Vec::new(),
                };
                (ExerciseType::Squat, frames, expectations)
            }
            SyntheticScenario::IdealHold { exercise, frames } => {
                let angles = ideal_angles(*exercise);
                let frames = (0..*frames)
                    .map(|i| {
                        let ts = i as u64 * FRAME_INTERVAL_MS;
                        (profile_view_frame(ts, 1.0), angles)
                    })
                    .collect::<Vec<_>>();
                let expectations = TraceExpectations {
                    repetitions: Some(0),
                    ..TraceExpectations::default()
                };
                (*exercise, frames, expectations)
            }
        };

        let frames = frames
            .into_iter()
            .map(|(mut frame, angles)| {
                jitter(&mut frame, &mut rng, self.jitter);
                TraceFrame {
                    frame,
                    angles: Some(angles),
                    latency_ms: Some(DEFAULT_LATENCY_MS),
                }
            })
            .collect();

        PoseTrace {
            name: self.id.clone(),
            exercise,
            mode: self.mode,
            frames,
            expectations: Some(expectations),
        }
    }
}

/// Scenarios shipped with the CLI
pub fn builtin_specs() -> Vec<SyntheticSpec> {
    vec![
        SyntheticSpec::new("squat_profile_single", SyntheticScenario::SquatCycles { reps: 1 }),
        SyntheticSpec::new("squat_profile_triple", SyntheticScenario::SquatCycles { reps: 3 }),
        SyntheticSpec::new(
            "squat_frontal_feet_together",
            SyntheticScenario::FeetTogether {
                ankle_spread: 0.08,
                reps: 1,
            },
        ),
        SyntheticSpec::new(
            "squat_ideal_hold",
            SyntheticScenario::IdealHold {
                exercise: ExerciseType::Squat,
                frames: 40,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::pose::{BodyView, ViewClassifier};

    #[test]
    fn test_knee_trace_shape() {
        let knees = squat_knee_trace(1);
        assert_eq!(knees.len(), STANDING_FRAMES + CYCLE_FRAMES);
        assert_eq!(knees[STANDING_FRAMES], 161.0);
        assert_eq!(knees[STANDING_FRAMES + 9], BOTTOM_KNEE);
        assert_eq!(*knees.last().unwrap(), STANDING_KNEE);
    }

    #[test]
    fn test_frames_classify_as_intended_view() {
        let classifier = ViewClassifier::new(&ViewConfig::default(), 0.5);
        assert_eq!(classifier.classify(&profile_view_frame(0, 1.0)), BodyView::Profile);
        assert_eq!(classifier.classify(&frontal_frame(0, 0.08, 1.0)), BodyView::Frontal);
        assert_eq!(classifier.classify(&frontal_frame(0, 0.3, 1.0)), BodyView::Frontal);
    }

    #[test]
    fn test_jitter_is_deterministic() {
        let spec = SyntheticSpec::new("j", SyntheticScenario::SquatCycles { reps: 1 })
            .with_jitter(0.01, 7);
        let a = spec.build();
        let b = spec.build();
        assert_eq!(a.frames[3].frame, b.frames[3].frame);
        assert_ne!(a.frames[3].frame, profile_view_frame(3 * FRAME_INTERVAL_MS, 1.0));
    }

    #[test]
    fn test_builtin_specs_have_frames() {
        for spec in builtin_specs() {
            let trace = spec.build();
            assert!(!trace.frames.is_empty(), "{} is empty", spec.id);
            assert!(trace.expectations.is_some());
        }
    }
}
