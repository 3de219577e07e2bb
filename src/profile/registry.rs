//! Exercise profile registry
//!
//! Profiles are built once on first access and shared read-only for the
//! life of the process. Rule order is priority order: the error engine
//! evaluates only the leading rules for the current view each frame.

use once_cell::sync::Lazy;

use super::{
    AngleRequirement, AngleSelector, AngleThreshold, DetectorFamily, ErrorRule, ErrorType,
    ExerciseProfile, ExerciseType, PhaseModel, RuleView, StartingPosition,
};
use crate::error::SessionError;
use crate::pose::{AngleKind, Joint};

static PROFILES: Lazy<Vec<ExerciseProfile>> = Lazy::new(|| {
    vec![
        squat(),
        push_up(),
        lunge(),
        plank(),
        bicep_curl(),
        deadlift(),
        bench_press(),
        shoulder_press(),
    ]
});

/// Every registered profile, in ExerciseType order
pub fn all_profiles() -> &'static [ExerciseProfile] {
    &PROFILES
}

/// Look up the profile for an exercise
///
/// # Returns
/// * `Ok(&ExerciseProfile)` - Registered profile
/// * `Err(SessionError::MissingProfile)` - No profile registered
pub fn profile_for(exercise: ExerciseType) -> Result<&'static ExerciseProfile, SessionError> {
    PROFILES
        .iter()
        .find(|p| p.exercise == exercise)
        .ok_or(SessionError::MissingProfile { exercise })
}

const KNEES: AngleSelector = AngleSelector::Bilateral(AngleKind::LeftKnee, AngleKind::RightKnee);
const HIPS: AngleSelector = AngleSelector::Bilateral(AngleKind::LeftHip, AngleKind::RightHip);
const ELBOWS: AngleSelector =
    AngleSelector::Bilateral(AngleKind::LeftElbow, AngleKind::RightElbow);
const SPINE: AngleSelector = AngleSelector::Single(AngleKind::Spine);
const BODY_LINE: AngleSelector = AngleSelector::Single(AngleKind::BodyLine);

fn threshold(min: f32, max: f32, ideal: f32, critical: f32, warning: Option<f32>) -> AngleThreshold {
    AngleThreshold {
        min,
        max,
        ideal,
        critical,
        warning,
    }
}

#[allow(clippy::too_many_arguments)]
fn rule(
    error_type: ErrorType,
    threshold: f32,
    severity: u8,
    view: RuleView,
    affected_joints: &[Joint],
    message: &str,
    setup_message: &str,
    recommendation: &str,
) -> ErrorRule {
    ErrorRule {
        error_type,
        threshold,
        severity,
        message: message.to_string(),
        setup_message: setup_message.to_string(),
        recommendation: recommendation.to_string(),
        affected_joints: affected_joints.to_vec(),
        view,
    }
}

fn bilateral(kinds: [AngleKind; 2], t: AngleThreshold) -> [(AngleKind, AngleThreshold); 2] {
    [(kinds[0], t), (kinds[1], t)]
}

const LOWER_BODY: [Joint; 6] = [
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

const UPPER_BODY: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftWrist,
    Joint::RightWrist,
];

fn squat() -> ExerciseProfile {
    let mut thresholds = Vec::new();
    thresholds.extend(bilateral(
        [AngleKind::LeftKnee, AngleKind::RightKnee],
        threshold(60.0, 180.0, 90.0, 45.0, Some(110.0)),
    ));
    thresholds.extend(bilateral(
        [AngleKind::LeftHip, AngleKind::RightHip],
        threshold(50.0, 180.0, 90.0, 40.0, None),
    ));
    thresholds.push((AngleKind::Spine, threshold(45.0, 90.0, 75.0, 35.0, Some(55.0))));

    ExerciseProfile {
        exercise: ExerciseType::Squat,
        display_name: "Squat".to_string(),
        key_joints: LOWER_BODY.to_vec(),
        thresholds,
        rules: vec![
            rule(
                ErrorType::KneeValgus,
                0.8,
                8,
                RuleView::Frontal,
                &[Joint::LeftKnee, Joint::RightKnee, Joint::LeftHip, Joint::RightHip],
                "Knees are collapsing inward",
                "Keep your knees over your toes",
                "Push your knees out in line with your feet throughout the rep",
            ),
            rule(
                ErrorType::PoorAlignment,
                0.15,
                5,
                RuleView::Frontal,
                &[Joint::LeftAnkle, Joint::RightAnkle],
                "Feet are too close together",
                "Step your feet out to about shoulder width",
                "Set your feet shoulder-width apart with toes slightly turned out",
            ),
            rule(
                ErrorType::FootLifted,
                0.05,
                6,
                RuleView::Frontal,
                &[Joint::LeftAnkle, Joint::RightAnkle],
                "One foot is lifting off the floor",
                "Plant both feet flat",
                "Keep your weight evenly spread across both feet",
            ),
            rule(
                ErrorType::SpinalRounding,
                45.0,
                8,
                RuleView::Profile,
                &[Joint::LeftShoulder, Joint::RightShoulder, Joint::LeftHip, Joint::RightHip],
                "Back is rounding forward",
                "Stand tall with your chest up",
                "Brace your core and keep your chest up as you descend",
            ),
            rule(
                ErrorType::InsufficientDepth,
                110.0,
                4,
                RuleView::Profile,
                &[Joint::LeftHip, Joint::RightHip, Joint::LeftKnee, Joint::RightKnee],
                "Squat is not deep enough",
                "Aim to sit back further on the next rep",
                "Lower until your thighs are at least parallel to the floor",
            ),
            rule(
                ErrorType::ExcessiveForwardLean,
                55.0,
                5,
                RuleView::Profile,
                &[Joint::LeftShoulder, Joint::RightShoulder, Joint::LeftHip, Joint::RightHip],
                "Leaning too far forward",
                "Keep your torso upright",
                "Sit your hips back and down rather than folding forward",
            ),
        ],
        phase_model: PhaseModel::SingleAngle {
            selector: KNEES,
            top: 145.0,
            bottom: 100.0,
        },
        tracked_angle: KNEES,
        starting_position: StartingPosition {
            requirements: vec![
                AngleRequirement::new(KNEES, 160.0, 180.0),
                AngleRequirement::new(SPINE, 70.0, 90.0),
            ],
            required_joints: LOWER_BODY.to_vec(),
            requires_movement: true,
        },
        motion_range: vec![AngleRequirement::new(KNEES, 30.0, 180.0)],
        rom_target: Some(90.0),
        stabilizing_joints: vec![
            Joint::LeftAnkle,
            Joint::RightAnkle,
            Joint::LeftHeel,
            Joint::RightHeel,
        ],
        detectors: vec![
            DetectorFamily::KneeValgus,
            DetectorFamily::HeelRise,
            DetectorFamily::ButtWink,
            DetectorFamily::TrunkLean,
        ],
        setup_hint: "stand tall with feet shoulder-width apart".to_string(),
        rationale: "Knee flexion drives the cycle; frontal-plane knee tracking and trunk \
                    inclination carry most of the injury risk under load."
            .to_string(),
    }
}

fn push_up() -> ExerciseProfile {
    let mut thresholds = Vec::new();
    thresholds.extend(bilateral(
        [AngleKind::LeftElbow, AngleKind::RightElbow],
        threshold(70.0, 180.0, 90.0, 60.0, None),
    ));
    thresholds.push((AngleKind::BodyLine, threshold(160.0, 180.0, 175.0, 150.0, Some(165.0))));

    ExerciseProfile {
        exercise: ExerciseType::PushUp,
        display_name: "Push-up".to_string(),
        key_joints: vec![
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftElbow,
            Joint::RightElbow,
            Joint::LeftWrist,
            Joint::RightWrist,
            Joint::LeftHip,
            Joint::RightHip,
            Joint::LeftAnkle,
            Joint::RightAnkle,
        ],
        thresholds,
        rules: vec![
            rule(
                ErrorType::HipSag,
                165.0,
                7,
                RuleView::Profile,
                &[Joint::LeftHip, Joint::RightHip],
                "Hips are sagging",
                "Lift your hips into a straight line",
                "Squeeze your glutes and brace your core to keep a straight body line",
            ),
            rule(
                ErrorType::HipPike,
                165.0,
                5,
                RuleView::Profile,
                &[Joint::LeftHip, Joint::RightHip],
                "Hips are piking up",
                "Lower your hips in line with your shoulders",
                "Keep shoulders, hips, and ankles in one line",
            ),
            rule(
                ErrorType::ElbowFlare,
                1.8,
                6,
                RuleView::Frontal,
                &[Joint::LeftElbow, Joint::RightElbow, Joint::LeftShoulder, Joint::RightShoulder],
                "Elbows are flaring out",
                "Tuck your elbows slightly",
                "Keep your elbows at roughly 45 degrees from your torso",
            ),
            rule(
                ErrorType::AsymmetricMovement,
                15.0,
                4,
                RuleView::Frontal,
                &[Joint::LeftElbow, Joint::RightElbow],
                "One arm is bending more than the other",
                "Place your hands evenly",
                "Lower both sides at the same speed",
            ),
        ],
        phase_model: PhaseModel::SingleAngle {
            selector: ELBOWS,
            top: 150.0,
            bottom: 100.0,
        },
        tracked_angle: ELBOWS,
        starting_position: StartingPosition {
            requirements: vec![
                AngleRequirement::new(ELBOWS, 150.0, 180.0),
                AngleRequirement::new(BODY_LINE, 150.0, 180.0),
            ],
            required_joints: vec![
                Joint::LeftShoulder,
                Joint::RightShoulder,
                Joint::LeftWrist,
                Joint::RightWrist,
                Joint::LeftHip,
                Joint::RightHip,
                Joint::LeftAnkle,
                Joint::RightAnkle,
            ],
            requires_movement: true,
        },
        motion_range: vec![
            AngleRequirement::new(ELBOWS, 30.0, 180.0),
            AngleRequirement::new(SPINE, 0.0, 50.0),
        ],
        rom_target: Some(90.0),
        stabilizing_joints: vec![
            Joint::LeftWrist,
            Joint::RightWrist,
            Joint::LeftAnkle,
            Joint::RightAnkle,
        ],
        detectors: vec![DetectorFamily::HipSag, DetectorFamily::ElbowFlare],
        setup_hint: "get into a high plank with arms straight".to_string(),
        rationale: "Elbow flexion drives the cycle; the shoulder-hip-ankle line shows core \
                    collapse before the user feels it."
            .to_string(),
    }
}

fn lunge() -> ExerciseProfile {
    let mut thresholds = Vec::new();
    thresholds.extend(bilateral(
        [AngleKind::LeftKnee, AngleKind::RightKnee],
        threshold(70.0, 180.0, 90.0, 60.0, None),
    ));
    thresholds.push((AngleKind::Spine, threshold(70.0, 90.0, 85.0, 60.0, None)));

    ExerciseProfile {
        exercise: ExerciseType::Lunge,
        display_name: "Lunge".to_string(),
        key_joints: LOWER_BODY.to_vec(),
        thresholds,
        rules: vec![
            rule(
                ErrorType::KneeValgus,
                0.7,
                7,
                RuleView::Frontal,
                &[Joint::LeftKnee, Joint::RightKnee, Joint::LeftHip, Joint::RightHip],
                "Front knee is caving inward",
                "Line your front knee up with your foot",
                "Track the front knee over the second toe",
            ),
            rule(
                ErrorType::KneeOverToe,
                0.06,
                6,
                RuleView::Profile,
                &[Joint::LeftKnee, Joint::RightKnee, Joint::LeftFootIndex, Joint::RightFootIndex],
                "Front knee is travelling past your toes",
                "Take a slightly longer stance",
                "Lengthen your stride so the shin stays close to vertical",
            ),
            rule(
                ErrorType::ExcessiveForwardLean,
                65.0,
                5,
                RuleView::Profile,
                &[Joint::LeftShoulder, Joint::RightShoulder, Joint::LeftHip, Joint::RightHip],
                "Torso is tipping forward",
                "Stand tall before stepping",
                "Keep your torso upright and drop the back knee straight down",
            ),
        ],
        phase_model: PhaseModel::SingleAngle {
            selector: KNEES,
            top: 150.0,
            bottom: 105.0,
        },
        tracked_angle: KNEES,
        starting_position: StartingPosition {
            requirements: vec![
                AngleRequirement::new(KNEES, 155.0, 180.0),
                AngleRequirement::new(SPINE, 70.0, 90.0),
            ],
            required_joints: LOWER_BODY.to_vec(),
            requires_movement: true,
        },
        motion_range: vec![AngleRequirement::new(KNEES, 40.0, 180.0)],
        rom_target: Some(95.0),
        stabilizing_joints: vec![Joint::LeftAnkle, Joint::RightAnkle],
        detectors: vec![DetectorFamily::KneeValgus, DetectorFamily::TrunkLean],
        setup_hint: "stand tall with feet hip-width apart".to_string(),
        rationale: "Single-leg loading exposes frontal-plane knee control; trunk lean shifts \
                    load off the working hip."
            .to_string(),
    }
}

fn plank() -> ExerciseProfile {
    ExerciseProfile {
        exercise: ExerciseType::Plank,
        display_name: "Plank".to_string(),
        key_joints: vec![
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftHip,
            Joint::RightHip,
            Joint::LeftAnkle,
            Joint::RightAnkle,
        ],
        thresholds: vec![
            (AngleKind::BodyLine, threshold(160.0, 180.0, 175.0, 150.0, Some(165.0))),
            (AngleKind::Spine, threshold(0.0, 30.0, 10.0, 45.0, None)),
        ],
        rules: vec![
            rule(
                ErrorType::HipSag,
                160.0,
                7,
                RuleView::Profile,
                &[Joint::LeftHip, Joint::RightHip],
                "Hips are dropping",
                "Lift your hips level with your shoulders",
                "Tuck your pelvis and squeeze your glutes",
            ),
            rule(
                ErrorType::HipPike,
                160.0,
                5,
                RuleView::Profile,
                &[Joint::LeftHip, Joint::RightHip],
                "Hips are too high",
                "Lower your hips into a straight line",
                "Hold a straight line from shoulders to ankles",
            ),
        ],
        phase_model: PhaseModel::StaticHold,
        tracked_angle: BODY_LINE,
        starting_position: StartingPosition {
            requirements: vec![
                AngleRequirement::new(BODY_LINE, 150.0, 180.0),
                AngleRequirement::new(SPINE, 0.0, 40.0),
            ],
            required_joints: vec![
                Joint::LeftShoulder,
                Joint::RightShoulder,
                Joint::LeftHip,
                Joint::RightHip,
                Joint::LeftAnkle,
                Joint::RightAnkle,
            ],
            requires_movement: false,
        },
        motion_range: vec![
            AngleRequirement::new(BODY_LINE, 120.0, 180.0),
            AngleRequirement::new(SPINE, 0.0, 45.0),
        ],
        rom_target: None,
        stabilizing_joints: vec![
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftHip,
            Joint::RightHip,
        ],
        detectors: vec![DetectorFamily::HipSag],
        setup_hint: "get onto your forearms and toes with a straight body".to_string(),
        rationale: "An isometric hold; the only signal is how well the body line is held."
            .to_string(),
    }
}

fn bicep_curl() -> ExerciseProfile {
    let mut thresholds = Vec::new();
    thresholds.extend(bilateral(
        [AngleKind::LeftElbow, AngleKind::RightElbow],
        threshold(30.0, 180.0, 45.0, 20.0, None),
    ));
    thresholds.extend(bilateral(
        [AngleKind::LeftShoulder, AngleKind::RightShoulder],
        threshold(0.0, 30.0, 10.0, 45.0, Some(25.0)),
    ));
    thresholds.push((AngleKind::Spine, threshold(75.0, 90.0, 88.0, 65.0, None)));

    ExerciseProfile {
        exercise: ExerciseType::BicepCurl,
        display_name: "Bicep curl".to_string(),
        key_joints: UPPER_BODY.to_vec(),
        thresholds,
        rules: vec![
            rule(
                ErrorType::ElbowDrift,
                30.0,
                5,
                RuleView::Profile,
                &[Joint::LeftElbow, Joint::RightElbow, Joint::LeftShoulder, Joint::RightShoulder],
                "Elbows are drifting forward",
                "Pin your elbows to your sides",
                "Keep your upper arms still and let only the forearm move",
            ),
            rule(
                ErrorType::ExcessiveForwardLean,
                75.0,
                4,
                RuleView::Profile,
                &[Joint::LeftShoulder, Joint::RightShoulder, Joint::LeftHip, Joint::RightHip],
                "Swinging the torso to lift the weight",
                "Stand tall before you curl",
                "Reduce the weight and keep your torso still",
            ),
            rule(
                ErrorType::AsymmetricMovement,
                20.0,
                4,
                RuleView::Frontal,
                &[Joint::LeftElbow, Joint::RightElbow],
                "Arms are moving unevenly",
                "Start with both arms straight",
                "Curl both arms at the same tempo",
            ),
        ],
        phase_model: PhaseModel::SingleAngle {
            selector: ELBOWS,
            top: 150.0,
            bottom: 70.0,
        },
        tracked_angle: ELBOWS,
        starting_position: StartingPosition {
            requirements: vec![
                AngleRequirement::new(ELBOWS, 150.0, 180.0),
                AngleRequirement::new(SPINE, 75.0, 90.0),
            ],
            required_joints: UPPER_BODY.to_vec(),
            requires_movement: true,
        },
        motion_range: vec![AngleRequirement::new(ELBOWS, 20.0, 180.0)],
        rom_target: Some(50.0),
        stabilizing_joints: vec![Joint::LeftShoulder, Joint::RightShoulder],
        detectors: vec![DetectorFamily::ElbowDrift, DetectorFamily::TrunkLean],
        setup_hint: "stand tall with arms straight at your sides".to_string(),
        rationale: "Elbow flexion drives the cycle; upper-arm and trunk motion indicate \
                    momentum replacing bicep work."
            .to_string(),
    }
}

fn deadlift() -> ExerciseProfile {
    let mut thresholds = Vec::new();
    thresholds.extend(bilateral(
        [AngleKind::LeftHip, AngleKind::RightHip],
        threshold(70.0, 180.0, 100.0, 60.0, None),
    ));
    thresholds.extend(bilateral(
        [AngleKind::LeftKnee, AngleKind::RightKnee],
        threshold(110.0, 180.0, 140.0, 90.0, None),
    ));
    thresholds.push((AngleKind::Spine, threshold(25.0, 90.0, 45.0, 15.0, Some(25.0))));

    ExerciseProfile {
        exercise: ExerciseType::Deadlift,
        display_name: "Deadlift".to_string(),
        key_joints: vec![
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftHip,
            Joint::RightHip,
            Joint::LeftKnee,
            Joint::RightKnee,
            Joint::LeftAnkle,
            Joint::RightAnkle,
        ],
        thresholds,
        rules: vec![
            rule(
                ErrorType::SpinalRounding,
                20.0,
                9,
                RuleView::Profile,
                &[Joint::LeftShoulder, Joint::RightShoulder, Joint::LeftHip, Joint::RightHip],
                "Back is rounding under load",
                "Set a flat back before lifting",
                "Hinge at the hips and keep a neutral spine",
            ),
            rule(
                ErrorType::KneeValgus,
                0.8,
                7,
                RuleView::Frontal,
                &[Joint::LeftKnee, Joint::RightKnee, Joint::LeftHip, Joint::RightHip],
                "Knees are caving inward",
                "Push your knees out slightly",
                "Drive the floor apart with your feet",
            ),
            rule(
                ErrorType::PoorAlignment,
                0.1,
                4,
                RuleView::Frontal,
                &[Joint::LeftAnkle, Joint::RightAnkle],
                "Stance is too narrow",
                "Set your feet about hip-width apart",
                "Use a hip-width stance for a balanced pull",
            ),
        ],
        phase_model: PhaseModel::SingleAngle {
            selector: HIPS,
            top: 160.0,
            bottom: 110.0,
        },
        tracked_angle: HIPS,
        starting_position: StartingPosition {
            requirements: vec![
                AngleRequirement::new(HIPS, 160.0, 180.0),
                AngleRequirement::new(KNEES, 150.0, 180.0),
                AngleRequirement::new(SPINE, 70.0, 90.0),
            ],
            required_joints: LOWER_BODY.to_vec(),
            requires_movement: true,
        },
        motion_range: vec![AngleRequirement::new(HIPS, 40.0, 180.0)],
        rom_target: Some(100.0),
        stabilizing_joints: vec![Joint::LeftAnkle, Joint::RightAnkle],
        detectors: vec![DetectorFamily::ButtWink, DetectorFamily::KneeValgus],
        setup_hint: "stand tall with the bar over mid-foot".to_string(),
        rationale: "Hip extension drives the cycle; lumbar flexion under load is the primary \
                    injury mechanism."
            .to_string(),
    }
}

fn bench_press() -> ExerciseProfile {
    ExerciseProfile {
        exercise: ExerciseType::BenchPress,
        display_name: "Bench press".to_string(),
        key_joints: UPPER_BODY.to_vec(),
        thresholds: bilateral(
            [AngleKind::LeftElbow, AngleKind::RightElbow],
            threshold(60.0, 180.0, 90.0, 45.0, None),
        )
        .to_vec(),
        rules: vec![
            rule(
                ErrorType::ElbowFlare,
                1.9,
                6,
                RuleView::Frontal,
                &[Joint::LeftElbow, Joint::RightElbow, Joint::LeftShoulder, Joint::RightShoulder],
                "Elbows are flaring wide",
                "Tuck your elbows a little",
                "Lower the bar with elbows about 45-70 degrees from your torso",
            ),
            rule(
                ErrorType::AsymmetricMovement,
                15.0,
                5,
                RuleView::Frontal,
                &[Joint::LeftElbow, Joint::RightElbow, Joint::LeftWrist, Joint::RightWrist],
                "Bar path is uneven",
                "Grip the bar evenly",
                "Press both arms at the same speed",
            ),
        ],
        phase_model: PhaseModel::SingleAngle {
            selector: ELBOWS,
            top: 150.0,
            bottom: 95.0,
        },
        tracked_angle: ELBOWS,
        starting_position: StartingPosition {
            requirements: vec![AngleRequirement::new(ELBOWS, 150.0, 180.0)],
            required_joints: UPPER_BODY.to_vec(),
            requires_movement: true,
        },
        motion_range: vec![AngleRequirement::new(ELBOWS, 30.0, 180.0)],
        rom_target: Some(90.0),
        stabilizing_joints: vec![Joint::LeftShoulder, Joint::RightShoulder],
        detectors: vec![DetectorFamily::ElbowFlare],
        setup_hint: "unrack the bar with arms locked out".to_string(),
        rationale: "Elbow flexion drives the cycle; excessive abduction loads the anterior \
                    shoulder."
            .to_string(),
    }
}

fn shoulder_press() -> ExerciseProfile {
    let mut thresholds = Vec::new();
    thresholds.extend(bilateral(
        [AngleKind::LeftElbow, AngleKind::RightElbow],
        threshold(60.0, 180.0, 90.0, 45.0, None),
    ));
    thresholds.push((AngleKind::Spine, threshold(75.0, 90.0, 88.0, 65.0, None)));

    ExerciseProfile {
        exercise: ExerciseType::ShoulderPress,
        display_name: "Shoulder press".to_string(),
        key_joints: UPPER_BODY.to_vec(),
        thresholds,
        rules: vec![
            rule(
                ErrorType::ExcessiveForwardLean,
                75.0,
                6,
                RuleView::Profile,
                &[Joint::LeftShoulder, Joint::RightShoulder, Joint::LeftHip, Joint::RightHip],
                "Lower back is arching",
                "Stack your ribs over your hips",
                "Brace your core and squeeze your glutes while pressing",
            ),
            rule(
                ErrorType::AsymmetricMovement,
                15.0,
                5,
                RuleView::Frontal,
                &[Joint::LeftElbow, Joint::RightElbow, Joint::LeftWrist, Joint::RightWrist],
                "One arm is lagging",
                "Hold both weights at the same height",
                "Press both arms together",
            ),
        ],
        phase_model: PhaseModel::SingleAngle {
            selector: ELBOWS,
            top: 155.0,
            bottom: 95.0,
        },
        tracked_angle: ELBOWS,
        starting_position: StartingPosition {
            requirements: vec![
                AngleRequirement::new(ELBOWS, 150.0, 180.0),
                AngleRequirement::new(SPINE, 75.0, 90.0),
            ],
            required_joints: UPPER_BODY.to_vec(),
            requires_movement: true,
        },
        motion_range: vec![AngleRequirement::new(ELBOWS, 30.0, 180.0)],
        rom_target: Some(90.0),
        stabilizing_joints: vec![Joint::LeftHip, Joint::RightHip],
        detectors: vec![DetectorFamily::TrunkLean],
        setup_hint: "press the weights overhead with arms locked out".to_string(),
        rationale: "Elbow extension drives the cycle; lumbar extension compensates for \
                    limited shoulder mobility."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_exercise_has_a_profile() {
        for exercise in ExerciseType::ALL {
            let profile = profile_for(exercise).unwrap();
            assert_eq!(profile.exercise, exercise);
            assert!(!profile.rules.is_empty());
            assert!(!profile.starting_position.requirements.is_empty());
        }
        assert_eq!(all_profiles().len(), ExerciseType::ALL.len());
    }

    #[test]
    fn test_rule_severities_in_range() {
        for profile in all_profiles() {
            for rule in &profile.rules {
                assert!((1..=10).contains(&rule.severity), "{:?}", rule.error_type);
                assert!(!rule.affected_joints.is_empty());
            }
        }
    }

    #[test]
    fn test_ideal_values_inside_ranges() {
        for profile in all_profiles() {
            for (kind, t) in &profile.thresholds {
                assert!(t.min <= t.ideal && t.ideal <= t.max, "{:?} {:?}", profile.exercise, kind);
            }
        }
    }

    #[test]
    fn test_squat_frontal_and_profile_rules_disjoint() {
        use crate::pose::BodyView;

        let squat = profile_for(ExerciseType::Squat).unwrap();
        let frontal: Vec<_> = squat
            .rules_for_view(BodyView::Frontal)
            .map(|r| r.error_type)
            .collect();
        let profile: Vec<_> = squat
            .rules_for_view(BodyView::Profile)
            .map(|r| r.error_type)
            .collect();

        assert!(frontal.contains(&ErrorType::KneeValgus));
        assert!(frontal.contains(&ErrorType::PoorAlignment));
        assert!(!profile.contains(&ErrorType::KneeValgus));
        assert!(profile.contains(&ErrorType::SpinalRounding));
    }

    #[test]
    fn test_plank_is_static_hold() {
        let plank = profile_for(ExerciseType::Plank).unwrap();
        assert_eq!(plank.phase_model, PhaseModel::StaticHold);
        assert!(!plank.starting_position.requires_movement);
    }
}
