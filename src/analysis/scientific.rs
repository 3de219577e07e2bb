// Scientific detectors - closed-form biomechanical checks per detector family
//
// Each family combines several geometric signals with fixed thresholds and
// yields at most one finding per frame. Findings go through the same
// confidence gate and cooldown tracker as rule-based errors.

use super::rules::FrameContext;
use crate::pose::geometry::{angle_at, midpoint};
use crate::pose::{AngleKind, BodyView, Joint, Landmark};
use crate::profile::{AngleSelector, DetectorFamily, ErrorType};

const VALGUS_SEVERE_RATIO: f32 = 0.6;
const VALGUS_RATIO: f32 = 0.75;
const VALGUS_SOFT_RATIO: f32 = 0.9;
const VALGUS_MEDIAL_SHIFT: f32 = 0.02;

const HEEL_LIFT_CLEAR: f32 = 0.03;
const HEEL_LIFT_SOFT: f32 = 0.015;
const SHANK_TILT_DEG: f32 = 35.0;

const DEEP_KNEE_DEG: f32 = 100.0;
const WINK_HIP_DEG: f32 = 50.0;
const WINK_TRUNK_FLEXION_DEG: f32 = 45.0;

const TRUNK_ROUNDING_DEG: f32 = 35.0;
const TRUNK_LEAN_DEG: f32 = 50.0;

const BODY_LINE_DEG: f32 = 160.0;
const ELBOW_FLARE_RATIO: f32 = 1.7;
const ELBOW_DRIFT_DEG: f32 = 35.0;

/// Positive result of one detector family
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub error_type: ErrorType,
    pub severity: u8,
    pub affected_joints: Vec<Joint>,
    pub description: &'static str,
    pub recommendation: &'static str,
}

/// View in which a detector family's geometry is trustworthy
pub fn family_view(family: DetectorFamily) -> BodyView {
    match family {
        DetectorFamily::KneeValgus | DetectorFamily::ElbowFlare => BodyView::Frontal,
        DetectorFamily::HeelRise
        | DetectorFamily::ButtWink
        | DetectorFamily::TrunkLean
        | DetectorFamily::HipSag
        | DetectorFamily::ElbowDrift => BodyView::Profile,
    }
}

/// Run one detector family against the frame
pub fn detect(family: DetectorFamily, ctx: &FrameContext<'_>) -> Option<Finding> {
    if family_view(family) != ctx.view {
        return None;
    }
    match family {
        DetectorFamily::KneeValgus => knee_valgus(ctx),
        DetectorFamily::HeelRise => heel_rise(ctx),
        DetectorFamily::ButtWink => butt_wink(ctx),
        DetectorFamily::TrunkLean => trunk_lean(ctx),
        DetectorFamily::HipSag => hip_sag(ctx),
        DetectorFamily::ElbowFlare => elbow_flare(ctx),
        DetectorFamily::ElbowDrift => elbow_drift(ctx),
    }
}

/// Dynamic knee valgus from the frontal knee/hip width ratio plus medial knee drift
fn knee_valgus(ctx: &FrameContext<'_>) -> Option<Finding> {
    let ratio = ctx.knee_hip_ratio()?;
    let f = ctx.frame;
    let (mid_x, _) = midpoint(&f[Joint::LeftHip], &f[Joint::RightHip]);
    let medial_shift = |knee: &Landmark, ankle: &Landmark| {
        (ankle.x - mid_x).abs() - (knee.x - mid_x).abs()
    };
    let knee_inside_ankle = medial_shift(&f[Joint::LeftKnee], &f[Joint::LeftAnkle])
        > VALGUS_MEDIAL_SHIFT
        || medial_shift(&f[Joint::RightKnee], &f[Joint::RightAnkle]) > VALGUS_MEDIAL_SHIFT;

    let detected =
        ratio < VALGUS_RATIO || (ratio < VALGUS_SOFT_RATIO && knee_inside_ankle);
    detected.then(|| Finding {
        error_type: ErrorType::KneeValgus,
        severity: if ratio < VALGUS_SEVERE_RATIO { 9 } else { 7 },
        affected_joints: vec![
            Joint::LeftKnee,
            Joint::RightKnee,
            Joint::LeftAnkle,
            Joint::RightAnkle,
        ],
        description: "Dynamic knee valgus: knees collapsing toward the midline",
        recommendation: "Drive your knees out over your toes and engage your glutes",
    })
}

/// Heel rise from heel/toe separation, reinforced by forward shank tilt
fn heel_rise(ctx: &FrameContext<'_>) -> Option<Finding> {
    let lift = ctx.heel_lift();
    let f = ctx.frame;
    let (knee, ankle) = if ctx.left_side_dominant() {
        (&f[Joint::LeftKnee], &f[Joint::LeftAnkle])
    } else {
        (&f[Joint::RightKnee], &f[Joint::RightAnkle])
    };
    // Tilt of the shank from vertical
    let vertical = Landmark::visible(ankle.x, ankle.y - 1.0);
    let shank_tilt = angle_at(knee, ankle, &vertical);

    let detected = lift > HEEL_LIFT_CLEAR || (lift > HEEL_LIFT_SOFT && shank_tilt > SHANK_TILT_DEG);
    detected.then(|| Finding {
        error_type: ErrorType::HeelRise,
        severity: 6,
        affected_joints: vec![
            Joint::LeftHeel,
            Joint::RightHeel,
            Joint::LeftAnkle,
            Joint::RightAnkle,
        ],
        description: "Heels are lifting off the floor",
        recommendation: "Keep your weight over mid-foot and work on ankle mobility",
    })
}

/// Posterior pelvic tilt at depth: deep knee flexion, closed hip, flexed trunk
fn butt_wink(ctx: &FrameContext<'_>) -> Option<Finding> {
    let knee = ctx.resolve(AngleSelector::Bilateral(AngleKind::LeftKnee, AngleKind::RightKnee))?;
    let hip = ctx.resolve(AngleSelector::Bilateral(AngleKind::LeftHip, AngleKind::RightHip))?;
    let spine = ctx.angles.get(AngleKind::Spine)?;

    let detected =
        knee < DEEP_KNEE_DEG && hip < WINK_HIP_DEG && (90.0 - spine) > WINK_TRUNK_FLEXION_DEG;
    detected.then(|| Finding {
        error_type: ErrorType::ButtWink,
        severity: 7,
        affected_joints: vec![
            Joint::LeftHip,
            Joint::RightHip,
            Joint::LeftShoulder,
            Joint::RightShoulder,
        ],
        description: "Pelvis is tucking under at the bottom",
        recommendation: "Stop just above the depth where your lower back starts to round",
    })
}

fn trunk_lean(ctx: &FrameContext<'_>) -> Option<Finding> {
    let spine = ctx.angles.get(AngleKind::Spine)?;
    let joints = vec![
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftHip,
        Joint::RightHip,
    ];
    if spine < TRUNK_ROUNDING_DEG {
        Some(Finding {
            error_type: ErrorType::SpinalRounding,
            severity: 8,
            affected_joints: joints,
            description: "Trunk is folding forward past a safe angle",
            recommendation: "Brace your core and lift your chest",
        })
    } else if spine < TRUNK_LEAN_DEG {
        Some(Finding {
            error_type: ErrorType::ExcessiveForwardLean,
            severity: 5,
            affected_joints: joints,
            description: "Trunk is leaning forward",
            recommendation: "Keep your chest up and your weight over mid-foot",
        })
    } else {
        None
    }
}

fn hip_sag(ctx: &FrameContext<'_>) -> Option<Finding> {
    let line = ctx.angles.get(AngleKind::BodyLine)?;
    if line >= BODY_LINE_DEG {
        return None;
    }
    let offset = ctx.hip_line_offset();
    let joints = vec![Joint::LeftHip, Joint::RightHip];
    if offset > 0.0 {
        Some(Finding {
            error_type: ErrorType::HipSag,
            severity: 7,
            affected_joints: joints,
            description: "Hips are sagging below the body line",
            recommendation: "Squeeze your glutes and pull your belly button in",
        })
    } else if offset < 0.0 {
        Some(Finding {
            error_type: ErrorType::HipPike,
            severity: 5,
            affected_joints: joints,
            description: "Hips are raised above the body line",
            recommendation: "Lower your hips until shoulders, hips, and ankles line up",
        })
    } else {
        None
    }
}

fn elbow_flare(ctx: &FrameContext<'_>) -> Option<Finding> {
    let ratio = ctx.elbow_shoulder_ratio()?;
    (ratio > ELBOW_FLARE_RATIO).then(|| Finding {
        error_type: ErrorType::ElbowFlare,
        severity: 6,
        affected_joints: vec![
            Joint::LeftElbow,
            Joint::RightElbow,
            Joint::LeftShoulder,
            Joint::RightShoulder,
        ],
        description: "Elbows are flaring wide of the shoulders",
        recommendation: "Tuck your elbows to roughly 45 degrees",
    })
}

fn elbow_drift(ctx: &FrameContext<'_>) -> Option<Finding> {
    let shoulder = ctx.resolve(AngleSelector::Bilateral(
        AngleKind::LeftShoulder,
        AngleKind::RightShoulder,
    ))?;
    (shoulder > ELBOW_DRIFT_DEG).then(|| Finding {
        error_type: ErrorType::ElbowDrift,
        severity: 5,
        affected_joints: vec![
            Joint::LeftElbow,
            Joint::RightElbow,
            Joint::LeftShoulder,
            Joint::RightShoulder,
        ],
        description: "Upper arm is swinging forward",
        recommendation: "Keep your elbows pinned to your sides",
    })
}
