// Exercise profiles - static per-exercise configuration
//
// A profile tells the exercise-agnostic analyzers which angle drives the
// repetition cycle, what the starting position looks like, which angle
// ranges are expected, and which error rules apply in which view. Profiles
// are built once (see `registry`) and never mutated during a session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::pose::{AngleKind, AngleSet, BodyView, Joint, PoseFrame};

pub mod registry;

pub use registry::{all_profiles, profile_for};

/// Supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Squat,
    PushUp,
    Lunge,
    Plank,
    BicepCurl,
    Deadlift,
    BenchPress,
    ShoulderPress,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 8] = [
        ExerciseType::Squat,
        ExerciseType::PushUp,
        ExerciseType::Lunge,
        ExerciseType::Plank,
        ExerciseType::BicepCurl,
        ExerciseType::Deadlift,
        ExerciseType::BenchPress,
        ExerciseType::ShoulderPress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Squat => "squat",
            ExerciseType::PushUp => "push_up",
            ExerciseType::Lunge => "lunge",
            ExerciseType::Plank => "plank",
            ExerciseType::BicepCurl => "bicep_curl",
            ExerciseType::Deadlift => "deadlift",
            ExerciseType::BenchPress => "bench_press",
            ExerciseType::ShoulderPress => "shoulder_press",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = SessionError;

    /// Accepts snake_case, kebab-case, spaced, and concatenated spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let exercise = match normalized.as_str() {
            "squat" => ExerciseType::Squat,
            "pushup" => ExerciseType::PushUp,
            "lunge" => ExerciseType::Lunge,
            "plank" => ExerciseType::Plank,
            "bicepcurl" | "curl" => ExerciseType::BicepCurl,
            "deadlift" => ExerciseType::Deadlift,
            "benchpress" | "bench" => ExerciseType::BenchPress,
            "shoulderpress" | "overheadpress" => ExerciseType::ShoulderPress,
            _ => {
                return Err(SessionError::UnknownExercise {
                    name: s.to_string(),
                })
            }
        };
        Ok(exercise)
    }
}

/// Expected range for one angle (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleThreshold {
    pub min: f32,
    pub max: f32,
    pub ideal: f32,
    pub critical: f32,
    pub warning: Option<f32>,
}

impl AngleThreshold {
    /// Distance outside [min, max]; 0.0 inside the range
    pub fn deviation(&self, degrees: f32) -> f32 {
        if degrees < self.min {
            self.min - degrees
        } else if degrees > self.max {
            degrees - self.max
        } else {
            0.0
        }
    }
}

/// Which angle(s) a profile tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleSelector {
    Single(AngleKind),
    /// Left and right sides of the same joint
    Bilateral(AngleKind, AngleKind),
}

impl AngleSelector {
    /// Resolve to one value, preferring the clearly more visible side
    ///
    /// Falls back to the average when both sides are similarly visible and to
    /// whichever side is present when only one is.
    pub fn resolve(&self, angles: &AngleSet, frame: &PoseFrame, preference_margin: f32) -> Option<f32> {
        match *self {
            AngleSelector::Single(kind) => angles.get(kind),
            AngleSelector::Bilateral(left, right) => match (angles.get(left), angles.get(right)) {
                (Some(l), Some(r)) => {
                    let left_vis = frame.mean_visibility(left.joints());
                    let right_vis = frame.mean_visibility(right.joints());
                    if left_vis - right_vis > preference_margin {
                        Some(l)
                    } else if right_vis - left_vis > preference_margin {
                        Some(r)
                    } else {
                        Some((l + r) / 2.0)
                    }
                }
                (Some(l), None) => Some(l),
                (None, Some(r)) => Some(r),
                (None, None) => None,
            },
        }
    }

    pub fn kinds(&self) -> Vec<AngleKind> {
        match *self {
            AngleSelector::Single(kind) => vec![kind],
            AngleSelector::Bilateral(left, right) => vec![left, right],
        }
    }
}

/// How a profile maps angles to repetition phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PhaseModel {
    /// One tracked angle: above `top` is TOP, below `bottom` is BOTTOM
    SingleAngle {
        selector: AngleSelector,
        top: f32,
        bottom: f32,
    },
    /// Isometric hold; always TOP, never counts repetitions
    StaticHold,
}

/// One angle that must lie within [min, max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRequirement {
    pub selector: AngleSelector,
    pub min: f32,
    pub max: f32,
}

impl AngleRequirement {
    pub const fn new(selector: AngleSelector, min: f32, max: f32) -> Self {
        Self { selector, min, max }
    }

    /// An absent angle never satisfies a requirement
    pub fn is_met(&self, angles: &AngleSet, frame: &PoseFrame, preference_margin: f32) -> bool {
        self.selector
            .resolve(angles, frame, preference_margin)
            .map(|v| v >= self.min && v <= self.max)
            .unwrap_or(false)
    }
}

/// Exercise-specific starting position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartingPosition {
    pub requirements: Vec<AngleRequirement>,
    /// Joints whose mean visibility must reach the landmark threshold
    pub required_joints: Vec<Joint>,
    /// Static holds begin as soon as the position is confirmed
    pub requires_movement: bool,
}

/// Broad error class; drives cooldown length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Injury-risk deviations (spine, knee collapse)
    Structural,
    Alignment,
    Balance,
    Minor,
}

/// Detectable posture errors; each has exactly one evaluation predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    KneeValgus,
    PoorAlignment,
    FootLifted,
    SpinalRounding,
    InsufficientDepth,
    ExcessiveForwardLean,
    KneeOverToe,
    HipSag,
    HipPike,
    ElbowFlare,
    ElbowDrift,
    AsymmetricMovement,
    HeelRise,
    ButtWink,
}

impl ErrorType {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorType::KneeValgus
            | ErrorType::SpinalRounding
            | ErrorType::ButtWink
            | ErrorType::HipSag => ErrorCategory::Structural,
            ErrorType::PoorAlignment
            | ErrorType::ExcessiveForwardLean
            | ErrorType::KneeOverToe
            | ErrorType::ElbowFlare
            | ErrorType::ElbowDrift
            | ErrorType::HipPike => ErrorCategory::Alignment,
            ErrorType::FootLifted | ErrorType::HeelRise | ErrorType::AsymmetricMovement => {
                ErrorCategory::Balance
            }
            ErrorType::InsufficientDepth => ErrorCategory::Minor,
        }
    }

    /// Base penalty used by the scientific quality scorer before severity/confidence scaling
    pub fn quality_weight(&self) -> f32 {
        match self {
            ErrorType::KneeValgus | ErrorType::SpinalRounding => 25.0,
            ErrorType::ButtWink | ErrorType::HipSag => 20.0,
            ErrorType::HeelRise
            | ErrorType::ExcessiveForwardLean
            | ErrorType::ElbowFlare
            | ErrorType::FootLifted => 12.0,
            ErrorType::KneeOverToe | ErrorType::HipPike | ErrorType::PoorAlignment => 10.0,
            ErrorType::ElbowDrift | ErrorType::AsymmetricMovement => 8.0,
            ErrorType::InsufficientDepth => 6.0,
        }
    }
}

/// Views in which a rule's geometry is meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleView {
    Frontal,
    Profile,
    Any,
}

impl RuleView {
    pub fn matches(&self, view: BodyView) -> bool {
        match self {
            RuleView::Any => true,
            RuleView::Frontal => view == BodyView::Frontal,
            RuleView::Profile => view == BodyView::Profile,
        }
    }
}

/// Declarative error rule; the engine knows how to evaluate each ErrorType
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRule {
    pub error_type: ErrorType,
    /// Predicate-specific threshold (ratio, degrees, or normalized distance)
    pub threshold: f32,
    /// 1 (cosmetic) to 10 (injury risk)
    pub severity: u8,
    pub message: String,
    /// Gentler wording used while the user is still setting up
    pub setup_message: String,
    pub recommendation: String,
    pub affected_joints: Vec<Joint>,
    pub view: RuleView,
}

/// Closed-form biomechanical detector families run in scientific mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorFamily {
    KneeValgus,
    HeelRise,
    ButtWink,
    TrunkLean,
    HipSag,
    ElbowFlare,
    ElbowDrift,
}

/// Immutable per-exercise configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub exercise: ExerciseType,
    pub display_name: String,
    pub key_joints: Vec<Joint>,
    pub thresholds: Vec<(AngleKind, AngleThreshold)>,
    /// Ordered by priority
    pub rules: Vec<ErrorRule>,
    pub phase_model: PhaseModel,
    /// Angle whose frame-to-frame change signals the start of exercising
    pub tracked_angle: AngleSelector,
    pub starting_position: StartingPosition,
    /// Envelope the user must stay within while exercising
    pub motion_range: Vec<AngleRequirement>,
    /// Tracked angle at or below which a BOTTOM frame earns the range-of-motion bonus
    pub rom_target: Option<f32>,
    /// Joints expected to stay still; drive the stability bonus
    pub stabilizing_joints: Vec<Joint>,
    pub detectors: Vec<DetectorFamily>,
    pub setup_hint: String,
    pub rationale: String,
}

impl ExerciseProfile {
    pub fn threshold(&self, kind: AngleKind) -> Option<&AngleThreshold> {
        self.thresholds
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, t)| t)
    }

    /// Rules applicable to the current view, in priority order
    pub fn rules_for_view(&self, view: BodyView) -> impl Iterator<Item = &ErrorRule> {
        self.rules.iter().filter(move |rule| rule.view.matches(view))
    }
}
