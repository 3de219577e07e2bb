// Precision metrics - statistical accuracy of the pose stream
//
// Computed over the validator's rolling window, never per frame. All scores
// are on a 0-100 scale.

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::pose::geometry::distance;
use crate::pose::{AngleSet, Landmark, PoseFrame};
use crate::profile::ExerciseProfile;

/// Per-landmark mean displacement at which a landmark's stability reaches zero
const STABILITY_DISPLACEMENT: f32 = 0.05;

/// Minimum paired samples before a correlation is trusted
const MIN_CORRELATION_SAMPLES: usize = 3;

const WEIGHT_ANGULAR: f32 = 0.3;
const WEIGHT_SPATIAL: f32 = 0.2;
const WEIGHT_TEMPORAL: f32 = 0.2;
const WEIGHT_CORRELATION: f32 = 0.2;
const WEIGHT_STABILITY: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionMetrics {
    pub angular_accuracy: f32,
    pub spatial_accuracy: f32,
    pub temporal_consistency: f32,
    pub correlation_coefficient: f32,
    pub frame_stability: f32,
    pub overall_precision: f32,
}

/// What the validator retains from one frame
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PrecisionSample {
    /// Profile key joints, in profile order
    pub landmarks: Vec<Landmark>,
    /// Mean distance of present angles outside their expected ranges
    pub angular_deviation: Option<f32>,
    pub tracked_angle: Option<f32>,
    pub reference_angle: Option<f32>,
}

impl PrecisionSample {
    pub fn capture(
        profile: &ExerciseProfile,
        frame: &PoseFrame,
        angles: &AngleSet,
        preference_margin: f32,
        reference_angle: Option<f32>,
    ) -> Self {
        let deviations: Vec<f32> = profile
            .thresholds
            .iter()
            .filter_map(|(kind, threshold)| angles.get(*kind).map(|v| threshold.deviation(v)))
            .collect();
        let angular_deviation = mean(&deviations);

        Self {
            landmarks: profile.key_joints.iter().map(|j| frame[*j]).collect(),
            angular_deviation,
            tracked_angle: profile.tracked_angle.resolve(angles, frame, preference_margin),
            reference_angle,
        }
    }
}

/// Compute every precision metric over the window (oldest sample first)
pub(crate) fn compute(samples: &[&PrecisionSample], config: &ValidationConfig) -> PrecisionMetrics {
    let angular_accuracy = angular_accuracy(samples, config.target_max_deviation_deg);
    let displacements = landmark_displacements(samples);
    let spatial_accuracy = spatial_accuracy(&displacements, config.implausible_jump);
    let temporal_consistency = temporal_consistency(samples);
    let correlation_coefficient = correlation(samples).unwrap_or(config.neutral_correlation);
    let frame_stability = frame_stability(&displacements);

    let overall_precision = WEIGHT_ANGULAR * angular_accuracy
        + WEIGHT_SPATIAL * spatial_accuracy
        + WEIGHT_TEMPORAL * temporal_consistency
        + WEIGHT_CORRELATION * correlation_coefficient
        + WEIGHT_STABILITY * frame_stability;

    PrecisionMetrics {
        angular_accuracy,
        spatial_accuracy,
        temporal_consistency,
        correlation_coefficient,
        frame_stability,
        overall_precision: score(overall_precision),
    }
}

/// 90 at exactly the target deviation, 100 with no deviation
fn angular_accuracy(samples: &[&PrecisionSample], target_max_deviation: f32) -> f32 {
    let deviations: Vec<f32> = samples.iter().filter_map(|s| s.angular_deviation).collect();
    match mean(&deviations) {
        Some(avg) if target_max_deviation > 0.0 => {
            score(100.0 - 10.0 * avg / target_max_deviation)
        }
        _ => 0.0,
    }
}

/// Displacements per landmark index between consecutive samples
fn landmark_displacements(samples: &[&PrecisionSample]) -> Vec<Vec<f32>> {
    let landmark_count = samples.iter().map(|s| s.landmarks.len()).min().unwrap_or(0);
    (0..landmark_count)
        .map(|i| {
            samples
                .windows(2)
                .map(|pair| distance(&pair[0].landmarks[i], &pair[1].landmarks[i]))
                .collect()
        })
        .collect()
}

fn spatial_accuracy(displacements: &[Vec<f32>], implausible_jump: f32) -> f32 {
    let all: Vec<f32> = displacements.iter().flatten().copied().collect();
    let Some(avg) = mean(&all) else {
        return 100.0;
    };
    if implausible_jump <= 0.0 {
        return 0.0;
    }
    let jumps = all.iter().filter(|d| **d > implausible_jump).count();
    let jump_ratio = jumps as f32 / all.len() as f32;
    score(100.0 - (avg / implausible_jump) * 50.0 - jump_ratio * 50.0)
}

fn temporal_consistency(samples: &[&PrecisionSample]) -> f32 {
    let deltas: Vec<f32> = samples
        .windows(2)
        .filter_map(|pair| match (pair[0].tracked_angle, pair[1].tracked_angle) {
            (Some(a), Some(b)) => Some((b - a).abs()),
            _ => None,
        })
        .collect();
    match mean(&deltas) {
        Some(avg) => score(100.0 - 2.0 * avg),
        None => 100.0,
    }
}

/// Pearson correlation of tracked vs reference angles, scaled to 0-100
///
/// `None` without enough paired samples or with a flat series.
fn correlation(samples: &[&PrecisionSample]) -> Option<f32> {
    let pairs: Vec<(f32, f32)> = samples
        .iter()
        .filter_map(|s| Some((s.tracked_angle?, s.reference_angle?)))
        .collect();
    pearson(&pairs).map(|r| score(r.max(0.0) * 100.0))
}

pub(crate) fn pearson(pairs: &[(f32, f32)]) -> Option<f32> {
    if pairs.len() < MIN_CORRELATION_SAMPLES {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| *x as f64).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| *y as f64).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in pairs {
        let dx = *x as f64 - mean_x;
        let dy = *y as f64 - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator <= f64::EPSILON {
        return None;
    }
    let r = (cov / denominator) as f32;
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

fn frame_stability(displacements: &[Vec<f32>]) -> f32 {
    let per_landmark: Vec<f32> = displacements
        .iter()
        .filter_map(|d| mean(d))
        .map(|avg| score(100.0 * (1.0 - avg / STABILITY_DISPLACEMENT)))
        .collect();
    mean(&per_landmark).unwrap_or(100.0)
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f32>() / values.len() as f32;
    avg.is_finite().then_some(avg)
}

fn score(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
