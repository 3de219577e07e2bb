// Quality scorer - one bounded form score per frame plus a rolling trend
//
// Score = 100 - error penalties + ideal-angle bonus + stability bonus +
// range-of-motion bonus, clamped to [0, 100].

use serde::{Deserialize, Serialize};

use super::detection::PostureError;
use super::history::RollingWindow;
use super::phase::RepetitionPhase;
use crate::config::{DetectionMode, QualityConfig};
use crate::pose::geometry::mean_displacement;
use crate::pose::{AngleSet, PoseFrame};
use crate::profile::ExerciseProfile;

/// Mean stabilizing-joint displacement per frame at which the stability bonus reaches zero
const STABILITY_NOISE_FLOOR: f32 = 0.02;

/// Scores within this many points of each other count as stable
const TREND_DEAD_BAND: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTrend {
    Improving,
    Stable,
    Declining,
    /// Fewer than two full slices of history
    Insufficient,
}

/// Inputs for scoring one frame
#[derive(Debug, Clone, Copy)]
pub struct QualityInput<'a> {
    pub errors: &'a [PostureError],
    pub angles: &'a AngleSet,
    pub profile: &'a ExerciseProfile,
    pub phase: RepetitionPhase,
    pub tracked_angle: Option<f32>,
    pub recent_poses: &'a RollingWindow<PoseFrame>,
    pub mode: DetectionMode,
}

#[derive(Debug, Clone)]
pub struct QualityScorer {
    config: QualityConfig,
    history: RollingWindow<f32>,
}

impl QualityScorer {
    pub fn new(config: QualityConfig) -> Self {
        let history = RollingWindow::new(config.history_capacity);
        Self { config, history }
    }

    /// Score one frame without recording it
    pub fn score(&self, input: &QualityInput<'_>) -> u8 {
        let penalty: f32 = input
            .errors
            .iter()
            .map(|e| error_penalty(e, input.mode))
            .sum();
        let total = 100.0 - penalty
            + self.ideal_bonus(input)
            + self.stability_bonus(input)
            + self.rom_bonus(input);

        if total.is_finite() {
            total.round().clamp(0.0, 100.0) as u8
        } else {
            0
        }
    }

    /// Append a score to the rolling history
    pub fn record(&mut self, score: u8) {
        self.history.push(score as f32);
    }

    pub fn average(&self) -> Option<f32> {
        self.history.mean()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Compare the latest `trend_slice` scores with the slice before them
    pub fn trend(&self) -> QualityTrend {
        let slice = self.config.trend_slice.max(1);
        if self.history.len() < slice * 2 {
            return QualityTrend::Insufficient;
        }
        let scores: Vec<f32> = self.history.recent(slice * 2).copied().collect();
        let (previous, recent) = scores.split_at(slice);
        let mean = |s: &[f32]| s.iter().sum::<f32>() / s.len() as f32;
        let delta = mean(recent) - mean(previous);

        if delta > TREND_DEAD_BAND {
            QualityTrend::Improving
        } else if delta < -TREND_DEAD_BAND {
            QualityTrend::Declining
        } else {
            QualityTrend::Stable
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    fn ideal_bonus(&self, input: &QualityInput<'_>) -> f32 {
        let bonus: f32 = input
            .profile
            .thresholds
            .iter()
            .filter_map(|(kind, threshold)| {
                let value = input.angles.get(*kind)?;
                let distance = (value - threshold.ideal).abs();
                Some(if distance <= 5.0 {
                    3.0
                } else if distance <= 10.0 {
                    2.0
                } else if distance <= 20.0 {
                    1.0
                } else {
                    0.0
                })
            })
            .sum();
        bonus.min(self.config.ideal_bonus_max)
    }

    fn stability_bonus(&self, input: &QualityInput<'_>) -> f32 {
        let joints = &input.profile.stabilizing_joints;
        let poses: Vec<&PoseFrame> = input
            .recent_poses
            .recent(self.config.stability_window)
            .collect();
        if joints.is_empty() || poses.len() < 2 {
            return 0.0;
        }

        let steps = poses.len() - 1;
        let movement: f32 = poses
            .windows(2)
            .map(|pair| mean_displacement(pair[0], pair[1], joints))
            .sum::<f32>()
            / steps as f32;

        (self.config.stability_bonus_max * (1.0 - movement / STABILITY_NOISE_FLOOR)).max(0.0)
    }

    fn rom_bonus(&self, input: &QualityInput<'_>) -> f32 {
        match (input.phase, input.profile.rom_target, input.tracked_angle) {
            (RepetitionPhase::Bottom, Some(target), Some(angle)) if angle <= target => {
                self.config.rom_bonus
            }
            _ => 0.0,
        }
    }
}

fn error_penalty(error: &PostureError, mode: DetectionMode) -> f32 {
    match mode {
        DetectionMode::RuleBased => match error.severity {
            s if s >= 7 => 20.0,
            s if s >= 5 => 10.0,
            _ => 5.0,
        },
        DetectionMode::Scientific => {
            error.error_type.quality_weight() * (error.severity as f32 / 10.0) * error.confidence
        }
    }
}

#[cfg(test)]
#[path = "quality_tests.rs"]
mod tests;
