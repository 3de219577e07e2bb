// Phase detection - raw per-frame classification plus majority-vote smoothing
//
// One generic classifier serves every exercise: the profile's PhaseModel
// supplies the tracked angle and its TOP/BOTTOM thresholds. Raw phases are
// pushed into a short window and the most frequent value wins, which keeps
// single-frame estimator jitter from flipping the phase.

use serde::{Deserialize, Serialize};

use super::history::RollingWindow;
use crate::profile::PhaseModel;

/// Point in the repetition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepetitionPhase {
    /// Not exercising
    Idle,
    Top,
    /// Eccentric
    Descending,
    Bottom,
    /// Concentric
    Ascending,
}

impl RepetitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepetitionPhase::Idle => "IDLE",
            RepetitionPhase::Top => "TOP",
            RepetitionPhase::Descending => "DESCENDING",
            RepetitionPhase::Bottom => "BOTTOM",
            RepetitionPhase::Ascending => "ASCENDING",
        }
    }
}

/// Classify one tracked-angle sample
///
/// Between the thresholds the direction of travel decides; with no previous
/// sample the phase defaults to DESCENDING.
pub fn classify_raw(angle: f32, previous: Option<f32>, top: f32, bottom: f32) -> RepetitionPhase {
    if angle > top {
        RepetitionPhase::Top
    } else if angle < bottom {
        RepetitionPhase::Bottom
    } else {
        match previous {
            Some(prev) if angle > prev => RepetitionPhase::Ascending,
            _ => RepetitionPhase::Descending,
        }
    }
}

/// Stateful phase detector for one session
#[derive(Debug, Clone)]
pub struct PhaseDetector {
    model: PhaseModel,
    votes: RollingWindow<RepetitionPhase>,
    previous_angle: Option<f32>,
    current: RepetitionPhase,
}

impl PhaseDetector {
    pub fn new(model: PhaseModel, smoothing_window: usize) -> Self {
        Self {
            model,
            votes: RollingWindow::new(smoothing_window),
            previous_angle: None,
            current: RepetitionPhase::Idle,
        }
    }

    /// Feed the resolved tracked angle for this frame and return the smoothed phase
    ///
    /// A missing angle leaves the smoothed phase unchanged.
    pub fn update(&mut self, tracked_angle: Option<f32>) -> RepetitionPhase {
        let raw = match self.model {
            PhaseModel::StaticHold => RepetitionPhase::Top,
            PhaseModel::SingleAngle { top, bottom, .. } => {
                let Some(angle) = tracked_angle else {
                    return self.current;
                };
                let raw = classify_raw(angle, self.previous_angle, top, bottom);
                self.previous_angle = Some(angle);
                raw
            }
        };

        self.votes.push(raw);
        self.current = self.votes.mode().unwrap_or(raw);
        self.current
    }

    /// Last smoothed phase (IDLE before the first update)
    pub fn current(&self) -> RepetitionPhase {
        self.current
    }

    pub fn reset(&mut self) {
        self.votes.clear();
        self.previous_angle = None;
        self.current = RepetitionPhase::Idle;
    }
}
