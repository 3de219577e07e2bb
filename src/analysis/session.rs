// Session analysis state - everything one exercise session mutates per frame
//
// Constructed fresh on exercise selection and replaced wholesale on reset.
// Nothing here is shared across sessions; the analyzer owns exactly one.
//
// Per-frame flow:
//   readiness FSM -> (complete frame) view + pose history
//   -> (exercising) phase detector -> repetition counter
//   -> error engine -> quality scorer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cooldown::CooldownTracker;
use super::detection::{ErrorEngine, PostureError};
use super::history::RollingWindow;
use super::phase::{PhaseDetector, RepetitionPhase};
use super::quality::{QualityInput, QualityScorer, QualityTrend};
use super::readiness::{ReadinessMachine, ReadinessSignals, ReadinessState, ReadinessTransition};
use super::repetition::RepetitionCounter;
use super::rules::FrameContext;
use crate::config::{AppConfig, DetectionMode};
use crate::pose::{AngleSet, BodyView, Joint, PoseFrame, ViewClassifier};
use crate::profile::{ErrorType, ExerciseProfile, PhaseModel};

/// Externally visible output of one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysisResult {
    pub errors: Vec<PostureError>,
    pub phase: RepetitionPhase,
    pub repetition_count: u32,
    /// 0-100
    pub quality_score: u8,
    pub readiness: ReadinessState,
}

impl FrameAnalysisResult {
    /// No errors, IDLE, zero quality
    pub fn neutral(readiness: ReadinessState, repetition_count: u32) -> Self {
        Self {
            errors: Vec::new(),
            phase: RepetitionPhase::Idle,
            repetition_count,
            quality_score: 0,
            readiness,
        }
    }
}

/// What one step produced besides the caller-facing result
#[derive(Debug, Clone)]
pub(crate) struct FrameStep {
    pub result: FrameAnalysisResult,
    pub transition: Option<ReadinessTransition>,
    pub repetition_completed: bool,
}

pub struct SessionAnalysisState {
    profile: &'static ExerciseProfile,
    landmark_visibility: f32,
    preference_margin: f32,
    view_classifier: ViewClassifier,
    engine: ErrorEngine,
    readiness: ReadinessMachine,
    phase: PhaseDetector,
    repetitions: RepetitionCounter,
    cooldowns: CooldownTracker,
    quality: QualityScorer,
    poses: RollingWindow<PoseFrame>,
    /// Smallest phase angle since the last TOP
    rep_min_angle: Option<f32>,
    last_view: Option<BodyView>,
    frames_analyzed: u64,
    error_counts: BTreeMap<ErrorType, u32>,
    first_timestamp_ms: Option<u64>,
    last_timestamp_ms: Option<u64>,
}

impl SessionAnalysisState {
    pub fn new(profile: &'static ExerciseProfile, config: &AppConfig) -> Self {
        Self {
            profile,
            landmark_visibility: config.readiness.landmark_visibility,
            preference_margin: config.phase.visibility_preference_margin,
            view_classifier: ViewClassifier::new(&config.view, config.readiness.landmark_visibility),
            engine: ErrorEngine::new(config.errors.clone()),
            readiness: ReadinessMachine::new(
                config.readiness.clone(),
                profile.starting_position.requires_movement,
            ),
            phase: PhaseDetector::new(profile.phase_model, config.phase.smoothing_window),
            repetitions: RepetitionCounter::new(),
            cooldowns: CooldownTracker::new(config.errors.cooldowns.clone()),
            quality: QualityScorer::new(config.quality.clone()),
            poses: RollingWindow::new(config.quality.stability_window),
            rep_min_angle: None,
            last_view: None,
            frames_analyzed: 0,
            error_counts: BTreeMap::new(),
            first_timestamp_ms: None,
            last_timestamp_ms: None,
        }
    }

    pub fn profile(&self) -> &'static ExerciseProfile {
        self.profile
    }

    pub fn readiness(&self) -> &ReadinessMachine {
        &self.readiness
    }

    pub fn readiness_state(&self) -> ReadinessState {
        self.readiness.state()
    }

    pub fn readiness_message(&self) -> String {
        self.readiness.message(
            &self.profile.display_name,
            &self.profile.setup_hint,
            self.repetitions.count(),
        )
    }

    pub fn phase(&self) -> RepetitionPhase {
        self.phase.current()
    }

    pub fn repetition_count(&self) -> u32 {
        self.repetitions.count()
    }

    /// View of the last complete frame
    pub fn last_view(&self) -> Option<BodyView> {
        self.last_view
    }

    pub fn detection_mode(&self) -> DetectionMode {
        self.engine.mode()
    }

    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.engine.set_mode(mode);
    }

    pub fn average_quality(&self) -> Option<f32> {
        self.quality.average()
    }

    pub fn quality_trend(&self) -> QualityTrend {
        self.quality.trend()
    }

    pub fn frames_analyzed(&self) -> u64 {
        self.frames_analyzed
    }

    /// Emitted errors per type since the session started
    pub fn error_counts(&self) -> &BTreeMap<ErrorType, u32> {
        &self.error_counts
    }

    pub fn total_errors(&self) -> u32 {
        self.error_counts.values().sum()
    }

    /// Span between the first and last analyzed frame timestamps
    pub fn duration_ms(&self) -> u64 {
        match (self.first_timestamp_ms, self.last_timestamp_ms) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => 0,
        }
    }

    /// Frames per second over the analyzed span (0.0 under two frames)
    pub fn effective_fps(&self) -> f32 {
        let duration_ms = self.duration_ms();
        if duration_ms == 0 || self.frames_analyzed < 2 {
            return 0.0;
        }
        (self.frames_analyzed - 1) as f32 / (duration_ms as f32 / 1000.0)
    }

    /// Angle the profile tracks for readiness movement and the validator
    pub fn tracked_angle(&self, frame: &PoseFrame, angles: &AngleSet) -> Option<f32> {
        self.profile
            .tracked_angle
            .resolve(angles, frame, self.preference_margin)
    }

    pub fn preference_margin(&self) -> f32 {
        self.preference_margin
    }

    /// Advance the session by one frame
    pub(crate) fn step(&mut self, frame: &PoseFrame, angles: &AngleSet) -> FrameStep {
        self.frames_analyzed += 1;
        self.first_timestamp_ms.get_or_insert(frame.timestamp_ms);
        self.last_timestamp_ms = Some(frame.timestamp_ms);

        let tracked_angle = self.tracked_angle(frame, angles);
        let signals = self.readiness_signals(frame, angles, tracked_angle);
        let update = self.readiness.update(&signals);
        if let Some(transition) = update.transition {
            self.apply_transition(transition);
        }

        let readiness = self.readiness.state();
        if readiness == ReadinessState::NotReady || !update.complete {
            return FrameStep {
                result: FrameAnalysisResult::neutral(readiness, self.repetitions.count()),
                transition: update.transition,
                repetition_completed: false,
            };
        }

        let view = self.view_classifier.classify(frame);
        self.last_view = Some(view);
        self.poses.push(frame.clone());

        let mut repetition_completed = false;
        let phase = if readiness == ReadinessState::Exercising {
            let phase_angle = self.phase_angle(frame, angles);
            let phase = self.phase.update(phase_angle);
            if phase == RepetitionPhase::Top {
                self.rep_min_angle = None;
            } else if let Some(angle) = phase_angle {
                self.rep_min_angle = Some(self.rep_min_angle.map_or(angle, |min| min.min(angle)));
            }
            repetition_completed = self.repetitions.observe(phase);
            phase
        } else {
            RepetitionPhase::Idle
        };

        let ctx = FrameContext {
            frame,
            angles,
            profile: self.profile,
            view,
            phase,
            tracked_angle,
            rep_min_angle: self.rep_min_angle,
            preference_margin: self.preference_margin,
        };
        let errors = self
            .engine
            .detect(&ctx, readiness.is_setup(), &mut self.cooldowns);
        for error in &errors {
            *self.error_counts.entry(error.error_type).or_insert(0) += 1;
        }

        let quality_score = self.quality.score(&QualityInput {
            errors: &errors,
            angles,
            profile: self.profile,
            phase,
            tracked_angle,
            recent_poses: &self.poses,
            mode: self.engine.mode(),
        });
        if readiness == ReadinessState::Exercising {
            self.quality.record(quality_score);
        }

        FrameStep {
            result: FrameAnalysisResult {
                errors,
                phase,
                repetition_count: self.repetitions.count(),
                quality_score,
                readiness,
            },
            transition: update.transition,
            repetition_completed,
        }
    }

    fn readiness_signals(
        &self,
        frame: &PoseFrame,
        angles: &AngleSet,
        tracked_angle: Option<f32>,
    ) -> ReadinessSignals {
        let start = &self.profile.starting_position;
        let in_start_position = start
            .requirements
            .iter()
            .all(|r| r.is_met(angles, frame, self.preference_margin))
            && frame.mean_visibility(&start.required_joints) >= self.landmark_visibility;
        let in_motion_range = self
            .profile
            .motion_range
            .iter()
            .all(|r| r.is_met(angles, frame, self.preference_margin));

        ReadinessSignals {
            visible_ratio: frame.visible_ratio(&Joint::COMPLETENESS_SET, self.landmark_visibility),
            in_start_position,
            in_motion_range,
            tracked_angle,
        }
    }

    fn phase_angle(&self, frame: &PoseFrame, angles: &AngleSet) -> Option<f32> {
        match self.profile.phase_model {
            PhaseModel::SingleAngle { selector, .. } => {
                selector.resolve(angles, frame, self.preference_margin)
            }
            PhaseModel::StaticHold => None,
        }
    }

    fn apply_transition(&mut self, transition: ReadinessTransition) {
        match (transition.from, transition.to) {
            (ReadinessState::Exercising, ReadinessState::NotReady) => {
                self.repetitions.reset();
                self.phase.reset();
                self.rep_min_angle = None;
            }
            (_, ReadinessState::Exercising) => {
                self.phase.reset();
                self.rep_min_angle = None;
            }
            _ => {}
        }
    }
}
