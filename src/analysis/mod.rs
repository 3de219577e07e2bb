// Analysis module - per-frame posture analysis pipeline
//
// This module orchestrates the complete analysis pipeline for one exercise
// session, turning pushed PoseFrame + AngleSet pairs into coaching feedback.
//
// Architecture:
// - PostureAnalyzer: owns the configuration, the active SessionAnalysisState
//   and the optional validator/telemetry side channels
// - Pipeline: ReadinessMachine → PhaseDetector → RepetitionCounter
//   → ErrorEngine → QualityScorer
// - Output: FrameAnalysisResult returned to the caller every frame

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, DetectionMode};
use crate::error::{log_session_error, SessionError};
use crate::pose::{AngleSet, PoseFrame};
use crate::profile::{profile_for, ErrorType, ExerciseType};
use crate::telemetry::{MetricEvent, TelemetryCollector};
use crate::validation::{FrameTiming, PrecisionValidator, ReferenceTrace, ValidationReport};

pub mod cooldown;
pub mod detection;
pub mod history;
pub mod phase;
pub mod quality;
pub mod readiness;
pub mod repetition;
pub mod rules;
pub mod scientific;
pub mod session;

pub use detection::{ErrorEngine, PostureError};
pub use history::RollingWindow;
pub use phase::{PhaseDetector, RepetitionPhase};
pub use quality::{QualityScorer, QualityTrend};
pub use readiness::{ReadinessMachine, ReadinessState};
pub use repetition::RepetitionCounter;
pub use session::{FrameAnalysisResult, SessionAnalysisState};

/// On-demand session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub exercise: ExerciseType,
    pub repetitions: u32,
    /// Rolling mean of per-frame scores while exercising
    pub average_quality: Option<f32>,
    pub trend: QualityTrend,
    pub phase: RepetitionPhase,
    pub readiness: ReadinessState,
    pub frames_analyzed: u64,
    pub total_errors: u32,
}

/// Extended-mode summary bundling session and validator data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScientificReport {
    pub exercise: ExerciseType,
    pub mode: DetectionMode,
    pub session_duration_ms: u64,
    pub effective_fps: f32,
    pub frames_analyzed: u64,
    pub repetitions: u32,
    pub average_quality: Option<f32>,
    pub error_distribution: BTreeMap<ErrorType, u32>,
    pub validation: Option<ValidationReport>,
    pub recommendations: Vec<String>,
}

/// Posture analysis entry point for one frame stream
///
/// Single producer, in-order delivery: the caller drives `analyze` from one
/// thread/task. Run one analyzer per camera source.
pub struct PostureAnalyzer {
    config: AppConfig,
    session: Option<SessionAnalysisState>,
    validator: Option<PrecisionValidator>,
    telemetry: Option<Arc<TelemetryCollector>>,
}

impl PostureAnalyzer {
    /// Create an analyzer with no exercise selected
    ///
    /// # Returns
    /// * `Ok(PostureAnalyzer)` - Ready for `set_current_exercise`
    /// * `Err(SessionError::InvalidConfig)` - Configuration rejected
    pub fn new(config: AppConfig) -> Result<Self, SessionError> {
        if let Err(err) = config.validate() {
            log_session_error(&err, "PostureAnalyzer::new");
            return Err(err);
        }

        let validator = config
            .validation
            .enabled
            .then(|| PrecisionValidator::new(config.validation.clone()));

        Ok(Self {
            config,
            session: None,
            validator,
            telemetry: None,
        })
    }

    /// Create an analyzer and select an exercise in one step
    pub fn with_exercise(exercise: ExerciseType, config: AppConfig) -> Result<Self, SessionError> {
        let mut analyzer = Self::new(config)?;
        analyzer.set_current_exercise(exercise)?;
        Ok(analyzer)
    }

    /// Select the exercise and start a fresh session
    ///
    /// Fails fast when no profile is registered, since analysing without one
    /// would silently disable error detection.
    pub fn set_current_exercise(&mut self, exercise: ExerciseType) -> Result<(), SessionError> {
        let profile = profile_for(exercise).inspect_err(|err| {
            log_session_error(err, "set_current_exercise");
        })?;

        self.session = Some(SessionAnalysisState::new(profile, &self.config));
        if let Some(validator) = self.validator.as_mut() {
            validator.clear();
        }
        tracing::info!(
            "[PostureAnalyzer] Exercise set to {} (mode={:?})",
            exercise,
            self.config.errors.mode
        );
        Ok(())
    }

    pub fn current_exercise(&self) -> Option<ExerciseType> {
        self.session.as_ref().map(|s| s.profile().exercise)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn detection_mode(&self) -> DetectionMode {
        self.config.errors.mode
    }

    /// Switch detection mode; the running session keeps its other state
    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.config.errors.mode = mode;
        if let Some(session) = self.session.as_mut() {
            session.set_detection_mode(mode);
        }
    }

    /// Publish session events to `collector` from now on
    pub fn attach_telemetry(&mut self, collector: Arc<TelemetryCollector>) {
        self.telemetry = Some(collector);
    }

    /// Analyse one frame; the validator sees the measured processing time as latency
    pub fn analyze(&mut self, frame: &PoseFrame, angles: &AngleSet) -> FrameAnalysisResult {
        self.analyze_frame(frame, angles, frame.timestamp_ms, None)
    }

    /// Analyse one frame with caller-measured wall-clock timing for the validator
    ///
    /// Total: an incomplete or low-visibility frame yields a neutral result.
    pub fn analyze_timed(
        &mut self,
        frame: &PoseFrame,
        angles: &AngleSet,
        timing: FrameTiming,
    ) -> FrameAnalysisResult {
        self.analyze_frame(frame, angles, timing.received_at_ms, Some(timing.latency_ms))
    }

    fn analyze_frame(
        &mut self,
        frame: &PoseFrame,
        angles: &AngleSet,
        received_at_ms: u64,
        caller_latency_ms: Option<f32>,
    ) -> FrameAnalysisResult {
        let Some(session) = self.session.as_mut() else {
            return FrameAnalysisResult::neutral(ReadinessState::NotReady, 0);
        };

        let started = Instant::now();
        let exercise = session.profile().exercise;
        let step = session.step(frame, angles);
        let timing = FrameTiming {
            received_at_ms,
            latency_ms: caller_latency_ms
                .unwrap_or_else(|| started.elapsed().as_secs_f32() * 1000.0),
        };

        if let Some(transition) = step.transition {
            tracing::info!(
                "[PostureAnalyzer] {}: {:?} -> {:?} at {}ms",
                exercise,
                transition.from,
                transition.to,
                frame.timestamp_ms
            );
            if let Some(telemetry) = &self.telemetry {
                telemetry.publish(MetricEvent::ReadinessChanged {
                    exercise,
                    from: transition.from,
                    to: transition.to,
                    timestamp_ms: frame.timestamp_ms,
                });
            }
        }

        if step.repetition_completed {
            tracing::info!(
                "[PostureAnalyzer] {} repetition {} completed",
                exercise,
                step.result.repetition_count
            );
            if let Some(telemetry) = &self.telemetry {
                telemetry.publish(MetricEvent::Repetition {
                    exercise,
                    count: step.result.repetition_count,
                    timestamp_ms: frame.timestamp_ms,
                });
            }
        }

        if let Some(telemetry) = &self.telemetry {
            for error in &step.result.errors {
                telemetry.publish(MetricEvent::PostureError {
                    exercise,
                    error_type: error.error_type,
                    severity: error.severity,
                    confidence: error.confidence,
                    timestamp_ms: error.timestamp_ms,
                });
            }
        }

        if let Some(validator) = self.validator.as_mut() {
            let refreshed = validator.record_frame(
                session.profile(),
                frame,
                angles,
                timing,
                session.preference_margin(),
            );
            if let (Some(report), Some(telemetry)) = (refreshed, &self.telemetry) {
                telemetry.publish(MetricEvent::ValidationRefresh {
                    overall_precision: report.precision.overall_precision,
                    fps: report.performance.fps,
                    avg_latency_ms: report.performance.avg_latency_ms,
                    within_targets: report.is_within_targets,
                });
            }
        }

        step.result
    }

    /// Clear every counter, buffer and cooldown back to session start
    ///
    /// Idempotent; the exercise selection and reference data are kept.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            *session = SessionAnalysisState::new(session.profile(), &self.config);
        }
        match self.validator.as_mut() {
            Some(validator) => validator.clear(),
            None if self.config.validation.enabled => {
                self.validator = Some(PrecisionValidator::new(self.config.validation.clone()));
            }
            None => {}
        }
        tracing::debug!("[PostureAnalyzer] Session reset");
    }

    /// Reset and release the validator's buffers
    ///
    /// Idempotent. A later `reset` re-creates the validator when enabled.
    pub fn dispose(&mut self) {
        if let Some(session) = self.session.as_mut() {
            *session = SessionAnalysisState::new(session.profile(), &self.config);
        }
        self.validator = None;
        tracing::debug!("[PostureAnalyzer] Disposed");
    }

    pub fn readiness_state(&self) -> ReadinessState {
        self.session
            .as_ref()
            .map(|s| s.readiness_state())
            .unwrap_or(ReadinessState::NotReady)
    }

    /// Setup guidance for the UI
    pub fn readiness_message(&self) -> String {
        match &self.session {
            Some(session) => session.readiness_message(),
            None => "Select an exercise to begin".to_string(),
        }
    }

    pub fn session(&self) -> Option<&SessionAnalysisState> {
        self.session.as_ref()
    }

    pub fn session_stats(&self) -> Result<SessionStats, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotConfigured)?;
        Ok(SessionStats {
            exercise: session.profile().exercise,
            repetitions: session.repetition_count(),
            average_quality: session.average_quality(),
            trend: session.quality_trend(),
            phase: session.phase(),
            readiness: session.readiness_state(),
            frames_analyzed: session.frames_analyzed(),
            total_errors: session.total_errors(),
        })
    }

    /// Session summary plus the latest validator snapshot
    ///
    /// The validation report is recomputed from the current window so the
    /// report reflects frames since the last periodic refresh.
    pub fn scientific_report(&self) -> Result<ScientificReport, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotConfigured)?;
        let validation = self.validator.as_ref().and_then(|v| {
            v.compute_report().or_else(|| v.latest_report().cloned())
        });
        let recommendations = validation
            .as_ref()
            .map(|r| r.recommendations.clone())
            .unwrap_or_default();

        Ok(ScientificReport {
            exercise: session.profile().exercise,
            mode: session.detection_mode(),
            session_duration_ms: session.duration_ms(),
            effective_fps: session.effective_fps(),
            frames_analyzed: session.frames_analyzed(),
            repetitions: session.repetition_count(),
            average_quality: session.average_quality(),
            error_distribution: session.error_counts().clone(),
            validation,
            recommendations,
        })
    }

    /// Load ground-truth angles for the validator's correlation metric
    ///
    /// Ignored when validation is disabled or the analyzer was disposed.
    pub fn load_reference(&mut self, reference: ReferenceTrace) {
        match self.validator.as_mut() {
            Some(validator) => validator.load_reference(reference),
            None => tracing::warn!("[PostureAnalyzer] Validator inactive; reference ignored"),
        }
    }

    pub fn clear_reference(&mut self) {
        if let Some(validator) = self.validator.as_mut() {
            validator.clear_reference();
        }
    }

    pub fn latest_validation(&self) -> Option<&ValidationReport> {
        self.validator.as_ref().and_then(|v| v.latest_report())
    }
}
