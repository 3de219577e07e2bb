// Validation module - precision and performance self-diagnosis
//
// An independent, lower-frequency monitor over a rolling window of frames.
// It never influences coaching feedback: the analyzer feeds it every frame
// on a side channel and it recomputes a report every `refresh_every`
// recorded frames.
//
// Architecture:
// - precision: angular/spatial/temporal/correlation/stability metrics
// - performance: fps, latency, frame drops, resource estimates
// - PrecisionValidator: rolling window + periodic ValidationReport

use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::analysis::history::RollingWindow;
use crate::config::ValidationConfig;
use crate::pose::{AngleSet, Landmark, PoseFrame};
use crate::profile::ExerciseProfile;

pub mod performance;
pub mod precision;

pub use performance::{BatteryImpact, FrameTiming, PerformanceMetrics};
pub use precision::PrecisionMetrics;

use precision::PrecisionSample;

/// Ground-truth tracked-angle sequence used for correlation
///
/// Frame `i` of the session is paired with `angles[i % len]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceTrace {
    pub angles: Vec<f32>,
}

impl ReferenceTrace {
    pub fn new(angles: Vec<f32>) -> Self {
        Self { angles }
    }

    pub fn angle_at(&self, frame_index: u64) -> Option<f32> {
        if self.angles.is_empty() {
            return None;
        }
        let idx = (frame_index % self.angles.len() as u64) as usize;
        self.angles.get(idx).copied()
    }
}

/// Snapshot produced on each refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub precision: PrecisionMetrics,
    pub performance: PerformanceMetrics,
    pub recommendations: Vec<String>,
    pub is_within_targets: bool,
    pub has_reference: bool,
    pub frames_in_window: usize,
    pub frames_recorded: u64,
}

#[derive(Debug, Clone)]
struct ValidationSample {
    precision: PrecisionSample,
    timing: FrameTiming,
}

pub struct PrecisionValidator {
    config: ValidationConfig,
    samples: RollingWindow<ValidationSample>,
    reference: Option<ReferenceTrace>,
    frames_recorded: u64,
    latest: Option<ValidationReport>,
}

impl PrecisionValidator {
    pub fn new(config: ValidationConfig) -> Self {
        let samples = RollingWindow::new(config.window);
        Self {
            config,
            samples,
            reference: None,
            frames_recorded: 0,
            latest: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record one frame; returns the fresh report when this frame triggered a refresh
    pub fn record_frame(
        &mut self,
        profile: &ExerciseProfile,
        frame: &PoseFrame,
        angles: &AngleSet,
        timing: FrameTiming,
        preference_margin: f32,
    ) -> Option<&ValidationReport> {
        if !self.config.enabled {
            return None;
        }

        let reference_angle = self
            .reference
            .as_ref()
            .and_then(|r| r.angle_at(self.frames_recorded));
        self.samples.push(ValidationSample {
            precision: PrecisionSample::capture(
                profile,
                frame,
                angles,
                preference_margin,
                reference_angle,
            ),
            timing,
        });
        self.frames_recorded += 1;

        let refresh_every = self.config.refresh_every.max(1) as u64;
        if self.frames_recorded % refresh_every != 0 {
            return None;
        }

        self.latest = self.compute_report();
        if let Some(report) = &self.latest {
            tracing::info!(
                "[Validator] precision={:.1} fps={:.1} latency={:.1}ms within_targets={}",
                report.precision.overall_precision,
                report.performance.fps,
                report.performance.avg_latency_ms,
                report.is_within_targets
            );
        }
        self.latest.as_ref()
    }

    /// Compute a report from the current window (needs at least two frames)
    pub fn compute_report(&self) -> Option<ValidationReport> {
        if self.samples.len() < 2 {
            return None;
        }

        let precision_samples: Vec<&PrecisionSample> =
            self.samples.iter().map(|s| &s.precision).collect();
        let timings: Vec<FrameTiming> = self.samples.iter().map(|s| s.timing).collect();

        let precision = precision::compute(&precision_samples, &self.config);
        let performance = performance::compute(&timings, &self.config, self.retained_bytes());
        let has_reference = self.reference.is_some();

        Some(ValidationReport {
            recommendations: self.recommendations(&precision, &performance, has_reference),
            is_within_targets: self.within_targets(&precision, &performance, has_reference),
            precision,
            performance,
            has_reference,
            frames_in_window: self.samples.len(),
            frames_recorded: self.frames_recorded,
        })
    }

    pub fn latest_report(&self) -> Option<&ValidationReport> {
        self.latest.as_ref()
    }

    pub fn load_reference(&mut self, reference: ReferenceTrace) {
        tracing::info!("[Validator] Loaded reference trace ({} angles)", reference.angles.len());
        self.reference = Some(reference);
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn frames_recorded(&self) -> u64 {
        self.frames_recorded
    }

    /// Drop every buffered frame and report; the reference trace is kept
    pub fn clear(&mut self) {
        self.samples.clear();
        self.frames_recorded = 0;
        self.latest = None;
    }

    fn retained_bytes(&self) -> usize {
        self.samples
            .iter()
            .map(|s| {
                size_of::<ValidationSample>() + s.precision.landmarks.len() * size_of::<Landmark>()
            })
            .sum()
    }

    /// Correlation only gates when reference data exists; the neutral value is informational
    fn within_targets(
        &self,
        precision: &PrecisionMetrics,
        performance: &PerformanceMetrics,
        has_reference: bool,
    ) -> bool {
        let c = &self.config;
        precision.angular_accuracy >= c.target_angular_accuracy
            && (!has_reference || precision.correlation_coefficient >= c.target_correlation)
            && performance.avg_latency_ms <= c.target_latency_ms
            && performance.fps >= c.target_fps
    }

    fn recommendations(
        &self,
        precision: &PrecisionMetrics,
        performance: &PerformanceMetrics,
        has_reference: bool,
    ) -> Vec<String> {
        let c = &self.config;
        let mut out = Vec::new();

        if precision.angular_accuracy < c.target_angular_accuracy {
            out.push(format!(
                "Improve angular calibration: accuracy {:.1} is below {:.0}",
                precision.angular_accuracy, c.target_angular_accuracy
            ));
        }
        if precision.spatial_accuracy < 80.0 {
            out.push("Reduce tracking noise: steady the camera or improve lighting".to_string());
        }
        if has_reference && precision.correlation_coefficient < c.target_correlation {
            out.push(format!(
                "Check reference alignment: correlation {:.1} is below {:.0}",
                precision.correlation_coefficient, c.target_correlation
            ));
        }
        if performance.avg_latency_ms > c.target_latency_ms {
            out.push(format!(
                "Reduce latency: mean {:.0}ms exceeds {:.0}ms",
                performance.avg_latency_ms, c.target_latency_ms
            ));
        }
        if performance.fps < c.target_fps {
            out.push(format!(
                "Increase frame rate: {:.1} fps is below {:.0}",
                performance.fps, c.target_fps
            ));
        }
        if performance.frame_drops > 0 {
            out.push(format!(
                "Investigate {} dropped frame gap(s)",
                performance.frame_drops
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{AngleKind, Joint};
    use crate::profile::{profile_for, ExerciseType};

    fn ideal_angles(profile: &ExerciseProfile) -> AngleSet {
        let mut angles = AngleSet::new();
        for (kind, threshold) in &profile.thresholds {
            angles.set(*kind, threshold.ideal);
        }
        angles
    }

    fn still_frame(ts: u64) -> PoseFrame {
        let mut frame = PoseFrame::empty(ts);
        for (i, joint) in Joint::ALL.iter().enumerate() {
            frame.set(*joint, Landmark::visible(0.3 + i as f32 * 0.01, 0.5));
        }
        frame
    }

    fn feed(
        validator: &mut PrecisionValidator,
        frames: u64,
        latency_ms: f32,
        interval_ms: u64,
    ) -> Vec<ValidationReport> {
        let profile = profile_for(ExerciseType::Squat).unwrap();
        let angles = ideal_angles(profile);
        let mut reports = Vec::new();
        for i in 0..frames {
            let timing = FrameTiming {
                received_at_ms: i * interval_ms,
                latency_ms,
            };
            if let Some(r) =
                validator.record_frame(profile, &still_frame(i * interval_ms), &angles, timing, 0.1)
            {
                reports.push(r.clone());
            }
        }
        reports
    }

    #[test]
    fn test_refreshes_every_ten_frames() {
        let mut validator = PrecisionValidator::new(ValidationConfig::default());
        let reports = feed(&mut validator, 40, 10.0, 33);
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[3].frames_in_window, 30);
        assert_eq!(validator.frames_recorded(), 40);
    }

    #[test]
    fn test_ideal_still_stream_is_within_targets() {
        let mut validator = PrecisionValidator::new(ValidationConfig::default());
        feed(&mut validator, 40, 10.0, 33);
        let report = validator.latest_report().unwrap();

        assert!(report.precision.angular_accuracy > 90.0);
        assert!(report.precision.frame_stability > 90.0);
        assert_eq!(report.precision.correlation_coefficient, 85.0);
        assert!(report.is_within_targets);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_slow_stream_gets_recommendations() {
        let mut validator = PrecisionValidator::new(ValidationConfig::default());
        feed(&mut validator, 20, 150.0, 66);
        let report = validator.latest_report().unwrap();

        assert!(!report.is_within_targets);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Reduce latency")));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Increase frame rate")));
    }

    #[test]
    fn test_out_of_range_angles_recommend_calibration() {
        let profile = profile_for(ExerciseType::Squat).unwrap();
        let angles = AngleSet::new()
            .with(AngleKind::LeftKnee, 40.0)
            .with(AngleKind::RightKnee, 40.0);
        let mut validator = PrecisionValidator::new(ValidationConfig::default());
        for i in 0..10u64 {
            let timing = FrameTiming {
                received_at_ms: i * 33,
                latency_ms: 10.0,
            };
            validator.record_frame(profile, &still_frame(i * 33), &angles, timing, 0.1);
        }
        let report = validator.latest_report().unwrap();
        assert!(report.precision.angular_accuracy < 90.0);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Improve angular calibration")));
    }

    #[test]
    fn test_reference_gates_correlation() {
        let mut validator = PrecisionValidator::new(ValidationConfig::default());
        // Flat reference: correlation is undefined and stays neutral, but now gates
        validator.load_reference(ReferenceTrace::new(vec![170.0]));
        feed(&mut validator, 10, 10.0, 33);
        let report = validator.latest_report().unwrap();
        assert!(report.has_reference);
        assert_eq!(report.precision.correlation_coefficient, 85.0);
        assert!(!report.is_within_targets);

        validator.clear_reference();
        assert!(!validator.has_reference());
    }

    #[test]
    fn test_disabled_validator_records_nothing() {
        let mut validator = PrecisionValidator::new(ValidationConfig {
            enabled: false,
            ..ValidationConfig::default()
        });
        assert!(feed(&mut validator, 20, 10.0, 33).is_empty());
        assert_eq!(validator.frames_recorded(), 0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut validator = PrecisionValidator::new(ValidationConfig::default());
        validator.clear();
        feed(&mut validator, 10, 10.0, 33);
        validator.clear();
        validator.clear();
        assert!(validator.latest_report().is_none());
        assert!(validator.compute_report().is_none());
    }
}
