//! Fixture utilities for the deterministic CLI harness.
//!
//! This module discovers recorded pose traces on disk, parses optional
//! expectation JSON, and replays traces through a fresh `PostureAnalyzer`.
//! It is desktop-focused to support CI and QA workflows without a camera.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::{
    FrameAnalysisResult, PostureAnalyzer, ReadinessState, RepetitionPhase, ScientificReport,
};
use crate::config::{AppConfig, DetectionMode};
use crate::error::{SessionError, TraceError};
use crate::pose::{AngleSet, PoseFrame};
use crate::profile::{ErrorType, ExerciseType};
use crate::telemetry::{self, TelemetryCollector};
use crate::validation::FrameTiming;

pub mod synthetic;

/// Default location for pose trace assets.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

const TRACE_SUFFIX: &str = ".trace.json";
const EXPECT_SUFFIX: &str = ".expect.json";

/// One recorded frame of a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub frame: PoseFrame,
    /// Estimator-supplied angles; derived from the frame when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angles: Option<AngleSet>,
    /// Capture-to-result latency measured at recording time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f32>,
}

/// Recorded or synthetic pose stream for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseTrace {
    pub name: String,
    pub exercise: ExerciseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DetectionMode>,
    pub frames: Vec<TraceFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectations: Option<TraceExpectations>,
}

impl PoseTrace {
    /// Load and sanity-check a trace file
    pub fn from_file(path: &Path) -> Result<Self, TraceError> {
        let json = fs::read_to_string(path).map_err(|err| TraceError::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        })?;
        let trace: PoseTrace = serde_json::from_str(&json).map_err(|err| TraceError::Parse {
            path: path.display().to_string(),
            details: err.to_string(),
        })?;
        if trace.frames.is_empty() {
            return Err(TraceError::Empty {
                path: path.display().to_string(),
            });
        }
        Ok(trace)
    }
}

/// JSON expectation schema for trace verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceExpectations {
    #[serde(default)]
    pub repetitions: Option<u32>,
    #[serde(default)]
    pub final_phase: Option<RepetitionPhase>,
    /// Types that must be emitted at least once
    #[serde(default)]
    pub required_errors: Vec<ErrorType>,
    /// Types that must never be emitted
    #[serde(default)]
    pub forbidden_errors: Vec<ErrorType>,
}

impl TraceExpectations {
    pub fn from_file(path: &Path) -> Result<Self, TraceError> {
        let json = fs::read_to_string(path).map_err(|err| TraceError::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        })?;
        serde_json::from_str(&json).map_err(|err| TraceError::Parse {
            path: path.display().to_string(),
            details: err.to_string(),
        })
    }

    pub fn verify(&self, summary: &ReplaySummary) -> Result<(), ExpectationDiff> {
        let mut failures = Vec::new();

        if let Some(expected) = self.repetitions {
            if summary.repetitions != expected {
                failures.push(ExpectationFailure::RepetitionCount {
                    expected,
                    actual: summary.repetitions,
                });
            }
        }

        if let Some(expected) = self.final_phase {
            if summary.final_phase != expected {
                failures.push(ExpectationFailure::FinalPhase {
                    expected,
                    actual: summary.final_phase,
                });
            }
        }

        for error_type in &self.required_errors {
            if !summary.error_counts.contains_key(error_type) {
                failures.push(ExpectationFailure::MissingError {
                    error_type: *error_type,
                });
            }
        }

        for error_type in &self.forbidden_errors {
            if let Some(first_at_ms) = summary.first_error_ms.get(error_type) {
                failures.push(ExpectationFailure::ForbiddenError {
                    error_type: *error_type,
                    first_at_ms: *first_at_ms,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing a replay with expectations.
#[derive(Debug)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "failures": self.failures })
    }
}

/// Detailed diff entry for a single failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectationFailure {
    RepetitionCount { expected: u32, actual: u32 },
    FinalPhase {
        expected: RepetitionPhase,
        actual: RepetitionPhase,
    },
    MissingError { error_type: ErrorType },
    ForbiddenError { error_type: ErrorType, first_at_ms: u64 },
}

/// Metadata describing an available trace.
#[derive(Clone, Debug)]
pub struct TraceMetadata {
    pub name: String,
    pub trace_path: PathBuf,
    pub expect_path: Option<PathBuf>,
}

/// Catalog responsible for discovering traces on disk.
pub struct FixtureCatalog {
    root: PathBuf,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all traces by their metadata.
    pub fn discover(&self) -> Result<Vec<TraceMetadata>, TraceError> {
        let mut traces = Vec::new();
        if !self.root.exists() {
            return Ok(traces);
        }

        let io_error = |err: std::io::Error| TraceError::Io {
            path: self.root.display().to_string(),
            details: err.to_string(),
        };
        for entry in fs::read_dir(&self.root).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if !entry.file_type().map_err(io_error)?.is_file() {
                continue;
            }
            if let Some(metadata) = self.metadata_for_path(&entry.path()) {
                traces.push(metadata);
            }
        }

        traces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(traces)
    }

    /// Load a trace by name or path, applying an expectation file if present.
    ///
    /// `override_expect` wins over a sibling `<name>.expect.json`, which wins
    /// over expectations embedded in the trace.
    pub fn load(
        &self,
        trace: &str,
        override_expect: Option<PathBuf>,
    ) -> Result<(TraceMetadata, PoseTrace), TraceError> {
        let trace_path = self.resolve_trace_path(trace)?;
        let metadata = self
            .metadata_for_path(&trace_path)
            .unwrap_or_else(|| TraceMetadata {
                name: trace.to_string(),
                trace_path: trace_path.clone(),
                expect_path: None,
            });

        let mut pose_trace = PoseTrace::from_file(&trace_path)?;
        if let Some(path) = override_expect.or_else(|| metadata.expect_path.clone()) {
            pose_trace.expectations = Some(TraceExpectations::from_file(&path)?);
        }
        Ok((metadata, pose_trace))
    }

    fn resolve_trace_path(&self, trace: &str) -> Result<PathBuf, TraceError> {
        let as_path = Path::new(trace);
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }

        let candidate = self.root.join(format!("{trace}{TRACE_SUFFIX}"));
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(TraceError::Io {
                path: candidate.display().to_string(),
                details: format!("trace '{trace}' not found in {}", self.root.display()),
            })
        }
    }

    fn metadata_for_path(&self, path: &Path) -> Option<TraceMetadata> {
        let file_name = path.file_name()?.to_str()?;
        let name = file_name.strip_suffix(TRACE_SUFFIX)?.to_string();
        let expect_path = path.with_file_name(format!("{name}{EXPECT_SUFFIX}"));
        Some(TraceMetadata {
            name,
            trace_path: path.to_path_buf(),
            expect_path: expect_path.is_file().then_some(expect_path),
        })
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// Aggregate outcome of one trace replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub trace: String,
    pub exercise: ExerciseType,
    pub mode: DetectionMode,
    pub frames: usize,
    pub repetitions: u32,
    pub final_phase: RepetitionPhase,
    pub final_readiness: ReadinessState,
    pub error_counts: BTreeMap<ErrorType, u32>,
    /// Timestamp of the first emission per type
    pub first_error_ms: BTreeMap<ErrorType, u64>,
    pub average_quality: Option<f32>,
    pub report: ScientificReport,
}

/// Per-frame results plus the summary
#[derive(Debug, Clone)]
pub struct TraceReplay {
    pub results: Vec<FrameAnalysisResult>,
    pub summary: ReplaySummary,
}

/// Replays traces through a fresh analyzer per run.
pub struct TraceProcessor {
    config: AppConfig,
    telemetry: Option<Arc<TelemetryCollector>>,
}

impl TraceProcessor {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, collector: Arc<TelemetryCollector>) -> Self {
        self.telemetry = Some(collector);
        self
    }

    pub fn run(&self, trace: &PoseTrace) -> Result<TraceReplay, SessionError> {
        let mut config = self.config.clone();
        if let Some(mode) = trace.mode {
            config.errors.mode = mode;
        }
        let landmark_visibility = config.readiness.landmark_visibility;

        let mut analyzer = PostureAnalyzer::with_exercise(trace.exercise, config)?;
        if let Some(collector) = &self.telemetry {
            analyzer.attach_telemetry(Arc::clone(collector));
        }

        let mut results = Vec::with_capacity(trace.frames.len());
        let mut first_error_ms = BTreeMap::new();

        for trace_frame in &trace.frames {
            let angles = trace_frame
                .angles
                .unwrap_or_else(|| AngleSet::from_frame(&trace_frame.frame, landmark_visibility));
            // Recorded latency wins; otherwise the analyzer measures its own
            let result = match trace_frame.latency_ms {
                Some(latency_ms) => analyzer.analyze_timed(
                    &trace_frame.frame,
                    &angles,
                    FrameTiming {
                        received_at_ms: trace_frame.frame.timestamp_ms,
                        latency_ms,
                    },
                ),
                None => analyzer.analyze(&trace_frame.frame, &angles),
            };
            for error in &result.errors {
                first_error_ms
                    .entry(error.error_type)
                    .or_insert(error.timestamp_ms);
            }
            if let Some(latency_ms) = trace_frame.latency_ms {
                telemetry::hub().record_frame_latency(latency_ms);
            }
            if result.readiness == ReadinessState::Exercising {
                telemetry::hub().record_quality(result.quality_score);
            }
            results.push(result);
        }

        let stats = analyzer.session_stats()?;
        let report = analyzer.scientific_report()?;
        tracing::info!(
            "[TraceProcessor] {}: {} frames, {} reps, {} errors",
            trace.name,
            trace.frames.len(),
            stats.repetitions,
            stats.total_errors
        );

        let summary = ReplaySummary {
            trace: trace.name.clone(),
            exercise: trace.exercise,
            mode: analyzer.detection_mode(),
            frames: trace.frames.len(),
            repetitions: stats.repetitions,
            final_phase: stats.phase,
            final_readiness: stats.readiness,
            error_counts: report.error_distribution.clone(),
            first_error_ms,
            average_quality: stats.average_quality,
            report,
        };

        Ok(TraceReplay { results, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::synthetic::{SyntheticScenario, SyntheticSpec};
    use super::*;

    fn replay(spec: SyntheticSpec) -> TraceReplay {
        TraceProcessor::new(AppConfig::default())
            .run(&spec.build())
            .unwrap()
    }

    #[test]
    fn test_squat_trace_meets_its_expectations() {
        let trace = SyntheticSpec::new("squat", SyntheticScenario::SquatCycles { reps: 1 }).build();
        let replay = TraceProcessor::new(AppConfig::default()).run(&trace).unwrap();

        assert_eq!(replay.results.len(), trace.frames.len());
        assert_eq!(replay.summary.repetitions, 1);
        assert!(trace.expectations.unwrap().verify(&replay.summary).is_ok());
    }

    #[test]
    fn test_verify_reports_each_failure() {
        let replay = replay(SyntheticSpec::new(
            "squat",
            SyntheticScenario::SquatCycles { reps: 1 },
        ));
        let expectations = TraceExpectations {
            repetitions: Some(3),
            final_phase: Some(RepetitionPhase::Bottom),
            required_errors: vec![ErrorType::SpinalRounding],
            forbidden_errors: Vec::new(),
        };

        let diff = expectations.verify(&replay.summary).unwrap_err();
        assert_eq!(diff.failures.len(), 3);
        assert_eq!(
            diff.failures[0],
            ExpectationFailure::RepetitionCount {
                expected: 3,
                actual: 1
            }
        );
        let json = diff.to_json();
        assert_eq!(json["failures"][2]["kind"], "missing_error");
        assert_eq!(json["failures"][2]["error_type"], "SPINAL_ROUNDING");
    }

    #[test]
    fn test_forbidden_error_reports_first_timestamp() {
        let replay = replay(SyntheticSpec::new(
            "feet",
            SyntheticScenario::FeetTogether {
                ankle_spread: 0.08,
                reps: 1,
            },
        ));
        let expectations = TraceExpectations {
            forbidden_errors: vec![ErrorType::PoorAlignment],
            ..TraceExpectations::default()
        };

        let diff = expectations.verify(&replay.summary).unwrap_err();
        assert!(matches!(
            diff.failures[0],
            ExpectationFailure::ForbiddenError {
                error_type: ErrorType::PoorAlignment,
                first_at_ms: 0
            }
        ));
    }

    #[test]
    fn test_missing_angles_are_derived_from_frames() {
        let mut trace =
            SyntheticSpec::new("derived", SyntheticScenario::SquatCycles { reps: 0 }).build();
        for frame in &mut trace.frames {
            frame.angles = None;
        }
        let replay = TraceProcessor::new(AppConfig::default()).run(&trace).unwrap();
        assert_eq!(replay.summary.frames, trace.frames.len());
        assert_eq!(replay.summary.repetitions, 0);
    }

    #[test]
    fn test_trace_mode_overrides_config() {
        let mut spec = SyntheticSpec::new("sci", SyntheticScenario::SquatCycles { reps: 1 });
        spec.mode = Some(DetectionMode::Scientific);
        assert_eq!(replay(spec).summary.mode, DetectionMode::Scientific);
    }

    #[test]
    fn test_missing_root_discovers_nothing() {
        let catalog = FixtureCatalog::new("/nonexistent/form_coach/fixtures");
        assert!(catalog.discover().unwrap().is_empty());
        assert!(matches!(
            catalog.load("missing", None),
            Err(TraceError::Io { .. })
        ));
    }
}
