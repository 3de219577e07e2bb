//! Core telemetry event types describing session diagnostics exposed to
//! the CLI and to any subscriber attached to an analyzer.

use serde::{Deserialize, Serialize};

use crate::analysis::ReadinessState;
use crate::profile::{ErrorType, ExerciseType};

/// Diagnostic error codes surfaced via telemetry metrics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticError {
    FixtureLoad,
    InvalidConfig,
    Unknown,
}

/// Metric events covering session progress, detected errors, and validator output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MetricEvent {
    ReadinessChanged {
        exercise: ExerciseType,
        from: ReadinessState,
        to: ReadinessState,
        timestamp_ms: u64,
    },
    Repetition {
        exercise: ExerciseType,
        count: u32,
        timestamp_ms: u64,
    },
    PostureError {
        exercise: ExerciseType,
        error_type: ErrorType,
        severity: u8,
        confidence: f32,
        timestamp_ms: u64,
    },
    ValidationRefresh {
        overall_precision: f32,
        fps: f32,
        avg_latency_ms: f32,
        within_targets: bool,
    },
    Quality {
        score: u8,
    },
    Latency {
        avg_ms: f32,
        max_ms: f32,
        sample_count: usize,
    },
    Error {
        code: DiagnosticError,
        context: String,
    },
}
