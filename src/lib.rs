// Form Coach Core - real-time exercise posture analysis
// Turns a pushed stream of estimated body landmarks into readiness guidance,
// repetition counts, form errors and quality scores.

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod pose;
pub mod profile;
pub mod telemetry;
pub mod validation;

// Re-exports for convenience
pub use analysis::{
    FrameAnalysisResult, PostureAnalyzer, PostureError, ReadinessState, RepetitionPhase,
    ScientificReport, SessionStats,
};
pub use config::{AppConfig, DetectionMode};
pub use error::{ErrorCode, SessionError, TraceError};
pub use pose::{AngleKind, AngleSet, Joint, Landmark, PoseFrame};
pub use profile::{ErrorType, ExerciseType};
pub use validation::{FrameTiming, ReferenceTrace, ValidationReport};
