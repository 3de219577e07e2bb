// Session setup error types and constants

use crate::error::ErrorCode;
use crate::profile::ExerciseType;
use log::error;
use std::fmt;

/// Session error code constants
///
/// Error code range: 3001-3004
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Exercise name could not be resolved to an ExerciseType
    pub const UNKNOWN_EXERCISE: i32 = 3001;

    /// No profile registered for the exercise
    pub const MISSING_PROFILE: i32 = 3002;

    /// Configuration rejected by validation
    pub const INVALID_CONFIG: i32 = 3003;

    /// Operation requires an exercise to be selected first
    pub const NOT_CONFIGURED: i32 = 3004;
}

/// Log a session error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=PostureAnalyzer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Session-level errors
///
/// These errors are raised at exercise selection and configuration time.
/// Proceeding with an undefined profile would silently disable error
/// detection, so these fail fast.
///
/// Error code ranges: 3001-3004
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Exercise name not recognised
    UnknownExercise { name: String },

    /// Registry has no profile for this exercise
    MissingProfile { exercise: ExerciseType },

    /// Configuration value out of range
    InvalidConfig { reason: String },

    /// No exercise selected yet
    NotConfigured,
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::UnknownExercise { .. } => SessionErrorCodes::UNKNOWN_EXERCISE,
            SessionError::MissingProfile { .. } => SessionErrorCodes::MISSING_PROFILE,
            SessionError::InvalidConfig { .. } => SessionErrorCodes::INVALID_CONFIG,
            SessionError::NotConfigured => SessionErrorCodes::NOT_CONFIGURED,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::UnknownExercise { name } => {
                format!("Unknown exercise type: {:?}", name)
            }
            SessionError::MissingProfile { exercise } => {
                format!("No exercise profile registered for {}", exercise)
            }
            SessionError::InvalidConfig { reason } => {
                format!("Invalid configuration: {}", reason)
            }
            SessionError::NotConfigured => {
                "No exercise selected. Call set_current_exercise() first.".to_string()
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SessionError {}
