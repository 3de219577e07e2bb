// Pose trace loading error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Trace error code constants
///
/// Error code range: 4001-4003
pub struct TraceErrorCodes {}

impl TraceErrorCodes {
    /// Trace file could not be read
    pub const IO: i32 = 4001;

    /// Trace file is not valid trace JSON
    pub const PARSE: i32 = 4002;

    /// Trace contains no frames
    pub const EMPTY: i32 = 4003;
}

/// Log a trace error with structured context
pub fn log_trace_error(err: &TraceError, context: &str) {
    error!(
        "Trace error in {}: code={}, component=FixtureCatalog, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while loading recorded or synthetic pose traces
///
/// Error code ranges: 4001-4003
#[derive(Debug, Clone, PartialEq)]
pub enum TraceError {
    /// Reading the file failed
    Io { path: String, details: String },

    /// JSON did not match the trace schema
    Parse { path: String, details: String },

    /// Trace has zero frames
    Empty { path: String },
}

impl ErrorCode for TraceError {
    fn code(&self) -> i32 {
        match self {
            TraceError::Io { .. } => TraceErrorCodes::IO,
            TraceError::Parse { .. } => TraceErrorCodes::PARSE,
            TraceError::Empty { .. } => TraceErrorCodes::EMPTY,
        }
    }

    fn message(&self) -> String {
        match self {
            TraceError::Io { path, details } => {
                format!("Failed to read trace {}: {}", path, details)
            }
            TraceError::Parse { path, details } => {
                format!("Failed to parse trace {}: {}", path, details)
            }
            TraceError::Empty { path } => format!("Trace {} contains no frames", path),
        }
    }
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TraceError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for TraceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_error_codes() {
        let io = TraceError::Io {
            path: "a.trace.json".to_string(),
            details: "missing".to_string(),
        };
        assert_eq!(io.code(), 4001);
        assert!(io.message().contains("a.trace.json"));

        let empty = TraceError::Empty {
            path: "b.trace.json".to_string(),
        };
        assert_eq!(empty.code(), 4003);
        assert!(empty.message().contains("no frames"));
    }
}
