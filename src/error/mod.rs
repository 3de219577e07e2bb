// Error types for the form coach analysis core
//
// This module defines custom error types for session setup and trace loading,
// providing structured error handling with numeric codes suitable for
// surfacing to the host application. Per-frame analysis never fails; only
// configuration-time calls return these errors.

mod session;
mod trace;

pub use session::{log_session_error, SessionError, SessionErrorCodes};
pub use trace::{log_trace_error, TraceError, TraceErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the host boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
