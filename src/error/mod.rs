// Error types for the hearing check core
//
// This module defines custom error types for tone synthesis, test sessions and
// audio output, providing structured error handling with stable error codes
// that presentation layers can switch on.

mod audio;
mod session;
mod tone;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use session::{log_session_error, SessionError, SessionErrorCodes};
pub use tone::{ToneError, ToneErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// whatever shell drives the tests.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
