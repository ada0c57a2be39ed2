// Tone synthesis error types

use crate::error::ErrorCode;
use std::fmt;

/// Tone error code constants
///
/// Error code range: 1001-1099
pub struct ToneErrorCodes {}

impl ToneErrorCodes {
    /// ToneSpec parameters are out of range
    pub const INVALID_INPUT: i32 = 1001;
}

/// Errors raised while building a [`crate::audio::ToneSpec`]
///
/// Generation itself never fails; every malformed spec is rejected here first.
#[derive(Debug, Clone, PartialEq)]
pub enum ToneError {
    /// Frequency, duration, sample rate or amplitude out of range
    InvalidInput { reason: String },
}

impl ErrorCode for ToneError {
    fn code(&self) -> i32 {
        match self {
            ToneError::InvalidInput { .. } => ToneErrorCodes::INVALID_INPUT,
        }
    }

    fn message(&self) -> String {
        match self {
            ToneError::InvalidInput { reason } => format!("Invalid tone: {}", reason),
        }
    }
}

impl fmt::Display for ToneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ToneError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for ToneError {}
