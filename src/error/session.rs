// Test session error types and constants

use crate::error::{ErrorCode, ToneError};
use crate::session::TestPhase;
use log::error;
use std::fmt;

/// Session error code constants
///
/// Error code range: 2001-2099
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Operation is not allowed in the session's current phase
    pub const INVALID_STATE_TRANSITION: i32 = 2001;

    /// Test configuration cannot produce valid stimuli
    pub const INVALID_CONFIG: i32 = 2002;

    /// No session of the requested kind is active
    pub const NO_ACTIVE_SESSION: i32 = 2003;
}

/// Log a session error with structured context
///
/// Mirrors the audio error logger so both families show up with the same
/// `code=..., component=..., message=...` shape.
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=TestSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Test session errors
///
/// All of these are recoverable: the caller stepped outside the state machine
/// or handed it a configuration that cannot be synthesized.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// `operation` was called while the session was in `phase`
    InvalidStateTransition {
        operation: &'static str,
        phase: TestPhase,
    },

    /// Configuration rejected before the session was created
    InvalidConfig { reason: String },

    /// The context has no session that accepts this operation
    NoActiveSession,
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::InvalidStateTransition { .. } => {
                SessionErrorCodes::INVALID_STATE_TRANSITION
            }
            SessionError::InvalidConfig { .. } => SessionErrorCodes::INVALID_CONFIG,
            SessionError::NoActiveSession => SessionErrorCodes::NO_ACTIVE_SESSION,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::InvalidStateTransition { operation, phase } => {
                format!("Cannot {} while test is {}", operation, phase.display_name())
            }
            SessionError::InvalidConfig { reason } => {
                format!("Invalid test configuration: {}", reason)
            }
            SessionError::NoActiveSession => "No matching test session is active".to_string(),
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

impl From<ToneError> for SessionError {
    fn from(err: ToneError) -> Self {
        SessionError::InvalidConfig {
            reason: err.message(),
        }
    }
}
