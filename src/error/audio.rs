// Audio output error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Error code range: 3001-3099
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// Failed to open audio stream
    pub const STREAM_OPEN_FAILED: i32 = 3001;

    /// Hardware error occurred
    pub const HARDWARE_ERROR: i32 = 3002;

    /// Writing the stimulus to its destination failed
    pub const WRITE_FAILED: i32 = 3003;
}

/// Log an audio error with structured context
///
/// `context` names the caller (e.g. `"AppContext::play"`).
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=AudioSink, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio output errors
///
/// These errors come from sinks: opening a device stream, starting playback,
/// or writing a stimulus file. They never leave a test session in a bad state.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Failed to open audio stream
    StreamOpenFailed { reason: String },

    /// Hardware error occurred
    HardwareError { details: String },

    /// Stimulus could not be written (file sink, closed device)
    WriteFailed { reason: String },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::StreamOpenFailed { .. } => AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioError::HardwareError { .. } => AudioErrorCodes::HARDWARE_ERROR,
            AudioError::WriteFailed { .. } => AudioErrorCodes::WRITE_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open audio stream: {}", reason)
            }
            AudioError::HardwareError { details } => {
                format!("Hardware error: {}", details)
            }
            AudioError::WriteFailed { reason } => {
                format!("Failed to write stimulus: {}", reason)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::WriteFailed {
            reason: err.to_string(),
        }
    }
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::WriteFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_codes() {
        assert_eq!(
            AudioError::StreamOpenFailed {
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::STREAM_OPEN_FAILED
        );
        assert_eq!(
            AudioError::HardwareError {
                details: "test".to_string()
            }
            .code(),
            AudioErrorCodes::HARDWARE_ERROR
        );
        assert_eq!(
            AudioError::WriteFailed {
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::WRITE_FAILED
        );
    }

    #[test]
    fn test_audio_error_messages() {
        let err = AudioError::StreamOpenFailed {
            reason: "No default output device found".to_string(),
        };
        assert_eq!(
            err.message(),
            "Failed to open audio stream: No default output device found"
        );

        let err = AudioError::HardwareError {
            details: "device lost".to_string(),
        };
        assert_eq!(err.message(), "Hardware error: device lost");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: AudioError = io.into();
        assert_eq!(err.code(), AudioErrorCodes::WRITE_FAILED);
        assert!(err.message().contains("read-only"));
    }
}
