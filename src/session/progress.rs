// Progress and response types shared with presentation layers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How well the subject heard the current sweep tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingLevel {
    CannotHear,
    HearFaintly,
    HearClearly,
}

impl HearingLevel {
    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            HearingLevel::CannotHear => "cannot hear",
            HearingLevel::HearFaintly => "hear faintly",
            HearingLevel::HearClearly => "hear clearly",
        }
    }
}

/// Error returned when a response token is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResponseError {
    pub input: String,
    pub expected: &'static str,
}

impl fmt::Display for ParseResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised response '{}' (expected {})", self.input, self.expected)
    }
}

impl std::error::Error for ParseResponseError {}

impl FromStr for HearingLevel {
    type Err = ParseResponseError;

    /// Accepts `0`/`n`/`no`/`cannot`, `1`/`f`/`faint`/`faintly`,
    /// `2`/`c`/`y`/`clear`/`clearly` (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "n" | "no" | "cannot" | "cannot_hear" => Ok(HearingLevel::CannotHear),
            "1" | "f" | "faint" | "faintly" | "hear_faintly" => Ok(HearingLevel::HearFaintly),
            "2" | "c" | "y" | "clear" | "clearly" | "hear_clearly" => {
                Ok(HearingLevel::HearClearly)
            }
            _ => Err(ParseResponseError {
                input: s.to_string(),
                expected: "n/f/c or 0/1/2",
            }),
        }
    }
}

/// Side named by the subject in the stereo test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ear {
    Left,
    Right,
}

impl Ear {
    pub fn is_left(self) -> bool {
        self == Ear::Left
    }
}

impl FromStr for Ear {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Ear::Left),
            "r" | "right" => Ok(Ear::Right),
            _ => Err(ParseResponseError {
                input: s.to_string(),
                expected: "l/r",
            }),
        }
    }
}

/// Position within a running test, for "progress n/N" labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestProgress {
    /// 1-based step currently being presented
    pub step: usize,
    /// Total steps in the run
    pub total: usize,
}

impl fmt::Display for TestProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.step, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hearing_level_parse() {
        assert_eq!("n".parse::<HearingLevel>(), Ok(HearingLevel::CannotHear));
        assert_eq!("0".parse::<HearingLevel>(), Ok(HearingLevel::CannotHear));
        assert_eq!(" Faint ".parse::<HearingLevel>(), Ok(HearingLevel::HearFaintly));
        assert_eq!("1".parse::<HearingLevel>(), Ok(HearingLevel::HearFaintly));
        assert_eq!("C".parse::<HearingLevel>(), Ok(HearingLevel::HearClearly));
        assert_eq!("2".parse::<HearingLevel>(), Ok(HearingLevel::HearClearly));
    }

    #[test]
    fn test_hearing_level_parse_rejects_unknown() {
        let err = "maybe".parse::<HearingLevel>().unwrap_err();
        assert_eq!(err.input, "maybe");
        assert!(err.to_string().contains("n/f/c"));
    }

    #[test]
    fn test_ear_parse() {
        assert_eq!("L".parse::<Ear>(), Ok(Ear::Left));
        assert_eq!("right".parse::<Ear>(), Ok(Ear::Right));
        assert!("both".parse::<Ear>().is_err());
        assert!(Ear::Left.is_left());
        assert!(!Ear::Right.is_left());
    }

    #[test]
    fn test_progress_display() {
        let progress = TestProgress { step: 3, total: 8 };
        assert_eq!(progress.to_string(), "3/8");
    }

    #[test]
    fn test_hearing_level_serde_names() {
        let json = serde_json::to_string(&HearingLevel::HearFaintly).unwrap();
        assert_eq!(json, "\"hear_faintly\"");
    }
}
