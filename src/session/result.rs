// Test results handed to presentation layers

use serde::{Deserialize, Serialize};

/// Which hearing test produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Frequency,
    Stereo,
}

impl TestKind {
    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            TestKind::Frequency => "Frequency sensitivity test",
            TestKind::Stereo => "Left/right hearing test",
        }
    }
}

/// Outcome of one completed run. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum TestResult {
    Frequency {
        /// First frequency rated "hear clearly"
        optimal_frequency: Option<u32>,
        /// First frequency rated at least "hear faintly"
        lowest_heard_frequency: Option<u32>,
        analysis_text: String,
    },
    Stereo {
        accuracy_percent: f64,
        correct_count: u32,
        total_trials: u32,
    },
}

impl TestResult {
    pub fn kind(&self) -> TestKind {
        match self {
            TestResult::Frequency { .. } => TestKind::Frequency,
            TestResult::Stereo { .. } => TestKind::Stereo,
        }
    }
}
