// Session module - hearing test state machines
//
// Two independent engines share the same lifecycle:
// 1. FrequencySweepTest: descending pure-tone sweep, tri-state responses
// 2. StereoDiscriminationTest: randomly panned probe, left/right answers
//
// The lifecycle:
// 1. Create the engine from configuration (stimuli are validated up front)
// 2. start() -> Running, first stimulus returned
// 3. Submit one response per stimulus until the engine reports Completed
// 4. Read the TestResult; the per-run state has already been dropped

pub mod progress;
pub mod result;
pub mod stereo;
pub mod sweep;

pub use progress::{Ear, HearingLevel, TestProgress};
pub use result::{TestKind, TestResult};
pub use stereo::{PanSource, RandomPan, ScriptedPan, StereoDiscriminationTest, StereoTrialState};
pub use sweep::{FrequencySweepState, FrequencySweepTest};

use crate::audio::ToneSpec;

/// Lifecycle phase shared by both test engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    NotStarted,
    Running,
    Completed,
}

impl TestPhase {
    /// Get human-readable name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            TestPhase::NotStarted => "not started",
            TestPhase::Running => "running",
            TestPhase::Completed => "completed",
        }
    }
}

/// What a session does after accepting a response
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Still running; this is the stimulus to present next
    Next(ToneSpec),
    /// The run finished with this result
    Completed(TestResult),
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed(_))
    }
}
