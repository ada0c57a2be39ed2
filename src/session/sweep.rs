// FrequencySweepTest - descending pure-tone sweep
//
// The subject hears one tone per frequency, highest first, and rates each as
// cannot hear / faintly / clearly. Two metrics come out of the run:
// - lowest_heard_frequency: first frequency rated at least "faintly"
// - optimal_frequency: first frequency rated "clearly"
//
// Both are latched on the first qualifying response and never overwritten.

use crate::analysis::interpreter::FrequencyBand;
use crate::audio::{ChannelMask, ToneSpec};
use crate::config::{AppConfig, FrequencyTestConfig};
use crate::error::SessionError;
use crate::session::{HearingLevel, StepOutcome, TestPhase, TestProgress, TestResult};

/// Per-run sweep state. Created by `start()`, dropped on completion or reset.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySweepState {
    /// Sweep order, highest first
    pub frequencies: Vec<u32>,
    /// Index of the frequency currently presented
    pub current_index: usize,
    pub lowest_heard_frequency: Option<u32>,
    pub optimal_frequency: Option<u32>,
}

impl FrequencySweepState {
    fn new(frequencies: Vec<u32>) -> Self {
        Self {
            frequencies,
            current_index: 0,
            lowest_heard_frequency: None,
            optimal_frequency: None,
        }
    }

    fn record(&mut self, level: HearingLevel, frequency: u32) {
        match level {
            HearingLevel::CannotHear => {}
            HearingLevel::HearFaintly => {
                self.lowest_heard_frequency.get_or_insert(frequency);
            }
            HearingLevel::HearClearly => {
                self.lowest_heard_frequency.get_or_insert(frequency);
                self.optimal_frequency.get_or_insert(frequency);
            }
        }
    }
}

/// Frequency sensitivity test engine
pub struct FrequencySweepTest {
    /// One validated stimulus per sweep frequency, in sweep order
    stimuli: Vec<ToneSpec>,
    phase: TestPhase,
    state: Option<FrequencySweepState>,
    result: Option<TestResult>,
}

impl FrequencySweepTest {
    /// Create a sweep engine
    ///
    /// # Errors
    /// `SessionError::InvalidConfig` if the frequency list is empty, not
    /// strictly descending, or any tone fails `ToneSpec` validation.
    pub fn new(config: &FrequencyTestConfig, sample_rate_hz: u32) -> Result<Self, SessionError> {
        if config.frequencies_hz.is_empty() {
            return Err(SessionError::InvalidConfig {
                reason: "frequency sweep needs at least one frequency".to_string(),
            });
        }
        if config.frequencies_hz.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(SessionError::InvalidConfig {
                reason: format!(
                    "sweep frequencies must be strictly descending, got {:?}",
                    config.frequencies_hz
                ),
            });
        }

        let stimuli = config
            .frequencies_hz
            .iter()
            .map(|&frequency| {
                ToneSpec::new(
                    frequency,
                    config.tone_duration_ms,
                    sample_rate_hz,
                    config.amplitude,
                    ChannelMask::Both,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            stimuli,
            phase: TestPhase::NotStarted,
            state: None,
            result: None,
        })
    }

    /// Create a sweep engine from the application config
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SessionError> {
        Self::new(&config.frequency_test, config.audio.sample_rate_hz)
    }

    /// Begin a fresh run and return the first stimulus
    ///
    /// Allowed from `NotStarted` and `Completed` (a retake); rejected while
    /// a run is in progress.
    pub fn start(&mut self) -> Result<ToneSpec, SessionError> {
        self.ensure_not_running("start the frequency test")?;

        let frequencies = self.stimuli.iter().map(ToneSpec::frequency_hz).collect();
        self.state = Some(FrequencySweepState::new(frequencies));
        self.result = None;
        self.phase = TestPhase::Running;

        tracing::info!(
            "[FrequencySweep] Started sweep over {} frequencies",
            self.stimuli.len()
        );
        Ok(self.stimuli[0])
    }

    /// Stimulus for the current frequency. No side effects; safe to call for replays.
    pub fn current_stimulus(&self) -> Result<ToneSpec, SessionError> {
        let state = self.running_state("read the current stimulus")?;
        Ok(self.stimuli[state.current_index])
    }

    /// Record the subject's rating of the current tone and advance
    ///
    /// # Returns
    /// * `StepOutcome::Next` - the next tone to present
    /// * `StepOutcome::Completed` - the sweep is done; the result is also kept
    ///   for [`FrequencySweepTest::result`]
    ///
    /// # Errors
    /// `SessionError::InvalidStateTransition` outside `Running`. Nothing is
    /// recorded in that case.
    pub fn submit_response(&mut self, level: HearingLevel) -> Result<StepOutcome, SessionError> {
        let phase = self.phase;
        let state = self
            .state
            .as_mut()
            .filter(|_| phase == TestPhase::Running)
            .ok_or(SessionError::InvalidStateTransition {
                operation: "submit a response",
                phase,
            })?;

        let frequency = state.frequencies[state.current_index];
        state.record(level, frequency);
        tracing::debug!(
            "[FrequencySweep] {} Hz rated '{}' (lowest={:?}, optimal={:?})",
            frequency,
            level.display_name(),
            state.lowest_heard_frequency,
            state.optimal_frequency
        );

        state.current_index += 1;
        if state.current_index < state.frequencies.len() {
            return Ok(StepOutcome::Next(self.stimuli[state.current_index]));
        }

        let result = self.finish();
        Ok(StepOutcome::Completed(result))
    }

    fn finish(&mut self) -> TestResult {
        let (lowest, optimal) = self
            .state
            .take()
            .map(|state| (state.lowest_heard_frequency, state.optimal_frequency))
            .unwrap_or_default();

        let result = TestResult::Frequency {
            optimal_frequency: optimal,
            lowest_heard_frequency: lowest,
            analysis_text: FrequencyBand::from_lowest_heard(lowest)
                .summary()
                .to_string(),
        };

        tracing::info!(
            "[FrequencySweep] Completed: lowest={:?} Hz, optimal={:?} Hz",
            lowest,
            optimal
        );
        self.phase = TestPhase::Completed;
        self.result = Some(result.clone());
        result
    }

    /// Abandon any run and return to `NotStarted`
    pub fn reset(&mut self) {
        if self.phase == TestPhase::Running {
            tracing::info!("[FrequencySweep] Run abandoned");
        }
        self.state = None;
        self.result = None;
        self.phase = TestPhase::NotStarted;
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    /// Per-run state, present only while running
    pub fn state(&self) -> Option<&FrequencySweepState> {
        self.state.as_ref()
    }

    /// Result of the last completed run
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// Frequency currently presented, if running
    pub fn current_frequency(&self) -> Option<u32> {
        self.state
            .as_ref()
            .map(|state| state.frequencies[state.current_index])
    }

    /// 1-based position in the sweep, if running
    pub fn progress(&self) -> Option<TestProgress> {
        self.state.as_ref().map(|state| TestProgress {
            step: state.current_index + 1,
            total: state.frequencies.len(),
        })
    }

    fn ensure_not_running(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.phase == TestPhase::Running {
            return Err(SessionError::InvalidStateTransition {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn running_state(&self, operation: &'static str) -> Result<&FrequencySweepState, SessionError> {
        self.state
            .as_ref()
            .filter(|_| self.phase == TestPhase::Running)
            .ok_or(SessionError::InvalidStateTransition {
                operation,
                phase: self.phase,
            })
    }
}
