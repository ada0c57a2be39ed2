// StereoDiscriminationTest - left/right channel identification
//
// Each trial plays the same probe tone on one channel chosen by a fair coin
// flip. The subject names the side; the run yields an accuracy percentage.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::{ChannelMask, ToneSpec};
use crate::config::{AppConfig, StereoTestConfig};
use crate::error::SessionError;
use crate::session::{StepOutcome, TestPhase, TestProgress, TestResult};

/// Source of the per-trial channel choice
pub trait PanSource {
    /// `true` for left, `false` for right. Called once per trial.
    fn next_is_left(&mut self) -> bool;
}

impl<P: PanSource + ?Sized> PanSource for Box<P> {
    fn next_is_left(&mut self) -> bool {
        (**self).next_is_left()
    }
}

/// Independent, unbiased coin flips
pub struct RandomPan {
    rng: StdRng,
}

impl RandomPan {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixed seed, for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPan {
    fn default() -> Self {
        Self::new()
    }
}

impl PanSource for RandomPan {
    fn next_is_left(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

/// Replays a fixed channel sequence, wrapping around when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedPan {
    sequence: Vec<bool>,
    position: usize,
}

impl ScriptedPan {
    /// An empty sequence always pans right
    pub fn new(sequence: Vec<bool>) -> Self {
        Self {
            sequence,
            position: 0,
        }
    }
}

impl PanSource for ScriptedPan {
    fn next_is_left(&mut self) -> bool {
        if self.sequence.is_empty() {
            return false;
        }
        let is_left = self.sequence[self.position % self.sequence.len()];
        self.position += 1;
        is_left
    }
}

/// Per-run trial state. Created by `start()`, dropped on completion or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StereoTrialState {
    /// 1-based trial currently presented
    pub trial_number: u32,
    pub total_trials: u32,
    pub current_pan_is_left: bool,
    pub correct_count: u32,
}

/// Stereo discrimination test engine
pub struct StereoDiscriminationTest<P: PanSource = RandomPan> {
    /// Probe tone; its channel is replaced per trial
    probe: ToneSpec,
    total_trials: u32,
    pan: P,
    phase: TestPhase,
    state: Option<StereoTrialState>,
    result: Option<TestResult>,
}

impl StereoDiscriminationTest<RandomPan> {
    /// Engine with entropy-seeded coin flips
    pub fn with_random_pan(
        config: &StereoTestConfig,
        sample_rate_hz: u32,
    ) -> Result<Self, SessionError> {
        Self::new(config, sample_rate_hz, RandomPan::new())
    }
}

impl<P: PanSource> StereoDiscriminationTest<P> {
    /// Create a stereo engine
    ///
    /// # Errors
    /// `SessionError::InvalidConfig` if `total_trials` is 0 or the probe tone
    /// fails `ToneSpec` validation.
    pub fn new(
        config: &StereoTestConfig,
        sample_rate_hz: u32,
        pan: P,
    ) -> Result<Self, SessionError> {
        if config.total_trials == 0 {
            return Err(SessionError::InvalidConfig {
                reason: "stereo test needs at least one trial".to_string(),
            });
        }

        let probe = ToneSpec::new(
            config.frequency_hz,
            config.tone_duration_ms,
            sample_rate_hz,
            config.amplitude,
            ChannelMask::Both,
        )?;

        Ok(Self {
            probe,
            total_trials: config.total_trials,
            pan,
            phase: TestPhase::NotStarted,
            state: None,
            result: None,
        })
    }

    /// Create a stereo engine from the application config
    pub fn from_app_config(config: &AppConfig, pan: P) -> Result<Self, SessionError> {
        Self::new(&config.stereo_test, config.audio.sample_rate_hz, pan)
    }

    /// Begin a fresh run, draw trial 1's channel and return its stimulus
    ///
    /// Allowed from `NotStarted` and `Completed`; rejected while running.
    pub fn start(&mut self) -> Result<ToneSpec, SessionError> {
        if self.phase == TestPhase::Running {
            return Err(SessionError::InvalidStateTransition {
                operation: "start the stereo test",
                phase: self.phase,
            });
        }

        let state = StereoTrialState {
            trial_number: 1,
            total_trials: self.total_trials,
            current_pan_is_left: self.pan.next_is_left(),
            correct_count: 0,
        };
        self.state = Some(state);
        self.result = None;
        self.phase = TestPhase::Running;

        tracing::info!("[StereoTest] Started {} trials", self.total_trials);
        Ok(self.stimulus_for(&state))
    }

    /// Stimulus for the active trial. No side effects; safe to call for replays.
    pub fn current_stimulus(&self) -> Result<ToneSpec, SessionError> {
        match (&self.state, self.phase) {
            (Some(state), TestPhase::Running) => Ok(self.stimulus_for(state)),
            _ => Err(SessionError::InvalidStateTransition {
                operation: "read the current stimulus",
                phase: self.phase,
            }),
        }
    }

    /// Record which side the subject heard and advance
    ///
    /// # Errors
    /// `SessionError::InvalidStateTransition` outside `Running`. Nothing is
    /// recorded in that case.
    pub fn submit_answer(&mut self, selected_left: bool) -> Result<StepOutcome, SessionError> {
        let mut state = match (self.state, self.phase) {
            (Some(state), TestPhase::Running) => state,
            _ => {
                return Err(SessionError::InvalidStateTransition {
                    operation: "submit an answer",
                    phase: self.phase,
                })
            }
        };

        let correct = selected_left == state.current_pan_is_left;
        if correct {
            state.correct_count += 1;
        }
        tracing::debug!(
            "[StereoTest] Trial {}/{}: played {}, answered {} ({})",
            state.trial_number,
            state.total_trials,
            side_name(state.current_pan_is_left),
            side_name(selected_left),
            if correct { "correct" } else { "wrong" }
        );

        if state.trial_number >= state.total_trials {
            return Ok(StepOutcome::Completed(self.finish(state)));
        }

        state.trial_number += 1;
        state.current_pan_is_left = self.pan.next_is_left();
        self.state = Some(state);
        Ok(StepOutcome::Next(self.stimulus_for(&state)))
    }

    fn finish(&mut self, state: StereoTrialState) -> TestResult {
        let accuracy_percent =
            100.0 * f64::from(state.correct_count) / f64::from(state.total_trials);
        let result = TestResult::Stereo {
            accuracy_percent,
            correct_count: state.correct_count,
            total_trials: state.total_trials,
        };

        tracing::info!(
            "[StereoTest] Completed: {}/{} correct ({:.1}%)",
            state.correct_count,
            state.total_trials,
            accuracy_percent
        );
        self.state = None;
        self.phase = TestPhase::Completed;
        self.result = Some(result.clone());
        result
    }

    /// Abandon any run and return to `NotStarted`
    pub fn reset(&mut self) {
        if self.phase == TestPhase::Running {
            tracing::info!("[StereoTest] Run abandoned");
        }
        self.state = None;
        self.result = None;
        self.phase = TestPhase::NotStarted;
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    /// Per-run state, present only while running
    pub fn state(&self) -> Option<&StereoTrialState> {
        self.state.as_ref()
    }

    /// Result of the last completed run
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// 1-based trial position, if running
    pub fn progress(&self) -> Option<TestProgress> {
        self.state.as_ref().map(|state| TestProgress {
            step: state.trial_number as usize,
            total: state.total_trials as usize,
        })
    }

    fn stimulus_for(&self, state: &StereoTrialState) -> ToneSpec {
        self.probe.with_channel(ChannelMask::side(state.current_pan_is_left))
    }
}

fn side_name(is_left: bool) -> &'static str {
    if is_left {
        "left"
    } else {
        "right"
    }
}
