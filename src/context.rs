// AppContext: single owner of the running test and the output sink
// Presentation layers (the CLI, a UI shell) drive everything through here

use crate::audio::{generate, AudioSink, ToneSpec};
use crate::config::AppConfig;
use crate::error::{log_audio_error, log_session_error, AudioError, SessionError};
use crate::session::{
    Ear, FrequencySweepTest, HearingLevel, PanSource, RandomPan, StepOutcome,
    StereoDiscriminationTest, TestKind, TestPhase, TestProgress, TestResult,
};

/// Builds the channel chooser for each new stereo run
pub type PanFactory = Box<dyn Fn() -> Box<dyn PanSource>>;

/// The one test that may be running at a time
enum ActiveSession {
    Frequency(FrequencySweepTest),
    Stereo(StereoDiscriminationTest<Box<dyn PanSource>>),
}

impl ActiveSession {
    fn kind(&self) -> TestKind {
        match self {
            ActiveSession::Frequency(_) => TestKind::Frequency,
            ActiveSession::Stereo(_) => TestKind::Stereo,
        }
    }

    fn current_stimulus(&self) -> Result<ToneSpec, SessionError> {
        match self {
            ActiveSession::Frequency(test) => test.current_stimulus(),
            ActiveSession::Stereo(test) => test.current_stimulus(),
        }
    }

    fn progress(&self) -> Option<TestProgress> {
        match self {
            ActiveSession::Frequency(test) => test.progress(),
            ActiveSession::Stereo(test) => test.progress(),
        }
    }

    fn reset(&mut self) {
        match self {
            ActiveSession::Frequency(test) => test.reset(),
            ActiveSession::Stereo(test) => test.reset(),
        }
    }
}

/// AppContext: owns configuration, the audio sink and at most one running test
///
/// - Every new stimulus is synthesized and played as soon as the engine
///   produces it (start and each advance); `replay` plays it again.
/// - Playback failures never abort a test. They are logged and kept in
///   `last_playback_error` so the caller can tell the subject.
/// - The last completed result survives until the next completion, which
///   is what `retake` keys off.
pub struct AppContext<S: AudioSink> {
    config: AppConfig,
    sink: S,
    session: Option<ActiveSession>,
    last_result: Option<TestResult>,
    pan_factory: PanFactory,
    last_playback_error: Option<AudioError>,
}

impl<S: AudioSink> AppContext<S> {
    /// Create a context with entropy-seeded stereo panning
    pub fn new(config: AppConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            session: None,
            last_result: None,
            pan_factory: Box::new(random_pan),
            last_playback_error: None,
        }
    }

    /// Replace how stereo runs choose their channels (seeded or scripted runs)
    pub fn with_pan_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn PanSource> + 'static,
    {
        self.pan_factory = Box::new(factory);
        self
    }

    // ========================================================================
    // TEST LIFECYCLE
    // ========================================================================

    /// Start a frequency sweep and play its first tone
    ///
    /// # Errors
    /// - `InvalidStateTransition` if any test is already running
    /// - `InvalidConfig` if the frequency test configuration is unusable
    pub fn start_frequency_test(&mut self) -> Result<ToneSpec, SessionError> {
        self.ensure_idle("start the frequency test")?;

        let mut test = FrequencySweepTest::from_app_config(&self.config).map_err(|err| {
            log_session_error(&err, "start_frequency_test");
            err
        })?;
        let first = test.start()?;

        self.session = Some(ActiveSession::Frequency(test));
        self.play(&first);
        Ok(first)
    }

    /// Start a stereo discrimination run and play its first probe
    ///
    /// # Errors
    /// Same as [`AppContext::start_frequency_test`], for the stereo config.
    pub fn start_stereo_test(&mut self) -> Result<ToneSpec, SessionError> {
        self.ensure_idle("start the stereo test")?;

        let mut test = StereoDiscriminationTest::from_app_config(&self.config, (self.pan_factory)())
            .map_err(|err| {
                log_session_error(&err, "start_stereo_test");
                err
            })?;
        let first = test.start()?;

        self.session = Some(ActiveSession::Stereo(test));
        self.play(&first);
        Ok(first)
    }

    /// Play the current stimulus again. The test does not advance.
    pub fn replay(&mut self) -> Result<ToneSpec, SessionError> {
        let spec = self
            .session
            .as_ref()
            .ok_or(SessionError::NoActiveSession)
            .and_then(ActiveSession::current_stimulus)
            .map_err(|err| {
                log_session_error(&err, "replay");
                err
            })?;

        tracing::debug!("[AppContext] Replaying {} Hz", spec.frequency_hz());
        self.play(&spec);
        Ok(spec)
    }

    /// Rate the current sweep tone
    ///
    /// # Errors
    /// - `InvalidStateTransition` if no test is running (before start or after
    ///   completion)
    /// - `NoActiveSession` if the running test is the stereo test
    pub fn respond_frequency(&mut self, level: HearingLevel) -> Result<StepOutcome, SessionError> {
        let phase = self.phase();
        let outcome = match self.session.as_mut() {
            Some(ActiveSession::Frequency(test)) => test.submit_response(level),
            Some(_) => Err(SessionError::NoActiveSession),
            None => Err(SessionError::InvalidStateTransition {
                operation: "submit a response",
                phase,
            }),
        }
        .map_err(|err| {
            log_session_error(&err, "respond_frequency");
            err
        })?;

        self.advance(&outcome);
        Ok(outcome)
    }

    /// Name the side the current stereo probe came from
    ///
    /// # Errors
    /// - `InvalidStateTransition` if no test is running (before start or after
    ///   completion)
    /// - `NoActiveSession` if the running test is the frequency sweep
    pub fn answer_stereo(&mut self, ear: Ear) -> Result<StepOutcome, SessionError> {
        let phase = self.phase();
        let outcome = match self.session.as_mut() {
            Some(ActiveSession::Stereo(test)) => test.submit_answer(ear.is_left()),
            Some(_) => Err(SessionError::NoActiveSession),
            None => Err(SessionError::InvalidStateTransition {
                operation: "submit an answer",
                phase,
            }),
        }
        .map_err(|err| {
            log_session_error(&err, "answer_stereo");
            err
        })?;

        self.advance(&outcome);
        Ok(outcome)
    }

    /// Run the last completed kind of test again
    ///
    /// # Errors
    /// `NoActiveSession` if nothing has completed yet, otherwise whatever the
    /// matching `start_*` call returns.
    pub fn retake(&mut self) -> Result<ToneSpec, SessionError> {
        match self.last_result.as_ref().map(TestResult::kind) {
            Some(TestKind::Frequency) => self.start_frequency_test(),
            Some(TestKind::Stereo) => self.start_stereo_test(),
            None => {
                let err = SessionError::NoActiveSession;
                log_session_error(&err, "retake");
                Err(err)
            }
        }
    }

    /// Drop the running test without a result
    ///
    /// Returns `false` if nothing was running.
    pub fn abandon(&mut self) -> bool {
        match self.session.take() {
            Some(mut session) => {
                tracing::info!("[AppContext] Abandoned {}", session.kind().display_name());
                session.reset();
                self.stop_playback();
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Kind of the running test, if any
    pub fn active_kind(&self) -> Option<TestKind> {
        self.session.as_ref().map(ActiveSession::kind)
    }

    /// Phase of the context as a whole
    pub fn phase(&self) -> TestPhase {
        match (&self.session, &self.last_result) {
            (Some(_), _) => TestPhase::Running,
            (None, Some(_)) => TestPhase::Completed,
            (None, None) => TestPhase::NotStarted,
        }
    }

    pub fn progress(&self) -> Option<TestProgress> {
        self.session.as_ref().and_then(ActiveSession::progress)
    }

    pub fn last_result(&self) -> Option<&TestResult> {
        self.last_result.as_ref()
    }

    /// Most recent playback failure, cleared by the next successful play
    pub fn last_playback_error(&self) -> Option<&AudioError> {
        self.last_playback_error.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn ensure_idle(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.session.is_some() {
            let err = SessionError::InvalidStateTransition {
                operation,
                phase: TestPhase::Running,
            };
            log_session_error(&err, "AppContext");
            return Err(err);
        }
        Ok(())
    }

    fn advance(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Next(spec) => self.play(spec),
            StepOutcome::Completed(result) => {
                self.session = None;
                self.last_result = Some(result.clone());
                self.stop_playback();
                tracing::info!("[AppContext] {} completed", result.kind().display_name());
            }
        }
    }

    fn play(&mut self, spec: &ToneSpec) {
        let samples = generate(spec);
        match self.sink.play(&samples, spec.sample_rate_hz()) {
            Ok(()) => self.last_playback_error = None,
            Err(err) => {
                log_audio_error(&err, "AppContext::play");
                self.last_playback_error = Some(err);
            }
        }
    }

    fn stop_playback(&mut self) {
        if let Err(err) = self.sink.stop() {
            log_audio_error(&err, "AppContext::stop_playback");
            self.last_playback_error = Some(err);
        }
    }
}

fn random_pan() -> Box<dyn PanSource> {
    Box::new(RandomPan::new())
}
