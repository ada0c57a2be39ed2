//! Integration tests for AppContext
//!
//! These tests drive both hearing tests end to end through the public API,
//! with a MemorySink standing in for the audio device:
//! - Stimulus playback on start, advance and replay
//! - Result metrics and interpretation text
//! - Retake and abandon flows
//! - Configuration loading

use hearing_check::analysis::{dominant_frequency, summarize};
use hearing_check::audio::{generate, ChannelMask, MemorySink};
use hearing_check::config::AppConfig;
use hearing_check::context::AppContext;
use hearing_check::error::{ErrorCode, SessionError, SessionErrorCodes};
use hearing_check::session::{Ear, HearingLevel, ScriptedPan, StepOutcome, TestKind, TestResult};

use hearing_check::session::HearingLevel::{CannotHear, HearClearly, HearFaintly};

fn scripted_context(pans: Vec<bool>) -> AppContext<MemorySink> {
    AppContext::new(AppConfig::default(), MemorySink::new())
        .with_pan_factory(move || Box::new(ScriptedPan::new(pans.clone())))
}

fn run_sweep(ctx: &mut AppContext<MemorySink>, responses: &[HearingLevel]) -> TestResult {
    ctx.start_frequency_test().expect("sweep should start");
    let mut last = None;
    for &level in responses {
        last = Some(ctx.respond_frequency(level).expect("response accepted"));
    }
    match last {
        Some(StepOutcome::Completed(result)) => result,
        other => panic!("sweep did not complete: {:?}", other),
    }
}

#[test]
fn test_frequency_sweep_end_to_end() {
    let mut ctx = scripted_context(vec![]);
    let result = run_sweep(
        &mut ctx,
        &[
            CannotHear,
            CannotHear,
            HearFaintly,
            HearClearly,
            CannotHear,
            CannotHear,
            CannotHear,
            CannotHear,
        ],
    );

    assert_eq!(
        result,
        TestResult::Frequency {
            optimal_frequency: Some(2000),
            lowest_heard_frequency: Some(4000),
            analysis_text: "normal young-adult range".to_string(),
        }
    );

    // One buffer per tone, in sweep order
    let played = ctx.sink().played();
    assert_eq!(played.len(), 8);
    let expected = [8000.0, 6000.0, 4000.0, 2000.0, 1000.0, 500.0, 250.0, 125.0];
    for (buffer, &freq) in played.iter().zip(&expected) {
        assert_eq!(buffer.sample_rate, 44_100);
        assert_eq!(buffer.samples.len(), 2 * 88_200);
        let detected = dominant_frequency(&buffer.samples, buffer.sample_rate, 1).unwrap();
        assert!(
            (detected - freq).abs() < 10.0,
            "expected ~{} Hz, detected {} Hz",
            freq,
            detected
        );
    }

    let text = summarize(ctx.last_result().unwrap());
    assert!(text.contains("Optimal frequency: 2000 Hz"));
    assert!(text.contains("Lowest detectable frequency: 4000 Hz"));
}

#[test]
fn test_frequency_sweep_interpretation_bands() {
    let cases: [(&[HearingLevel], &str); 3] = [
        (&[CannotHear; 8], "recommend full audiological exam"),
        (
            &[
                CannotHear, CannotHear, CannotHear, HearFaintly, CannotHear, CannotHear,
                CannotHear, CannotHear,
            ],
            "average adult range",
        ),
        (
            &[
                CannotHear, CannotHear, CannotHear, CannotHear, HearClearly, HearClearly,
                HearClearly, HearClearly,
            ],
            "possible mild high-frequency loss",
        ),
    ];

    for (responses, expected) in cases {
        let mut ctx = scripted_context(vec![]);
        match run_sweep(&mut ctx, responses) {
            TestResult::Frequency { analysis_text, .. } => assert_eq!(analysis_text, expected),
            other => panic!("expected frequency result, got {:?}", other),
        }
    }
}

#[test]
fn test_stereo_end_to_end() {
    let mut ctx = scripted_context(vec![true, false, true, true, false]);
    let first = ctx.start_stereo_test().unwrap();
    assert_eq!(first.frequency_hz(), 1000);
    assert_eq!(first.channel(), ChannelMask::Left);

    let answers = [Ear::Left, Ear::Left, Ear::Left, Ear::Right, Ear::Right];
    let mut last = None;
    for ear in answers {
        last = Some(ctx.answer_stereo(ear).unwrap());
    }

    let result = match last {
        Some(StepOutcome::Completed(result)) => result,
        other => panic!("stereo test did not complete: {:?}", other),
    };
    assert_eq!(
        result,
        TestResult::Stereo {
            accuracy_percent: 60.0,
            correct_count: 3,
            total_trials: 5,
        }
    );

    // Every probe is silent on the opposite side
    let pans = [true, false, true, true, false];
    for (buffer, &is_left) in ctx.sink().played().iter().zip(&pans) {
        let silent = if is_left { 1 } else { 0 };
        assert!(buffer
            .samples
            .iter()
            .skip(silent)
            .step_by(2)
            .all(|&s| s == 0));
    }

    let text = summarize(&result);
    assert!(text.contains("Accuracy: 60.0%"));
    assert!(text.contains("Correct: 3/5"));
}

#[test]
fn test_replay_matches_generated_stimulus() {
    let mut ctx = scripted_context(vec![false]);
    ctx.start_stereo_test().unwrap();
    let spec = ctx.replay().unwrap();

    assert_eq!(spec.channel(), ChannelMask::Right);
    assert_eq!(ctx.sink().last().unwrap().samples, generate(&spec));
    assert_eq!(ctx.progress().unwrap().to_string(), "1/5");
}

#[test]
fn test_retake_after_stereo_uses_fresh_pan_source() {
    let mut ctx = scripted_context(vec![true]);
    ctx.start_stereo_test().unwrap();
    for _ in 0..5 {
        ctx.answer_stereo(Ear::Left).unwrap();
    }
    assert_eq!(ctx.last_result().unwrap().kind(), TestKind::Stereo);

    let first = ctx.retake().unwrap();
    assert_eq!(first.channel(), ChannelMask::Left);
    assert_eq!(ctx.active_kind(), Some(TestKind::Stereo));
    assert_eq!(ctx.progress().unwrap().step, 1);
}

#[test]
fn test_errors_carry_codes() {
    let mut ctx = scripted_context(vec![true]);
    let err = ctx.answer_stereo(Ear::Left).unwrap_err();
    assert_eq!(err.code(), SessionErrorCodes::INVALID_STATE_TRANSITION);
    assert!(err.message().contains("not started"));

    ctx.start_stereo_test().unwrap();
    let err = ctx.start_frequency_test().unwrap_err();
    assert_eq!(err.code(), SessionErrorCodes::INVALID_STATE_TRANSITION);
    assert!(err.message().contains("running"));

    let err = ctx.respond_frequency(HearClearly).unwrap_err();
    assert_eq!(err, SessionError::NoActiveSession);
    assert_eq!(err.code(), SessionErrorCodes::NO_ACTIVE_SESSION);
}

#[test]
fn test_responses_after_completion_rejected() {
    let mut ctx = scripted_context(vec![]);
    let result = run_sweep(&mut ctx, &[HearClearly; 8]);

    let err = ctx.respond_frequency(HearClearly).unwrap_err();
    assert_eq!(err.code(), SessionErrorCodes::INVALID_STATE_TRANSITION);
    assert!(err.message().contains("completed"));
    assert_eq!(ctx.last_result(), Some(&result));
    assert_eq!(ctx.sink().played().len(), 8);
}

#[test]
fn test_config_file_overrides() {
    let path = std::env::temp_dir().join(format!(
        "hearing-check-integration-{}.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        r#"{ "frequency_test": { "frequencies_hz": [4000, 1000], "tone_duration_ms": 100 },
             "stereo_test": { "total_trials": 2 } }"#,
    )
    .unwrap();

    let config = AppConfig::load_from_file(&path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.frequency_test.frequencies_hz, vec![4000, 1000]);
    assert_eq!(config.stereo_test.total_trials, 2);
    assert_eq!(config.audio.sample_rate_hz, 44_100);

    let mut ctx = AppContext::new(config, MemorySink::new());
    let first = ctx.start_frequency_test().unwrap();
    assert_eq!(first.duration_ms(), 100);
    assert_eq!(ctx.sink().last().unwrap().samples.len(), 2 * 4410);

    ctx.respond_frequency(HearClearly).unwrap();
    let outcome = ctx.respond_frequency(CannotHear).unwrap();
    assert!(outcome.is_completed());
    assert_eq!(ctx.sink().played().len(), 2);
}
