// Result-screen text for a completed test

use crate::analysis::interpreter::{FrequencyBand, StereoBand};
use crate::session::TestResult;

/// Render a completed result as multi-line text for display.
pub fn summarize(result: &TestResult) -> String {
    match result {
        TestResult::Frequency {
            optimal_frequency,
            lowest_heard_frequency,
            analysis_text,
        } => {
            let mut lines = vec![
                format!("Optimal frequency: {}", format_hz(*optimal_frequency)),
                format!(
                    "Lowest detectable frequency: {}",
                    format_hz(*lowest_heard_frequency)
                ),
                format!("Analysis: {}", analysis_text),
                String::new(),
                FrequencyBand::from_lowest_heard(*lowest_heard_frequency)
                    .advice()
                    .to_string(),
            ];
            if lowest_heard_frequency.is_none() {
                lines.push(
                    "No tone was heard. Raise the volume and try the test again.".to_string(),
                );
            }
            lines.join("\n")
        }
        TestResult::Stereo {
            accuracy_percent,
            correct_count,
            total_trials,
        } => {
            let band = StereoBand::from_accuracy(*accuracy_percent);
            format!(
                "Accuracy: {:.1}%\nCorrect: {}/{}\nAnalysis: {}\n\n{}",
                accuracy_percent,
                correct_count,
                total_trials,
                band.summary(),
                band.advice()
            )
        }
    }
}

fn format_hz(frequency: Option<u32>) -> String {
    match frequency {
        Some(hz) => format!("{} Hz", hz),
        None => "not detected".to_string(),
    }
}
