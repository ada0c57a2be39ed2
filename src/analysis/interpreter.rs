// ResultInterpreter - threshold tables from metrics to display text
//
// Thresholds are illustrative heuristics, not audiological criteria.
// Every function here is pure: the same metrics always map to the same band.

use serde::{Deserialize, Serialize};

use crate::session::TestResult;

/// Band for the lowest frequency heard in the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyBand {
    /// lowest heard >= 4000 Hz
    NormalYoungAdult,
    /// lowest heard >= 2000 Hz
    AverageAdult,
    /// lowest heard >= 1000 Hz
    MildHighFrequencyLoss,
    /// below 1000 Hz, or nothing heard at all
    FullExamRecommended,
}

impl FrequencyBand {
    /// Classify a sweep's `lowest_heard_frequency`. Unset falls to the last band.
    pub fn from_lowest_heard(lowest_heard_hz: Option<u32>) -> Self {
        match lowest_heard_hz {
            Some(hz) if hz >= 4000 => FrequencyBand::NormalYoungAdult,
            Some(hz) if hz >= 2000 => FrequencyBand::AverageAdult,
            Some(hz) if hz >= 1000 => FrequencyBand::MildHighFrequencyLoss,
            _ => FrequencyBand::FullExamRecommended,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            FrequencyBand::NormalYoungAdult => "normal young-adult range",
            FrequencyBand::AverageAdult => "average adult range",
            FrequencyBand::MildHighFrequencyLoss => "possible mild high-frequency loss",
            FrequencyBand::FullExamRecommended => "recommend full audiological exam",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            FrequencyBand::NormalYoungAdult => {
                "Your hearing is within the normal range for young adults."
            }
            FrequencyBand::AverageAdult => "Your hearing is at the level of an average adult.",
            FrequencyBand::MildHighFrequencyLoss => {
                "Your high-frequency hearing may be slightly reduced."
            }
            FrequencyBand::FullExamRecommended => {
                "A comprehensive hearing examination is recommended."
            }
        }
    }
}

/// Band for stereo discrimination accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StereoBand {
    /// accuracy >= 80%
    Excellent,
    /// accuracy >= 60%
    Average,
    /// below 60%
    Difficulty,
}

impl StereoBand {
    pub fn from_accuracy(accuracy_percent: f64) -> Self {
        if accuracy_percent >= 80.0 {
            StereoBand::Excellent
        } else if accuracy_percent >= 60.0 {
            StereoBand::Average
        } else {
            StereoBand::Difficulty
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            StereoBand::Excellent => "excellent",
            StereoBand::Average => "average, consider retesting in quieter conditions",
            StereoBand::Difficulty => "may have difficulty, consider professional consultation",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            StereoBand::Excellent => {
                "You show excellent left/right discrimination.\n\
                 Both ears are working in good balance."
            }
            StereoBand::Average => {
                "Your left/right discrimination is average.\n\
                 Try again with more focus, or check the condition\n\
                 of your headphones or earphones."
            }
            StereoBand::Difficulty => {
                "You may have difficulty telling left from right.\n\
                 Retest in a quiet environment, or consult\n\
                 a hearing specialist."
            }
        }
    }
}

/// Band summary for the sweep's lowest heard frequency
pub fn interpret_frequency(lowest_heard_hz: Option<u32>) -> &'static str {
    FrequencyBand::from_lowest_heard(lowest_heard_hz).summary()
}

/// Band summary for a stereo accuracy percentage
pub fn interpret_stereo(accuracy_percent: f64) -> &'static str {
    StereoBand::from_accuracy(accuracy_percent).summary()
}

/// Band summary for any completed result
pub fn interpret(result: &TestResult) -> &'static str {
    match result {
        TestResult::Frequency {
            lowest_heard_frequency,
            ..
        } => interpret_frequency(*lowest_heard_frequency),
        TestResult::Stereo {
            accuracy_percent, ..
        } => interpret_stereo(*accuracy_percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_band_boundaries() {
        let cases = [
            (Some(8000), FrequencyBand::NormalYoungAdult),
            (Some(4000), FrequencyBand::NormalYoungAdult),
            (Some(3999), FrequencyBand::AverageAdult),
            (Some(2000), FrequencyBand::AverageAdult),
            (Some(1999), FrequencyBand::MildHighFrequencyLoss),
            (Some(1000), FrequencyBand::MildHighFrequencyLoss),
            (Some(999), FrequencyBand::FullExamRecommended),
            (Some(125), FrequencyBand::FullExamRecommended),
            (None, FrequencyBand::FullExamRecommended),
        ];

        for (lowest, expected) in cases {
            assert_eq!(
                FrequencyBand::from_lowest_heard(lowest),
                expected,
                "lowest={:?}",
                lowest
            );
        }
    }

    #[test]
    fn test_stereo_band_boundaries() {
        assert_eq!(StereoBand::from_accuracy(100.0), StereoBand::Excellent);
        assert_eq!(StereoBand::from_accuracy(80.0), StereoBand::Excellent);
        assert_eq!(StereoBand::from_accuracy(79.9), StereoBand::Average);
        assert_eq!(StereoBand::from_accuracy(60.0), StereoBand::Average);
        assert_eq!(StereoBand::from_accuracy(59.9), StereoBand::Difficulty);
        assert_eq!(StereoBand::from_accuracy(0.0), StereoBand::Difficulty);
    }

    #[test]
    fn test_interpret_texts() {
        assert_eq!(interpret_frequency(Some(2000)), "average adult range");
        assert_eq!(interpret_frequency(None), "recommend full audiological exam");
        assert_eq!(interpret_stereo(60.0), "average, consider retesting in quieter conditions");
        assert_eq!(interpret_stereo(40.0), "may have difficulty, consider professional consultation");
    }

    #[test]
    fn test_interpret_result_deterministic() {
        let result = TestResult::Stereo {
            accuracy_percent: 80.0,
            correct_count: 4,
            total_trials: 5,
        };
        assert_eq!(interpret(&result), "excellent");
        assert_eq!(interpret(&result), interpret(&result.clone()));

        let result = TestResult::Frequency {
            optimal_frequency: Some(1000),
            lowest_heard_frequency: Some(1000),
            analysis_text: "possible mild high-frequency loss".to_string(),
        };
        assert_eq!(interpret(&result), "possible mild high-frequency loss");
    }
}
