//! Configuration for the hearing tests
//!
//! Stimulus constants (frequency list, tone lengths, volumes, trial count)
//! have no calibration basis, so they live here as plain configuration with
//! defaults matching the shipped app. A JSON file can override any of them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sample rate used for every stimulus unless overridden
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;

/// Descending sweep order used by the frequency test
pub const DEFAULT_SWEEP_FREQUENCIES_HZ: [u32; 8] = [8000, 6000, 4000, 2000, 1000, 500, 250, 125];

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub frequency_test: FrequencyTestConfig,
    pub stereo_test: StereoTestConfig,
}

/// Audio output parameters shared by both tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of generated buffers in Hz
    pub sample_rate_hz: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

/// Frequency sweep parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyTestConfig {
    /// Frequencies presented in order, highest first
    pub frequencies_hz: Vec<u32>,
    /// Length of each sweep tone
    pub tone_duration_ms: u32,
    /// Fraction of full scale, in (0, 1]
    pub amplitude: f64,
}

impl Default for FrequencyTestConfig {
    fn default() -> Self {
        Self {
            frequencies_hz: DEFAULT_SWEEP_FREQUENCIES_HZ.to_vec(),
            tone_duration_ms: 2000,
            amplitude: 0.4,
        }
    }
}

/// Stereo discrimination parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoTestConfig {
    /// Frequency of the panned probe tone
    pub frequency_hz: u32,
    /// Length of each probe tone
    pub tone_duration_ms: u32,
    /// Fraction of full scale, in (0, 1]
    pub amplitude: f64,
    /// Number of trials in one run
    pub total_trials: u32,
}

impl Default for StereoTestConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1000,
            tone_duration_ms: 1000,
            amplitude: 0.3,
            total_trials: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// Missing keys take their defaults. If the file doesn't exist or the JSON
    /// is invalid, the full default config is returned and a warning logged.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the bundled assets directory
    pub fn load() -> Self {
        Self::load_from_file("assets/hearing_config.json")
    }
}
