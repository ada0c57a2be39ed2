//! Tone - deterministic stereo sine synthesis
//!
//! This module builds the stimuli for both hearing tests:
//! - Interleaved L/R signed 16-bit samples, ready for any PCM sink
//! - Phase restarts at 0 on every call, so identical specs give identical buffers
//! - Pure functions (no side effects, no allocation beyond the output buffer)

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ToneError;

/// Peak value used to scale the unit sine
const FULL_SCALE: f64 = i16::MAX as f64;

/// Which stereo channel(s) carry the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMask {
    Left,
    Right,
    Both,
}

impl ChannelMask {
    /// Mask that plays only on the given side
    pub fn side(is_left: bool) -> Self {
        if is_left {
            ChannelMask::Left
        } else {
            ChannelMask::Right
        }
    }

    fn gains(self) -> (i16, i16) {
        match self {
            ChannelMask::Left => (1, 0),
            ChannelMask::Right => (0, 1),
            ChannelMask::Both => (1, 1),
        }
    }
}

/// Immutable description of one stimulus
///
/// Only constructible through [`ToneSpec::new`], so every spec that reaches
/// [`generate`] has already been validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneSpec {
    frequency_hz: u32,
    duration_ms: u32,
    sample_rate_hz: u32,
    amplitude: f64,
    channel: ChannelMask,
    /// `duration_ms * sample_rate_hz / 1000`, checked to fit in memory indices
    #[serde(skip)]
    frame_count: usize,
}

impl ToneSpec {
    /// Create a validated tone spec
    ///
    /// # Errors
    /// `ToneError::InvalidInput` when frequency, duration or sample rate is 0,
    /// when amplitude lies outside (0, 1], when the frequency is at or
    /// above Nyquist for the sample rate, or when the interleaved buffer
    /// length would overflow `usize`.
    pub fn new(
        frequency_hz: u32,
        duration_ms: u32,
        sample_rate_hz: u32,
        amplitude: f64,
        channel: ChannelMask,
    ) -> Result<Self, ToneError> {
        if frequency_hz == 0 {
            return Err(invalid("frequency must be greater than 0 Hz".to_string()));
        }
        if duration_ms == 0 {
            return Err(invalid("duration must be greater than 0 ms".to_string()));
        }
        if sample_rate_hz == 0 {
            return Err(invalid("sample rate must be greater than 0 Hz".to_string()));
        }
        if !(amplitude > 0.0 && amplitude <= 1.0) {
            return Err(invalid(format!("amplitude {} outside (0, 1]", amplitude)));
        }
        if u64::from(frequency_hz) * 2 >= u64::from(sample_rate_hz) {
            return Err(invalid(format!(
                "frequency {} Hz at or above Nyquist for {} Hz sample rate",
                frequency_hz, sample_rate_hz
            )));
        }
        let frames = frames_u64(duration_ms, sample_rate_hz);
        let frame_count = usize::try_from(frames)
            .ok()
            .filter(|frames| frames.checked_mul(2).is_some())
            .ok_or_else(|| {
                invalid(format!(
                    "{} ms at {} Hz is {} frames, too long for this platform",
                    duration_ms, sample_rate_hz, frames
                ))
            })?;

        Ok(Self {
            frequency_hz,
            duration_ms,
            sample_rate_hz,
            amplitude,
            channel,
            frame_count,
        })
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn channel(&self) -> ChannelMask {
        self.channel
    }

    /// Same tone routed to a different channel
    pub fn with_channel(self, channel: ChannelMask) -> Self {
        Self { channel, ..self }
    }

    /// Number of frames (L/R pairs) this spec produces
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Largest absolute sample value this spec can produce
    pub fn peak(&self) -> i16 {
        (FULL_SCALE * self.amplitude).round() as i16
    }
}

fn frames_u64(duration_ms: u32, sample_rate_hz: u32) -> u64 {
    u64::from(duration_ms) * u64::from(sample_rate_hz) / 1000
}

fn invalid(reason: String) -> ToneError {
    ToneError::InvalidInput { reason }
}

/// Generates an interleaved stereo sine buffer.
///
/// Sample `i` is `round(32767 · amplitude · sin(2π · f · i / sample_rate))`,
/// written to the channels selected by the spec's mask; the other slot is 0.
///
/// # Returns
/// A `Vec<i16>` of exactly `2 * frame_count()` samples, left first.
///
/// # Examples
/// ```
/// use hearing_check::audio::{generate, ChannelMask, ToneSpec};
///
/// let spec = ToneSpec::new(1000, 10, 44_100, 0.3, ChannelMask::Left).unwrap();
/// let buffer = generate(&spec);
/// assert_eq!(buffer.len(), 2 * 441);
/// assert!(buffer.iter().skip(1).step_by(2).all(|&s| s == 0));
/// ```
pub fn generate(spec: &ToneSpec) -> Vec<i16> {
    let frames = spec.frame_count();
    let (left_gain, right_gain) = spec.channel.gains();
    let step = 2.0 * PI * f64::from(spec.frequency_hz) / f64::from(spec.sample_rate_hz);
    let scale = FULL_SCALE * spec.amplitude;

    let mut buffer = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let sample = (scale * (step * i as f64).sin()).round() as i16;
        buffer.push(sample * left_gain);
        buffer.push(sample * right_gain);
    }

    buffer
}
