// Spectrum module - dominant frequency of a stimulus channel
//
// Used to check synthesized or rendered stimuli: Hann-windowed FFT over the
// first power-of-two block of one channel, peak bin reported in Hz.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::audio::STIMULUS_CHANNELS;

/// Largest FFT block analysed
pub const MAX_FFT_SIZE: usize = 8192;

/// Smallest block worth analysing
pub const MIN_FFT_SIZE: usize = 64;

/// Magnitudes below this are treated as silence
const SILENCE_THRESHOLD: f32 = 1e-3;

/// FFT processor that computes magnitude spectra from audio windows
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Hann window for FFT (pre-computed)
    window: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Create a new analyzer for blocks of `fft_size` samples
    pub fn new(fft_size: usize) -> Self {
        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (fft_size as f32 - 1.0)).cos())
            })
            .collect();

        Self {
            fft: FftPlanner::new().plan_fft_forward(fft_size),
            fft_size,
            window,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Magnitude spectrum for positive frequencies (size = fft_size / 2 + 1)
    ///
    /// Input shorter than `fft_size` is zero-padded; longer input is truncated.
    pub fn magnitude_spectrum(&self, audio: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = audio
            .iter()
            .zip(&self.window)
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.fft_size / 2 + 1]
            .iter()
            .map(|c| c.norm())
            .collect()
    }
}

/// Frequency of the strongest bin in one channel of an interleaved stereo buffer.
///
/// # Returns
/// `None` if the channel has fewer than `MIN_FFT_SIZE` frames or is silent.
pub fn dominant_frequency(samples: &[i16], sample_rate: u32, channel: usize) -> Option<f32> {
    let stride = STIMULUS_CHANNELS as usize;
    let mono: Vec<f32> = samples
        .iter()
        .skip(channel)
        .step_by(stride)
        .map(|&s| s as f32 / i16::MAX as f32)
        .collect();

    if mono.len() < MIN_FFT_SIZE {
        return None;
    }

    let fft_size = prev_power_of_two(mono.len()).min(MAX_FFT_SIZE);
    let analyzer = SpectrumAnalyzer::new(fft_size);
    let spectrum = analyzer.magnitude_spectrum(&mono[..fft_size]);

    // Skip the DC bin
    let (peak_bin, peak_mag) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0f32), |best, (i, &mag)| if mag > best.1 { (i, mag) } else { best });

    if peak_mag < SILENCE_THRESHOLD {
        return None;
    }

    Some(peak_bin as f32 * sample_rate as f32 / fft_size as f32)
}

/// Peak absolute sample value of one channel
pub fn channel_peak(samples: &[i16], channel: usize) -> i16 {
    samples
        .iter()
        .skip(channel)
        .step_by(STIMULUS_CHANNELS as usize)
        .map(|&s| s.saturating_abs())
        .max()
        .unwrap_or(0)
}

fn prev_power_of_two(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    1 << (usize::BITS - 1 - n.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{generate, ChannelMask, ToneSpec};

    fn bin_width(sample_rate: u32, frames: usize) -> f32 {
        sample_rate as f32 / prev_power_of_two(frames).min(MAX_FFT_SIZE) as f32
    }

    #[test]
    fn test_dominant_frequency_matches_sweep_tones() {
        for &freq in &[8000u32, 6000, 4000, 2000, 1000, 500, 250, 125] {
            let spec = ToneSpec::new(freq, 500, 44_100, 0.4, ChannelMask::Both).unwrap();
            let buffer = generate(&spec);
            let detected = dominant_frequency(&buffer, 44_100, 0).unwrap();
            let tolerance = bin_width(44_100, spec.frame_count());
            assert!(
                (detected - freq as f32).abs() <= tolerance,
                "Expected ~{} Hz, detected {} Hz (bin width {})",
                freq,
                detected,
                tolerance
            );
        }
    }

    #[test]
    fn test_dominant_frequency_silent_channel() {
        let spec = ToneSpec::new(1000, 200, 44_100, 0.3, ChannelMask::Left).unwrap();
        let buffer = generate(&spec);
        assert!(dominant_frequency(&buffer, 44_100, 0).is_some());
        assert_eq!(dominant_frequency(&buffer, 44_100, 1), None);
    }

    #[test]
    fn test_dominant_frequency_too_short() {
        assert_eq!(dominant_frequency(&[0, 0, 1, 1], 44_100, 0), None);
    }

    #[test]
    fn test_channel_peak() {
        let spec = ToneSpec::new(1000, 100, 44_100, 0.3, ChannelMask::Right).unwrap();
        let buffer = generate(&spec);
        assert_eq!(channel_peak(&buffer, 0), 0);
        let peak = channel_peak(&buffer, 1);
        assert!(peak <= spec.peak());
        assert!(peak > spec.peak() - 100);
    }

    #[test]
    fn test_magnitude_spectrum_size() {
        let analyzer = SpectrumAnalyzer::new(1024);
        let spectrum = analyzer.magnitude_spectrum(&[0.5; 100]);
        assert_eq!(spectrum.len(), 513);
        assert_eq!(analyzer.fft_size(), 1024);
    }

    #[test]
    fn test_prev_power_of_two() {
        assert_eq!(prev_power_of_two(1), 1);
        assert_eq!(prev_power_of_two(1000), 512);
        assert_eq!(prev_power_of_two(1024), 1024);
        assert_eq!(prev_power_of_two(88_200), 65_536);
    }
}
