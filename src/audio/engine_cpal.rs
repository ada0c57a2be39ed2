//! CPAL-based playback sink for desktop platforms (Linux, macOS, Windows)
//!
//! Each `play` opens a fresh output stream on the default device and feeds it
//! the stimulus from the audio callback until the buffer runs out, then
//! outputs silence. The previous stream is dropped first, so a replay cuts
//! off whatever was still sounding.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::sink::{AudioSink, STIMULUS_CHANNELS};
use crate::error::{log_audio_error, AudioError};

/// Playback sink backed by the host's default output device
pub struct CpalSink {
    output_stream: Option<cpal::Stream>,
}

impl CpalSink {
    pub fn new() -> Self {
        Self {
            output_stream: None,
        }
    }

    fn create_output_stream(
        &self,
        samples: Arc<Vec<i16>>,
        sample_rate: u32,
    ) -> Result<cpal::Stream, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::StreamOpenFailed {
                reason: "No default output device found".to_string(),
            })?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::StreamOpenFailed {
                reason: format!("Failed to get default output config: {:?}", e),
            })?;

        // Keep the device's channel layout but run at the stimulus rate
        let stream_config = cpal::StreamConfig {
            channels: config.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let channels_count = stream_config.channels as usize;
        let cursor = Arc::new(AtomicUsize::new(0));

        let err_fn = |err| log::error!("Output stream error: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    fill_frames(data, channels_count, &samples, &cursor, |s| {
                        s as f32 / i16::MAX as f32
                    });
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_output_stream(
                &stream_config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    fill_frames(data, channels_count, &samples, &cursor, |s| s);
                },
                err_fn,
                None,
            ),
            other => {
                return Err(AudioError::StreamOpenFailed {
                    reason: format!("Unsupported output sample format {:?}", other),
                })
            }
        }
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("{:?}", e),
        })?;

        Ok(stream)
    }
}

impl Default for CpalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for CpalSink {
    fn play(&mut self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
        self.stop()?;

        let stream = self
            .create_output_stream(Arc::new(samples.to_vec()), sample_rate)
            .map_err(|err| {
                log_audio_error(&err, "CpalSink::play");
                err
            })?;
        stream.play().map_err(|e| AudioError::HardwareError {
            details: format!("Output start failed: {}", e),
        })?;

        self.output_stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.output_stream.take() {
            drop(stream);
        }
        Ok(())
    }
}

/// Copy the next stereo frames into a device buffer of `channels_count` channels.
///
/// Mono devices get the L/R average; channels past the second stay silent.
fn fill_frames<T: Copy + Default>(
    data: &mut [T],
    channels_count: usize,
    samples: &[i16],
    cursor: &AtomicUsize,
    convert: impl Fn(i16) -> T,
) {
    let stimulus_channels = STIMULUS_CHANNELS as usize;
    let total_frames = samples.len() / stimulus_channels;
    let mut frame_idx = cursor.load(Ordering::Relaxed);

    for frame in data.chunks_mut(channels_count) {
        let (left, right) = if frame_idx < total_frames {
            let base = frame_idx * stimulus_channels;
            frame_idx += 1;
            (samples[base], samples[base + 1])
        } else {
            (0, 0)
        };

        for (ch, slot) in frame.iter_mut().enumerate() {
            *slot = match (channels_count, ch) {
                (1, _) => convert(((left as i32 + right as i32) / 2) as i16),
                (_, 0) => convert(left),
                (_, 1) => convert(right),
                _ => T::default(),
            };
        }
    }

    cursor.store(frame_idx, Ordering::Relaxed);
}
