//! Audio output sinks
//!
//! The test sessions only produce sample buffers. Something else has to put
//! them in front of the listener; that is the [`AudioSink`] seam.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::AudioError;

/// Number of interleaved channels in every stimulus buffer
pub const STIMULUS_CHANNELS: u16 = 2;

/// Trait implemented by anything that can play an interleaved 16-bit stereo buffer.
///
/// Playback is fire-and-forget: `play` returns once the buffer has been handed
/// off, and a later `play` replaces whatever is still sounding.
pub trait AudioSink {
    fn play(&mut self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Box<T> {
    fn play(&mut self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
        (**self).play(samples, sample_rate)
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        (**self).stop()
    }
}

/// A buffer handed to a [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// Sink that records every buffer instead of playing it.
///
/// Used for headless runs and as the observation point in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    played: Vec<PlayedBuffer>,
    stop_count: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> &[PlayedBuffer] {
        &self.played
    }

    pub fn last(&self) -> Option<&PlayedBuffer> {
        self.played.last()
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count
    }
}

impl AudioSink for MemorySink {
    fn play(&mut self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
        self.played.push(PlayedBuffer {
            samples: samples.to_vec(),
            sample_rate,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.stop_count += 1;
        Ok(())
    }
}

/// Sink that writes each stimulus to `<dir>/<prefix>-NNN.wav`.
pub struct WavSink {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl WavSink {
    /// Create the sink, making `dir` if it does not exist
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<Self, AudioError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            written: Vec::new(),
        })
    }

    /// Files written so far, in play order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl AudioSink for WavSink {
    fn play(&mut self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
        let path = self
            .dir
            .join(format!("{}-{:03}.wav", self.prefix, self.written.len() + 1));
        write_wav(&path, samples, sample_rate)?;
        log::debug!("[WavSink] Wrote {} samples to {:?}", samples.len(), path);
        self.written.push(path);
        Ok(())
    }
}

/// Write an interleaved stereo buffer as a 16-bit PCM WAV file
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[i16],
    sample_rate: u32,
) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: STIMULUS_CHANNELS,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hearing-check-sink-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_memory_sink_records_buffers() {
        let mut sink = MemorySink::new();
        sink.play(&[1, 2, 3, 4], 44_100).unwrap();
        sink.play(&[5, 6], 48_000).unwrap();
        sink.stop().unwrap();

        assert_eq!(sink.played().len(), 2);
        assert_eq!(sink.played()[0].samples, vec![1, 2, 3, 4]);
        assert_eq!(sink.last().unwrap().sample_rate, 48_000);
        assert_eq!(sink.stop_count(), 1);
    }

    #[test]
    fn test_wav_sink_writes_numbered_files() {
        let dir = temp_dir("numbered");
        let mut sink = WavSink::new(&dir, "sweep").unwrap();
        sink.play(&[0, 0, 100, -100], 44_100).unwrap();
        sink.play(&[0, 0], 44_100).unwrap();

        assert_eq!(sink.written().len(), 2);
        assert!(sink.written()[0].ends_with("sweep-001.wav"));
        assert!(sink.written()[1].ends_with("sweep-002.wav"));

        let mut reader = hound::WavReader::open(&sink.written()[0]).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 0, 100, -100]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut sink: Box<dyn AudioSink> = Box::new(MemorySink::new());
        sink.play(&[1, 1], 44_100).unwrap();
        sink.stop().unwrap();
    }
}
