// Audio module - stimulus synthesis and playback sinks

pub mod sink;
pub mod tone;

#[cfg(not(target_os = "android"))]
pub mod engine_cpal;

// Re-export commonly used types for convenience
pub use sink::{write_wav, AudioSink, MemorySink, PlayedBuffer, WavSink, STIMULUS_CHANNELS};
pub use tone::{generate, ChannelMask, ToneSpec};

#[cfg(not(target_os = "android"))]
pub use engine_cpal::CpalSink;
