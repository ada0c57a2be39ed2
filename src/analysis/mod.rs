// Analysis module - turning results and buffers into something readable
//
// This module contains:
// - interpreter: threshold bands and summary text for completed results
// - report: multi-line result-screen text
// - spectrum: FFT check of a stimulus buffer's dominant frequency

pub mod interpreter;
pub mod report;
pub mod spectrum;

pub use interpreter::{interpret, interpret_frequency, interpret_stereo, FrequencyBand, StereoBand};
pub use report::summarize;
pub use spectrum::{channel_peak, dominant_frequency, SpectrumAnalyzer};
