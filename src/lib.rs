//! Frame-by-frame audio feature extraction.
//!
//! A [`Gist`] session takes one frame of samples at a time and answers
//! time-domain, spectral, onset, pitch and mel-frequency queries about it.
//! [`audio::analysis`] runs a session over a whole signal.

pub mod audio;

pub use audio::analysis::{analyze_frames, analyze_frames_with, split_frames, summarize};
pub use audio::error::AnalysisError;
pub use audio::features::{AnalysisSummary, FrameDescriptors};
pub use audio::sample::Sample;
pub use audio::session::{AnalysisConfig, Gist};
pub use audio::signal::SignalKind;
pub use audio::transform::{FftTransform, Transform};
pub use audio::window::WindowType;
