use super::error::AnalysisError;
use super::features::{AnalysisSummary, FrameDescriptors};
use super::sample::Sample;
use super::session::{AnalysisConfig, Gist};

/// Cuts `samples` into frames of `frame_size` starting every `hop_size`
/// samples. The last frame is zero-padded. A hop of 0 means no overlap.
pub fn split_frames<T: Sample>(
    samples: &[T],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<Vec<T>>, AnalysisError> {
    if frame_size == 0 {
        return Err(AnalysisError::InvalidFrameSize(frame_size));
    }
    let hop = if hop_size == 0 { frame_size } else { hop_size };

    let mut frames = Vec::with_capacity(samples.len().div_ceil(hop));
    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + frame_size).min(samples.len());
        let mut frame = samples[pos..end].to_vec();
        frame.resize(frame_size, T::zero());
        frames.push(frame);
        pos += hop;
    }
    Ok(frames)
}

/// Runs one session over `frames` in order, so onset and pitch memories
/// carry from each frame to the next.
pub fn analyze_frames<T: Sample>(
    config: &AnalysisConfig,
    frames: &[Vec<T>],
) -> Result<Vec<FrameDescriptors>, AnalysisError> {
    analyze_frames_with(config, frames, |_| {})
}

/// As [`analyze_frames`], calling `on_frame` with each frame index once it is described.
pub fn analyze_frames_with<T: Sample>(
    config: &AnalysisConfig,
    frames: &[Vec<T>],
    mut on_frame: impl FnMut(usize),
) -> Result<Vec<FrameDescriptors>, AnalysisError> {
    let mut gist = Gist::<T>::from_config(config)?;
    log::debug!(
        "Analyzing {} frames of {} samples at {} Hz",
        frames.len(),
        config.frame_size,
        config.sample_rate
    );

    let mut described = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        gist.process_frame(frame)?;
        described.push(gist.describe()?);
        on_frame(i);
    }
    Ok(described)
}

/// Summarizes a run of frames analysed at `hop_size` and `sample_rate`.
pub fn summarize(frames: &[FrameDescriptors], hop_size: usize, sample_rate: u32) -> AnalysisSummary {
    if frames.is_empty() {
        return AnalysisSummary::default();
    }

    let peak_rms = frames.iter().map(|f| f.rms).fold(0.0f64, f64::max);
    let peak_amplitude = frames.iter().map(|f| f.peak_energy).fold(0.0f64, f64::max);

    let median_pitch = {
        let mut pitches: Vec<f64> = frames.iter().map(|f| f.pitch).filter(|p| p.is_finite()).collect();
        pitches.sort_by(f64::total_cmp);
        pitches.get(pitches.len() / 2).copied().unwrap_or(0.0)
    };

    let strongest_onset_frame = frames
        .iter()
        .enumerate()
        .filter(|(_, f)| f.spectral_difference_hwr > 0.0)
        .max_by(|(_, a), (_, b)| a.spectral_difference_hwr.total_cmp(&b.spectral_difference_hwr))
        .map(|(i, _)| i);

    AnalysisSummary {
        frame_count: frames.len(),
        duration: (frames.len() * hop_size) as f64 / sample_rate.max(1) as f64,
        peak_rms,
        peak_amplitude,
        median_pitch,
        strongest_onset_frame,
    }
}
