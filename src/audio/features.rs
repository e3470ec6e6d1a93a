use serde::{Deserialize, Serialize};

/// Every descriptor for one analysed frame, widened to `f64` for reporting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDescriptors {
    /// Root mean square of the raw frame
    pub rms: f64,
    /// Largest absolute sample
    pub peak_energy: f64,
    /// Sign changes between consecutive samples (a count, not a rate per second)
    pub zero_crossing_rate: f64,
    /// Square root of the mean absolute deviation
    pub standard_deviation: f64,

    /// Spectral shape, in bins
    pub spectral_centroid: f64,
    pub spectral_spread: f64,
    pub spectral_skewness: f64,
    pub spectral_kurtosis: f64,
    pub spectral_flatness: f64,
    pub spectral_crest: f64,
    /// Normalized bin index (0.0-1.0)
    pub spectral_rolloff: f64,
    pub spectral_decrease: f64,

    /// Onset detection functions
    pub energy_difference: f64,
    pub spectral_difference: f64,
    pub spectral_difference_hwr: f64,
    pub complex_spectral_difference: f64,
    pub high_frequency_content: f64,

    /// YIN estimate in Hz
    pub pitch: f64,

    pub mel_spectrum: Vec<f64>,
    pub mfcc: Vec<f64>,
}

/// Whole-signal summary over a run of frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub frame_count: usize,
    /// Seconds covered by the analysed frames at the configured hop
    pub duration: f64,
    pub peak_rms: f64,
    pub peak_amplitude: f64,
    /// Median YIN estimate across frames, in Hz
    pub median_pitch: f64,
    /// Frame with the largest half-wave-rectified spectral difference
    pub strongest_onset_frame: Option<usize>,
}
