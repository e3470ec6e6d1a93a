use serde::{Deserialize, Serialize};

use super::error::AnalysisError;
use super::features::FrameDescriptors;
use super::mfcc::{Mfcc, DEFAULT_NUM_COEFFICIENTS};
use super::onset::OnsetDetectionFunction;
use super::pitch::{Yin, DEFAULT_MAX_FREQUENCY};
use super::sample::Sample;
use super::spectral::{self, DEFAULT_ROLLOFF_PERCENTILE};
use super::time_domain;
use super::transform::{FftTransform, Transform};
use super::window::WindowType;

/// Parameters a [`Gist`] session is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_mfcc_coefficients")]
    pub mfcc_coefficients: usize,
    /// Highest pitch YIN will report, in Hz
    #[serde(default = "default_max_frequency")]
    pub max_frequency: f64,
    #[serde(default)]
    pub window: WindowType,
    #[serde(default = "default_rolloff_percentile")]
    pub rolloff_percentile: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            sample_rate: default_sample_rate(),
            mfcc_coefficients: default_mfcc_coefficients(),
            max_frequency: default_max_frequency(),
            window: WindowType::default(),
            rolloff_percentile: default_rolloff_percentile(),
        }
    }
}

fn default_frame_size() -> usize { 512 }
fn default_sample_rate() -> u32 { 44100 }
fn default_mfcc_coefficients() -> usize { DEFAULT_NUM_COEFFICIENTS }
fn default_max_frequency() -> f64 { DEFAULT_MAX_FREQUENCY }
fn default_rolloff_percentile() -> f64 { DEFAULT_ROLLOFF_PERCENTILE }

/// One analysis session: a frame buffer, its transform, and every feature
/// set, all at one frame size, sample rate and precision.
///
/// Push a frame with [`Gist::process_frame`], then ask for any descriptor.
/// Asking before the first frame (or after a frame-size change) returns
/// [`AnalysisError::NoFrame`].
///
/// The onset functions and [`Gist::pitch`] carry memory from one call to the
/// next, so call each of them once per frame. A session is not meant to be
/// shared between threads; give each thread its own.
pub struct Gist<T: Sample, E: Transform<T> = FftTransform<T>> {
    frame_size: usize,
    sample_rate: u32,
    window_type: WindowType,
    window: Vec<T>,
    rolloff_percentile: T,
    audio_frame: Vec<T>,
    windowed_frame: Vec<T>,
    has_frame: bool,
    transform: E,
    onset: OnsetDetectionFunction<T>,
    yin: Yin<T>,
    mfcc: Mfcc<T>,
}

impl<T: Sample> Gist<T> {
    pub fn new(frame_size: usize, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::from_config(&AnalysisConfig {
            frame_size,
            sample_rate,
            ..Default::default()
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let transform = FftTransform::new(config.frame_size)?;
        Self::with_transform(config, transform)
    }
}

impl<T: Sample, E: Transform<T>> Gist<T, E> {
    /// Builds a session around a caller-supplied transform, resizing it to
    /// the configured frame size if needed.
    pub fn with_transform(config: &AnalysisConfig, mut transform: E) -> Result<Self, AnalysisError> {
        let frame_size = config.frame_size;
        if frame_size == 0 {
            return Err(AnalysisError::InvalidFrameSize(frame_size));
        }
        let mut yin = Yin::new(config.sample_rate)?;
        yin.set_max_frequency(config.max_frequency);
        let mfcc = Mfcc::with_coefficients(frame_size, config.sample_rate, config.mfcc_coefficients)?;
        if transform.frame_size() != frame_size {
            transform.set_frame_size(frame_size)?;
        }

        Ok(Self {
            frame_size,
            sample_rate: config.sample_rate,
            window_type: config.window,
            window: config.window.coefficients(frame_size),
            rolloff_percentile: T::of(config.rolloff_percentile),
            audio_frame: vec![T::zero(); frame_size],
            windowed_frame: vec![T::zero(); frame_size],
            has_frame: false,
            transform,
            onset: OnsetDetectionFunction::new(frame_size / 2),
            yin,
            mfcc,
        })
    }

    // --- configuration ---

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn window(&self) -> WindowType {
        self.window_type
    }

    pub fn num_coefficients(&self) -> usize {
        self.mfcc.num_coefficients()
    }

    /// Highest pitch the YIN estimator can report (`sample_rate / min_period`).
    pub fn max_frequency(&self) -> T {
        self.yin.max_frequency()
    }

    pub fn rolloff_percentile(&self) -> T {
        self.rolloff_percentile
    }

    /// Resizes every buffer, re-plans the FFT, rebuilds the window and mel
    /// filterbank, and clears onset history. The next descriptor call needs
    /// a new frame.
    pub fn set_frame_size(&mut self, frame_size: usize) -> Result<(), AnalysisError> {
        if frame_size == 0 {
            return Err(AnalysisError::InvalidFrameSize(frame_size));
        }
        self.transform.set_frame_size(frame_size)?;
        self.mfcc.set_frame_size(frame_size)?;
        self.onset.set_frame_size(frame_size / 2);
        self.window = self.window_type.coefficients(frame_size);
        self.audio_frame = vec![T::zero(); frame_size];
        self.windowed_frame = vec![T::zero(); frame_size];
        self.frame_size = frame_size;
        self.has_frame = false;
        Ok(())
    }

    /// Rescales the YIN minimum period and rebuilds the mel filterbank.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        self.yin.set_sample_rate(sample_rate)?;
        self.mfcc.set_sample_rate(sample_rate)?;
        self.sample_rate = sample_rate;
        Ok(())
    }

    pub fn set_num_coefficients(&mut self, num_coefficients: usize) -> Result<(), AnalysisError> {
        self.mfcc.set_num_coefficients(num_coefficients)
    }

    pub fn set_max_frequency(&mut self, max_frequency: f64) {
        self.yin.set_max_frequency(max_frequency);
    }

    /// Takes effect from the next ingested frame.
    pub fn set_window(&mut self, window: WindowType) {
        self.window_type = window;
        self.window = window.coefficients(self.frame_size);
    }

    pub fn set_rolloff_percentile(&mut self, percentile: f64) {
        self.rolloff_percentile = T::of(percentile);
    }

    // --- ingestion ---

    /// Stores `frame` and runs the forward transform once.
    ///
    /// The frame must have exactly [`Gist::frame_size`] samples; pass a
    /// sub-slice to analyse part of a longer buffer.
    pub fn process_frame(&mut self, frame: &[T]) -> Result<(), AnalysisError> {
        if frame.len() != self.frame_size {
            return Err(AnalysisError::FrameSizeMismatch {
                expected: self.frame_size,
                got: frame.len(),
            });
        }

        self.audio_frame.copy_from_slice(frame);
        for ((out, &sample), &w) in self.windowed_frame.iter_mut().zip(frame).zip(&self.window) {
            *out = sample * w;
        }
        self.transform.process(&self.windowed_frame)?;
        self.has_frame = true;
        Ok(())
    }

    fn ensure_frame(&self) -> Result<(), AnalysisError> {
        if self.has_frame {
            Ok(())
        } else {
            Err(AnalysisError::NoFrame)
        }
    }

    /// The raw frame last ingested.
    pub fn audio_frame(&self) -> Result<&[T], AnalysisError> {
        self.ensure_frame()?;
        Ok(&self.audio_frame)
    }

    /// Magnitudes of bins `[0, N/2)` of the current frame.
    pub fn magnitude_spectrum(&self) -> Result<&[T], AnalysisError> {
        self.ensure_frame()?;
        Ok(self.transform.magnitude_spectrum())
    }

    /// Real part of the full transform of the current frame.
    pub fn fft_real(&self) -> Result<&[T], AnalysisError> {
        self.ensure_frame()?;
        Ok(self.transform.real())
    }

    /// Imaginary part of the full transform of the current frame.
    pub fn fft_imaginary(&self) -> Result<&[T], AnalysisError> {
        self.ensure_frame()?;
        Ok(self.transform.imaginary())
    }

    // --- time domain ---

    pub fn root_mean_square(&self) -> Result<T, AnalysisError> {
        Ok(time_domain::root_mean_square(self.audio_frame()?))
    }

    pub fn peak_energy(&self) -> Result<T, AnalysisError> {
        Ok(time_domain::peak_energy(self.audio_frame()?))
    }

    pub fn zero_crossing_rate(&self) -> Result<T, AnalysisError> {
        Ok(time_domain::zero_crossing_rate(self.audio_frame()?))
    }

    pub fn standard_deviation(&self) -> Result<T, AnalysisError> {
        Ok(time_domain::standard_deviation(self.audio_frame()?))
    }

    // --- frequency domain ---

    pub fn spectral_centroid(&self) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_centroid(self.magnitude_spectrum()?))
    }

    pub fn spectral_spread(&self) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_spread(self.magnitude_spectrum()?))
    }

    pub fn spectral_skewness(&self) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_skewness(self.magnitude_spectrum()?))
    }

    pub fn spectral_kurtosis(&self) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_kurtosis(self.magnitude_spectrum()?))
    }

    pub fn spectral_flatness(&self) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_flatness(self.magnitude_spectrum()?))
    }

    pub fn spectral_crest(&self) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_crest(self.magnitude_spectrum()?))
    }

    /// Rolloff at the session's configured percentile (0.85 by default).
    pub fn spectral_rolloff(&self) -> Result<T, AnalysisError> {
        self.spectral_rolloff_at(self.rolloff_percentile)
    }

    pub fn spectral_rolloff_at(&self, percentile: T) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_rolloff(self.magnitude_spectrum()?, percentile))
    }

    pub fn spectral_decrease(&self) -> Result<T, AnalysisError> {
        Ok(spectral::spectral_decrease(self.magnitude_spectrum()?))
    }

    // --- onset detection ---

    pub fn energy_difference(&mut self) -> Result<T, AnalysisError> {
        self.ensure_frame()?;
        Ok(self.onset.energy_difference(&self.audio_frame))
    }

    pub fn spectral_difference(&mut self) -> Result<T, AnalysisError> {
        self.ensure_frame()?;
        self.onset.spectral_difference(self.transform.magnitude_spectrum())
    }

    pub fn spectral_difference_hwr(&mut self) -> Result<T, AnalysisError> {
        self.ensure_frame()?;
        self.onset.spectral_difference_hwr(self.transform.magnitude_spectrum())
    }

    /// Reads bins `[0, N/2)` of the transform, the same half every other onset
    /// function sees. The mirrored upper half of a real input is left out, so
    /// values are about half those of a sum over all `N` bins.
    pub fn complex_spectral_difference(&mut self) -> Result<T, AnalysisError> {
        self.ensure_frame()?;
        let half = self.frame_size / 2;
        self.onset.complex_spectral_difference(
            &self.transform.real()[..half],
            &self.transform.imaginary()[..half],
        )
    }

    pub fn high_frequency_content(&self) -> Result<T, AnalysisError> {
        Ok(self.onset.high_frequency_content(self.magnitude_spectrum()?))
    }

    // --- pitch ---

    /// YIN pitch of the raw (unwindowed) frame, in Hz.
    pub fn pitch(&mut self) -> Result<T, AnalysisError> {
        self.ensure_frame()?;
        Ok(self.yin.pitch(&self.audio_frame))
    }

    // --- cepstral ---

    pub fn mel_frequency_spectrum(&mut self) -> Result<&[T], AnalysisError> {
        self.ensure_frame()?;
        self.mfcc.mel_frequency_spectrum(self.transform.magnitude_spectrum())
    }

    pub fn mel_frequency_cepstral_coefficients(&mut self) -> Result<&[T], AnalysisError> {
        self.ensure_frame()?;
        self.mfcc
            .mel_frequency_cepstral_coefficients(self.transform.magnitude_spectrum())
    }

    /// Triangular mel filters currently in use.
    pub fn mel_filter_bank(&self) -> &[Vec<T>] {
        self.mfcc.filter_bank()
    }

    /// Computes every descriptor for the current frame.
    ///
    /// This advances the onset and pitch memories exactly as calling each
    /// stateful accessor once would.
    pub fn describe(&mut self) -> Result<FrameDescriptors, AnalysisError> {
        self.ensure_frame()?;
        let mel_spectrum = widen(self.mel_frequency_spectrum()?);
        let mfcc = widen(self.mel_frequency_cepstral_coefficients()?);

        Ok(FrameDescriptors {
            rms: self.root_mean_square()?.into(),
            peak_energy: self.peak_energy()?.into(),
            zero_crossing_rate: self.zero_crossing_rate()?.into(),
            standard_deviation: self.standard_deviation()?.into(),
            spectral_centroid: self.spectral_centroid()?.into(),
            spectral_spread: self.spectral_spread()?.into(),
            spectral_skewness: self.spectral_skewness()?.into(),
            spectral_kurtosis: self.spectral_kurtosis()?.into(),
            spectral_flatness: self.spectral_flatness()?.into(),
            spectral_crest: self.spectral_crest()?.into(),
            spectral_rolloff: self.spectral_rolloff()?.into(),
            spectral_decrease: self.spectral_decrease()?.into(),
            energy_difference: self.energy_difference()?.into(),
            spectral_difference: self.spectral_difference()?.into(),
            spectral_difference_hwr: self.spectral_difference_hwr()?.into(),
            complex_spectral_difference: self.complex_spectral_difference()?.into(),
            high_frequency_content: self.high_frequency_content()?.into(),
            pitch: self.pitch()?.into(),
            mel_spectrum,
            mfcc,
        })
    }
}

fn widen<T: Sample>(values: &[T]) -> Vec<f64> {
    values.iter().map(|&v| v.into()).collect()
}
