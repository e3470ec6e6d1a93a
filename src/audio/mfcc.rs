//! Mel-frequency spectrum and cepstral coefficients.

use super::error::AnalysisError;
use super::sample::Sample;

pub const DEFAULT_NUM_COEFFICIENTS: usize = 13;

/// Added to every mel bin before the logarithm so a silent bin maps to
/// `ln(f32::MIN_POSITIVE)` (about -87.34) instead of negative infinity.
/// The same floor is used at both precisions.
const LOG_FLOOR: f64 = f32::MIN_POSITIVE as f64;

/// Mel value of `frequency` Hz: `1127 · ln(1 + f/700)`.
pub fn frequency_to_mel(frequency: f64) -> f64 {
    1127.0 * (1.0 + frequency / 700.0).ln()
}

/// Inverse of [`frequency_to_mel`].
pub fn mel_to_frequency(mel: f64) -> f64 {
    700.0 * ((mel / 1127.0).exp() - 1.0)
}

pub struct Mfcc<T: Sample> {
    num_coefficients: usize,
    frame_size: usize,
    sample_rate: u32,
    filter_bank: Vec<Vec<T>>,
    mel_spectrum: Vec<T>,
    coefficients: Vec<T>,
}

impl<T: Sample> Mfcc<T> {
    pub fn new(frame_size: usize, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::with_coefficients(frame_size, sample_rate, DEFAULT_NUM_COEFFICIENTS)
    }

    pub fn with_coefficients(
        frame_size: usize,
        sample_rate: u32,
        num_coefficients: usize,
    ) -> Result<Self, AnalysisError> {
        validate(frame_size, sample_rate, num_coefficients)?;
        let mut mfcc = Self {
            num_coefficients,
            frame_size,
            sample_rate,
            filter_bank: Vec::new(),
            mel_spectrum: Vec::new(),
            coefficients: Vec::new(),
        };
        mfcc.initialise();
        Ok(mfcc)
    }

    pub fn num_coefficients(&self) -> usize {
        self.num_coefficients
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the magnitude spectrum this filterbank expects (`frame_size / 2`).
    pub fn magnitude_spectrum_size(&self) -> usize {
        self.frame_size / 2
    }

    pub fn set_num_coefficients(&mut self, num_coefficients: usize) -> Result<(), AnalysisError> {
        validate(self.frame_size, self.sample_rate, num_coefficients)?;
        self.num_coefficients = num_coefficients;
        self.initialise();
        Ok(())
    }

    pub fn set_frame_size(&mut self, frame_size: usize) -> Result<(), AnalysisError> {
        validate(frame_size, self.sample_rate, self.num_coefficients)?;
        self.frame_size = frame_size;
        self.initialise();
        Ok(())
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), AnalysisError> {
        validate(self.frame_size, sample_rate, self.num_coefficients)?;
        self.sample_rate = sample_rate;
        self.initialise();
        Ok(())
    }

    /// Triangular filters, one row per coefficient, one column per spectrum bin.
    pub fn filter_bank(&self) -> &[Vec<T>] {
        &self.filter_bank
    }

    fn initialise(&mut self) {
        self.mel_spectrum = vec![T::zero(); self.num_coefficients];
        self.coefficients = vec![T::zero(); self.num_coefficients];
        self.filter_bank = build_filter_bank(
            self.num_coefficients,
            self.magnitude_spectrum_size(),
            self.sample_rate,
        );
        log::debug!(
            "Built mel filterbank: {} filters x {} bins at {} Hz",
            self.num_coefficients,
            self.magnitude_spectrum_size(),
            self.sample_rate
        );
    }

    /// Power spectrum projected through each filter: `Σ_j mag[j]² · bank[i][j]`.
    pub fn mel_frequency_spectrum(&mut self, magnitude: &[T]) -> Result<&[T], AnalysisError> {
        let expected = self.magnitude_spectrum_size();
        if magnitude.len() != expected {
            return Err(AnalysisError::SpectrumLengthMismatch {
                expected,
                got: magnitude.len(),
            });
        }

        for (out, filter) in self.mel_spectrum.iter_mut().zip(&self.filter_bank) {
            *out = magnitude
                .iter()
                .zip(filter)
                .map(|(&mag, &weight)| mag * mag * weight)
                .sum();
        }
        Ok(&self.mel_spectrum)
    }

    /// Unnormalized DCT-II (scaled by 2) of the log mel spectrum.
    ///
    /// Silent mel bins are floored at `f32::MIN_POSITIVE` before the log, so
    /// the output stays finite; such coefficients are dominated by that floor
    /// rather than by the signal.
    pub fn mel_frequency_cepstral_coefficients(
        &mut self,
        magnitude: &[T],
    ) -> Result<&[T], AnalysisError> {
        self.mel_frequency_spectrum(magnitude)?;

        let floor = T::of(LOG_FLOOR);
        for (c, &mel) in self.coefficients.iter_mut().zip(&self.mel_spectrum) {
            *c = (mel + floor).ln();
        }
        discrete_cosine_transform(&mut self.coefficients);
        Ok(&self.coefficients)
    }
}

fn validate(frame_size: usize, sample_rate: u32, num_coefficients: usize) -> Result<(), AnalysisError> {
    if frame_size == 0 {
        return Err(AnalysisError::InvalidFrameSize(frame_size));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidSampleRate(sample_rate));
    }
    if num_coefficients == 0 {
        return Err(AnalysisError::InvalidCoefficientCount(num_coefficients));
    }
    Ok(())
}

/// Filter edges sit on `num_filters + 2` points equally spaced in mel between
/// 0 Hz and Nyquist, rounded to the nearest spectrum bin.
fn build_filter_bank<T: Sample>(num_filters: usize, spectrum_size: usize, sample_rate: u32) -> Vec<Vec<T>> {
    let nyquist = sample_rate as f64 / 2.0;
    let min_mel = frequency_to_mel(0.0);
    let max_mel = frequency_to_mel(nyquist);
    let step = (max_mel - min_mel) / (num_filters + 1) as f64;

    let centres: Vec<usize> = (0..num_filters + 2)
        .map(|i| {
            let frequency = mel_to_frequency(min_mel + i as f64 * step);
            let bin = (0.5 + spectrum_size as f64 * frequency / nyquist).floor();
            (bin.max(0.0) as usize).min(spectrum_size)
        })
        .collect();

    let mut bank = vec![vec![T::zero(); spectrum_size]; num_filters];
    for (i, filter) in bank.iter_mut().enumerate() {
        let (begin, centre, end) = (centres[i], centres[i + 1], centres[i + 2]);

        let rise = (centre - begin) as f64;
        for k in begin..centre {
            filter[k] = T::of((k - begin) as f64 / rise);
        }

        let fall = (end - centre) as f64;
        for k in centre..end {
            filter[k] = T::of((end - k) as f64 / fall);
        }
    }
    bank
}

/// In-place `X[k] = 2 Σ_n x[n] cos(π/N · (n + ½) · k)`.
fn discrete_cosine_transform<T: Sample>(signal: &mut [T]) {
    let input = signal.to_vec();
    let n = T::of_usize(input.len());
    let pi_over_n = T::PI() / n;
    let half = T::of(0.5);
    let two = T::of(2.0);

    for (k, out) in signal.iter_mut().enumerate() {
        let k = T::of_usize(k);
        let sum: T = input
            .iter()
            .enumerate()
            .map(|(i, &x)| x * (pi_over_n * (T::of_usize(i) + half) * k).cos())
            .sum();
        *out = two * sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn mel_scale_round_trips() {
        assert_eq!(frequency_to_mel(0.0), 0.0);
        assert_relative_eq!(frequency_to_mel(1000.0), 1000.0, max_relative = 1e-3);
        assert_relative_eq!(mel_to_frequency(frequency_to_mel(4321.0)), 4321.0, epsilon = 1e-9, max_relative = 1e-12);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(matches!(Mfcc::<f32>::new(0, 44100), Err(AnalysisError::InvalidFrameSize(0))));
        assert!(matches!(Mfcc::<f32>::new(512, 0), Err(AnalysisError::InvalidSampleRate(0))));
        let mut mfcc = Mfcc::<f32>::new(512, 44100).unwrap();
        assert_eq!(
            mfcc.set_num_coefficients(0),
            Err(AnalysisError::InvalidCoefficientCount(0))
        );
        assert_eq!(mfcc.num_coefficients(), 13);
    }

    #[test]
    fn filter_bank_shape() {
        let mfcc = Mfcc::<f64>::new(1024, 44100).unwrap();
        let bank = mfcc.filter_bank();
        assert_eq!(bank.len(), 13);
        for filter in bank {
            assert_eq!(filter.len(), 512);
            assert!(filter.iter().all(|&w| (0.0..=1.0).contains(&w)));
            // each filter peaks at exactly 1 on its centre bin
            assert_eq!(filter.iter().copied().fold(0.0, f64::max), 1.0);
        }
        // higher filters start further up the spectrum
        let first_nonzero = |f: &Vec<f64>| f.iter().position(|&w| w > 0.0).unwrap();
        assert!(first_nonzero(&bank[12]) > first_nonzero(&bank[1]));
    }

    #[test]
    fn filter_bank_is_deterministic() {
        let a = Mfcc::<f32>::with_coefficients(512, 44100, 20).unwrap();
        let mut b = Mfcc::<f32>::with_coefficients(512, 44100, 20).unwrap();
        assert_eq!(a.filter_bank(), b.filter_bank());

        b.set_sample_rate(22050).unwrap();
        assert_ne!(a.filter_bank(), b.filter_bank());
        b.set_sample_rate(44100).unwrap();
        assert_eq!(a.filter_bank(), b.filter_bank());
    }

    #[test]
    fn reconfiguration_resizes_outputs() {
        let mut mfcc = Mfcc::<f64>::new(512, 44100).unwrap();
        mfcc.set_num_coefficients(20).unwrap();
        assert_eq!(mfcc.filter_bank().len(), 20);
        assert_eq!(mfcc.mel_frequency_spectrum(&vec![1.0; 256]).unwrap().len(), 20);

        mfcc.set_frame_size(2048).unwrap();
        assert_eq!(mfcc.magnitude_spectrum_size(), 1024);
        assert!(mfcc.mel_frequency_spectrum(&vec![1.0; 256]).is_err());
        assert_eq!(mfcc.mel_frequency_cepstral_coefficients(&vec![1.0; 1024]).unwrap().len(), 20);
    }

    #[test]
    fn mel_spectrum_uses_power() {
        let mut mfcc = Mfcc::<f64>::new(512, 44100).unwrap();
        let ones = mfcc.mel_frequency_spectrum(&vec![1.0; 256]).unwrap().to_vec();
        let twos = mfcc.mel_frequency_spectrum(&vec![2.0; 256]).unwrap().to_vec();
        for (a, b) in ones.iter().zip(&twos) {
            assert_relative_eq!(*b, 4.0 * a, epsilon = 1e-9, max_relative = 1e-12);
        }
    }

    #[test]
    fn single_bin_excites_its_filter() {
        let mut mfcc = Mfcc::<f64>::new(1024, 44100).unwrap();
        let centre = mfcc.filter_bank()[5]
            .iter()
            .position(|&w| w == 1.0)
            .unwrap();
        let mut spectrum = vec![0.0; 512];
        spectrum[centre] = 3.0;

        let mel = mfcc.mel_frequency_spectrum(&spectrum).unwrap();
        assert_relative_eq!(mel[5], 9.0, epsilon = 1e-9, max_relative = 1e-12);
        assert_eq!(mel[0], 0.0);
        assert_eq!(mel[12], 0.0);
    }

    #[test]
    fn silent_spectrum_gives_finite_coefficients() {
        let mut mfcc = Mfcc::<f32>::new(512, 44100).unwrap();
        let coeffs = mfcc.mel_frequency_cepstral_coefficients(&vec![0.0; 256]).unwrap();
        assert!(coeffs.iter().all(|c| c.is_finite()));

        let floor = (f32::MIN_POSITIVE as f64).ln();
        assert_relative_eq!(coeffs[0] as f64, 2.0 * 13.0 * floor, max_relative = 1e-4);
    }

    #[test]
    fn dct_of_constant_is_dc_only() {
        let mut signal = vec![1.5f64; 8];
        discrete_cosine_transform(&mut signal);
        assert_relative_eq!(signal[0], 2.0 * 8.0 * 1.5, epsilon = 1e-9, max_relative = 1e-12);
        for &v in &signal[1..] {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn dct_of_cosine_picks_its_index() {
        let n = 8;
        let mut signal: Vec<f64> = (0..n)
            .map(|i| (std::f64::consts::PI / n as f64 * (i as f64 + 0.5) * 3.0).cos())
            .collect();
        discrete_cosine_transform(&mut signal);
        assert_relative_eq!(signal[3], n as f64, epsilon = 1e-9, max_relative = 1e-12);
        assert_abs_diff_eq!(signal[2], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(signal[4], 0.0, epsilon = 1e-12);
    }
}
