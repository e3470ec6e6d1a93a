//! Onset detection functions: one novelty value per frame.
//!
//! Each stateful variant keeps its own memory of the previous frame. The
//! memory starts as zeros, is compared against on every call, and is then
//! overwritten with the frame just seen.

use rustfft::num_traits::Float;

use super::error::AnalysisError;
use super::sample::Sample;

pub struct OnsetDetectionFunction<T: Sample> {
    frame_size: usize,
    prev_energy: T,
    prev_magnitude_sd: Vec<T>,
    prev_magnitude_hwr: Vec<T>,
    prev_magnitude_csd: Vec<T>,
    prev_phase: Vec<T>,
    prev_phase2: Vec<T>,
}

impl<T: Sample> OnsetDetectionFunction<T> {
    /// `frame_size` is the length of the spectra this instance will be fed.
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            prev_energy: T::zero(),
            prev_magnitude_sd: vec![T::zero(); frame_size],
            prev_magnitude_hwr: vec![T::zero(); frame_size],
            prev_magnitude_csd: vec![T::zero(); frame_size],
            prev_phase: vec![T::zero(); frame_size],
            prev_phase2: vec![T::zero(); frame_size],
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Resizes and clears every memory buffer. History is discarded even
    /// when the size is unchanged.
    pub fn set_frame_size(&mut self, frame_size: usize) {
        *self = Self::new(frame_size);
    }

    fn check_len(&self, got: usize) -> Result<(), AnalysisError> {
        if got != self.frame_size {
            return Err(AnalysisError::SpectrumLengthMismatch {
                expected: self.frame_size,
                got,
            });
        }
        Ok(())
    }

    /// Positive change in time-domain frame energy `Σx²`.
    pub fn energy_difference(&mut self, frame: &[T]) -> T {
        let energy: T = frame.iter().map(|&s| s * s).sum();
        let difference = energy - self.prev_energy;
        self.prev_energy = energy;
        difference.max(T::zero())
    }

    /// `Σ |mag[i] - prev[i]|`.
    pub fn spectral_difference(&mut self, magnitude: &[T]) -> Result<T, AnalysisError> {
        self.check_len(magnitude.len())?;
        let mut sum = T::zero();
        for (prev, &mag) in self.prev_magnitude_sd.iter_mut().zip(magnitude) {
            sum += Float::abs(mag - *prev);
            *prev = mag;
        }
        Ok(sum)
    }

    /// `Σ max(0, mag[i] - prev[i])`: only rising bins contribute.
    pub fn spectral_difference_hwr(&mut self, magnitude: &[T]) -> Result<T, AnalysisError> {
        self.check_len(magnitude.len())?;
        let mut sum = T::zero();
        for (prev, &mag) in self.prev_magnitude_hwr.iter_mut().zip(magnitude) {
            let diff = mag - *prev;
            if diff > T::zero() {
                sum += diff;
            }
            *prev = mag;
        }
        Ok(sum)
    }

    /// Distance between each bin and its prediction from the two previous
    /// frames, assuming constant magnitude and linearly advancing phase.
    pub fn complex_spectral_difference(
        &mut self,
        real: &[T],
        imaginary: &[T],
    ) -> Result<T, AnalysisError> {
        self.check_len(real.len())?;
        self.check_len(imaginary.len())?;

        let pi = T::PI();
        let two_pi = pi + pi;
        let two = T::of(2.0);
        let mut sum = T::zero();

        for i in 0..self.frame_size {
            let (re, im) = (real[i], imaginary[i]);
            let phase = im.atan2(re);
            let magnitude = (re * re + im * im).sqrt();

            let mut deviation = phase - two * self.prev_phase[i] + self.prev_phase2[i];
            while deviation > pi {
                deviation -= two_pi;
            }
            while deviation <= -pi {
                deviation += two_pi;
            }

            let prev_mag = self.prev_magnitude_csd[i];
            let distance =
                prev_mag * prev_mag + magnitude * magnitude - two * prev_mag * magnitude * deviation.cos();
            sum += distance.max(T::zero()).sqrt();

            self.prev_phase2[i] = self.prev_phase[i];
            self.prev_phase[i] = phase;
            self.prev_magnitude_csd[i] = magnitude;
        }
        Ok(sum)
    }

    /// `Σ mag[i]·(i+1)`. Stateless.
    pub fn high_frequency_content(&self, magnitude: &[T]) -> T {
        magnitude
            .iter()
            .enumerate()
            .map(|(i, &mag)| mag * T::of_usize(i + 1))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn spectral_difference_zeros_twice() {
        let mut odf = OnsetDetectionFunction::<f32>::new(512);
        let spectrum = vec![0.0f32; 512];
        assert_eq!(odf.spectral_difference(&spectrum).unwrap(), 0.0);
        assert_eq!(odf.spectral_difference(&spectrum).unwrap(), 0.0);
    }

    #[test]
    fn spectral_difference_same_spectrum_twice() {
        let mut odf = OnsetDetectionFunction::<f32>::new(512);
        let spectrum = vec![1.0f32; 512];
        assert_eq!(odf.spectral_difference(&spectrum).unwrap(), 512.0);
        assert_eq!(odf.spectral_difference(&spectrum).unwrap(), 0.0);
    }

    #[test]
    fn spectral_difference_numeric() {
        let mut odf = OnsetDetectionFunction::<f64>::new(512);
        let ramp: Vec<f64> = (0..512).map(|i| i as f64).collect();
        assert_eq!(odf.spectral_difference(&ramp).unwrap(), 130816.0);
        assert_eq!(odf.spectral_difference(&vec![1.0; 512]).unwrap(), 130306.0);
    }

    #[test]
    fn hwr_only_counts_rising_bins() {
        let mut odf = OnsetDetectionFunction::<f64>::new(512);
        let ramp: Vec<f64> = (0..512).map(|i| i as f64).collect();
        assert_eq!(odf.spectral_difference_hwr(&ramp).unwrap(), 130816.0);
        // only bin 0 rises (0 -> 1)
        assert_eq!(odf.spectral_difference_hwr(&vec![1.0; 512]).unwrap(), 1.0);
        assert_eq!(odf.spectral_difference_hwr(&vec![1.0; 512]).unwrap(), 0.0);
    }

    #[test]
    fn variants_keep_separate_memories() {
        let mut odf = OnsetDetectionFunction::<f64>::new(4);
        let spectrum = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(odf.spectral_difference(&spectrum).unwrap(), 10.0);
        // HWR has not seen a frame yet
        assert_eq!(odf.spectral_difference_hwr(&spectrum).unwrap(), 10.0);
    }

    #[test]
    fn resize_discards_history() {
        let mut odf = OnsetDetectionFunction::<f64>::new(4);
        odf.spectral_difference(&[1.0; 4]).unwrap();
        odf.set_frame_size(8);
        assert_eq!(odf.frame_size(), 8);
        assert_eq!(odf.spectral_difference(&[1.0; 8]).unwrap(), 8.0);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let mut odf = OnsetDetectionFunction::<f64>::new(4);
        assert_eq!(
            odf.spectral_difference(&[1.0; 3]),
            Err(AnalysisError::SpectrumLengthMismatch { expected: 4, got: 3 })
        );
        assert!(odf.complex_spectral_difference(&[0.0; 4], &[0.0; 5]).is_err());
    }

    #[test]
    fn energy_difference_is_half_wave_rectified() {
        let mut odf = OnsetDetectionFunction::<f64>::new(4);
        assert_eq!(odf.energy_difference(&[1.0, 1.0, 1.0, 1.0]), 4.0);
        assert_eq!(odf.energy_difference(&[1.0, 1.0, 1.0, 1.0]), 0.0);
        assert_eq!(odf.energy_difference(&[0.0; 4]), 0.0);
        assert_eq!(odf.energy_difference(&[2.0, 0.0, 0.0, 0.0]), 4.0);
    }

    #[test]
    fn high_frequency_content_weights_by_bin() {
        let odf = OnsetDetectionFunction::<f64>::new(4);
        assert_eq!(odf.high_frequency_content(&[1.0, 1.0, 1.0, 1.0]), 10.0);
        assert_eq!(odf.high_frequency_content(&[0.0, 0.0, 0.0, 2.0]), 8.0);
        assert_eq!(odf.high_frequency_content(&[0.0; 4]), 0.0);
    }

    #[test]
    fn complex_difference_of_repeated_frame() {
        let mut odf = OnsetDetectionFunction::<f64>::new(4);
        let real = [1.0; 4];
        let imag = [0.0; 4];
        assert_abs_diff_eq!(odf.complex_spectral_difference(&real, &imag).unwrap(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(odf.complex_spectral_difference(&real, &imag).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn complex_difference_tracks_steady_phase_advance() {
        let mut odf = OnsetDetectionFunction::<f64>::new(3);
        let step = 0.3;
        let frame = |t: f64| -> (Vec<f64>, Vec<f64>) {
            let phases = [t * step, t * 2.0 * step, t * 3.0 * step];
            (phases.iter().map(|p| p.cos()).collect(), phases.iter().map(|p| p.sin()).collect())
        };

        for t in 0..2 {
            let (re, im) = frame(t as f64);
            odf.complex_spectral_difference(&re, &im).unwrap();
        }
        let (re, im) = frame(2.0);
        let csd = odf.complex_spectral_difference(&re, &im).unwrap();
        assert!(csd < 1e-6, "steady sinusoid should be predicted, got {csd}");

        // a sudden phase jump is novel
        let (re, im) = frame(7.0);
        assert!(odf.complex_spectral_difference(&re, &im).unwrap() > 0.5);
    }
}
