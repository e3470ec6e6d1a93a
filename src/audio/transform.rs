use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::error::AnalysisError;
use super::sample::Sample;

/// Forward real-input transform producing the spectra every feature set reads.
///
/// One implementation is compiled in ([`FftTransform`]); the session only
/// talks to this trait.
pub trait Transform<T: Sample> {
    fn frame_size(&self) -> usize;

    /// Reallocates every buffer and replaces the plan for frames of `frame_size` samples.
    fn set_frame_size(&mut self, frame_size: usize) -> Result<(), AnalysisError>;

    /// Transforms one frame. The slice length must equal [`Transform::frame_size`].
    fn process(&mut self, samples: &[T]) -> Result<(), AnalysisError>;

    /// Real part of the full `N`-point transform.
    fn real(&self) -> &[T];

    /// Imaginary part of the full `N`-point transform.
    fn imaginary(&self) -> &[T];

    /// Magnitudes of bins `[0, N/2)`.
    fn magnitude_spectrum(&self) -> &[T];
}

/// [`Transform`] backed by a planned `rustfft` complex FFT.
pub struct FftTransform<T: Sample> {
    planner: FftPlanner<T>,
    fft: Arc<dyn Fft<T>>,
    buffer: Vec<Complex<T>>,
    scratch: Vec<Complex<T>>,
    real: Vec<T>,
    imaginary: Vec<T>,
    magnitude: Vec<T>,
}

impl<T: Sample> FftTransform<T> {
    pub fn new(frame_size: usize) -> Result<Self, AnalysisError> {
        if frame_size == 0 {
            return Err(AnalysisError::InvalidFrameSize(frame_size));
        }
        let mut planner = FftPlanner::<T>::new();
        let fft = planner.plan_fft_forward(frame_size);
        let scratch_len = fft.get_inplace_scratch_len();

        Ok(Self {
            planner,
            fft,
            buffer: vec![Complex::new(T::zero(), T::zero()); frame_size],
            scratch: vec![Complex::new(T::zero(), T::zero()); scratch_len],
            real: vec![T::zero(); frame_size],
            imaginary: vec![T::zero(); frame_size],
            magnitude: vec![T::zero(); frame_size / 2],
        })
    }
}

impl<T: Sample> Transform<T> for FftTransform<T> {
    fn frame_size(&self) -> usize {
        self.buffer.len()
    }

    fn set_frame_size(&mut self, frame_size: usize) -> Result<(), AnalysisError> {
        if frame_size == 0 {
            return Err(AnalysisError::InvalidFrameSize(frame_size));
        }
        if frame_size == self.frame_size() {
            return Ok(());
        }

        log::debug!("Re-planning FFT: {} -> {} points", self.frame_size(), frame_size);
        self.fft = self.planner.plan_fft_forward(frame_size);
        let zero = Complex::new(T::zero(), T::zero());
        self.buffer = vec![zero; frame_size];
        self.scratch = vec![zero; self.fft.get_inplace_scratch_len()];
        self.real = vec![T::zero(); frame_size];
        self.imaginary = vec![T::zero(); frame_size];
        self.magnitude = vec![T::zero(); frame_size / 2];
        Ok(())
    }

    fn process(&mut self, samples: &[T]) -> Result<(), AnalysisError> {
        if samples.len() != self.frame_size() {
            return Err(AnalysisError::FrameSizeMismatch {
                expected: self.frame_size(),
                got: samples.len(),
            });
        }

        for (slot, &s) in self.buffer.iter_mut().zip(samples) {
            *slot = Complex::new(s, T::zero());
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (i, c) in self.buffer.iter().enumerate() {
            self.real[i] = c.re;
            self.imaginary[i] = c.im;
        }
        for (mag, c) in self.magnitude.iter_mut().zip(&self.buffer) {
            *mag = (c.re * c.re + c.im * c.im).sqrt();
        }
        Ok(())
    }

    fn real(&self) -> &[T] {
        &self.real
    }

    fn imaginary(&self) -> &[T] {
        &self.imaginary
    }

    fn magnitude_spectrum(&self) -> &[T] {
        &self.magnitude
    }
}
