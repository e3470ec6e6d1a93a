//! Descriptors computed directly on the raw sample frame.
//!
//! Every function is pure and returns 0 for an empty frame.

use rustfft::num_traits::Float;

use super::sample::Sample;

/// Root mean square of the frame.
pub fn root_mean_square<T: Sample>(frame: &[T]) -> T {
    if frame.is_empty() {
        return T::zero();
    }
    let sum: T = frame.iter().map(|&s| s * s).sum();
    (sum / T::of_usize(frame.len())).sqrt()
}

/// Largest absolute sample value.
pub fn peak_energy<T: Sample>(frame: &[T]) -> T {
    frame
        .iter()
        .map(|&s| Float::abs(s))
        .fold(T::zero(), Float::max)
}

/// Number of sign changes between consecutive samples.
///
/// A sample of exactly zero is on the non-positive side.
pub fn zero_crossing_rate<T: Sample>(frame: &[T]) -> T {
    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] > T::zero()) != (pair[1] > T::zero()))
        .count();
    T::of_usize(crossings)
}

/// Square root of the mean absolute deviation from the frame mean.
///
/// This is deliberately not the variance-based standard deviation.
pub fn standard_deviation<T: Sample>(frame: &[T]) -> T {
    if frame.is_empty() {
        return T::zero();
    }
    let n = T::of_usize(frame.len());
    let mean = frame.iter().copied().sum::<T>() / n;
    let deviation: T = frame.iter().map(|&s| Float::abs(s - mean)).sum();
    (deviation / n).sqrt()
}
