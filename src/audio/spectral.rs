//! Shape descriptors of a magnitude spectrum.
//!
//! Bin indices stand in for frequency, so results are in bins (or
//! normalized bins for rolloff). All functions accept an all-zero spectrum
//! and return a defined value instead of NaN.

use super::sample::Sample;

/// Default fraction of spectral energy used by [`spectral_rolloff`] on a session.
pub const DEFAULT_ROLLOFF_PERCENTILE: f64 = 0.85;

/// Raw spectral moments `Σ iᵏ·mag[i] / Σ mag[i]` for k = 1..=3.
///
/// `None` when the spectrum sums to zero.
fn raw_moments<T: Sample>(spectrum: &[T]) -> Option<[T; 3]> {
    let total: T = spectrum.iter().copied().sum();
    if total == T::zero() {
        return None;
    }

    let mut m1 = T::zero();
    let mut m2 = T::zero();
    let mut m3 = T::zero();
    for (i, &mag) in spectrum.iter().enumerate() {
        let idx = T::of_usize(i);
        m1 += idx * mag;
        m2 += idx * idx * mag;
        m3 += idx * idx * idx * mag;
    }
    Some([m1 / total, m2 / total, m3 / total])
}

/// Centre of mass of the spectrum, in bins.
pub fn spectral_centroid<T: Sample>(spectrum: &[T]) -> T {
    raw_moments(spectrum).map_or(T::zero(), |[m1, _, _]| m1)
}

/// Standard deviation of the spectrum around its centroid, in bins.
pub fn spectral_spread<T: Sample>(spectrum: &[T]) -> T {
    raw_moments(spectrum).map_or(T::zero(), |[m1, m2, _]| spread_from(m1, m2))
}

fn spread_from<T: Sample>(m1: T, m2: T) -> T {
    (m2 - m1 * m1).max(T::zero()).sqrt()
}

/// Asymmetry of the spectrum around its centroid. Zero when the spread is zero.
pub fn spectral_skewness<T: Sample>(spectrum: &[T]) -> T {
    let Some([m1, m2, m3]) = raw_moments(spectrum) else {
        return T::zero();
    };
    let spread = spread_from(m1, m2);
    if spread == T::zero() {
        return T::zero();
    }
    let central3 = T::of(2.0) * m1 * m1 * m1 - T::of(3.0) * m1 * m2 + m3;
    central3 / (spread * spread * spread)
}

/// Excess kurtosis of the bin amplitudes about their mean.
///
/// Returns -3 when the amplitudes have no variance (flat or empty spectrum).
pub fn spectral_kurtosis<T: Sample>(spectrum: &[T]) -> T {
    let excess = T::of(3.0);
    if spectrum.is_empty() {
        return -excess;
    }

    let n = T::of_usize(spectrum.len());
    let mean = spectrum.iter().copied().sum::<T>() / n;

    let mut moment2 = T::zero();
    let mut moment4 = T::zero();
    for &mag in spectrum {
        let sq = (mag - mean) * (mag - mean);
        moment2 += sq;
        moment4 += sq * sq;
    }
    moment2 /= n;
    moment4 /= n;

    if moment2 == T::zero() {
        return -excess;
    }
    moment4 / (moment2 * moment2) - excess
}

/// Ratio of geometric to arithmetic mean of `1 + mag`.
///
/// The unit offset keeps zero bins out of the logarithm, so an all-zero
/// spectrum is perfectly flat (1). An empty spectrum yields 0.
pub fn spectral_flatness<T: Sample>(spectrum: &[T]) -> T {
    if spectrum.is_empty() {
        return T::zero();
    }
    let n = T::of_usize(spectrum.len());
    let log_mean = spectrum.iter().map(|&m| (T::one() + m).ln()).sum::<T>() / n;
    let arith_mean = spectrum.iter().map(|&m| T::one() + m).sum::<T>() / n;

    if arith_mean <= T::zero() {
        return T::zero();
    }
    log_mean.exp() / arith_mean
}

/// Peak power over mean power. A silent spectrum is not peaky and yields 1.
pub fn spectral_crest<T: Sample>(spectrum: &[T]) -> T {
    let mut sum = T::zero();
    let mut max = T::zero();
    for &mag in spectrum {
        let power = mag * mag;
        sum += power;
        max = max.max(power);
    }
    if sum == T::zero() {
        return T::one();
    }
    max / (sum / T::of_usize(spectrum.len()))
}

/// Normalized index of the first bin where the cumulative magnitude
/// strictly exceeds `percentile` of the total.
///
/// Returns 0 for a silent spectrum and 1 when the threshold is never
/// crossed (a percentile of 1 or more).
pub fn spectral_rolloff<T: Sample>(spectrum: &[T], percentile: T) -> T {
    let total: T = spectrum.iter().copied().sum();
    if total == T::zero() {
        return T::zero();
    }

    let threshold = percentile * total;
    let mut cumulative = T::zero();
    for (i, &mag) in spectrum.iter().enumerate() {
        cumulative += mag;
        if cumulative > threshold {
            return T::of_usize(i) / T::of_usize(spectrum.len());
        }
    }
    T::one()
}

/// Average slope of the spectrum relative to its first bin, weighted by `1/k`.
pub fn spectral_decrease<T: Sample>(spectrum: &[T]) -> T {
    let Some((&first, rest)) = spectrum.split_first() else {
        return T::zero();
    };

    let mut numerator = T::zero();
    let mut denominator = T::zero();
    for (k, &mag) in rest.iter().enumerate() {
        numerator += (mag - first) / T::of_usize(k + 1);
        denominator += mag;
    }
    if denominator == T::zero() {
        return T::zero();
    }
    numerator / denominator
}
