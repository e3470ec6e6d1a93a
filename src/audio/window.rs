use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sample::Sample;

/// Window applied to a frame before the forward FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// No tapering; the FFT sees the raw samples.
    #[default]
    Rectangular,
    Hanning,
    Hamming,
    Blackman,
}

impl WindowType {
    pub const ALL: [WindowType; 4] = [
        WindowType::Rectangular,
        WindowType::Hanning,
        WindowType::Hamming,
        WindowType::Blackman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WindowType::Rectangular => "rectangular",
            WindowType::Hanning => "hanning",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
        }
    }

    /// Builds the window coefficients for a frame of `size` samples.
    ///
    /// Tapered windows use an `N - 1` denominator so both ends reach the
    /// window's minimum. Frames shorter than two samples get a unit window.
    pub fn coefficients<T: Sample>(self, size: usize) -> Vec<T> {
        if self == WindowType::Rectangular || size < 2 {
            return vec![T::one(); size];
        }

        let denom = (size - 1) as f64;
        let two_pi = 2.0 * std::f64::consts::PI;

        (0..size)
            .map(|i| {
                let phase = two_pi * i as f64 / denom;
                let w = match self {
                    WindowType::Hanning => 0.5 * (1.0 - phase.cos()),
                    WindowType::Hamming => 0.54 - 0.46 * phase.cos(),
                    WindowType::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
                    WindowType::Rectangular => 1.0,
                };
                T::of(w)
            })
            .collect()
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Ok(WindowType::Rectangular),
            "hanning" | "hann" => Ok(WindowType::Hanning),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            other => Err(format!(
                "unknown window '{}'. Valid names: {}",
                other,
                WindowType::ALL
                    .iter()
                    .map(|w| w.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rectangular_is_all_ones() {
        let w: Vec<f64> = WindowType::Rectangular.coefficients(8);
        assert!(w.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn hanning_tapers_to_zero_at_edges() {
        let w: Vec<f64> = WindowType::Hanning.coefficients(101);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[100], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[50], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hamming_and_blackman_edges() {
        let hamming: Vec<f32> = WindowType::Hamming.coefficients(64);
        assert_abs_diff_eq!(hamming[0], 0.08, epsilon = 1e-6);
        let blackman: Vec<f64> = WindowType::Blackman.coefficients(64);
        assert_abs_diff_eq!(blackman[0], 0.0, epsilon = 1e-12);
        assert!(blackman.iter().all(|&v| v >= -1e-12 && v <= 1.0 + 1e-12));
    }

    #[test]
    fn tiny_frames_get_unit_window() {
        let w: Vec<f64> = WindowType::Blackman.coefficients(1);
        assert_eq!(w, vec![1.0]);
    }

    #[test]
    fn parses_names() {
        assert_eq!("hann".parse::<WindowType>(), Ok(WindowType::Hanning));
        assert_eq!("Blackman".parse::<WindowType>(), Ok(WindowType::Blackman));
        assert!("triangle".parse::<WindowType>().is_err());
    }
}
