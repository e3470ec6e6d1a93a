//! Monophonic pitch estimation with the YIN algorithm
//! (de Cheveigné & Kawahara, 2002).

use super::error::AnalysisError;
use super::sample::Sample;

/// Upper pitch bound used when none is configured.
pub const DEFAULT_MAX_FREQUENCY: f64 = 1500.0;

/// Bounds at or below this are rejected in favour of [`FALLBACK_MAX_FREQUENCY`].
const MIN_VALID_MAX_FREQUENCY: f64 = 200.0;
const FALLBACK_MAX_FREQUENCY: f64 = 2000.0;

/// Absolute threshold on the normalized difference for accepting a dip.
const THRESHOLD: f64 = 0.1;

pub struct Yin<T: Sample> {
    sample_rate: u32,
    max_frequency: f64,
    min_period: usize,
    prev_period_estimate: T,
    delta: Vec<T>,
}

impl<T: Sample> Yin<T> {
    pub fn new(sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        let mut yin = Self {
            sample_rate,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            min_period: 1,
            prev_period_estimate: T::one(),
            delta: Vec::new(),
        };
        yin.set_max_frequency(DEFAULT_MAX_FREQUENCY);
        Ok(yin)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Changes the sample rate and rescales the minimum period so the same
    /// frequency ceiling still applies.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        self.sample_rate = sample_rate;
        self.update_min_period();
        Ok(())
    }

    /// Sets the highest detectable pitch. Bounds at or below 200 Hz (or not
    /// finite) fall back to 2000 Hz.
    pub fn set_max_frequency(&mut self, max_frequency: f64) {
        self.max_frequency = if max_frequency.is_finite() && max_frequency > MIN_VALID_MAX_FREQUENCY {
            max_frequency
        } else {
            log::debug!(
                "YIN max frequency {} Hz out of range, using {} Hz",
                max_frequency,
                FALLBACK_MAX_FREQUENCY
            );
            FALLBACK_MAX_FREQUENCY
        };
        self.update_min_period();
    }

    fn update_min_period(&mut self) {
        let period = (self.sample_rate as f64 / self.max_frequency).ceil();
        self.min_period = (period as usize).max(1);
        log::debug!(
            "YIN minimum period {} samples at {} Hz",
            self.min_period,
            self.sample_rate
        );
    }

    /// Highest pitch this estimator can report: `sample_rate / min_period`.
    pub fn max_frequency(&self) -> T {
        T::of_usize(self.sample_rate as usize) / T::of_usize(self.min_period)
    }

    pub fn min_period(&self) -> usize {
        self.min_period
    }

    /// Period (in samples, fractional) chosen by the previous call.
    pub fn previous_period(&self) -> T {
        self.prev_period_estimate
    }

    /// Estimates the pitch of `frame` in Hz.
    ///
    /// Silent or constant frames have no dip in the difference function and
    /// resolve to [`Yin::max_frequency`].
    pub fn pitch(&mut self, frame: &[T]) -> T {
        self.cumulative_mean_normalized_difference(frame);

        let period = self
            .search_near_previous_period()
            .unwrap_or_else(|| self.period_candidate());

        let refined = if period > 0 && period + 1 < self.delta.len() {
            parabolic_interpolation(
                period,
                self.delta[period - 1],
                self.delta[period],
                self.delta[period + 1],
            )
        } else {
            T::of_usize(period)
        };

        self.prev_period_estimate = refined;
        T::of_usize(self.sample_rate as usize) / refined
    }

    /// Fills `delta` with the cumulative mean normalized difference over lags
    /// `[0, N/2)`, comparing the first half of the frame with its shifted copy.
    fn cumulative_mean_normalized_difference(&mut self, frame: &[T]) {
        let half = frame.len() / 2;
        self.delta.clear();
        self.delta.resize(half, T::zero());

        let mut cumulative = T::zero();
        for tau in 0..half {
            let d: T = frame[..half]
                .iter()
                .zip(&frame[tau..tau + half])
                .map(|(&a, &b)| (a - b) * (a - b))
                .sum();
            cumulative += d;
            self.delta[tau] = if cumulative > T::zero() {
                d * T::of_usize(tau) / cumulative
            } else {
                d
            };
        }

        if let Some(first) = self.delta.first_mut() {
            *first = T::one();
        }
    }

    fn is_local_minimum(&self, i: usize) -> bool {
        self.delta[i] < self.delta[i - 1] && self.delta[i] < self.delta[i + 1]
    }

    /// Looks for a dip at the previous estimate or one sample either side.
    /// Lags below the minimum period are skipped, so this path never reports
    /// a pitch above [`Yin::max_frequency`].
    fn search_near_previous_period(&self) -> Option<usize> {
        let previous = self.prev_period_estimate.round();
        if !previous.is_finite() || previous < T::zero() {
            return None;
        }
        let centre: f64 = previous.into();
        let centre = centre as usize;

        let lo = centre.saturating_sub(1).max(self.min_period);
        let hi = (centre + 1).min(self.delta.len().saturating_sub(2));

        (lo..=hi).filter(|&i| self.is_local_minimum(i)).last()
    }

    /// First dip below the threshold at or beyond the minimum period, else
    /// the global minimum over that range, else the minimum period itself.
    fn period_candidate(&self) -> usize {
        let threshold = T::of(THRESHOLD);
        let mut min_value = T::infinity();
        let mut min_index = self.min_period;

        for i in self.min_period..self.delta.len().saturating_sub(1) {
            if self.delta[i] < min_value {
                min_value = self.delta[i];
                min_index = i;
            }
            if self.delta[i] < threshold && self.is_local_minimum(i) {
                return i;
            }
        }
        min_index
    }
}

/// Vertex of the parabola through `(period-1, y1)`, `(period, y2)`,
/// `(period+1, y3)`. Flat or collinear neighbourhoods keep the integer period.
fn parabolic_interpolation<T: Sample>(period: usize, y1: T, y2: T, y3: T) -> T {
    let period = T::of_usize(period);
    if y1 == y2 && y2 == y3 {
        return period;
    }
    let denominator = T::of(2.0) * (T::of(2.0) * y2 - y3 - y1);
    if denominator == T::zero() {
        return period;
    }
    period + (y3 - y1) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(frequency: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * frequency * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(matches!(
            Yin::<f32>::new(0),
            Err(AnalysisError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn silent_and_constant_frames_report_max_frequency() {
        for value in [0.0f32, 1.0, -1.0] {
            let mut yin = Yin::<f32>::new(44100).unwrap();
            let pitch = yin.pitch(&vec![value; 512]);
            assert_eq!(pitch, yin.max_frequency());
            assert!(pitch.is_finite());
            // a second call follows the same path through the continuity check
            assert_eq!(yin.pitch(&vec![value; 512]), yin.max_frequency());
        }
    }

    #[test]
    fn detects_sine_pitch() {
        let mut yin = Yin::<f64>::new(44100).unwrap();
        let pitch = yin.pitch(&sine(441.0, 44100.0, 512));
        assert_relative_eq!(pitch, 441.0, max_relative = 0.005);
        assert_relative_eq!(yin.previous_period(), 100.0, max_relative = 0.005);

        let mut yin = Yin::<f64>::new(44100).unwrap();
        assert_relative_eq!(yin.pitch(&sine(220.5, 44100.0, 1024)), 220.5, max_relative = 0.005);
    }

    #[test]
    fn continuity_keeps_period_across_frames() {
        let mut yin = Yin::<f64>::new(44100).unwrap();
        let frame = sine(441.0, 44100.0, 512);
        let first = yin.pitch(&frame);
        let second = yin.pitch(&frame);
        assert_relative_eq!(second, first, epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn previous_period_wins_over_threshold_search() {
        let frame = sine(441.0, 44100.0, 1024);

        let mut fresh = Yin::<f64>::new(44100).unwrap();
        assert_relative_eq!(fresh.pitch(&frame), 441.0, max_relative = 0.005);

        // the dip at twice the period is also a local minimum
        let mut tracking = Yin::<f64>::new(44100).unwrap();
        tracking.prev_period_estimate = 200.0;
        assert_relative_eq!(tracking.pitch(&frame), 220.5, max_relative = 0.005);
        assert_relative_eq!(tracking.previous_period(), 200.0, max_relative = 0.005);
    }

    #[test]
    fn previous_period_without_a_dip_falls_through() {
        let frame = sine(441.0, 44100.0, 1024);
        let mut yin = Yin::<f64>::new(44100).unwrap();
        // half a period away the difference function peaks
        yin.prev_period_estimate = 150.0;
        assert_relative_eq!(yin.pitch(&frame), 441.0, max_relative = 0.005);
        assert_relative_eq!(yin.previous_period(), 100.0, max_relative = 0.005);
    }

    #[test]
    fn previous_period_below_min_period_is_ignored() {
        let frame = sine(441.0, 44100.0, 1024);
        let mut yin = Yin::<f64>::new(44100).unwrap();
        yin.set_max_frequency(1000.0);
        yin.prev_period_estimate = 5.0;
        let pitch = yin.pitch(&frame);
        assert!(pitch <= yin.max_frequency());
        assert_relative_eq!(pitch, 441.0, max_relative = 0.005);
    }

    #[test]
    fn single_precision_sine() {
        let mut yin = Yin::<f32>::new(48000).unwrap();
        let frame: Vec<f32> = sine(480.0, 48000.0, 1024).into_iter().map(|s| s as f32).collect();
        assert_relative_eq!(yin.pitch(&frame) as f64, 480.0, max_relative = 0.01);
    }

    #[test]
    fn min_period_follows_max_frequency() {
        let mut yin = Yin::<f64>::new(44100).unwrap();
        assert_eq!(yin.min_period(), 30);

        yin.set_max_frequency(100.0);
        assert_eq!(yin.min_period(), 23);
        assert_relative_eq!(yin.max_frequency(), 44100.0 / 23.0, epsilon = 1e-9, max_relative = 1e-12);

        yin.set_max_frequency(f64::NAN);
        assert_eq!(yin.min_period(), 23);
    }

    #[test]
    fn sample_rate_change_rescales_min_period() {
        let mut yin = Yin::<f64>::new(44100).unwrap();
        yin.set_sample_rate(22050).unwrap();
        assert_eq!(yin.min_period(), 15);
        assert_eq!(yin.sample_rate(), 22050);
        assert_eq!(yin.set_sample_rate(0), Err(AnalysisError::InvalidSampleRate(0)));
    }

    #[test]
    fn short_frames_fall_back_to_min_period() {
        let mut yin = Yin::<f64>::new(44100).unwrap();
        let pitch = yin.pitch(&[0.3, -0.2, 0.1, 0.5]);
        assert_eq!(pitch, yin.max_frequency());
        assert_eq!(yin.pitch(&[]), yin.max_frequency());
    }

    #[test]
    fn difference_function_starts_at_one() {
        let mut yin = Yin::<f64>::new(44100).unwrap();
        yin.cumulative_mean_normalized_difference(&sine(441.0, 44100.0, 512));
        assert_eq!(yin.delta.len(), 256);
        assert_eq!(yin.delta[0], 1.0);
        assert!(yin.delta[100] < 1e-6);
    }

    #[test]
    fn interpolation_of_flat_minimum_keeps_period() {
        assert_eq!(parabolic_interpolation(42, 0.0f64, 0.0, 0.0), 42.0);
        assert_eq!(parabolic_interpolation(42, 0.3f32, 0.3, 0.3), 42.0);
    }

    #[test]
    fn interpolation_refines_towards_lower_neighbour() {
        // parabola (x - 10.25)^2 sampled at 9, 10, 11
        let f = |x: f64| (x - 10.25) * (x - 10.25);
        assert_relative_eq!(parabolic_interpolation(10, f(9.0), f(10.0), f(11.0)), 10.25, epsilon = 1e-9, max_relative = 1e-12);
        // collinear points have no vertex
        assert_eq!(parabolic_interpolation(5, 1.0f64, 2.0, 3.0), 5.0);
    }
}
