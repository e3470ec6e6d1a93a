//! Deterministic test signals, so analysis can run without audio files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sample::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    #[default]
    Sine,
    Square,
    Sawtooth,
    /// Unit impulse train at the requested frequency (a single impulse if the frequency is 0).
    Impulse,
    Silence,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::Sine,
        SignalKind::Square,
        SignalKind::Sawtooth,
        SignalKind::Impulse,
        SignalKind::Silence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SignalKind::Sine => "sine",
            SignalKind::Square => "square",
            SignalKind::Sawtooth => "sawtooth",
            SignalKind::Impulse => "impulse",
            SignalKind::Silence => "silence",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("saw").then_some(SignalKind::Sawtooth))
            .ok_or_else(|| {
                format!(
                    "unknown signal '{}'. Valid names: {}",
                    s,
                    SignalKind::ALL.map(|k| k.name()).join(", ")
                )
            })
    }
}

/// Synthesizes `len` samples of `kind` at `frequency` Hz and peak `amplitude`.
pub fn generate<T: Sample>(
    kind: SignalKind,
    frequency: f64,
    amplitude: f64,
    sample_rate: u32,
    len: usize,
) -> Vec<T> {
    let sr = sample_rate.max(1) as f64;
    let cycles = |i: usize| frequency * i as f64 / sr;

    (0..len)
        .map(|i| {
            let value = match kind {
                SignalKind::Sine => (2.0 * std::f64::consts::PI * cycles(i)).sin(),
                SignalKind::Square => {
                    if cycles(i).fract() < 0.5 {
                        1.0
                    } else {
                        -1.0
                    }
                }
                SignalKind::Sawtooth => 2.0 * cycles(i).fract() - 1.0,
                SignalKind::Impulse => {
                    let is_onset = if frequency > 0.0 {
                        i == 0 || cycles(i).floor() > cycles(i - 1).floor()
                    } else {
                        i == 0
                    };
                    if is_onset {
                        1.0
                    } else {
                        0.0
                    }
                }
                SignalKind::Silence => 0.0,
            };
            T::of(amplitude * value)
        })
        .collect()
}
