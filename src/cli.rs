use clap::Parser;
use std::path::PathBuf;

use gist::{AnalysisConfig, SignalKind, WindowType};

#[derive(Parser, Debug)]
#[command(name = "gist", about = "Frame-by-frame audio feature extraction")]
pub struct Cli {
    /// Test signal to synthesize (sine, square, sawtooth, impulse, silence)
    #[arg(short, long, default_value_t = SignalKind::Sine)]
    pub signal: SignalKind,

    /// Signal frequencies in Hz, one analysis per value (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub frequency: Vec<f64>,

    /// Number of frames to synthesize per signal
    #[arg(long, default_value_t = 16)]
    pub frames: usize,

    /// Hop between frame starts in samples (0 = frame size)
    #[arg(long, default_value_t = 0)]
    pub hop: usize,

    /// Peak amplitude of the synthesized signal
    #[arg(short, long, default_value_t = 0.5)]
    pub amplitude: f64,

    /// Samples per analysis frame
    #[arg(long, default_value_t = 512)]
    pub frame_size: usize,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Number of MFCCs to compute
    #[arg(long, default_value_t = 13)]
    pub coefficients: usize,

    /// Highest pitch the YIN detector will report, in Hz
    #[arg(long, default_value_t = 1500.0)]
    pub max_frequency: f64,

    /// Fraction of spectral energy below the rolloff point
    #[arg(long, default_value_t = 0.85)]
    pub rolloff: f64,

    /// Window applied before the FFT (rectangular, hanning, hamming, blackman)
    #[arg(short, long, default_value_t = WindowType::Rectangular)]
    pub window: WindowType,

    /// Analyse in f32 instead of f64
    #[arg(long)]
    pub single_precision: bool,

    /// Read a JSON array of samples from stdin instead of synthesizing
    #[arg(long)]
    pub stdin: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Config file (defaults to ./gist.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            frame_size: self.frame_size,
            sample_rate: self.sample_rate,
            mfcc_coefficients: self.coefficients,
            max_frequency: self.max_frequency,
            window: self.window,
            rolloff_percentile: self.rolloff,
        }
    }

    /// Hop in samples with the 0 shorthand resolved.
    pub fn hop_size(&self) -> usize {
        if self.hop == 0 { self.frame_size } else { self.hop }
    }

    pub fn frequencies(&self) -> Vec<f64> {
        if self.frequency.is_empty() { vec![440.0] } else { self.frequency.clone() }
    }
}
