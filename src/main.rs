mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Read;

use cli::Cli;
use gist::audio::signal;
use gist::{
    analyze_frames_with, split_frames, summarize, AnalysisConfig, AnalysisSummary,
    FrameDescriptors, Sample,
};

/// One analysed signal in the JSON output.
#[derive(Debug, Serialize)]
struct SignalReport {
    label: String,
    summary: AnalysisSummary,
    frames: Vec<FrameDescriptors>,
}

struct SignalInput {
    label: String,
    samples: Vec<f64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            cfg.merge_into(&mut cli);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    let analysis = cli.analysis_config();
    let hop = cli.hop_size();

    log::info!("gist - audio feature extraction");
    log::info!(
        "Frame size: {}, hop: {}, sample rate: {} Hz, window: {}",
        analysis.frame_size,
        hop,
        analysis.sample_rate,
        analysis.window
    );
    log::info!("Precision: {}", if cli.single_precision { "f32" } else { "f64" });

    let inputs = if cli.stdin {
        vec![read_stdin_signal()?]
    } else {
        synthesize_inputs(&cli)?
    };

    let total_frames: usize = inputs
        .iter()
        .map(|input| input.samples.len().div_ceil(hop.max(1)))
        .sum();
    let pb = ProgressBar::new(total_frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let reports = if cli.single_precision {
        analyze_inputs::<f32>(&analysis, hop, &inputs, &pb)?
    } else {
        analyze_inputs::<f64>(&analysis, hop, &inputs, &pb)?
    };
    pb.finish_with_message("Analysis complete");

    let json = if cli.pretty {
        serde_json::to_string_pretty(&reports)
    } else {
        serde_json::to_string(&reports)
    }
    .context("Failed to serialize analysis")?;
    println!("{}", json);

    Ok(())
}

fn read_stdin_signal() -> Result<SignalInput> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("Failed to read stdin")?;
    let samples: Vec<f64> =
        serde_json::from_str(&raw).context("stdin must hold a JSON array of samples")?;
    log::info!("Read {} samples from stdin", samples.len());
    Ok(SignalInput {
        label: "stdin".into(),
        samples,
    })
}

fn synthesize_inputs(cli: &Cli) -> Result<Vec<SignalInput>> {
    if cli.frames == 0 {
        anyhow::bail!("--frames must be at least 1");
    }
    // Exactly `frames` frames, the last one ending on the final sample
    let len = (cli.frames - 1) * cli.hop_size() + cli.frame_size;

    let inputs = cli
        .frequencies()
        .into_iter()
        .map(|frequency| {
            log::info!("Synthesizing {} at {} Hz ({} samples)", cli.signal, frequency, len);
            SignalInput {
                label: format!("{} {} Hz", cli.signal, frequency),
                samples: signal::generate(cli.signal, frequency, cli.amplitude, cli.sample_rate, len),
            }
        })
        .collect();
    Ok(inputs)
}

/// Each signal runs on its own rayon task with a private session.
fn analyze_inputs<T: Sample>(
    config: &AnalysisConfig,
    hop: usize,
    inputs: &[SignalInput],
    pb: &ProgressBar,
) -> Result<Vec<SignalReport>> {
    inputs
        .par_iter()
        .map(|input| -> Result<SignalReport> {
            let samples: Vec<T> = input.samples.iter().map(|&s| T::of(s)).collect();
            let frames = split_frames(&samples, config.frame_size, hop)?;
            let described = analyze_frames_with(config, &frames, |_| pb.inc(1))
                .with_context(|| format!("Failed to analyse {}", input.label))?;
            let summary = summarize(&described, hop, config.sample_rate);
            log::info!(
                "{}: {} frames, median pitch {:.2} Hz, peak RMS {:.4}",
                input.label,
                summary.frame_count,
                summary.median_pitch,
                summary.peak_rms
            );
            Ok(SignalReport {
                label: input.label.clone(),
                summary,
                frames: described,
            })
        })
        .collect()
}
