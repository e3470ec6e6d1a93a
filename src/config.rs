use serde::Deserialize;
use std::path::{Path, PathBuf};

use gist::AnalysisConfig;

use crate::cli::Cli;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
}

/// Finds the config file: explicit path, then ./gist.toml, then the user config dirs.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("gist.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("gist").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("gist").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Option<Config> {
    toml::from_str(content).ok()
}

impl Config {
    /// Config values apply only where the CLI is still at its default.
    pub fn merge_into(self, cli: &mut Cli) {
        let defaults = AnalysisConfig::default();
        let analysis = self.analysis;
        if cli.frame_size == defaults.frame_size { cli.frame_size = analysis.frame_size; }
        if cli.sample_rate == defaults.sample_rate { cli.sample_rate = analysis.sample_rate; }
        if cli.coefficients == defaults.mfcc_coefficients { cli.coefficients = analysis.mfcc_coefficients; }
        if cli.max_frequency == defaults.max_frequency { cli.max_frequency = analysis.max_frequency; }
        if cli.window == defaults.window { cli.window = analysis.window; }
        if cli.rolloff == defaults.rolloff_percentile { cli.rolloff = analysis.rolloff_percentile; }
        if !cli.pretty { cli.pretty = self.output.pretty; }
    }
}
