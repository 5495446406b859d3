use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use logoscan_fast::DetectorPreset;
use logoscan_match::MatcherKind;

use crate::config::PipelineConfig;
use crate::error::ConfigError;

/// Where `run` writes the upscaled logo unless told otherwise
pub const DEFAULT_UPSCALED_PATH: &str = "logo.jpg";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MatcherArg {
    Lsh,
    BruteForce,
}

impl From<MatcherArg> for MatcherKind {
    fn from(arg: MatcherArg) -> Self {
        match arg {
            MatcherArg::Lsh => MatcherKind::Lsh,
            MatcherArg::BruteForce => MatcherKind::BruteForce,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PresetArg {
    Balanced,
    Fast,
    Quality,
}

impl From<PresetArg> for DetectorPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Balanced => DetectorPreset::Balanced,
            PresetArg::Fast => DetectorPreset::Fast,
            PresetArg::Quality => DetectorPreset::Quality,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "logoscan",
    version,
    about = "Find a reference logo in a screenshot by local feature matching",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Configuration file (TOML, or JSON by extension)
    #[arg(long = "config", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads for detection and matching (0 = one per core)
    #[arg(long = "threads", global = true, value_name = "N")]
    pub threads: Option<usize>,

    /// Descriptor matcher
    #[arg(long = "matcher", global = true, value_enum)]
    pub matcher: Option<MatcherArg>,

    /// Detector tuning preset
    #[arg(long = "preset", global = true, value_enum)]
    pub preset: Option<PresetArg>,

    /// Lowe's ratio for accepting a best match
    #[arg(long = "ratio", global = true, value_name = "R")]
    pub ratio: Option<f32>,

    /// Scores above this count as high-confidence
    #[arg(long = "threshold", global = true, value_name = "T")]
    pub threshold: Option<f64>,

    /// Print the match report as JSON
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resize an image by a percentage and save it
    Upscale {
        source: PathBuf,
        /// Percent of the original size
        #[arg(long = "scale", value_name = "PERCENT")]
        scale: Option<f64>,
        #[arg(long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Match a logo against a screenshot
    Match {
        logo: PathBuf,
        screenshot: PathBuf,
        /// Write a side-by-side match image
        #[arg(long = "visualize", value_name = "FILE")]
        visualize: Option<PathBuf>,
    },
    /// Upscale the logo, then match it against a screenshot
    Run {
        logo: PathBuf,
        screenshot: PathBuf,
        #[arg(long = "scale", value_name = "PERCENT")]
        scale: Option<f64>,
        /// Where to save the upscaled logo
        #[arg(long = "upscaled", value_name = "FILE")]
        upscaled: Option<PathBuf>,
        #[arg(long = "visualize", value_name = "FILE")]
        visualize: Option<PathBuf>,
    },
}

impl CliArgs {
    /// Configuration file (or defaults) with command-line values on top
    pub fn effective_config(&self) -> Result<PipelineConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(threads) = self.threads {
            cfg.detector.n_threads = threads;
        }
        if let Some(kind) = self.matcher {
            cfg.matcher.kind = kind.into();
        }
        if let Some(preset) = self.preset {
            cfg.preset = Some(preset.into());
        }
        if let Some(ratio) = self.ratio {
            cfg.scoring.ratio = ratio;
        }
        if let Some(threshold) = self.threshold {
            cfg.scoring.high_confidence_threshold = threshold;
        }

        match &self.command {
            Command::Upscale { scale, output, .. } => {
                if let Some(scale) = scale {
                    cfg.upscale.scale_percent = *scale;
                }
                if output.is_some() {
                    cfg.upscale.output = output.clone();
                }
            }
            Command::Match { visualize, .. } => {
                if visualize.is_some() {
                    cfg.visualization = visualize.clone();
                }
            }
            Command::Run {
                scale,
                upscaled,
                visualize,
                ..
            } => {
                if let Some(scale) = scale {
                    cfg.upscale.scale_percent = *scale;
                }
                match upscaled {
                    Some(path) => cfg.upscale.output = Some(path.clone()),
                    None if cfg.upscale.output.is_none() => {
                        cfg.upscale.output = Some(PathBuf::from(DEFAULT_UPSCALED_PATH));
                    }
                    None => {}
                }
                if visualize.is_some() {
                    cfg.visualization = visualize.clone();
                }
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }
}
