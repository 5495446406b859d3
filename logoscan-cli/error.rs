use std::path::PathBuf;

use logoscan_fast::FastError;
use logoscan_match::MatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML config")]
    TomlDe(#[from] toml::de::Error),
    #[error("cannot serialize config as TOML")]
    TomlSer(#[from] toml::ser::Error),
    #[error("invalid JSON config")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The path does not resolve to a decodable image
    #[error("unable to load image {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unable to save image {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid scale {0}% (must be finite, > 0, and keep both dimensions non-zero)")]
    InvalidScale(f64),
    #[error("upscaled logo was not saved; an output path is required to continue matching")]
    MissingUpscaledImage,
    #[error("feature detection failed")]
    Detector(#[from] FastError),
    #[error("matcher setup failed")]
    Matcher(#[from] MatchError),
    #[error("configuration error")]
    Config(#[from] ConfigError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
