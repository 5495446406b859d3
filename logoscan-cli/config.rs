use std::path::{Path, PathBuf};

use logoscan_core::FeatureConfig;
use logoscan_fast::DetectorPreset;
use logoscan_match::{DEFAULT_RATIO, MatcherConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Score above which a good match counts as high-confidence
pub const DEFAULT_HIGH_CONFIDENCE: f64 = 60.0;

/// Percent of the logo's linear size used by the upscaler
pub const DEFAULT_SCALE_PERCENT: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Lowe's ratio; best must be closer than `ratio * second_best`
    pub ratio: f32,
    /// Strict lower bound for high-confidence scores
    pub high_confidence_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_RATIO,
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscaleConfig {
    pub scale_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for UpscaleConfig {
    fn default() -> Self {
        Self {
            scale_percent: DEFAULT_SCALE_PERCENT,
            output: None,
        }
    }
}

/// Everything a pipeline run needs besides the input paths
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Applied on top of `detector` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<DetectorPreset>,
    /// Where to write the match composite; `None` disables rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<PathBuf>,
    pub detector: FeatureConfig,
    pub matcher: MatcherConfig,
    pub scoring: ScoringConfig,
    pub upscale: UpscaleConfig,
}

impl PipelineConfig {
    /// Detector settings with the preset, if any, applied
    pub fn detector_config(&self) -> FeatureConfig {
        match self.preset {
            Some(preset) => preset.apply(self.detector.clone()),
            None => self.detector.clone(),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.scoring.ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!("ratio {} must be in (0, 1]", ratio)));
        }

        let threshold = self.scoring.high_confidence_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "high-confidence threshold {} must be in [0, 100]",
                threshold
            )));
        }

        let scale = self.upscale.scale_percent;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::Invalid(format!("scale_percent {} must be finite and > 0", scale)));
        }

        let detector = self.detector_config();
        if detector.patch_size % 2 == 0 || detector.patch_size < 3 {
            return Err(ConfigError::Invalid(format!(
                "patch_size {} must be odd and at least 3",
                detector.patch_size
            )));
        }

        self.matcher
            .build()
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Load from a `.json` file, or TOML for any other extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = if is_json(path) {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save as JSON or TOML, chosen by extension like [`PipelineConfig::load`]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) { self.to_json()? } else { self.to_toml()? };
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
