use logoscan_core::FeatureConfig;
use crate::detector::FastDetector;
use crate::error::FastResult;

/// Sizes a [`FastDetector`] to one image from a shared configuration
#[derive(Debug, Clone)]
pub struct DetectorBuilder {
    config: FeatureConfig,
    width: usize,
    height: usize,
}

impl DetectorBuilder {
    pub fn from_config(config: FeatureConfig, width: usize, height: usize) -> Self {
        Self { config, width, height }
    }

    /// Build the detector, validating every parameter
    pub fn build(self) -> FastResult<FastDetector> {
        FastDetector::new(self.config, self.width, self.height)
    }

    /// Image size plus the detector parameters, for logs
    pub fn summary(&self) -> String {
        format!("{}x{}, {}", self.width, self.height, crate::config::summary(&self.config))
    }
}
