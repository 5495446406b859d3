//! Logo detection by local feature matching.
//!
//! [`upscale`](upscale::upscale) enlarges a reference logo,
//! [`match_images`](pipeline::match_images) detects ORB-style features in the
//! logo and a screenshot, keeps distinctive k=2 matches and scores them.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod upscale;
pub mod visualize;

use image::GrayImage;
use logoscan_brief::BriefGenerator;
use logoscan_core::{FeatureConfig, Features};
use logoscan_fast::{DetectorBuilder, FastDetector};

pub use config::PipelineConfig;
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{MatchOutcome, match_features, match_images, run_pipeline};
pub use report::MatchReport;
pub use upscale::upscale;

/// Oriented FAST keypoints with steered BRIEF descriptors
pub struct LogoScanner {
    config: FeatureConfig,
    brief_generator: BriefGenerator,
}

impl LogoScanner {
    /// Create a scanner, validating the detector parameters up front
    pub fn new(config: FeatureConfig) -> PipelineResult<Self> {
        // A 1x1 image has no pyramid levels, so this only checks parameters
        FastDetector::new(config.clone(), 1, 1)?;
        let brief_generator = BriefGenerator::new(config.patch_size);
        Ok(Self {
            config,
            brief_generator,
        })
    }

    /// Detect keypoints and describe each one on its own pyramid level
    pub fn detect_and_describe(&self, img: &GrayImage) -> PipelineResult<Features> {
        let (w, h) = img.dimensions();
        let builder = DetectorBuilder::from_config(self.config.clone(), w as usize, h as usize);
        log::debug!("detector: {}", builder.summary());
        let detector = builder.build()?;
        let (keypoints, pyramid) = detector.detect_with_pyramid(img.as_raw())?;
        let descriptors = self.brief_generator.generate_descriptors(&pyramid, &keypoints);
        Ok(Features::new(keypoints, descriptors))
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Bright squares on a dark background, one per `cell`
    fn squares(size: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if x % cell < cell / 2 && y % cell < cell / 2 { Luma([210]) } else { Luma([40]) }
        })
    }

    #[test]
    fn rejects_invalid_parameters() {
        let cfg = FeatureConfig {
            patch_size: 8,
            ..FeatureConfig::default()
        };
        assert!(matches!(LogoScanner::new(cfg), Err(PipelineError::Detector(_))));
    }

    #[test]
    fn uniform_image_has_no_features() {
        let scanner = LogoScanner::new(FeatureConfig::default()).unwrap();
        let features = scanner.detect_and_describe(&GrayImage::from_pixel(160, 120, Luma([128]))).unwrap();
        assert!(features.is_empty());
        assert!(features.descriptors.is_empty());
    }

    #[test]
    fn tiny_image_has_no_features() {
        let scanner = LogoScanner::new(FeatureConfig::default()).unwrap();
        let features = scanner.detect_and_describe(&squares(20, 4)).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn textured_image_is_described() {
        let scanner = LogoScanner::new(FeatureConfig::default()).unwrap();
        let features = scanner.detect_and_describe(&squares(160, 16)).unwrap();
        assert!(!features.is_empty());
        assert_eq!(features.keypoints.len(), features.descriptors.len());
        assert_eq!(scanner.config().max_features, 0);

        let capped = LogoScanner::new(FeatureConfig {
            max_features: 10,
            ..FeatureConfig::default()
        })
        .unwrap();
        let features = capped.detect_and_describe(&squares(160, 16)).unwrap();
        assert_eq!(features.len(), 10);
    }
}
