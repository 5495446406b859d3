use logoscan_core::{FeatureConfig, Image, Keypoint, Pyramid};
use crate::corner_detection::CornerDetector;
use crate::error::{FastError, FastResult};
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;
use crate::types::ScaleLevel;
use rayon::prelude::*;

/// Deepest pyramid a keypoint's `u8` octave can address
pub const MAX_LEVELS: usize = u8::MAX as usize + 1;

/// Main FAST corner detector with multi-scale capability
#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: FeatureConfig,
    w: usize,
    h: usize,
    scale_levels: Vec<ScaleLevel>,
}

impl FastDetector {
    /// Creates a new FAST detector with validation.
    ///
    /// Images too small for the configured border are accepted; they simply
    /// produce no pyramid levels and therefore no keypoints.
    pub fn new(cfg: FeatureConfig, width: usize, height: usize) -> FastResult<Self> {
        if width == 0 || height == 0 {
            return Err(FastError::InvalidImageSize { width, height });
        }

        // 0 would flag every pixel, >127 overflows the signed segment test range
        if cfg.threshold == 0 || cfg.threshold > 127 {
            return Err(FastError::InvalidThreshold(cfg.threshold));
        }

        if cfg.patch_size % 2 == 0 || cfg.patch_size < 3 {
            return Err(FastError::InvalidPatchSize(cfg.patch_size));
        }

        let min_edge = (cfg.patch_size / 2).max(3);
        if cfg.edge_threshold < min_edge {
            return Err(FastError::InvalidEdgeThreshold {
                edge_threshold: cfg.edge_threshold,
                min: min_edge,
            });
        }

        if !cfg.scale_factor.is_finite() || cfg.scale_factor <= 1.0 {
            return Err(FastError::InvalidScaleFactor(cfg.scale_factor));
        }

        if cfg.n_levels == 0 || cfg.n_levels > MAX_LEVELS {
            return Err(FastError::InvalidLevels(cfg.n_levels));
        }

        let scale_levels = ImagePyramid::generate_scale_levels(width, height, &cfg);

        Ok(Self {
            cfg,
            w: width,
            h: height,
            scale_levels,
        })
    }

    /// Validates image data before processing
    fn validate_image(&self, img: &Image) -> FastResult<()> {
        let expected_len = self.w * self.h;
        if img.len() != expected_len {
            return Err(FastError::InvalidImageData {
                expected_len,
                actual_len: img.len(),
            });
        }
        Ok(())
    }

    /// Detect keypoints across all pyramid levels, in level-0 coordinates
    pub fn detect_keypoints(&self, img: &Image) -> FastResult<Vec<Keypoint>> {
        Ok(self.detect_with_pyramid(img)?.0)
    }

    /// Detect keypoints and hand back the pyramid they were found on, so
    /// descriptors can be computed at each keypoint's native scale
    pub fn detect_with_pyramid(&self, img: &Image) -> FastResult<(Vec<Keypoint>, Pyramid)> {
        self.validate_image(img)?;

        let pyramid = ImagePyramid::build_image_pyramid(img, self.w, self.h, &self.scale_levels)?;

        let per_level: Vec<Vec<Keypoint>> = pyramid
            .levels
            .par_iter()
            .zip(pyramid.images.par_iter())
            .map(|(scale_level, level_img)| self.detect_keypoints_at_scale(level_img, scale_level))
            .collect();

        let all: Vec<Keypoint> = per_level.into_iter().flatten().collect();
        let detected = all.len();
        let keypoints = KeypointRefinement::retain_best(all, self.cfg.max_features);

        log::debug!(
            "FAST: {}x{} image, {} levels, {} corners, {} kept",
            self.w,
            self.h,
            self.scale_levels.len(),
            detected,
            keypoints.len()
        );

        Ok((keypoints, pyramid))
    }

    /// Detect, suppress and orient corners on one level; output is in level-0 coordinates
    pub fn detect_keypoints_at_scale(&self, img: &Image, scale_level: &ScaleLevel) -> Vec<Keypoint> {
        let corners = CornerDetector::detect_corners(img, scale_level, self.cfg.threshold, self.cfg.edge_threshold);
        let suppressed = KeypointRefinement::non_maximum_suppression(&corners, self.cfg.nms_distance);

        suppressed
            .into_iter()
            .map(|kp| {
                let angle = KeypointRefinement::compute_orientation(
                    img,
                    scale_level.width,
                    scale_level.height,
                    kp.x,
                    kp.y,
                    self.cfg.patch_size,
                );
                Keypoint {
                    x: kp.x * scale_level.scale,
                    y: kp.y * scale_level.scale,
                    size: self.cfg.patch_size as f32 * scale_level.scale,
                    angle,
                    response: kp.response,
                    octave: kp.octave,
                }
            })
            .collect()
    }

    /// Get scale levels for this detector
    pub fn scale_levels(&self) -> &[ScaleLevel] {
        &self.scale_levels
    }

    /// Get detector configuration
    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    /// Get image dimensions
    pub fn dimensions(&self) -> (usize, usize) {
        (self.w, self.h)
    }
}
