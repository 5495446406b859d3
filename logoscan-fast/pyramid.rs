use logoscan_core::{FeatureConfig, Image, Pyramid};
use crate::error::{FastError, FastResult};
use crate::types::ScaleLevel;

/// Image pyramid operations for multi-scale feature detection
pub struct ImagePyramid;

impl ImagePyramid {
    /// Generate scale levels for image pyramid.
    ///
    /// Levels whose border-stripped area would be empty are dropped, so an
    /// image smaller than `2 * edge_threshold + 1` yields no levels at all.
    pub fn generate_scale_levels(width: usize, height: usize, cfg: &FeatureConfig) -> Vec<ScaleLevel> {
        let min_side = 2 * cfg.edge_threshold + 1;
        let mut levels = Vec::with_capacity(cfg.n_levels);
        let mut current_scale = 1.0f32;

        for level in 0..cfg.n_levels {
            let scaled_width = ((width as f32) / current_scale).round() as usize;
            let scaled_height = ((height as f32) / current_scale).round() as usize;

            if scaled_width < min_side || scaled_height < min_side {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
            });

            current_scale *= cfg.scale_factor;
        }

        levels
    }

    /// Build image pyramid from base image, each level resampled from the previous one
    pub fn build_image_pyramid(img: &Image, width: usize, height: usize, scale_levels: &[ScaleLevel]) -> FastResult<Pyramid> {
        let expected_len = width * height;
        if img.len() != expected_len {
            return Err(FastError::InvalidImageData {
                expected_len,
                actual_len: img.len(),
            });
        }

        let mut images: Vec<Image> = Vec::with_capacity(scale_levels.len());
        for scale_level in scale_levels {
            let next = match images.last() {
                None => img.clone(),
                Some(prev) => {
                    let prev_level = &scale_levels[scale_level.level - 1];
                    Self::downsample_image(
                        prev,
                        prev_level.width,
                        prev_level.height,
                        scale_level.width,
                        scale_level.height,
                    )
                }
            };
            images.push(next);
        }

        Ok(Pyramid {
            levels: scale_levels.to_vec(),
            images,
        })
    }

    /// Downsample image using pixel-centre aligned bilinear interpolation
    fn downsample_image(img: &Image, src_width: usize, src_height: usize, target_width: usize, target_height: usize) -> Image {
        let mut downsampled = vec![0u8; target_width * target_height];

        let x_ratio = src_width as f32 / target_width as f32;
        let y_ratio = src_height as f32 / target_height as f32;

        for (y, row) in downsampled.chunks_exact_mut(target_width).enumerate() {
            let src_y = ((y as f32 + 0.5) * y_ratio - 0.5).max(0.0);
            for (x, px) in row.iter_mut().enumerate() {
                let src_x = ((x as f32 + 0.5) * x_ratio - 0.5).max(0.0);
                let value = Self::bilinear_sample(img, src_width, src_height, src_x, src_y);
                *px = value.round().clamp(0.0, 255.0) as u8;
            }
        }

        downsampled
    }

    /// Sample image at fractional coordinates using bilinear interpolation
    fn bilinear_sample(img: &Image, width: usize, height: usize, x: f32, y: f32) -> f32 {
        let x1 = (x.floor() as usize).min(width - 1);
        let y1 = (y.floor() as usize).min(height - 1);
        let x2 = (x1 + 1).min(width - 1);
        let y2 = (y1 + 1).min(height - 1);

        let fx = x - x1 as f32;
        let fy = y - y1 as f32;

        let p11 = img[y1 * width + x1] as f32;
        let p12 = img[y1 * width + x2] as f32;
        let p21 = img[y2 * width + x1] as f32;
        let p22 = img[y2 * width + x2] as f32;

        let top = p11 * (1.0 - fx) + p12 * fx;
        let bottom = p21 * (1.0 - fx) + p22 * fx;

        top * (1.0 - fy) + bottom * fy
    }
}
