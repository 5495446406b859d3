use std::path::{Path, PathBuf};

use image::DynamicImage;
use image::imageops::FilterType;

use crate::error::{PipelineError, PipelineResult};
use crate::loader::{load_color, save_image};

/// Target size for a proportional resize; each side is rounded independently
pub fn scaled_dimensions(width: u32, height: u32, scale_percent: f64) -> PipelineResult<(u32, u32)> {
    if !scale_percent.is_finite() || scale_percent <= 0.0 {
        return Err(PipelineError::InvalidScale(scale_percent));
    }
    let scale = |side: u32| (side as f64 * scale_percent / 100.0).round();
    let (w, h) = (scale(width), scale(height));
    if w < 1.0 || h < 1.0 || w > u32::MAX as f64 || h > u32::MAX as f64 {
        return Err(PipelineError::InvalidScale(scale_percent));
    }
    Ok((w as u32, h as u32))
}

/// Resize by a percentage of the current size.
///
/// Reductions average source areas, enlargements interpolate bilinearly.
pub fn resize_image(img: &DynamicImage, scale_percent: f64) -> PipelineResult<DynamicImage> {
    let (w, h) = scaled_dimensions(img.width(), img.height(), scale_percent)?;
    let resized = if (w, h) == (img.width(), img.height()) {
        img.clone()
    } else if scale_percent < 100.0 {
        img.thumbnail_exact(w, h)
    } else {
        img.resize_exact(w, h, FilterType::Triangle)
    };
    Ok(resized)
}

/// Load `source`, resize it and optionally write the result.
///
/// Returns the written path, or `None` when no output was requested.
pub fn upscale<P: AsRef<Path>>(source: P, scale_percent: f64, output: Option<&Path>) -> PipelineResult<Option<PathBuf>> {
    let source = source.as_ref();
    if !scale_percent.is_finite() || scale_percent <= 0.0 {
        return Err(PipelineError::InvalidScale(scale_percent));
    }

    let img = load_color(source)?;
    let resized = resize_image(&img, scale_percent)?;
    log::debug!(
        "resized {} from {}x{} to {}x{} ({}%)",
        source.display(),
        img.width(),
        img.height(),
        resized.width(),
        resized.height(),
        scale_percent
    );

    match output {
        Some(path) => {
            save_image(&resized, path)?;
            log::info!("upscaled image saved to {}", path.display());
            Ok(Some(path.to_path_buf()))
        }
        None => {
            log::warn!("no output path given; upscaled image of {} was not saved", source.display());
            Ok(None)
        }
    }
}
