use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader};

use crate::error::{PipelineError, PipelineResult};

/// Decode any supported format, guessing from content rather than extension
pub fn load_image<P: AsRef<Path>>(path: P) -> PipelineResult<DynamicImage> {
    let path = path.as_ref();
    let load_err = |source| PipelineError::Load {
        path: path.to_path_buf(),
        source,
    };

    let img = ImageReader::open(path)
        .map_err(|e| load_err(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| load_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(load_err)?;

    log::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Load as 8-bit single-channel luminance
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> PipelineResult<GrayImage> {
    Ok(load_image(path)?.to_luma8())
}

/// Load as 8-bit three-channel color
pub fn load_color<P: AsRef<Path>>(path: P) -> PipelineResult<DynamicImage> {
    Ok(DynamicImage::ImageRgb8(load_image(path)?.to_rgb8()))
}

/// Encode by file extension
pub fn save_image<P: AsRef<Path>>(img: &DynamicImage, path: P) -> PipelineResult<()> {
    let path = path.as_ref();
    img.save(path).map_err(|source| PipelineError::Save {
        path: path.to_path_buf(),
        source,
    })
}
