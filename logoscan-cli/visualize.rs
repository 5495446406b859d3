use std::path::Path;

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use logoscan_core::{DescriptorMatch, Keypoint};

use crate::error::PipelineResult;
use crate::loader::save_image;

const PALETTE: [Rgb<u8>; 6] = [
    Rgb([255, 64, 64]),
    Rgb([64, 200, 64]),
    Rgb([64, 128, 255]),
    Rgb([255, 200, 0]),
    Rgb([200, 64, 255]),
    Rgb([0, 220, 220]),
];

const CIRCLE_RADIUS: i32 = 4;

/// Logo on the left, screenshot on the right, one colored line per match.
///
/// Only matched keypoints are drawn. Matches pointing outside either
/// keypoint list are skipped.
pub fn draw_matches(
    logo: &GrayImage,
    screenshot: &GrayImage,
    logo_kps: &[Keypoint],
    screenshot_kps: &[Keypoint],
    matches: &[DescriptorMatch],
) -> RgbImage {
    let width = logo.width() + screenshot.width();
    let height = logo.height().max(screenshot.height());
    let mut canvas = RgbImage::new(width, height);

    let left = DynamicImage::ImageLuma8(logo.clone()).to_rgb8();
    let right = DynamicImage::ImageLuma8(screenshot.clone()).to_rgb8();
    image::imageops::overlay(&mut canvas, &left, 0, 0);
    image::imageops::overlay(&mut canvas, &right, logo.width() as i64, 0);

    let offset = logo.width() as f32;
    for (i, m) in matches.iter().enumerate() {
        let (Some(a), Some(b)) = (logo_kps.get(m.query_idx), screenshot_kps.get(m.train_idx)) else {
            continue;
        };
        let color = PALETTE[i % PALETTE.len()];
        let start = (a.x, a.y);
        let end = (b.x + offset, b.y);
        draw_line_segment_mut(&mut canvas, start, end, color);
        draw_hollow_circle_mut(&mut canvas, (start.0 as i32, start.1 as i32), CIRCLE_RADIUS, color);
        draw_hollow_circle_mut(&mut canvas, (end.0 as i32, end.1 as i32), CIRCLE_RADIUS, color);
    }
    canvas
}

/// Render and write the composite
pub fn save_matches<P: AsRef<Path>>(
    path: P,
    logo: &GrayImage,
    screenshot: &GrayImage,
    logo_kps: &[Keypoint],
    screenshot_kps: &[Keypoint],
    matches: &[DescriptorMatch],
) -> PipelineResult<()> {
    let path = path.as_ref();
    let canvas = draw_matches(logo, screenshot, logo_kps, screenshot_kps, matches);
    save_image(&DynamicImage::ImageRgb8(canvas), path)?;
    log::info!("match visualization saved to {}", path.display());
    Ok(())
}
