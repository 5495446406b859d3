use logoscan_core::{Image, Keypoint};
use crate::types::{CornerType, ScaleLevel};
use rayon::prelude::*;

/// Contiguous arc length required by the segment test (FAST-9)
pub const ARC_LENGTH: usize = 9;

/// FAST segment-test corner detection
pub struct CornerDetector;

impl CornerDetector {
    /// Bresenham circle of radius 3, clockwise from 12 o'clock
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (0, -3), (1, -3), (2, -2), (3, -1),
        (3, 0), (3, 1), (2, 2), (1, 3),
        (0, 3), (-1, 3), (-2, 2), (-3, 1),
        (-3, 0), (-3, -1), (-2, -2), (-1, -3),
    ];

    /// Detect corners on one pyramid level, skipping `border` pixels on every side.
    ///
    /// Returned keypoints are in level coordinates with `octave` set to the
    /// level index and `response` set to the corner score.
    pub fn detect_corners(img: &Image, scale_level: &ScaleLevel, threshold: u8, border: usize) -> Vec<Keypoint> {
        let width = scale_level.width;
        let height = scale_level.height;
        let border = border.max(3);
        if width <= 2 * border || height <= 2 * border {
            return Vec::new();
        }

        (border..height - border)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut row = Vec::new();
                for x in border..width - border {
                    if let Some(response) = Self::corner_response(img, width, x, y, threshold) {
                        row.push(Keypoint {
                            x: x as f32,
                            y: y as f32,
                            size: 0.0,
                            angle: 0.0,
                            response,
                            octave: scale_level.level as u8,
                        });
                    }
                }
                row
            })
            .collect()
    }

    /// Segment test at (x, y); returns the corner score if it passes.
    ///
    /// The score is the summed excess over `threshold` of the pixels on the
    /// winning side of the circle, so it is always positive for a corner.
    pub fn corner_response(img: &Image, width: usize, x: usize, y: usize, threshold: u8) -> Option<f32> {
        let p = img[y * width + x] as i32;
        let t = threshold as i32;

        // Cardinal pixels reject most candidates before the full circle is read
        let cardinal = [0usize, 4, 8, 12].map(|i| Self::circle_pixel(img, width, x, y, i));
        let bright_cardinal = cardinal.iter().filter(|&&q| q >= p + t).count();
        let dark_cardinal = cardinal.iter().filter(|&&q| q <= p - t).count();
        if bright_cardinal < 2 && dark_cardinal < 2 {
            return None;
        }

        let mut bright = [false; 16];
        let mut dark = [false; 16];
        let mut bright_sum = 0i32;
        let mut dark_sum = 0i32;
        for i in 0..16 {
            let q = Self::circle_pixel(img, width, x, y, i);
            if q >= p + t {
                bright[i] = true;
                bright_sum += q - p - t;
            } else if q <= p - t {
                dark[i] = true;
                dark_sum += p - q - t;
            }
        }

        let corner_type = if has_consecutive_pixels(&bright, ARC_LENGTH) {
            CornerType::Bright
        } else if has_consecutive_pixels(&dark, ARC_LENGTH) {
            CornerType::Dark
        } else {
            return None;
        };

        let score = match corner_type {
            CornerType::Bright => bright_sum,
            CornerType::Dark => dark_sum,
        };
        Some(score as f32 + 1.0)
    }

    #[inline]
    fn circle_pixel(img: &Image, width: usize, x: usize, y: usize, i: usize) -> i32 {
        let (dx, dy) = Self::FAST_OFFSETS[i];
        let xx = (x as i32 + dx) as usize;
        let yy = (y as i32 + dy) as usize;
        img[yy * width + xx] as i32
    }
}

/// Check if there are at least `min_count` consecutive true values in the
/// circular array, using a rotate-and-mask over a 16-bit word
pub fn has_consecutive_pixels(pixels: &[bool; 16], min_count: usize) -> bool {
    if min_count > 16 || min_count == 0 {
        return false;
    }

    let mask = pixels
        .iter()
        .enumerate()
        .fold(0u16, |mask, (i, &set)| if set { mask | (1 << i) } else { mask });

    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i as u32);
        if test_mask == 0 {
            return false;
        }
    }

    test_mask != 0
}
