use image::GrayImage;
use logoscan_core::{DESCRIPTOR_SIZE, Descriptor, Image, Keypoint, Pyramid, ScaleLevel};
use once_cell::sync::Lazy;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;

const N_TESTS: usize = DESCRIPTOR_SIZE * 8;

/// Smoothing applied to each level before sampling, so single-pixel noise
/// does not flip descriptor bits
const SMOOTHING_SIGMA: f32 = 2.0;

/// Unit-variance test locations, reproducible across runs so descriptors
/// from different images stay comparable
static UNIT_PATTERN: Lazy<[[f32; 4]; N_TESTS]> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(42);
    let mut pattern = [[0.0f32; 4]; N_TESTS];
    for test in pattern.iter_mut() {
        for v in test.iter_mut() {
            *v = StandardNormal.sample(&mut rng);
        }
    }
    pattern
});

/// Steered BRIEF: 256 intensity comparisons rotated by the keypoint angle
pub struct BriefGenerator {
    pairs: Vec<[f32; 4]>,
}

impl BriefGenerator {
    /// Build the sampling pattern for a square patch of side `patch_size`.
    ///
    /// Offsets follow an isotropic Gaussian of sigma `patch_size / 5`,
    /// clipped to the patch.
    pub fn new(patch_size: usize) -> Self {
        assert!(patch_size >= 3);
        let half = (patch_size / 2) as f32;
        let sigma = patch_size as f32 / 5.0;
        let pairs = UNIT_PATTERN
            .iter()
            .map(|test| test.map(|v| (v * sigma).round().clamp(-half, half)))
            .collect();
        Self { pairs }
    }

    /// Describe every keypoint on the pyramid level it was detected on.
    ///
    /// Output is index-aligned with `kps`.
    pub fn generate_descriptors(&self, pyramid: &Pyramid, kps: &[Keypoint]) -> Vec<Descriptor> {
        let smoothed: Vec<(ScaleLevel, Image)> = (0..pyramid.len())
            .into_par_iter()
            .filter_map(|i| pyramid.level(i))
            .map(|(level, img)| (*level, smooth(img, level.width, level.height)))
            .collect();

        kps.par_iter()
            .map(|kp| {
                let octave = kp.octave as usize;
                match smoothed.get(octave) {
                    Some((level, img)) => self.describe(img, level.width, level.height, kp, level.scale),
                    None => {
                        log::warn!("keypoint references missing pyramid level {}", octave);
                        [0u8; DESCRIPTOR_SIZE]
                    }
                }
            })
            .collect()
    }

    /// Descriptor for one keypoint on an already smoothed level image
    pub fn describe(&self, img: &Image, w: usize, h: usize, kp: &Keypoint, scale: f32) -> Descriptor {
        let (s, c) = kp.angle.sin_cos();
        let (cx, cy) = (kp.x / scale, kp.y / scale);
        let mut d = [0u8; DESCRIPTOR_SIZE];

        for (i, &[dx1, dy1, dx2, dy2]) in self.pairs.iter().enumerate() {
            let (rx1, ry1) = (cx + c * dx1 - s * dy1, cy + s * dx1 + c * dy1);
            let (rx2, ry2) = (cx + c * dx2 - s * dy2, cy + s * dx2 + c * dy2);

            let val1 = bilinear_sample(img, w, h, rx1, ry1);
            let val2 = bilinear_sample(img, w, h, rx2, ry2);

            let bit = (val1 < val2) as u8;
            d[i / 8] |= bit << (i % 8);
        }
        d
    }

    pub fn pattern(&self) -> &[[f32; 4]] {
        &self.pairs
    }
}

fn smooth(img: &Image, w: usize, h: usize) -> Image {
    match GrayImage::from_raw(w as u32, h as u32, img.clone()) {
        Some(gray) => imageproc::filter::gaussian_blur_f32(&gray, SMOOTHING_SIGMA).into_raw(),
        None => img.clone(),
    }
}

/// Bilinear interpolation, clamping to the nearest pixel outside the image
fn bilinear_sample(img: &Image, w: usize, h: usize, x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();

    if x0 < 0.0 || y0 < 0.0 || x0 + 1.0 >= w as f32 || y0 + 1.0 >= h as f32 {
        let cx = x.round().clamp(0.0, (w - 1) as f32) as usize;
        let cy = y.round().clamp(0.0, (h - 1) as f32) as usize;
        return img[cy * w + cx] as f32;
    }

    let dx = x - x0;
    let dy = y - y0;
    let (xi, yi) = (x0 as usize, y0 as usize);

    let p00 = img[yi * w + xi] as f32;
    let p10 = img[yi * w + xi + 1] as f32;
    let p01 = img[(yi + 1) * w + xi] as f32;
    let p11 = img[(yi + 1) * w + xi + 1] as f32;

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}
