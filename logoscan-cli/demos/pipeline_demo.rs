//! Builds a synthetic logo, hides it in a larger frame and runs the full
//! upscale + match pipeline on it.
//!
//! `cargo run -p logoscan-cli --example pipeline_demo`

use image::{GrayImage, Luma};
use logoscan_cli::{PipelineConfig, run_pipeline};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let dir = tempfile::tempdir()?;
    let mut rng = StdRng::seed_from_u64(7);

    // 60x60 logo of random 6px tiles
    let tiles: Vec<u8> = (0..100).map(|_| rng.gen_range(0..=255)).collect();
    let logo = GrayImage::from_fn(60, 60, |x, y| Luma([tiles[((y / 6) * 10 + x / 6) as usize]]));

    // The screenshot shows the logo at three times its size
    let big = image::imageops::resize(&logo, 180, 180, image::imageops::FilterType::Triangle);
    let mut screenshot = GrayImage::from_pixel(480, 360, Luma([30]));
    image::imageops::overlay(&mut screenshot, &big, 200, 120);

    let logo_path = dir.path().join("logo.png");
    let screenshot_path = dir.path().join("screenshot.png");
    logo.save(&logo_path)?;
    screenshot.save(&screenshot_path)?;

    let mut cfg = PipelineConfig::default();
    cfg.upscale.output = Some(dir.path().join("logo_upscaled.png"));
    cfg.visualization = Some(dir.path().join("matches.png"));

    let report = run_pipeline(&logo_path, &screenshot_path, &cfg)?;
    println!("{report}");
    println!("\nConfiguration used:\n{}", cfg.to_toml()?);
    Ok(())
}
