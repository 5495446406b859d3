use std::path::{Path, PathBuf};
use std::time::Instant;

use logoscan_core::{DescriptorMatch, Features};
use logoscan_match::ratio_test;

use crate::LogoScanner;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::loader::load_grayscale;
use crate::report::MatchReport;
use crate::scoring::{high_confidence, mean_score, normalized_scores};
use crate::upscale::upscale;
use crate::visualize::save_matches;

/// Nearest neighbours requested per logo descriptor
const K: usize = 2;

/// Good matches of one comparison and the report derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub good_matches: Vec<DescriptorMatch>,
    pub report: MatchReport,
}

/// k=2 matching, ratio test and scoring over already extracted features.
///
/// A screenshot with fewer than two descriptors cannot support the ratio
/// test; the comparison then yields no good matches instead of failing.
pub fn match_features(logo: &Features, screenshot: &Features, config: &PipelineConfig) -> PipelineResult<MatchOutcome> {
    let insufficient = screenshot.descriptors.len() < K;
    let good_matches = if insufficient {
        log::warn!(
            "screenshot has {} descriptors, at least {} are needed; skipping matching",
            screenshot.descriptors.len(),
            K
        );
        Vec::new()
    } else {
        let matcher = config.matcher.build()?;
        let knn = matcher.knn_match(&logo.descriptors, &screenshot.descriptors, K);
        let good = ratio_test(&knn, config.scoring.ratio);
        log::debug!(
            "{}: {} queries, {} good matches at ratio {}",
            matcher.name(),
            knn.len(),
            good.len(),
            config.scoring.ratio
        );
        good
    };

    let scores = normalized_scores(&good_matches);
    let report = MatchReport {
        logo_keypoints: logo.len(),
        screenshot_keypoints: screenshot.len(),
        good_matches: good_matches.len(),
        mean_score: mean_score(&scores),
        high_confidence: high_confidence(&scores, config.scoring.high_confidence_threshold),
        scores,
        insufficient_descriptors: insufficient,
    };

    Ok(MatchOutcome { good_matches, report })
}

/// Compare a logo with a screenshot, both read from disk.
///
/// Renders the match composite when `config.visualization` is set.
pub fn match_images<P: AsRef<Path>, Q: AsRef<Path>>(logo: P, screenshot: Q, config: &PipelineConfig) -> PipelineResult<MatchReport> {
    let logo_img = load_grayscale(logo)?;
    let screenshot_img = load_grayscale(screenshot)?;

    let scanner = LogoScanner::new(config.detector_config())?;

    let t0 = Instant::now();
    let logo_features = scanner.detect_and_describe(&logo_img)?;
    let screenshot_features = scanner.detect_and_describe(&screenshot_img)?;
    log::debug!(
        "features: logo {}, screenshot {} in {:.2?}",
        logo_features.len(),
        screenshot_features.len(),
        t0.elapsed()
    );

    let outcome = match_features(&logo_features, &screenshot_features, config)?;

    if let Some(path) = &config.visualization {
        save_matches(
            path,
            &logo_img,
            &screenshot_img,
            &logo_features.keypoints,
            &screenshot_features.keypoints,
            &outcome.good_matches,
        )?;
    }

    Ok(outcome.report)
}

/// Upscale the logo, then match the saved result against the screenshot
pub fn run_pipeline<P: AsRef<Path>, Q: AsRef<Path>>(logo: P, screenshot: Q, config: &PipelineConfig) -> PipelineResult<MatchReport> {
    let upscaled: PathBuf = upscale(logo, config.upscale.scale_percent, config.upscale.output.as_deref())?
        .ok_or(PipelineError::MissingUpscaledImage)?;
    match_images(upscaled, screenshot, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use logoscan_core::{DESCRIPTOR_SIZE, Descriptor, Keypoint};
    use logoscan_match::MatcherKind;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn features(descriptors: Vec<Descriptor>) -> Features {
        let keypoints = (0..descriptors.len()).map(|i| Keypoint::new(i as f32, 0.0)).collect();
        Features::new(keypoints, descriptors)
    }

    fn random_descriptors(n: usize, seed: u64) -> Vec<Descriptor> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let mut d = [0u8; DESCRIPTOR_SIZE];
                rng.fill(&mut d[..]);
                d
            })
            .collect()
    }

    /// Random gray levels in `block`-sized tiles
    fn blocks(w: u32, h: u32, block: u32, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let (bw, bh) = (w.div_ceil(block), h.div_ceil(block));
        let levels: Vec<u8> = (0..bw * bh).map(|_| rng.gen_range(0..=255)).collect();
        GrayImage::from_fn(w, h, |x, y| Luma([levels[((y / block) * bw + x / block) as usize]]))
    }

    #[test]
    fn one_screenshot_descriptor_is_degraded_not_fatal() {
        let logo = features(random_descriptors(10, 1));
        let screenshot = features(random_descriptors(1, 2));
        let outcome = match_features(&logo, &screenshot, &PipelineConfig::default()).unwrap();

        assert!(outcome.good_matches.is_empty());
        assert!(outcome.report.insufficient_descriptors);
        assert_eq!(outcome.report.logo_keypoints, 10);
        assert_eq!(outcome.report.screenshot_keypoints, 1);
        assert_eq!(outcome.report.mean_score, 0.0);
    }

    #[test]
    fn duplicated_descriptors_match_exactly() {
        let train = random_descriptors(200, 3);
        let query: Vec<Descriptor> = train.iter().step_by(4).copied().collect();

        for kind in [MatcherKind::Lsh, MatcherKind::BruteForce] {
            let mut cfg = PipelineConfig::default();
            cfg.matcher.kind = kind;
            let outcome = match_features(&features(query.clone()), &features(train.clone()), &cfg).unwrap();

            assert_eq!(outcome.good_matches.len(), query.len());
            for (i, m) in outcome.good_matches.iter().enumerate() {
                assert_eq!((m.query_idx, m.train_idx), (i, i * 4));
            }
            assert!(outcome.report.scores.iter().all(|&s| s == 100.0));
            assert_eq!(outcome.report.high_confidence, query.len());
        }
    }

    #[test]
    fn counts_respect_invariants() {
        let logo = features(random_descriptors(60, 4));
        let screenshot = features(random_descriptors(300, 5));
        let report = match_features(&logo, &screenshot, &PipelineConfig::default()).unwrap().report;

        assert!(report.good_matches <= report.logo_keypoints);
        assert!(report.high_confidence <= report.good_matches);
        assert_eq!(report.scores.len(), report.good_matches);
        assert!(!report.insufficient_descriptors);
    }

    #[test]
    fn solid_images_find_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        let screenshot = dir.path().join("screen.png");
        GrayImage::from_pixel(120, 120, Luma([90])).save(&logo).unwrap();
        GrayImage::from_pixel(320, 240, Luma([200])).save(&screenshot).unwrap();

        let report = match_images(&logo, &screenshot, &PipelineConfig::default()).unwrap();
        assert_eq!(report.good_matches, 0);
        assert_eq!(report.logo_keypoints, 0);
        assert!(report.to_string().contains("Good matches found: 0"));
        assert!(report.to_string().contains("No matches to score"));
    }

    #[test]
    fn pasted_logo_is_found_with_high_scores() {
        let dir = tempfile::tempdir().unwrap();
        let logo_img = blocks(120, 120, 8, 21);
        let mut screen_img = GrayImage::from_pixel(400, 300, Luma([128]));
        image::imageops::overlay(&mut screen_img, &logo_img, 137, 83);

        let logo = dir.path().join("logo.png");
        let screenshot = dir.path().join("screen.png");
        logo_img.save(&logo).unwrap();
        screen_img.save(&screenshot).unwrap();

        let mut cfg = PipelineConfig::default();
        cfg.visualization = Some(dir.path().join("matches.png"));
        let report = match_images(&logo, &screenshot, &cfg).unwrap();

        // The frame's own corners must not crowd out the logo's
        assert!(report.screenshot_keypoints > report.logo_keypoints, "{report}");
        assert!(report.logo_keypoints >= 50, "{report}");
        assert!(report.good_matches * 2 > report.logo_keypoints, "{report}");
        assert!(report.high_confidence * 2 > report.good_matches, "{report}");
        assert!(dir.path().join("matches.png").exists());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        let screenshot = dir.path().join("screen.png");
        blocks(100, 100, 6, 8).save(&logo).unwrap();
        blocks(300, 200, 10, 9).save(&screenshot).unwrap();

        let cfg = PipelineConfig::default();
        let first = match_images(&logo, &screenshot, &cfg).unwrap();
        let second = match_images(&logo, &screenshot, &cfg).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unreadable_screenshot_fails_before_matching() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        blocks(80, 80, 8, 1).save(&logo).unwrap();

        let err = match_images(&logo, dir.path().join("missing.png"), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
    }

    #[test]
    fn run_requires_a_saved_upscale() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        let screenshot = dir.path().join("screen.png");
        blocks(40, 40, 4, 2).save(&logo).unwrap();
        blocks(300, 200, 10, 3).save(&screenshot).unwrap();

        let err = run_pipeline(&logo, &screenshot, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingUpscaledImage));

        let mut cfg = PipelineConfig::default();
        cfg.upscale.output = Some(dir.path().join("logo_up.png"));
        let report = run_pipeline(&logo, &screenshot, &cfg).unwrap();
        assert!(report.good_matches <= report.logo_keypoints);
        assert_eq!(image::image_dimensions(dir.path().join("logo_up.png")).unwrap(), (120, 120));
    }
}
