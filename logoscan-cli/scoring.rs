//! Confidence scores for good matches, relative to the worst match of a run.

use logoscan_core::DescriptorMatch;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Map distances to [0, 100], 100 being identical descriptors.
///
/// The farthest match of the run scores 0. When every distance is 0 all
/// matches are exact and score 100.
pub fn normalized_scores(matches: &[DescriptorMatch]) -> Vec<f64> {
    let max_distance = matches.iter().map(|m| m.distance as f64).fold(0.0, f64::max);
    if max_distance == 0.0 {
        return vec![100.0; matches.len()];
    }
    matches
        .iter()
        .map(|m| round2(100.0 * (1.0 - m.distance as f64 / max_distance)))
        .collect()
}

/// Arithmetic mean, 0 for no scores
pub fn mean_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Number of scores strictly above `threshold`
pub fn high_confidence(scores: &[f64], threshold: f64) -> usize {
    scores.iter().filter(|&&s| s > threshold).count()
}
