use std::fmt;

use serde::Serialize;

/// Summary of one logo/screenshot comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub logo_keypoints: usize,
    pub screenshot_keypoints: usize,
    pub good_matches: usize,
    /// One score per good match, in logo keypoint order
    pub scores: Vec<f64>,
    pub mean_score: f64,
    pub high_confidence: usize,
    /// The screenshot had fewer than two descriptors, so matching was skipped
    pub insufficient_descriptors: bool,
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total keypoints in logo: {}", self.logo_keypoints)?;
        writeln!(f, "Total keypoints in screenshot: {}", self.screenshot_keypoints)?;
        writeln!(f, "Good matches found: {}", self.good_matches)?;
        if self.scores.is_empty() {
            writeln!(f, "No matches to score")?;
        } else {
            writeln!(f, "Match quality scores: {:?}", self.scores)?;
            writeln!(f, "Average score: {:.1}/100", self.mean_score)?;
        }
        write!(f, "High-confidence matches: {}", self.high_confidence)
    }
}
