//! k-nearest-neighbour matching of binary descriptors under Hamming distance.

pub mod brute_force;
pub mod error;
pub mod lsh;
pub mod ratio;

use logoscan_core::{Descriptor, DescriptorMatch};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use brute_force::BruteForceMatcher;
pub use error::{MatchError, MatchResult};
pub use lsh::{LshIndex, LshMatcher};
pub use ratio::{DEFAULT_RATIO, ratio_test};

/// Finds, for every query descriptor, its `k` closest train descriptors.
///
/// The outer list is index-aligned with `query`; each inner list is sorted by
/// ascending distance and holds `min(k, train.len())` entries for exact
/// matchers.
pub trait DescriptorMatcher: Send + Sync {
    fn knn_match(&self, query: &[Descriptor], train: &[Descriptor], k: usize) -> Vec<Vec<DescriptorMatch>>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MatcherKind {
    /// Approximate multi-probe LSH index
    #[default]
    Lsh,
    /// Exact linear scan
    BruteForce,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatcherConfig {
    pub kind: MatcherKind,
    pub tables: usize,
    pub key_bits: usize,
    pub probe_level: usize,
    pub seed: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            kind: MatcherKind::Lsh,
            tables: 5,
            key_bits: 16,
            probe_level: 1,
            seed: 42,
        }
    }
}

impl MatcherConfig {
    /// Instantiate the configured matcher
    pub fn build(&self) -> MatchResult<Box<dyn DescriptorMatcher>> {
        Ok(match self.kind {
            MatcherKind::BruteForce => Box::new(BruteForceMatcher),
            MatcherKind::Lsh => Box::new(LshMatcher::new(self.tables, self.key_bits, self.probe_level, self.seed)?),
        })
    }
}
