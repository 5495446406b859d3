use logoscan_core::{Descriptor, DescriptorMatch, hamming_distance};
use rayon::prelude::*;

use crate::DescriptorMatcher;

/// Exact matcher: every query is compared with every train descriptor
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceMatcher;

impl DescriptorMatcher for BruteForceMatcher {
    fn knn_match(&self, query: &[Descriptor], train: &[Descriptor], k: usize) -> Vec<Vec<DescriptorMatch>> {
        query
            .par_iter()
            .enumerate()
            .map(|(query_idx, q)| nearest(query_idx, q, train, 0..train.len(), k))
            .collect()
    }

    fn name(&self) -> &'static str {
        "brute-force"
    }
}

/// The `k` closest of `candidates`, ascending by distance then train index
pub(crate) fn nearest(
    query_idx: usize,
    q: &Descriptor,
    train: &[Descriptor],
    candidates: impl IntoIterator<Item = usize>,
    k: usize,
) -> Vec<DescriptorMatch> {
    if k == 0 {
        return Vec::new();
    }

    // (distance, train_idx), kept sorted; k is tiny so insertion is cheapest
    let mut best: Vec<(u32, usize)> = Vec::with_capacity(k + 1);
    for train_idx in candidates {
        let d = hamming_distance(q, &train[train_idx]);
        if best.len() == k && (d, train_idx) >= best[k - 1] {
            continue;
        }
        let pos = best.partition_point(|&e| e < (d, train_idx));
        best.insert(pos, (d, train_idx));
        best.truncate(k);
    }

    best.into_iter()
        .map(|(d, train_idx)| DescriptorMatch {
            query_idx,
            train_idx,
            distance: d as f32,
        })
        .collect()
}
