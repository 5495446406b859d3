use logoscan_core::DescriptorMatch;

/// Lowe's distance-ratio threshold used when none is configured
pub const DEFAULT_RATIO: f32 = 0.7;

/// Lowe's ratio test over k-NN lists.
///
/// Keeps the best candidate of a list when it is strictly closer than
/// `ratio` times the second best. Lists with fewer than two candidates carry
/// no evidence either way and are dropped. Output follows list order.
pub fn ratio_test(knn: &[Vec<DescriptorMatch>], ratio: f32) -> Vec<DescriptorMatch> {
    knn.iter()
        .filter_map(|list| match list.as_slice() {
            [m, n, ..] if m.distance < ratio * n.distance => Some(*m),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(query_idx: usize, distance: f32) -> DescriptorMatch {
        DescriptorMatch { query_idx, train_idx: query_idx * 10, distance }
    }

    #[test]
    fn keeps_distinctive_matches_only() {
        let knn = vec![
            vec![m(0, 10.0), m(0, 40.0)],
            vec![m(1, 30.0), m(1, 40.0)],
            vec![m(2, 5.0), m(2, 9.0)],
        ];
        let good = ratio_test(&knn, 0.7);
        assert_eq!(good.iter().map(|g| g.query_idx).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn boundary_is_exclusive() {
        let knn = vec![vec![m(0, 7.0), m(0, 10.0)]];
        assert!(ratio_test(&knn, 0.7).is_empty());
        assert_eq!(ratio_test(&knn, 0.71).len(), 1);
    }

    #[test]
    fn zero_distances_never_pass() {
        let knn = vec![vec![m(0, 0.0), m(0, 0.0)]];
        assert!(ratio_test(&knn, 0.7).is_empty());
        let knn = vec![vec![m(0, 0.0), m(0, 1.0)]];
        assert_eq!(ratio_test(&knn, 0.7).len(), 1);
    }

    #[test]
    fn short_lists_are_dropped() {
        let knn = vec![vec![], vec![m(1, 1.0)], vec![m(2, 1.0), m(2, 50.0)]];
        let good = ratio_test(&knn, DEFAULT_RATIO);
        assert_eq!(good.len(), 1);
        assert_eq!(good[0].query_idx, 2);
    }

    proptest::proptest! {
        #[test]
        fn never_more_good_matches_than_queries(
            lists in proptest::collection::vec(proptest::collection::vec(0.0f32..256.0, 0..3), 0..60),
            ratio in 0.1f32..1.0,
        ) {
            let knn: Vec<Vec<DescriptorMatch>> = lists
                .iter()
                .enumerate()
                .map(|(q, ds)| {
                    let mut ds = ds.clone();
                    ds.sort_by(|a, b| a.partial_cmp(b).unwrap());
                    ds.into_iter().map(|d| m(q, d)).collect()
                })
                .collect();
            let good = ratio_test(&knn, ratio);
            proptest::prop_assert!(good.len() <= knn.len());
            proptest::prop_assert!(good.windows(2).all(|w| w[0].query_idx < w[1].query_idx));
        }
    }
}
