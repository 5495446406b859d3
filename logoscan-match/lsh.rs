//! Multi-probe locality-sensitive hashing over binary descriptors.
//!
//! Each table hashes a descriptor to the concatenation of `key_bits` fixed,
//! randomly chosen bit positions. Descriptors at small Hamming distance agree
//! on most positions, so near neighbours tend to share a bucket in at least
//! one table. Probing buckets whose key differs in up to `probe_level` bits
//! widens the net without adding tables.

use std::collections::HashMap;

use logoscan_core::{DESCRIPTOR_SIZE, Descriptor, DescriptorMatch};
use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use crate::DescriptorMatcher;
use crate::brute_force::nearest;
use crate::error::{MatchError, MatchResult};

const DESCRIPTOR_BITS: usize = DESCRIPTOR_SIZE * 8;

/// Approximate matcher backed by an [`LshIndex`] built per train set
#[derive(Debug, Clone)]
pub struct LshMatcher {
    tables: usize,
    key_bits: usize,
    probe_level: usize,
    seed: u64,
}

impl LshMatcher {
    pub fn new(tables: usize, key_bits: usize, probe_level: usize, seed: u64) -> MatchResult<Self> {
        if tables == 0 {
            return Err(MatchError::InvalidConfig("LSH needs at least one table".into()));
        }
        if key_bits == 0 || key_bits > 32 {
            return Err(MatchError::InvalidConfig(format!("LSH key_bits {} outside 1..=32", key_bits)));
        }
        if probe_level > 2 {
            return Err(MatchError::InvalidConfig(format!("LSH probe_level {} above 2", probe_level)));
        }
        Ok(Self {
            tables,
            key_bits,
            probe_level,
            seed,
        })
    }
}

impl DescriptorMatcher for LshMatcher {
    fn knn_match(&self, query: &[Descriptor], train: &[Descriptor], k: usize) -> Vec<Vec<DescriptorMatch>> {
        let index = LshIndex::build(train, self.tables, self.key_bits, self.seed);
        let fallbacks = std::sync::atomic::AtomicUsize::new(0);

        let result = query
            .par_iter()
            .enumerate()
            .map(|(query_idx, q)| {
                let candidates = index.candidates(q, self.probe_level);
                if candidates.len() < k.min(train.len()) {
                    // Too few bucket hits to fill k slots: fall back to an exact scan
                    fallbacks.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    nearest(query_idx, q, train, 0..train.len(), k)
                } else {
                    nearest(query_idx, q, train, candidates, k)
                }
            })
            .collect();

        log::debug!(
            "LSH: {} tables x {} bits, {} queries, {} exact fallbacks",
            index.tables(),
            self.key_bits,
            query.len(),
            fallbacks.into_inner()
        );
        result
    }

    fn name(&self) -> &'static str {
        "lsh"
    }
}

/// Hash tables over one descriptor set
pub struct LshIndex {
    /// Per table: the sampled bit positions
    projections: Vec<Vec<usize>>,
    /// Per table: key -> train indices, ascending
    buckets: Vec<HashMap<u32, Vec<usize>>>,
}

impl LshIndex {
    pub fn build(train: &[Descriptor], tables: usize, key_bits: usize, seed: u64) -> Self {
        let projections: Vec<Vec<usize>> = (0..tables)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let mut bits = rand::seq::index::sample(&mut rng, DESCRIPTOR_BITS, key_bits).into_vec();
                bits.sort_unstable();
                bits
            })
            .collect();

        let buckets = projections
            .iter()
            .map(|bits| {
                let mut table: HashMap<u32, Vec<usize>> = HashMap::new();
                for (i, d) in train.iter().enumerate() {
                    table.entry(hash_key(d, bits)).or_default().push(i);
                }
                table
            })
            .collect();

        Self { projections, buckets }
    }

    /// Sorted, de-duplicated train indices sharing a probed bucket with `q`
    pub fn candidates(&self, q: &Descriptor, probe_level: usize) -> Vec<usize> {
        let mut found = Vec::new();
        for (bits, table) in self.projections.iter().zip(&self.buckets) {
            let key = hash_key(q, bits);
            for probe in probe_keys(key, bits.len(), probe_level) {
                if let Some(bucket) = table.get(&probe) {
                    found.extend_from_slice(bucket);
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn tables(&self) -> usize {
        self.projections.len()
    }
}

fn hash_key(d: &Descriptor, bits: &[usize]) -> u32 {
    bits.iter().enumerate().fold(0u32, |key, (i, &b)| {
        let bit = (d[b / 8] >> (b % 8)) & 1;
        key | ((bit as u32) << i)
    })
}

/// `key` plus every key within `level` flipped bits
fn probe_keys(key: u32, key_bits: usize, level: usize) -> Vec<u32> {
    let mut keys = vec![key];
    if level >= 1 {
        for i in 0..key_bits {
            keys.push(key ^ (1 << i));
        }
    }
    if level >= 2 {
        for i in 0..key_bits {
            for j in (i + 1)..key_bits {
                keys.push(key ^ (1 << i) ^ (1 << j));
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BruteForceMatcher;
    use rand::Rng;

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

    fn flip_bits(d: &Descriptor, bits: &[usize]) -> Descriptor {
        let mut out = *d;
        for &b in bits {
            out[b / 8] ^= 1 << (b % 8);
        }
        out
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(LshMatcher::new(0, 16, 1, 0).is_err());
        assert!(LshMatcher::new(5, 0, 1, 0).is_err());
        assert!(LshMatcher::new(5, 33, 1, 0).is_err());
        assert!(LshMatcher::new(5, 16, 3, 0).is_err());
        assert!(LshMatcher::new(5, 16, 2, 0).is_ok());
    }

    #[test]
    fn probe_keys_cover_hamming_ball() {
        assert_eq!(probe_keys(0, 4, 0), vec![0]);
        assert_eq!(probe_keys(0b1010, 4, 1).len(), 5);
        assert_eq!(probe_keys(0, 4, 2).len(), 1 + 4 + 6);
        assert!(probe_keys(0b1010, 4, 1).contains(&0b1011));
    }

    #[test]
    fn exact_duplicates_are_always_found() {
        let train = random_descriptors(300, 7);
        let query: Vec<Descriptor> = train.iter().step_by(10).copied().collect();
        let matcher = LshMatcher::new(5, 16, 1, 42).unwrap();
        let knn = matcher.knn_match(&query, &train, 2);

        for (i, list) in knn.iter().enumerate() {
            assert_eq!(list.len(), 2);
            assert_eq!(list[0].train_idx, i * 10);
            assert_eq!(list[0].distance, 0.0);
            assert!(list[1].distance > 0.0);
        }
    }

    #[test]
    fn agrees_with_brute_force_on_close_neighbours() {
        let train = random_descriptors(400, 11);
        let query: Vec<Descriptor> = train
            .iter()
            .take(40)
            .enumerate()
            .map(|(i, d)| flip_bits(d, &[i % 256, (i * 7 + 3) % 256, (i * 13 + 5) % 256]))
            .collect();

        let exact = BruteForceMatcher.knn_match(&query, &train, 2);
        let approx = LshMatcher::new(5, 16, 1, 42).unwrap().knn_match(&query, &train, 2);

        for (e, a) in exact.iter().zip(&approx) {
            assert_eq!(e[0].train_idx, a[0].train_idx);
            assert_eq!(e[0].distance, a[0].distance);
            // The approximate second neighbour can only be farther
            assert!(a[1].distance >= e[1].distance);
        }
    }

    #[test]
    fn tiny_train_sets_fall_back_to_exact() {
        let train = random_descriptors(1, 3);
        let query = random_descriptors(4, 4);
        let knn = LshMatcher::new(5, 16, 1, 42).unwrap().knn_match(&query, &train, 2);
        assert_eq!(knn.len(), 4);
        assert!(knn.iter().all(|l| l.len() == 1 && l[0].train_idx == 0));
    }

    #[test]
    fn index_is_deterministic_for_a_seed() {
        let train = random_descriptors(50, 5);
        let a = LshIndex::build(&train, 3, 12, 9);
        let b = LshIndex::build(&train, 3, 12, 9);
        assert_eq!(a.tables(), 3);
        for d in &train {
            assert_eq!(a.candidates(d, 1), b.candidates(d, 1));
        }
    }
}
