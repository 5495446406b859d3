use std::cmp::Ordering;
use std::collections::HashMap;

use logoscan_core::{Image, Keypoint};

/// Post-processing of raw corners: suppression, orientation, capping
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// Greedy non-maximum suppression: strongest corners first, dropping any
    /// corner closer than `min_distance` to one already accepted.
    pub fn non_maximum_suppression(keypoints: &[Keypoint], min_distance: f32) -> Vec<Keypoint> {
        if keypoints.is_empty() {
            return Vec::new();
        }
        if min_distance <= 0.0 {
            return keypoints.to_vec();
        }

        let mut sorted = keypoints.to_vec();
        sorted.sort_by(Self::by_strength);

        let min_distance_sq = min_distance * min_distance;
        let cell = min_distance;
        let cell_of = |kp: &Keypoint| ((kp.x / cell).floor() as i64, (kp.y / cell).floor() as i64);

        // Accepted keypoints bucketed by grid cell; a neighbour within
        // `min_distance` is always in one of the 3x3 surrounding cells
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        let mut accepted: Vec<Keypoint> = Vec::new();

        for candidate in sorted {
            let (cx, cy) = cell_of(&candidate);
            let too_close = (-1..=1).any(|gy| {
                (-1..=1).any(|gx| {
                    grid.get(&(cx + gx, cy + gy)).is_some_and(|bucket| {
                        bucket.iter().any(|&i| {
                            let dx = candidate.x - accepted[i].x;
                            let dy = candidate.y - accepted[i].y;
                            dx * dx + dy * dy < min_distance_sq
                        })
                    })
                })
            });

            if !too_close {
                grid.entry((cx, cy)).or_default().push(accepted.len());
                accepted.push(candidate);
            }
        }

        accepted
    }

    /// Orientation by the intensity centroid of a disc of radius `patch_size / 2`.
    ///
    /// The disc is clipped to the image, so the call is safe anywhere.
    pub fn compute_orientation(img: &Image, width: usize, height: usize, x: f32, y: f32, patch_size: usize) -> f32 {
        let half = (patch_size / 2) as i32;
        let (cx, cy) = (x.round() as i32, y.round() as i32);
        let mut m10 = 0i64;
        let mut m01 = 0i64;

        for dy in -half..=half {
            let yy = cy + dy;
            if yy < 0 || yy >= height as i32 {
                continue;
            }
            let row = yy as usize * width;
            let span = ((half * half - dy * dy) as f32).sqrt() as i32;
            for dx in -span..=span {
                let xx = cx + dx;
                if xx < 0 || xx >= width as i32 {
                    continue;
                }
                let val = img[row + xx as usize] as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }

    /// Keep the `max_features` strongest keypoints, ordered strongest first.
    ///
    /// A cap of 0 keeps every keypoint.
    pub fn retain_best(mut keypoints: Vec<Keypoint>, max_features: usize) -> Vec<Keypoint> {
        keypoints.sort_by(Self::by_strength);
        if max_features > 0 {
            keypoints.truncate(max_features);
        }
        keypoints
    }

    /// Descending response, ties broken by level then raster position so
    /// results never depend on parallel collection order
    fn by_strength(a: &Keypoint, b: &Keypoint) -> Ordering {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(Ordering::Equal)
            .then(a.octave.cmp(&b.octave))
            .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(x: f32, y: f32, response: f32) -> Keypoint {
        Keypoint {
            response,
            ..Keypoint::new(x, y)
        }
    }

    #[test]
    fn nms_keeps_strongest_of_cluster() {
        let kps = vec![
            scored(10.0, 10.0, 5.0),
            scored(11.0, 10.0, 9.0),
            scored(10.0, 11.0, 7.0),
            scored(30.0, 30.0, 1.0),
        ];
        let kept = KeypointRefinement::non_maximum_suppression(&kps, 3.0);
        assert_eq!(kept.len(), 2);
        assert_eq!((kept[0].x, kept[0].y), (11.0, 10.0));
        assert_eq!((kept[1].x, kept[1].y), (30.0, 30.0));
    }

    #[test]
    fn nms_enforces_minimum_distance() {
        let kps: Vec<Keypoint> = (0..20)
            .flat_map(|y| (0..20).map(move |x| scored(x as f32, y as f32, ((x * 7 + y * 13) % 17) as f32)))
            .collect();
        let kept = KeypointRefinement::non_maximum_suppression(&kps, 5.0);
        assert!(kept.len() < kps.len());
        for i in 0..kept.len() {
            for j in (i + 1)..kept.len() {
                let dx = kept[i].x - kept[j].x;
                let dy = kept[i].y - kept[j].y;
                assert!((dx * dx + dy * dy).sqrt() >= 5.0);
            }
        }
    }

    #[test]
    fn nms_with_zero_distance_is_identity() {
        let kps = vec![scored(1.0, 1.0, 1.0), scored(1.0, 1.0, 2.0)];
        assert_eq!(KeypointRefinement::non_maximum_suppression(&kps, 0.0).len(), 2);
        assert!(KeypointRefinement::non_maximum_suppression(&[], 3.0).is_empty());
    }

    #[test]
    fn orientation_points_towards_bright_side() {
        let (w, h) = (41, 41);
        // Bright right half
        let img: Image = (0..w * h).map(|i| if i % w > 20 { 200 } else { 10 }).collect();
        let angle = KeypointRefinement::compute_orientation(&img, w, h, 20.0, 20.0, 15);
        assert!(angle.abs() < 1e-3, "angle {}", angle);

        // Bright bottom half
        let img: Image = (0..w * h).map(|i| if i / w > 20 { 200 } else { 10 }).collect();
        let angle = KeypointRefinement::compute_orientation(&img, w, h, 20.0, 20.0, 15);
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-3, "angle {}", angle);
    }

    #[test]
    fn orientation_of_uniform_patch_is_zero() {
        let img = vec![90u8; 31 * 31];
        assert_eq!(KeypointRefinement::compute_orientation(&img, 31, 31, 15.0, 15.0, 31), 0.0);
        // Clipped disc near a corner stays finite
        assert!(KeypointRefinement::compute_orientation(&img, 31, 31, 0.0, 0.0, 31).is_finite());
    }

    #[test]
    fn retain_best_caps_and_orders() {
        let kps = vec![scored(0.0, 0.0, 1.0), scored(1.0, 0.0, 3.0), scored(2.0, 0.0, 2.0)];
        let best = KeypointRefinement::retain_best(kps, 2);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].response, 3.0);
        assert_eq!(best[1].response, 2.0);
    }

    #[test]
    fn retain_best_zero_cap_keeps_all() {
        let kps = vec![scored(0.0, 0.0, 1.0), scored(1.0, 0.0, 3.0), scored(2.0, 0.0, 2.0)];
        let all = KeypointRefinement::retain_best(kps, 0);
        assert_eq!(all.iter().map(|k| k.response).collect::<Vec<_>>(), vec![3.0, 2.0, 1.0]);
    }
}
