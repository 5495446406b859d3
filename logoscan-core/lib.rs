#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major 8-bit grayscale image
pub type Image = Vec<u8>;

/// Oriented multi-scale corner, coordinates in level-0 pixels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the described patch, in level-0 pixels
    pub size: f32,
    /// Radians
    pub angle: f32,
    pub response: f32,
    pub octave: u8,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            size: 0.0,
            angle: 0.0,
            response: 0.0,
            octave: 0,
        }
    }
}

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; 32];

/// Number of bytes in a [`Descriptor`]
pub const DESCRIPTOR_SIZE: usize = 32;

/// Hamming distance between two binary descriptors
#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Keypoints and their descriptors for one image, index-aligned
#[derive(Debug, Clone, Default)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Features {
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> Self {
        debug_assert_eq!(keypoints.len(), descriptors.len());
        Self {
            keypoints,
            descriptors,
        }
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Scale information for pyramid levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub level: usize,
    pub scale: f32,
    pub width: usize,
    pub height: usize,
}

/// Downsampled copies of one image, level 0 being the original
#[derive(Debug, Clone, Default)]
pub struct Pyramid {
    pub levels: Vec<ScaleLevel>,
    pub images: Vec<Image>,
}

impl Pyramid {
    pub fn level(&self, index: usize) -> Option<(&ScaleLevel, &Image)> {
        Some((self.levels.get(index)?, self.images.get(index)?))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Candidate correspondence between a query (logo) and a train (screenshot) descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptorMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeatureConfig {
    /// FAST intensity threshold
    pub threshold: u8,
    /// Side of the square patch used for orientation and BRIEF sampling (odd)
    pub patch_size: usize,
    /// Pixels ignored at every image border on each pyramid level
    pub edge_threshold: usize,
    pub n_levels: usize,
    pub scale_factor: f32,
    /// Minimum distance between two corners kept on the same level
    pub nms_distance: f32,
    /// Keep at most this many keypoints per image, strongest first; 0 keeps all
    pub max_features: usize,
    pub n_threads: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            patch_size: 31,
            edge_threshold: 31,
            n_levels: 8,
            scale_factor: 1.2,
            nms_distance: 3.0,
            max_features: 0,
            n_threads: num_cpus::get().max(1),
        }
    }
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
