//! Multi-scale oriented FAST corner detection.
//!
//! Corners are found with the FAST-9 segment test on every level of an image
//! pyramid, thinned by non-maximum suppression, oriented by the intensity
//! centroid of their patch and mapped back to level-0 coordinates.

pub mod builder;
pub mod config;
pub mod corner_detection;
pub mod detector;
pub mod error;
pub mod pyramid;
pub mod refinement;
pub mod types;

pub use builder::DetectorBuilder;
pub use config::DetectorPreset;
pub use detector::FastDetector;
pub use error::{FastError, FastResult};
pub use types::ScaleLevel;
