use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FastError {
    #[error("Invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },
    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
    #[error("Invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("Invalid patch size {0} (must be odd and at least 3)")]
    InvalidPatchSize(usize),
    #[error("Edge threshold {edge_threshold} smaller than required {min}")]
    InvalidEdgeThreshold { edge_threshold: usize, min: usize },
    #[error("Invalid pyramid scale factor: {0} (must be finite and > 1)")]
    InvalidScaleFactor(f32),
    #[error("Invalid pyramid depth: {0} levels (must be 1-256)")]
    InvalidLevels(usize),
}

pub type FastResult<T> = Result<T, FastError>;
