pub use logoscan_core::ScaleLevel;

/// Side of the intensity arc that passed the segment test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CornerType {
    Bright,
    Dark,
}
