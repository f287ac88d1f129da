//! Error types for mask editing operations.

use thiserror::Error;

/// Result type for mask editing operations.
pub type MaskResult<T> = Result<T, MaskError>;

/// Errors that can occur while editing a mask.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaskError {
    /// A raster or image was given zero or overflowing dimensions.
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Raw pixel data does not match the declared dimensions.
    #[error("Raster data length {actual} does not match {width}x{height} RGBA ({expected} bytes)")]
    RasterSize {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// Drawing was attempted before a source image finished decoding.
    #[error("Source image not ready: {0}")]
    SourceNotReady(String),

    /// Interaction is frozen while an export is in flight.
    #[error("Interaction frozen while an edit request is in flight")]
    InteractionFrozen,
}
