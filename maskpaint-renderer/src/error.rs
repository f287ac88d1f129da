//! Renderer error types.

use maskpaint_core::MaskError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while loading, compositing or exporting.
///
/// None of these clear the mask; every failure is retryable.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Fetching or decoding the source image failed. Drawing stays disabled.
    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    /// Encoding the mask or the source snapshot failed. Nothing was submitted.
    #[error("Export encoding failed: {0}")]
    ExportEncoding(String),

    /// The inpainting service rejected or failed the request.
    #[error("Remote edit failed: {0}")]
    RemoteEdit(String),

    /// An editing operation was rejected by the core.
    #[error(transparent)]
    Core(#[from] MaskError),
}
