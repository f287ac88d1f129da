//! External collaborators: the image source and the inpainting service.
//!
//! Both are black boxes. The session only needs bytes from one and a new
//! image URL from the other.

use async_trait::async_trait;
use thiserror::Error;

use crate::export::ExportBundle;

/// Opaque failure reported by a collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    /// Create a new service error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Supplies encoded image bytes for a URL.
///
/// Cross-origin concerns (proxying, credentials) belong to the implementor.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Fetch the encoded image at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be fetched.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}

/// A request to the inpainting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InpaintRequest {
    /// Opaque cover/session identifier supplied by the host.
    pub cover_id: String,
    /// Width of both images.
    pub width: u32,
    /// Height of both images.
    pub height: u32,
    /// Encoded binarized mask.
    pub mask: Vec<u8>,
    /// Encoded source snapshot.
    pub image: Vec<u8>,
}

impl InpaintRequest {
    /// Build a request from an export bundle.
    #[must_use]
    pub fn new(cover_id: impl Into<String>, bundle: ExportBundle) -> Self {
        Self {
            cover_id: cover_id.into(),
            width: bundle.width,
            height: bundle.height,
            mask: bundle.mask,
            image: bundle.image,
        }
    }
}

/// Regenerates the masked region of an image.
#[async_trait]
pub trait InpaintService: Send + Sync {
    /// Submit a mask and snapshot, returning the URL of the edited image.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects or fails the request.
    async fn inpaint(&self, request: InpaintRequest) -> Result<String, ServiceError>;
}
