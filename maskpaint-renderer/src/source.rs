//! Source image decoding.
//!
//! A [`SourceImage`] is immutable once decoded. When an edit result comes
//! back, the session replaces it wholesale.

use image::RgbaImage;

use crate::error::{RenderError, RenderResult};

/// Encoded formats recognized by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format, or constructed in memory.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }
        Self::Unknown
    }
}

/// A decoded source image at its natural resolution.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
    format: ImageFormat,
}

impl SourceImage {
    /// Wrap an already decoded RGBA image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image has a zero dimension.
    pub fn from_rgba(pixels: RgbaImage) -> RenderResult<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::ImageLoad(format!(
                "Image has empty dimensions {width}x{height}"
            )));
        }
        Ok(Self {
            pixels,
            format: ImageFormat::Unknown,
        })
    }

    /// Decode an image from encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded or is empty.
    pub fn from_bytes(data: &[u8]) -> RenderResult<Self> {
        let format = ImageFormat::from_magic_bytes(data);
        let img = image::load_from_memory(data)
            .map_err(|e| RenderError::ImageLoad(format!("Failed to decode image: {e}")))?;
        let mut source = Self::from_rgba(img.to_rgba8())?;
        source.format = format;
        tracing::debug!(
            "Decoded {:?} source {}x{}",
            format,
            source.width(),
            source.height()
        );
        Ok(source)
    }

    /// Decode an image from a `data:` URI.
    ///
    /// Supports both `;base64` and percent-encoded payloads, e.g.
    /// `data:image/png;base64,iVBORw0KGgo...`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is malformed or the image cannot be decoded.
    pub fn from_data_uri(uri: &str) -> RenderResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| RenderError::ImageLoad("Not a data URI".to_string()))?;
        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| RenderError::ImageLoad("Invalid data URI: missing comma".to_string()))?;

        let bytes = if metadata.contains(";base64") {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| RenderError::ImageLoad(format!("Failed to decode base64: {e}")))?
        } else {
            percent_decode(payload)?
        };

        Self::from_bytes(&bytes)
    }

    /// Natural width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)` at natural resolution.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The decoded pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Format detected at decode time.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::ImageLoad("Invalid URL encoding".to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
