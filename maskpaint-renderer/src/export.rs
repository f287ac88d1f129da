//! Binarized mask export.
//!
//! Export turns the editing raster into exactly two tones, reports whether
//! anything was painted for removal, and encodes the mask together with a
//! snapshot of the source redrawn at the mask's dimensions. The inpainting
//! service requires both outputs to share pixel dimensions.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use maskpaint_core::raster::{is_removed, KEEP_PIXEL, REMOVE_PIXEL};
use maskpaint_core::MaskRaster;

use crate::error::{RenderError, RenderResult};
use crate::source::SourceImage;

/// Force every pixel to opaque black (remove) or opaque white (keep).
///
/// Returns `true` if any pixel ended up black. Running it twice yields the
/// same raster.
pub fn binarize(raster: &mut MaskRaster) -> bool {
    let mut touched = false;
    for px in raster.as_raw_mut().chunks_exact_mut(4) {
        if is_removed(px) {
            px.copy_from_slice(&REMOVE_PIXEL);
            touched = true;
        } else {
            px.copy_from_slice(&KEEP_PIXEL);
        }
    }
    touched
}

/// Redraw the source at exactly `width x height`.
#[must_use]
pub fn snapshot_source(source: &SourceImage, width: u32, height: u32) -> RgbaImage {
    if source.dimensions() == (width, height) {
        source.pixels().clone()
    } else {
        tracing::warn!(
            "Source {}x{} differs from mask {}x{}, resampling snapshot",
            source.width(),
            source.height(),
            width,
            height
        );
        imageops::resize(source.pixels(), width, height, FilterType::Lanczos3)
    }
}

/// Encodes RGBA rasters to bytes.
pub trait RasterEncoder: Send + Sync {
    /// Encode `width x height` RGBA pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixels cannot be encoded.
    fn encode(&self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<Vec<u8>>;
}

/// PNG compression level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    /// Fastest encoding, larger output.
    Fast,
    /// Balanced.
    #[default]
    Default,
    /// Smallest output.
    Best,
}

/// PNG encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRasterEncoder {
    compression: PngCompression,
}

impl PngRasterEncoder {
    /// Create an encoder with the given compression level.
    #[must_use]
    pub fn new(compression: PngCompression) -> Self {
        Self { compression }
    }
}

impl RasterEncoder for PngRasterEncoder {
    fn encode(&self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<Vec<u8>> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if rgba.len() as u64 != expected {
            return Err(RenderError::ExportEncoding(format!(
                "Buffer of {} bytes does not match {width}x{height} RGBA",
                rgba.len()
            )));
        }

        let compression = match self.compression {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        };

        let mut buf = Vec::new();
        PngEncoder::new_with_quality(&mut buf, compression, PngFilter::Adaptive)
            .write_image(rgba, width, height, ExtendedColorType::Rgba8)
            .map_err(|e| RenderError::ExportEncoding(format!("PNG encoding failed: {e}")))?;
        Ok(buf)
    }
}

/// Encoded mask and source snapshot, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    /// Width of both outputs.
    pub width: u32,
    /// Height of both outputs.
    pub height: u32,
    /// Encoded binarized mask.
    pub mask: Vec<u8>,
    /// Encoded source snapshot.
    pub image: Vec<u8>,
}

/// Result of an export attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing was painted for removal; there is nothing to submit.
    Untouched,
    /// Both outputs encoded.
    Ready(ExportBundle),
}

/// Binarizes and encodes the mask and the source snapshot.
pub struct MaskExporter {
    encoder: Box<dyn RasterEncoder>,
}

impl Default for MaskExporter {
    fn default() -> Self {
        Self::new(Box::new(PngRasterEncoder::default()))
    }
}

impl std::fmt::Debug for MaskExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskExporter").finish_non_exhaustive()
    }
}

impl MaskExporter {
    /// Create an exporter with a custom encoder.
    #[must_use]
    pub fn new(encoder: Box<dyn RasterEncoder>) -> Self {
        Self { encoder }
    }

    /// Binarize `raster` in place and encode it with a matching snapshot of
    /// `source`.
    ///
    /// Either both outputs are produced or none is. The binarized raster is
    /// kept on failure, so the export can be retried without repainting.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ExportEncoding`] if either output fails to
    /// encode.
    pub fn export(
        &self,
        raster: &mut MaskRaster,
        source: &SourceImage,
    ) -> RenderResult<ExportOutcome> {
        let touched = binarize(raster);
        if !touched {
            tracing::info!("Mask untouched, nothing to export");
            return Ok(ExportOutcome::Untouched);
        }

        let (width, height) = raster.dimensions();
        let snapshot = snapshot_source(source, width, height);

        let mask = self.encoder.encode(width, height, raster.as_raw())?;
        let image = self.encoder.encode(width, height, snapshot.as_raw())?;

        tracing::info!(
            "Exported {}x{} mask ({} bytes) and snapshot ({} bytes)",
            width,
            height,
            mask.len(),
            image.len()
        );
        Ok(ExportOutcome::Ready(ExportBundle {
            width,
            height,
            mask,
            image,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use maskpaint_core::{PaintMode, Point};

    #[test]
    fn test_binarize_thresholds_each_pixel() {
        let data = vec![
            127, 127, 127, 255, // dark gray -> remove
            128, 128, 128, 255, // mid gray -> keep
            0, 0, 0, 10, // black, partial alpha -> opaque remove
            255, 255, 255, 0, // white, transparent -> opaque keep
        ];
        let mut raster = MaskRaster::from_rgba(2, 2, data).expect("raster");
        assert!(binarize(&mut raster));
        assert_eq!(raster.pixel(0, 0), Some(REMOVE_PIXEL));
        assert_eq!(raster.pixel(1, 0), Some(KEEP_PIXEL));
        assert_eq!(raster.pixel(0, 1), Some(REMOVE_PIXEL));
        assert_eq!(raster.pixel(1, 1), Some(KEEP_PIXEL));
    }

    #[test]
    fn test_binarize_blank_is_untouched() {
        let mut raster = MaskRaster::new(16, 16).expect("raster");
        assert!(!binarize(&mut raster));
        assert!(raster.is_blank());
    }

    #[test]
    fn test_snapshot_matches_requested_size() {
        let source = SourceImage::from_rgba(RgbaImage::from_pixel(10, 20, Rgba([1, 2, 3, 255])))
            .expect("source");
        assert_eq!(snapshot_source(&source, 10, 20).dimensions(), (10, 20));
        assert_eq!(snapshot_source(&source, 5, 10).dimensions(), (5, 10));
    }

    #[test]
    fn test_png_encoder_rejects_mismatched_buffer() {
        let encoder = PngRasterEncoder::default();
        assert!(matches!(
            encoder.encode(2, 2, &[0; 15]),
            Err(RenderError::ExportEncoding(_))
        ));
    }

    struct FailSecond(std::sync::atomic::AtomicUsize);

    impl RasterEncoder for FailSecond {
        fn encode(&self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<Vec<u8>> {
            let call = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call == 1 {
                return Err(RenderError::ExportEncoding("snapshot failed".to_string()));
            }
            PngRasterEncoder::default().encode(width, height, rgba)
        }
    }

    #[test]
    fn test_export_is_atomic_on_encoding_failure() {
        let source = SourceImage::from_rgba(RgbaImage::new(32, 32)).expect("source");
        let mut raster = MaskRaster::new(32, 32).expect("raster");
        let c = Point::new(16.0, 16.0);
        raster.apply_stroke(c, c, 6.0, PaintMode::Remove);

        let exporter = MaskExporter::new(Box::new(FailSecond(0.into())));
        let result = exporter.export(&mut raster, &source);
        assert!(matches!(result, Err(RenderError::ExportEncoding(_))));

        // The selection survives for a retry.
        assert!(raster.count_removed() > 0);
        let retry = MaskExporter::default()
            .export(&mut raster, &source)
            .expect("retry");
        assert!(matches!(retry, ExportOutcome::Ready(_)));
    }
}
