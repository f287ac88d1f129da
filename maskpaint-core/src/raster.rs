//! The authoritative full-resolution mask raster.
//!
//! The raster always matches the source image 1:1 and is never resized.
//! White pixels are kept, black pixels are regenerated by the inpainting
//! service. Stroke edges are anti-aliased, so intermediate grays exist until
//! the raster is binarized for export.

use serde::{Deserialize, Serialize};

use crate::error::{MaskError, MaskResult};
use crate::transform::Point;

/// Luminance below this value counts as "remove".
pub const LUMINANCE_THRESHOLD: u32 = 128;

/// RGBA value of a kept pixel.
pub const KEEP_PIXEL: [u8; 4] = [255, 255, 255, 255];

/// RGBA value of a removed pixel.
pub const REMOVE_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// Mean of the color channels, in `0..=255`.
#[must_use]
pub fn luminance(pixel: &[u8]) -> u32 {
    (u32::from(pixel[0]) + u32::from(pixel[1]) + u32::from(pixel[2])) / 3
}

/// Whether an RGBA pixel counts as painted for removal.
#[must_use]
pub fn is_removed(pixel: &[u8]) -> bool {
    luminance(pixel) < LUMINANCE_THRESHOLD
}

/// What a stroke writes into the mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintMode {
    /// Mark pixels for regeneration.
    #[default]
    Remove,
    /// Restore pixels to "keep".
    Restore,
}

impl PaintMode {
    /// Channel value written by this mode.
    #[must_use]
    pub fn channel_value(self) -> u8 {
        match self {
            Self::Remove => 0,
            Self::Restore => 255,
        }
    }

    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Remove => Self::Restore,
            Self::Restore => Self::Remove,
        }
    }
}

/// Full-resolution RGBA mask buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl MaskRaster {
    /// Create an all-keep raster of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the buffer size
    /// overflows.
    pub fn new(width: u32, height: u32) -> MaskResult<Self> {
        let len = Self::byte_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            data.extend_from_slice(&KEEP_PIXEL);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap existing RGBA data.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are invalid or the data length
    /// does not match them.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> MaskResult<Self> {
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(MaskError::RasterSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn byte_len(width: u32, height: u32) -> MaskResult<usize> {
        if width == 0 || height == 0 {
            return Err(MaskError::InvalidDimensions { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(MaskError::InvalidDimensions { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes, row-major.
    ///
    /// Intended for in-place binarization at export time.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RGBA value at `(x, y)`, or `None` outside the raster.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Fill the whole raster with "keep".
    pub fn reset(&mut self) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&KEEP_PIXEL);
        }
    }

    /// Whether every pixel is exactly "keep".
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px == KEEP_PIXEL)
    }

    /// Number of pixels whose luminance is below [`LUMINANCE_THRESHOLD`].
    #[must_use]
    pub fn count_removed(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| is_removed(px)).count()
    }

    /// Draw a round-capped segment from `from` to `to` in image space.
    ///
    /// `radius` is in image pixels. Pixel centers sit at `(x + 0.5, y + 0.5)`
    /// and edge pixels are blended by their coverage, so consecutive segments
    /// sharing an endpoint join without seams. A zero-length segment paints a
    /// single round dab.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn apply_stroke(&mut self, from: Point, to: Point, radius: f32, mode: PaintMode) {
        if !(radius.is_finite() && radius > 0.0) || !from.is_finite() || !to.is_finite() {
            tracing::warn!(
                "Ignoring degenerate stroke {:?} -> {:?} radius {}",
                from,
                to,
                radius
            );
            return;
        }

        let reach = radius + 0.5;
        let min_x = (from.x.min(to.x) - reach).floor().max(0.0);
        let min_y = (from.y.min(to.y) - reach).floor().max(0.0);
        let max_x = (from.x.max(to.x) + reach).ceil().min(self.width as f32);
        let max_y = (from.y.max(to.y) + reach).ceil().min(self.height as f32);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let target = f32::from(mode.channel_value());
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len_sq = dx * dx + dy * dy;

        for y in (min_y as u32)..(max_y as u32) {
            let py = y as f32 + 0.5;
            for x in (min_x as u32)..(max_x as u32) {
                let px = x as f32 + 0.5;

                // Closest point on the segment.
                let t = if len_sq > 0.0 {
                    (((px - from.x) * dx + (py - from.y) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let cx = from.x + t * dx;
                let cy = from.y + t * dy;
                let dist = ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt();

                let coverage = (reach - dist).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let idx = self.index(x, y);
                for channel in &mut self.data[idx..idx + 3] {
                    let old = f32::from(*channel);
                    *channel = (old + (target - old) * coverage).round() as u8;
                }
                self.data[idx + 3] = 255;
            }
        }

        tracing::trace!(
            "Stroke {:?} ({:.1},{:.1}) -> ({:.1},{:.1}) r={:.2}",
            mode,
            from.x,
            from.y,
            to.x,
            to.y,
            radius
        );
    }
}
