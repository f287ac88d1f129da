//! Contain-fit layout of the source image inside a responsive container.
//!
//! The resolver turns the container's content width, the image's natural
//! size and the device pixel ratio into two things:
//!
//! - a [`SurfaceSize`] carrying both the logical (CSS) size of the drawing
//!   surface and its physical backing size, so drawing stays crisp on
//!   high-density displays;
//! - a [`FitTransform`] describing where the image lands on that surface.
//!
//! ```text
//!  container width (>= min)
//! ┌──────────────────────────────┐
//! │ offset_y                     │
//! │   ┌──────────────────────┐   │
//! │   │  image × scale       │   │  height = width / aspect
//! │   └──────────────────────┘   │
//! └──────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Minimum logical width of the drawing surface.
pub const DEFAULT_MIN_CONTAINER_WIDTH: f32 = 320.0;

/// Aspect ratio (width / height) used before the image has decoded.
pub const DEFAULT_FALLBACK_ASPECT: f32 = 1.0;

/// Largest device pixel ratio honoured when sizing the backing surface.
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 8.0;

/// Clamp a reported device pixel ratio to `1..=MAX_DEVICE_PIXEL_RATIO`.
///
/// Non-finite and sub-unit values become 1.
#[must_use]
pub fn sanitize_device_pixel_ratio(device_pixel_ratio: f32) -> f32 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio >= 1.0 {
        device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Logical and physical size of the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Layout width in CSS pixels.
    pub logical_width: f32,
    /// Layout height in CSS pixels.
    pub logical_height: f32,
    /// Backing buffer width in device pixels.
    pub physical_width: u32,
    /// Backing buffer height in device pixels.
    pub physical_height: u32,
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f32,
}

impl SurfaceSize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn new(logical_width: f32, logical_height: f32, device_pixel_ratio: f32) -> Self {
        let physical_width = (logical_width * device_pixel_ratio).round().max(1.0) as u32;
        let physical_height = (logical_height * device_pixel_ratio).round().max(1.0) as u32;
        Self {
            logical_width,
            logical_height,
            physical_width,
            physical_height,
            device_pixel_ratio,
        }
    }
}

/// A rectangle in whole device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width (at least 1).
    pub width: u32,
    /// Height (at least 1).
    pub height: u32,
}

/// Placement of the source image on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTransform {
    /// CSS pixels per image pixel.
    pub scale: f32,
    /// Horizontal offset of the image inside the surface, CSS pixels.
    pub offset_x: f32,
    /// Vertical offset of the image inside the surface, CSS pixels.
    pub offset_y: f32,
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f32,
    /// Natural image width.
    pub image_width: u32,
    /// Natural image height.
    pub image_height: u32,
}

impl FitTransform {
    /// Width of the scaled image in CSS pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn drawn_width(&self) -> f32 {
        self.image_width as f32 * self.scale
    }

    /// Height of the scaled image in CSS pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn drawn_height(&self) -> f32 {
        self.image_height as f32 * self.scale
    }

    /// The image rectangle in backing-buffer pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn physical_rect(&self) -> PixelRect {
        let dpr = self.device_pixel_ratio;
        PixelRect {
            x: (self.offset_x * dpr).round() as i64,
            y: (self.offset_y * dpr).round() as i64,
            width: (self.drawn_width() * dpr).round().max(1.0) as u32,
            height: (self.drawn_height() * dpr).round().max(1.0) as u32,
        }
    }
}

/// Result of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Size of the display surface.
    pub surface: SurfaceSize,
    /// Image placement, `None` until the image has decoded.
    pub fit: Option<FitTransform>,
}

/// Computes contain-fit layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResolver {
    min_container_width: f32,
    fallback_aspect: f32,
}

impl Default for FitResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONTAINER_WIDTH, DEFAULT_FALLBACK_ASPECT)
    }
}

impl FitResolver {
    /// Create a resolver with a minimum surface width and a fallback aspect.
    ///
    /// Non-positive or non-finite values fall back to the defaults.
    #[must_use]
    pub fn new(min_container_width: f32, fallback_aspect: f32) -> Self {
        let min_container_width = if min_container_width.is_finite() && min_container_width > 0.0
        {
            min_container_width
        } else {
            DEFAULT_MIN_CONTAINER_WIDTH
        };
        let fallback_aspect = if fallback_aspect.is_finite() && fallback_aspect > 0.0 {
            fallback_aspect
        } else {
            DEFAULT_FALLBACK_ASPECT
        };
        Self {
            min_container_width,
            fallback_aspect,
        }
    }

    /// Minimum logical surface width.
    #[must_use]
    pub fn min_container_width(&self) -> f32 {
        self.min_container_width
    }

    /// Aspect ratio used while no image is known.
    #[must_use]
    pub fn fallback_aspect(&self) -> f32 {
        self.fallback_aspect
    }

    /// Resolve the layout for a container width, optional image size and
    /// device pixel ratio.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn resolve(
        &self,
        container_width: f32,
        image: Option<(u32, u32)>,
        device_pixel_ratio: f32,
    ) -> Layout {
        let dpr = sanitize_device_pixel_ratio(device_pixel_ratio);
        let width = if container_width.is_finite() {
            container_width.max(self.min_container_width)
        } else {
            self.min_container_width
        };

        let image = image.filter(|&(w, h)| w > 0 && h > 0);
        let aspect = image.map_or(self.fallback_aspect, |(w, h)| w as f32 / h as f32);
        let height = (width / aspect).round().max(1.0);
        let surface = SurfaceSize::new(width, height, dpr);

        let fit = image.map(|(image_width, image_height)| {
            let (wn, hn) = (image_width as f32, image_height as f32);
            let scale = (width / wn).min(height / hn);
            FitTransform {
                scale,
                offset_x: (width - wn * scale) / 2.0,
                offset_y: (height - hn * scale) / 2.0,
                device_pixel_ratio: dpr,
                image_width,
                image_height,
            }
        });

        tracing::debug!(
            "Layout resolved: {}x{} css, {}x{} physical, dpr {}, scale {:?}",
            surface.logical_width,
            surface.logical_height,
            surface.physical_width,
            surface.physical_height,
            dpr,
            fit.map(|f| f.scale)
        );

        Layout { surface, fit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contain_fit_upscales() {
        let resolver = FitResolver::default();
        let layout = resolver.resolve(900.0, Some((300, 200)), 1.0);
        let fit = layout.fit.expect("fit");

        assert!((layout.surface.logical_width - 900.0).abs() < f32::EPSILON);
        assert!((layout.surface.logical_height - 600.0).abs() < f32::EPSILON);
        assert!((fit.scale - 3.0).abs() < 1e-6);
        assert!(fit.offset_x.abs() < 1e-4);
        assert!(fit.offset_y.abs() < 1e-4);
    }

    #[test]
    fn test_width_clamped_to_minimum() {
        let resolver = FitResolver::default();
        let layout = resolver.resolve(100.0, Some((892, 1248)), 1.0);
        assert!((layout.surface.logical_width - 320.0).abs() < f32::EPSILON);
        assert!((layout.surface.logical_height - 448.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fallback_aspect_without_image() {
        let resolver = FitResolver::new(320.0, 4.0 / 3.0);
        let layout = resolver.resolve(800.0, None, 2.0);
        assert!(layout.fit.is_none());
        assert!((layout.surface.logical_height - 600.0).abs() < f32::EPSILON);
        assert_eq!(layout.surface.physical_width, 1600);
        assert_eq!(layout.surface.physical_height, 1200);
    }

    #[test]
    fn test_physical_size_tracks_device_pixel_ratio() {
        let resolver = FitResolver::default();
        let layout = resolver.resolve(500.0, Some((1000, 500)), 2.0);
        let fit = layout.fit.expect("fit");

        assert!((layout.surface.logical_width - 500.0).abs() < f32::EPSILON);
        assert!((layout.surface.logical_height - 250.0).abs() < f32::EPSILON);
        assert_eq!(layout.surface.physical_width, 1000);
        assert_eq!(layout.surface.physical_height, 500);

        let rect = fit.physical_rect();
        assert_eq!((rect.x, rect.y), (0, 0));
        assert_eq!((rect.width, rect.height), (1000, 500));
    }

    #[test]
    fn test_invalid_device_pixel_ratio_falls_back() {
        assert!((sanitize_device_pixel_ratio(0.5) - 1.0).abs() < f32::EPSILON);
        assert!((sanitize_device_pixel_ratio(f32::NAN) - 1.0).abs() < f32::EPSILON);
        assert!((sanitize_device_pixel_ratio(3.0) - 3.0).abs() < f32::EPSILON);
        assert!((sanitize_device_pixel_ratio(f32::INFINITY) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_huge_device_pixel_ratio_is_capped() {
        assert!(
            (sanitize_device_pixel_ratio(1.0e9) - MAX_DEVICE_PIXEL_RATIO).abs() < f32::EPSILON
        );

        let layout = FitResolver::default().resolve(400.0, Some((400, 300)), 1.0e9);
        assert!((layout.surface.device_pixel_ratio - MAX_DEVICE_PIXEL_RATIO).abs() < f32::EPSILON);
        assert_eq!(layout.surface.physical_width, 3200);
        assert_eq!(layout.surface.physical_height, 2400);
    }

    #[test]
    fn test_rounded_height_keeps_image_centered() {
        let resolver = FitResolver::default();
        // 1000 / (3/1) = 333.33 -> 333, so height is the binding side.
        let layout = resolver.resolve(1000.0, Some((300, 100)), 1.0);
        let fit = layout.fit.expect("fit");
        assert!((fit.scale - 3.33).abs() < 1e-3);
        assert!(fit.offset_x > 0.0);
        assert!(fit.offset_y.abs() < 1e-4);
        assert!((fit.offset_x * 2.0 + fit.drawn_width() - 1000.0).abs() < 1e-3);
    }
}
