//! Live preview compositing.
//!
//! Each pass rebuilds a disposable display-resolution surface:
//!
//! 1. clear the surface to transparent;
//! 2. draw the source image into the fit rectangle;
//! 3. resample the mask raster into the same rectangle;
//! 4. recolor painted pixels as translucent red and everything else as
//!    transparent, then composite that over the base.
//!
//! The mask is only read. The surface is never a second source of truth.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

use maskpaint_core::layout::{PixelRect, SurfaceSize};
use maskpaint_core::raster::is_removed;
use maskpaint_core::{EditorState, MaskRaster};

use crate::source::SourceImage;

/// Configuration for the preview overlay.
#[derive(Debug, Clone, Copy)]
pub struct PreviewConfig {
    /// Overlay RGB for painted pixels.
    pub overlay_color: [u8; 3],
    /// Overlay opacity (0.0 - 1.0).
    pub overlay_alpha: f32,
    /// Resampling filter for both the base image and the mask.
    pub filter: FilterType,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            overlay_color: [255, 0, 0],
            overlay_alpha: 0.3,
            filter: FilterType::Triangle,
        }
    }
}

impl PreviewConfig {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn overlay_pixel(&self) -> Rgba<u8> {
        let [r, g, b] = self.overlay_color;
        let a = (self.overlay_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([r, g, b, a])
    }
}

/// A composited display surface in physical (device) pixels.
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    size: SurfaceSize,
    pixels: RgbaImage,
}

impl DisplaySurface {
    /// Logical and physical size this surface was built for.
    #[must_use]
    pub fn size(&self) -> &SurfaceSize {
        &self.size
    }

    /// Backing buffer dimensions.
    #[must_use]
    pub fn physical_dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The composited pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the surface, returning its pixels.
    #[must_use]
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositorStats {
    /// Passes that reused the scaled base image.
    pub hits: u64,
    /// Passes that had to rescale the base image.
    pub misses: u64,
}

#[derive(Debug)]
struct ScaledBase {
    generation: u64,
    rect: PixelRect,
    pixels: RgbaImage,
}

/// Builds preview surfaces from the source image and the mask raster.
#[derive(Debug, Default)]
pub struct PreviewCompositor {
    config: PreviewConfig,
    base: Option<ScaledBase>,
    stats: CompositorStats,
}

impl PreviewCompositor {
    /// Create a compositor with the given configuration.
    #[must_use]
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            config,
            base: None,
            stats: CompositorStats::default(),
        }
    }

    /// The overlay configuration.
    #[must_use]
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> CompositorStats {
        self.stats
    }

    /// Drop the cached scaled base image.
    pub fn invalidate(&mut self) {
        self.base = None;
    }

    /// Composite the current editor state.
    ///
    /// Without a source image (or before layout knows where it goes) the
    /// result is a cleared surface of the current size.
    pub fn compose(&mut self, source: Option<&SourceImage>, state: &EditorState) -> DisplaySurface {
        let size = state.layout().surface;
        let mut pixels = RgbaImage::new(size.physical_width, size.physical_height);

        if let (Some(source), Some(raster), Some(fit)) =
            (source, state.raster(), state.layout().fit)
        {
            let rect = fit.physical_rect();
            let base = self.scaled_base(source, state.generation(), rect);
            imageops::overlay(&mut pixels, base, rect.x, rect.y);

            let overlay = self.mask_overlay(raster, rect);
            imageops::overlay(&mut pixels, &overlay, rect.x, rect.y);
        }

        tracing::trace!(
            "Composited {}x{} surface",
            size.physical_width,
            size.physical_height
        );
        DisplaySurface { size, pixels }
    }

    fn scaled_base(&mut self, source: &SourceImage, generation: u64, rect: PixelRect) -> &RgbaImage {
        let base = match self.base.take() {
            Some(base) if base.generation == generation && base.rect == rect => {
                self.stats.hits += 1;
                base
            }
            _ => {
                self.stats.misses += 1;
                tracing::debug!(
                    "Rescaling base image to {}x{} (generation {})",
                    rect.width,
                    rect.height,
                    generation
                );
                let pixels = if source.dimensions() == (rect.width, rect.height) {
                    source.pixels().clone()
                } else {
                    imageops::resize(source.pixels(), rect.width, rect.height, self.config.filter)
                };
                ScaledBase {
                    generation,
                    rect,
                    pixels,
                }
            }
        };
        &self.base.insert(base).pixels
    }

    fn mask_overlay(&self, raster: &MaskRaster, rect: PixelRect) -> RgbaImage {
        let painted = self.config.overlay_pixel();
        let clear = Rgba([0, 0, 0, 0]);

        let Some(view) = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(
            raster.width(),
            raster.height(),
            raster.as_raw(),
        ) else {
            return RgbaImage::new(rect.width, rect.height);
        };
        let mut overlay = if raster.dimensions() == (rect.width, rect.height) {
            RgbaImage::from_fn(rect.width, rect.height, |x, y| *view.get_pixel(x, y))
        } else {
            imageops::resize(&view, rect.width, rect.height, self.config.filter)
        };

        for px in overlay.pixels_mut() {
            *px = if is_removed(&px.0) { painted } else { clear };
        }
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskpaint_core::PointerEvent;

    fn gray_source(w: u32, h: u32) -> SourceImage {
        SourceImage::from_rgba(RgbaImage::from_pixel(w, h, Rgba([100, 100, 100, 255])))
            .expect("source")
    }

    #[test]
    fn test_surface_uses_physical_size() {
        let source = gray_source(200, 100);
        let mut state = EditorState::default();
        state.resize_container(400.0, 2.0);
        state.load_source(200, 100).expect("load");

        let mut compositor = PreviewCompositor::default();
        let surface = compositor.compose(Some(&source), &state);
        assert_eq!(surface.physical_dimensions(), (800, 400));
        assert!((surface.size().logical_width - 400.0).abs() < f32::EPSILON);
        assert_eq!(surface.pixels().get_pixel(10, 10), &Rgba([100, 100, 100, 255]));
    }

    #[test]
    fn test_painted_region_is_tinted_red() {
        let source = gray_source(100, 100);
        let mut state = EditorState::default();
        state.resize_container(400.0, 1.0);
        state.load_source(100, 100).expect("load");
        state.set_brush_size(40.0);
        state
            .handle_pointer(&PointerEvent::down(200.0, 200.0))
            .expect("down");

        let mut compositor = PreviewCompositor::default();
        let surface = compositor.compose(Some(&source), &state);

        let inside = surface.pixels().get_pixel(200, 200);
        assert!(inside[0] > inside[1], "inside = {inside:?}");
        assert_eq!(inside[1], inside[2]);
        assert_eq!(inside[3], 255);

        let outside = surface.pixels().get_pixel(20, 20);
        assert_eq!(outside, &Rgba([100, 100, 100, 255]));
    }

    #[test]
    fn test_overlay_is_not_written_back() {
        let source = gray_source(50, 50);
        let mut state = EditorState::default();
        state.load_source(50, 50).expect("load");
        state
            .handle_pointer(&PointerEvent::down(160.0, 160.0))
            .expect("down");
        let before = state.raster().cloned();

        let mut compositor = PreviewCompositor::default();
        let _ = compositor.compose(Some(&source), &state);
        assert_eq!(state.raster().cloned(), before);
    }

    #[test]
    fn test_base_cache_reused_until_layout_changes() {
        let source = gray_source(64, 64);
        let mut state = EditorState::default();
        state.load_source(64, 64).expect("load");

        let mut compositor = PreviewCompositor::default();
        let _ = compositor.compose(Some(&source), &state);
        let _ = compositor.compose(Some(&source), &state);
        assert_eq!(compositor.stats(), CompositorStats { hits: 1, misses: 1 });

        state.resize_container(640.0, 1.0);
        let _ = compositor.compose(Some(&source), &state);
        assert_eq!(compositor.stats().misses, 2);

        state.load_source(64, 64).expect("reload");
        let _ = compositor.compose(Some(&source), &state);
        assert_eq!(compositor.stats().misses, 3);
    }

    #[test]
    fn test_compose_without_source_is_clear() {
        let state = EditorState::default();
        let mut compositor = PreviewCompositor::default();
        let surface = compositor.compose(None, &state);
        assert_eq!(surface.physical_dimensions(), (320, 320));
        assert!(surface.pixels().pixels().all(|p| p[3] == 0));
    }
}
