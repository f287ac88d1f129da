//! Editor state management.
//!
//! [`EditorState`] owns the mask raster, the current layout and the brush
//! engine, and routes host commands to them. All mutation happens on the
//! caller's thread, one event at a time.

use serde::{Deserialize, Serialize};

use crate::brush::{BrushEngine, CaptureChange, StrokeOutcome, DEFAULT_BRUSH_SIZE};
use crate::error::{MaskError, MaskResult};
use crate::event::PointerEvent;
use crate::layout::{
    FitResolver, Layout, DEFAULT_FALLBACK_ASPECT, DEFAULT_MIN_CONTAINER_WIDTH,
};
use crate::raster::{MaskRaster, PaintMode};
use crate::transform::{CoordinateTransform, Point};

/// Editor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum logical surface width in CSS pixels.
    pub min_container_width: f32,
    /// Aspect ratio (width / height) used before the image is known.
    pub fallback_aspect: f32,
    /// Initial brush diameter in display pixels.
    pub brush_size: f32,
    /// Initial paint mode.
    pub mode: PaintMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_container_width: DEFAULT_MIN_CONTAINER_WIDTH,
            fallback_aspect: DEFAULT_FALLBACK_ASPECT,
            brush_size: DEFAULT_BRUSH_SIZE,
            mode: PaintMode::Remove,
        }
    }
}

/// The complete editing state for one source image.
#[derive(Debug, Clone)]
pub struct EditorState {
    resolver: FitResolver,
    raster: Option<MaskRaster>,
    layout: Layout,
    container_width: f32,
    device_pixel_ratio: f32,
    origin: Point,
    brush: BrushEngine,
    frozen: bool,
    load_failed: bool,
    generation: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorState {
    /// Create an editor with no source image.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let resolver = FitResolver::new(config.min_container_width, config.fallback_aspect);
        let container_width = resolver.min_container_width();
        Self {
            layout: resolver.resolve(container_width, None, 1.0),
            resolver,
            raster: None,
            container_width,
            device_pixel_ratio: 1.0,
            origin: Point::default(),
            brush: BrushEngine::new(config.brush_size, config.mode),
            frozen: false,
            load_failed: false,
            generation: 0,
        }
    }

    /// Install a freshly decoded source image of the given natural size.
    ///
    /// Creates an all-keep raster at exactly that size, drops any active
    /// stroke and re-runs layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are invalid. The previous raster is
    /// left in place in that case.
    pub fn load_source(&mut self, width: u32, height: u32) -> MaskResult<()> {
        let raster = MaskRaster::new(width, height)?;
        self.raster = Some(raster);
        self.load_failed = false;
        self.brush.reset();
        self.generation += 1;
        self.relayout();
        tracing::info!(
            "Source loaded: {}x{} (generation {})",
            width,
            height,
            self.generation
        );
        Ok(())
    }

    /// Record that loading a replacement source failed.
    ///
    /// The current raster and layout are kept untouched, but drawing stays
    /// disabled until a later load succeeds. Any active stroke is aborted.
    ///
    /// Returns the pointer whose capture should be released, if any.
    pub fn mark_load_failed(&mut self) -> Option<u32> {
        self.load_failed = true;
        tracing::warn!("Source load failed, drawing disabled");
        self.brush.cancel()
    }

    /// Whether the most recent source load failed.
    #[must_use]
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Report a new container content width and device pixel ratio.
    pub fn resize_container(&mut self, container_width: f32, device_pixel_ratio: f32) -> &Layout {
        self.container_width = container_width;
        self.device_pixel_ratio = device_pixel_ratio;
        self.relayout();
        &self.layout
    }

    /// Report where the surface's top-left corner sits in the viewport.
    pub fn set_surface_origin(&mut self, left: f32, top: f32) {
        self.origin = Point::new(left, top);
    }

    fn relayout(&mut self) {
        let image = self.raster.as_ref().map(MaskRaster::dimensions);
        self.layout = self
            .resolver
            .resolve(self.container_width, image, self.device_pixel_ratio);
    }

    /// Current layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Coordinate transform for the current layout, if an image is loaded.
    #[must_use]
    pub fn transform(&self) -> Option<CoordinateTransform> {
        self.layout
            .fit
            .map(|fit| CoordinateTransform::new(self.origin, fit))
    }

    /// Whether a source image is loaded and drawing is possible.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.load_failed && self.raster.is_some() && self.layout.fit.is_some()
    }

    /// The mask raster, if a source is loaded.
    #[must_use]
    pub fn raster(&self) -> Option<&MaskRaster> {
        self.raster.as_ref()
    }

    /// Mutable access to the raster for export-time binarization.
    pub fn raster_mut(&mut self) -> Option<&mut MaskRaster> {
        self.raster.as_mut()
    }

    /// The brush engine.
    #[must_use]
    pub fn brush(&self) -> &BrushEngine {
        &self.brush
    }

    /// Counter bumped every time the source image changes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hint: a remove stroke was applied since the last reset.
    #[must_use]
    pub fn painted_remove(&self) -> bool {
        self.brush.painted_remove()
    }

    /// Whether interaction is frozen by an in-flight export.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze interaction. Any active stroke is aborted.
    ///
    /// Returns the pointer whose capture should be released, if any.
    pub fn freeze(&mut self) -> Option<u32> {
        self.frozen = true;
        self.brush.cancel()
    }

    /// Re-enable interaction.
    pub fn thaw(&mut self) {
        self.frozen = false;
    }

    /// Set the paint mode.
    pub fn set_mode(&mut self, mode: PaintMode) {
        self.brush.set_mode(mode);
    }

    /// Set the brush diameter in display pixels, returning the clamped value.
    pub fn set_brush_size(&mut self, size: f32) -> f32 {
        self.brush.set_size(size)
    }

    /// Route a pointer event to the brush engine.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::InteractionFrozen`] while an export is in flight
    /// and [`MaskError::SourceNotReady`] before a source image is loaded or
    /// after a load failed.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> MaskResult<StrokeOutcome> {
        if self.frozen {
            tracing::warn!("Rejecting {:?} while frozen", event.phase);
            return Err(MaskError::InteractionFrozen);
        }
        if self.load_failed {
            return Err(MaskError::SourceNotReady("image load failed".to_string()));
        }
        let transform = self
            .transform()
            .ok_or_else(|| MaskError::SourceNotReady("no image decoded".to_string()))?;
        let raster = self
            .raster
            .as_mut()
            .ok_or_else(|| MaskError::SourceNotReady("no mask raster".to_string()))?;
        Ok(self.brush.handle(event, &transform, raster))
    }

    /// Clear the mask back to all-keep.
    ///
    /// # Errors
    ///
    /// Returns an error while frozen, before a source image is loaded, or
    /// after a load failed.
    pub fn clear(&mut self) -> MaskResult<StrokeOutcome> {
        if self.frozen {
            return Err(MaskError::InteractionFrozen);
        }
        if self.load_failed {
            return Err(MaskError::SourceNotReady("image load failed".to_string()));
        }
        let raster = self
            .raster
            .as_mut()
            .ok_or_else(|| MaskError::SourceNotReady("no mask raster".to_string()))?;
        raster.reset();
        let capture = self
            .brush
            .cancel()
            .map_or(CaptureChange::Unchanged, CaptureChange::Release);
        self.brush.reset();
        tracing::debug!("Mask cleared");
        Ok(StrokeOutcome {
            repaint: true,
            capture,
        })
    }
}
