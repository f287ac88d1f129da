//! Editing session: one source image, its mask, and the submission flow.
//!
//! ```text
//!  load_from ──▶ SourceImage ──▶ EditorState (raster sized Wn × Hn)
//!                                   │
//!  pointer events ─────────────────▶│──▶ render() → DisplaySurface
//!                                   │
//!  submit ──▶ export ──▶ Untouched (no remote call)
//!                   └──▶ freeze ──▶ InpaintService ──▶ thaw
//! ```

use maskpaint_core::{
    EditorConfig, EditorState, Layout, MaskError, PaintMode, PointerEvent, StrokeOutcome,
};

use crate::compositor::{DisplaySurface, PreviewCompositor, PreviewConfig};
use crate::error::{RenderError, RenderResult};
use crate::export::{ExportBundle, ExportOutcome, MaskExporter};
use crate::service::{ImageProvider, InpaintRequest, InpaintService};
use crate::source::SourceImage;

/// Message shown to the user when a submission had nothing painted.
pub const UNTOUCHED_MESSAGE: &str = "Nothing is marked for removal. Paint over the area to replace first.";

/// Result of preparing a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing painted; no remote call should be made.
    Untouched,
    /// Outputs encoded; the session is frozen until
    /// [`EditorSession::finish_submission`] is called.
    Pending(ExportBundle),
}

/// Result of a completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing painted; no remote call was made.
    Untouched,
    /// The service produced a new image.
    Edited {
        /// URL of the edited image.
        image_url: String,
    },
}

/// Thaws the editor when dropped, so a cancelled submission cannot leave
/// interaction frozen.
struct ThawOnDrop<'a>(&'a mut EditorState);

impl Drop for ThawOnDrop<'_> {
    fn drop(&mut self) {
        self.0.thaw();
    }
}

/// Owns the editor state, the decoded source and the render/export helpers.
#[derive(Debug, Default)]
pub struct EditorSession {
    state: EditorState,
    source: Option<SourceImage>,
    compositor: PreviewCompositor,
    exporter: MaskExporter,
}

impl EditorSession {
    /// Create a session.
    #[must_use]
    pub fn new(config: EditorConfig, preview: PreviewConfig) -> Self {
        Self {
            state: EditorState::new(config),
            source: None,
            compositor: PreviewCompositor::new(preview),
            exporter: MaskExporter::default(),
        }
    }

    /// Replace the exporter (e.g., to change PNG compression).
    #[must_use]
    pub fn with_exporter(mut self, exporter: MaskExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// The editor state.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The decoded source image, if any.
    #[must_use]
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Compositor statistics and configuration.
    #[must_use]
    pub fn compositor(&self) -> &PreviewCompositor {
        &self.compositor
    }

    /// Install a decoded source image and reset the mask to match it.
    ///
    /// # Errors
    ///
    /// Returns an error while a submission is in flight.
    pub fn load_source(&mut self, source: SourceImage) -> RenderResult<()> {
        if self.state.is_frozen() {
            return Err(MaskError::InteractionFrozen.into());
        }
        let (width, height) = source.dimensions();
        self.state.load_source(width, height)?;
        self.source = Some(source);
        self.compositor.invalidate();
        Ok(())
    }

    /// Fetch and decode an image, then install it.
    ///
    /// On failure the current source and mask are kept, but drawing is
    /// disabled until a later load succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ImageLoad`] if fetching or decoding fails.
    pub async fn load_from<P>(&mut self, provider: &P, url: &str) -> RenderResult<()>
    where
        P: ImageProvider + ?Sized,
    {
        if self.state.is_frozen() {
            return Err(MaskError::InteractionFrozen.into());
        }
        tracing::info!("Loading source image from {}", url);
        let decoded = match provider.fetch(url).await {
            Ok(bytes) => SourceImage::from_bytes(&bytes),
            Err(e) => Err(RenderError::ImageLoad(format!("Fetch failed: {e}"))),
        };
        match decoded {
            Ok(source) => self.load_source(source),
            Err(e) => {
                tracing::warn!("Image load from {} failed: {}", url, e);
                if let Some(pointer_id) = self.state.mark_load_failed() {
                    tracing::debug!("Aborted stroke of pointer {} after failed load", pointer_id);
                }
                Err(e)
            }
        }
    }

    /// Report the container content width and device pixel ratio.
    pub fn resize_container(&mut self, container_width: f32, device_pixel_ratio: f32) -> Layout {
        *self
            .state
            .resize_container(container_width, device_pixel_ratio)
    }

    /// Report the surface's top-left corner in viewport coordinates.
    pub fn set_surface_origin(&mut self, left: f32, top: f32) {
        self.state.set_surface_origin(left, top);
    }

    /// Route a pointer event to the brush engine.
    ///
    /// # Errors
    ///
    /// Returns an error while frozen or before a source is loaded.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> RenderResult<StrokeOutcome> {
        Ok(self.state.handle_pointer(event)?)
    }

    /// Set the paint mode.
    pub fn set_mode(&mut self, mode: PaintMode) {
        self.state.set_mode(mode);
    }

    /// Set the brush diameter in display pixels, returning the clamped value.
    pub fn set_brush_size(&mut self, size: f32) -> f32 {
        self.state.set_brush_size(size)
    }

    /// Clear the mask.
    ///
    /// # Errors
    ///
    /// Returns an error while frozen or before a source is loaded.
    pub fn clear(&mut self) -> RenderResult<StrokeOutcome> {
        Ok(self.state.clear()?)
    }

    /// Composite the current preview.
    pub fn render(&mut self) -> DisplaySurface {
        self.compositor.compose(self.source.as_ref(), &self.state)
    }

    /// Binarize and encode the mask, freezing interaction if there is
    /// something to submit.
    ///
    /// # Errors
    ///
    /// Returns an error if no source is loaded, a submission is already in
    /// flight, or encoding fails. The mask is kept in every case.
    pub fn prepare_submission(&mut self) -> RenderResult<Submission> {
        if self.state.is_frozen() {
            return Err(MaskError::InteractionFrozen.into());
        }
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| MaskError::SourceNotReady("no image decoded".to_string()))?;
        let raster = self
            .state
            .raster_mut()
            .ok_or_else(|| MaskError::SourceNotReady("no mask raster".to_string()))?;

        match self.exporter.export(raster, source)? {
            ExportOutcome::Untouched => Ok(Submission::Untouched),
            ExportOutcome::Ready(bundle) => {
                if let Some(pointer_id) = self.state.freeze() {
                    tracing::debug!("Aborted stroke of pointer {} for submission", pointer_id);
                }
                Ok(Submission::Pending(bundle))
            }
        }
    }

    /// Re-enable interaction after a submission resolved.
    pub fn finish_submission(&mut self) {
        self.state.thaw();
    }

    /// Export the mask and send it to the inpainting service.
    ///
    /// An untouched mask short-circuits without calling the service.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ExportEncoding`] if encoding fails and
    /// [`RenderError::RemoteEdit`] if the service fails. The mask is kept
    /// and interaction is re-enabled either way, including when the
    /// returned future is dropped before the service answers.
    pub async fn submit<S>(&mut self, service: &S, cover_id: &str) -> RenderResult<SubmitOutcome>
    where
        S: InpaintService + ?Sized,
    {
        let bundle = match self.prepare_submission()? {
            Submission::Untouched => {
                tracing::info!("{}", UNTOUCHED_MESSAGE);
                return Ok(SubmitOutcome::Untouched);
            }
            Submission::Pending(bundle) => bundle,
        };

        tracing::info!(
            "Submitting {}x{} mask for cover {}",
            bundle.width,
            bundle.height,
            cover_id
        );
        let result = {
            let _thaw = ThawOnDrop(&mut self.state);
            service.inpaint(InpaintRequest::new(cover_id, bundle)).await
        };

        match result {
            Ok(image_url) => {
                tracing::info!("Edit ready at {}", image_url);
                Ok(SubmitOutcome::Edited { image_url })
            }
            Err(e) => {
                tracing::warn!("Remote edit failed: {}", e);
                Err(RenderError::RemoteEdit(e.to_string()))
            }
        }
    }
}
