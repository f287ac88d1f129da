//! Brush/stroke state machine.
//!
//! ```text
//!          pointer down
//!   Idle ───────────────▶ Drawing { last }
//!    ▲                      │   ▲
//!    │  up / leave / cancel │   │ move: segment last → new
//!    └──────────────────────┘───┘
//! ```
//!
//! The raster is mutated incrementally on every event, so releasing the
//! pointer has nothing left to commit.

use serde::{Deserialize, Serialize};

use crate::event::{PointerEvent, PointerPhase};
use crate::raster::{MaskRaster, PaintMode};
use crate::transform::{CoordinateTransform, Point};

/// Smallest brush diameter in display pixels.
pub const MIN_BRUSH_SIZE: f32 = 5.0;

/// Largest brush diameter in display pixels.
pub const MAX_BRUSH_SIZE: f32 = 150.0;

/// Brush diameter used when none is configured.
pub const DEFAULT_BRUSH_SIZE: f32 = 40.0;

/// Clamp a brush diameter to the supported range.
#[must_use]
pub fn clamp_brush_size(size: f32) -> f32 {
    if size.is_nan() {
        DEFAULT_BRUSH_SIZE
    } else {
        size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
    }
}

/// Current stroke state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StrokeState {
    /// No pointer is down.
    #[default]
    Idle,
    /// A stroke is in progress.
    Drawing {
        /// Pointer that owns the stroke.
        pointer_id: u32,
        /// Last applied point in image space.
        last: Point,
    },
}

/// Pointer capture request for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureChange {
    /// Leave capture as is.
    Unchanged,
    /// Capture this pointer on the drawing surface.
    Capture(u32),
    /// Release this pointer.
    Release(u32),
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeOutcome {
    /// The raster changed; the preview must be recomposited.
    pub repaint: bool,
    /// Pointer capture change.
    pub capture: CaptureChange,
}

impl StrokeOutcome {
    const IGNORED: Self = Self {
        repaint: false,
        capture: CaptureChange::Unchanged,
    };
}

/// Applies pointer input to a [`MaskRaster`].
#[derive(Debug, Clone, PartialEq)]
pub struct BrushEngine {
    state: StrokeState,
    size: f32,
    mode: PaintMode,
    painted_remove: bool,
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_SIZE, PaintMode::Remove)
    }
}

impl BrushEngine {
    /// Create an idle engine.
    #[must_use]
    pub fn new(size: f32, mode: PaintMode) -> Self {
        Self {
            state: StrokeState::Idle,
            size: clamp_brush_size(size),
            mode,
            painted_remove: false,
        }
    }

    /// Current stroke state.
    #[must_use]
    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Brush diameter in display pixels.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Set the brush diameter, returning the clamped value.
    pub fn set_size(&mut self, size: f32) -> f32 {
        self.size = clamp_brush_size(size);
        self.size
    }

    /// Current paint mode.
    #[must_use]
    pub fn mode(&self) -> PaintMode {
        self.mode
    }

    /// Set the paint mode.
    pub fn set_mode(&mut self, mode: PaintMode) {
        self.mode = mode;
    }

    /// Whether any remove stroke was applied since the last reset.
    ///
    /// This is a hint; export always rescans the raster.
    #[must_use]
    pub fn painted_remove(&self) -> bool {
        self.painted_remove
    }

    /// Drop any active stroke and forget the remove hint.
    pub fn reset(&mut self) {
        self.state = StrokeState::Idle;
        self.painted_remove = false;
    }

    /// Abort the active stroke, if any, returning the pointer to release.
    pub fn cancel(&mut self) -> Option<u32> {
        match std::mem::take(&mut self.state) {
            StrokeState::Drawing { pointer_id, .. } => Some(pointer_id),
            StrokeState::Idle => None,
        }
    }

    /// Handle a pointer event, painting into `raster` as needed.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        transform: &CoordinateTransform,
        raster: &mut MaskRaster,
    ) -> StrokeOutcome {
        match (self.state, event.phase) {
            (StrokeState::Idle, PointerPhase::Down) => {
                let point = transform.to_image_coords(event.x, event.y);
                self.state = StrokeState::Drawing {
                    pointer_id: event.pointer_id,
                    last: point,
                };
                self.paint(point, point, transform, raster);
                StrokeOutcome {
                    repaint: true,
                    capture: CaptureChange::Capture(event.pointer_id),
                }
            }
            (StrokeState::Drawing { pointer_id, last }, PointerPhase::Move)
                if pointer_id == event.pointer_id =>
            {
                let point = transform.to_image_coords(event.x, event.y);
                self.paint(last, point, transform, raster);
                self.state = StrokeState::Drawing {
                    pointer_id,
                    last: point,
                };
                StrokeOutcome {
                    repaint: true,
                    capture: CaptureChange::Unchanged,
                }
            }
            (StrokeState::Drawing { pointer_id, .. }, phase)
                if phase.ends_stroke() && pointer_id == event.pointer_id =>
            {
                self.state = StrokeState::Idle;
                StrokeOutcome {
                    repaint: false,
                    capture: CaptureChange::Release(pointer_id),
                }
            }
            (StrokeState::Drawing { pointer_id, .. }, PointerPhase::Down)
                if pointer_id == event.pointer_id =>
            {
                // The owning pointer's up was lost; start over at the new point.
                tracing::debug!("Restarting stroke of pointer {}", pointer_id);
                let point = transform.to_image_coords(event.x, event.y);
                self.state = StrokeState::Drawing {
                    pointer_id,
                    last: point,
                };
                self.paint(point, point, transform, raster);
                StrokeOutcome {
                    repaint: true,
                    capture: CaptureChange::Unchanged,
                }
            }
            (StrokeState::Drawing { pointer_id, .. }, PointerPhase::Down) => {
                tracing::warn!(
                    "Ignoring pointer {} down while pointer {} is drawing",
                    event.pointer_id,
                    pointer_id
                );
                StrokeOutcome::IGNORED
            }
            _ => StrokeOutcome::IGNORED,
        }
    }

    fn paint(
        &mut self,
        from: Point,
        to: Point,
        transform: &CoordinateTransform,
        raster: &mut MaskRaster,
    ) {
        let radius = transform.brush_radius_in_image(self.size);
        raster.apply_stroke(from, to, radius, self.mode);
        if self.mode == PaintMode::Remove {
            self.painted_remove = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FitResolver;
    use crate::raster::{is_removed, REMOVE_PIXEL};

    fn setup(container: f32, image: (u32, u32)) -> (CoordinateTransform, MaskRaster) {
        let layout = FitResolver::default().resolve(container, Some(image), 1.0);
        let transform = CoordinateTransform::new(Point::default(), layout.fit.expect("fit"));
        let raster = MaskRaster::new(image.0, image.1).expect("raster");
        (transform, raster)
    }

    #[test]
    fn test_click_registers_dab() {
        let (t, mut raster) = setup(400.0, (400, 400));
        let mut brush = BrushEngine::new(20.0, PaintMode::Remove);

        let down = brush.handle(&PointerEvent::down(100.0, 100.0), &t, &mut raster);
        assert!(down.repaint);
        assert_eq!(down.capture, CaptureChange::Capture(0));
        assert!(brush.is_drawing());
        assert_eq!(raster.pixel(100, 100), Some(REMOVE_PIXEL));

        let up = brush.handle(&PointerEvent::up(100.0, 100.0), &t, &mut raster);
        assert!(!up.repaint);
        assert_eq!(up.capture, CaptureChange::Release(0));
        assert_eq!(brush.state(), StrokeState::Idle);
        assert!(brush.painted_remove());
    }

    #[test]
    fn test_large_jump_is_connected() {
        let (t, mut raster) = setup(400.0, (400, 400));
        let mut brush = BrushEngine::new(10.0, PaintMode::Remove);

        brush.handle(&PointerEvent::down(20.0, 200.0), &t, &mut raster);
        brush.handle(&PointerEvent::moved(380.0, 200.0), &t, &mut raster);

        for x in (20..380).step_by(20) {
            assert!(
                is_removed(&raster.pixel(x, 200).expect("px")),
                "gap at x = {x}"
            );
        }
    }

    #[test]
    fn test_move_while_idle_does_nothing() {
        let (t, mut raster) = setup(400.0, (400, 400));
        let mut brush = BrushEngine::default();
        let outcome = brush.handle(&PointerEvent::moved(50.0, 50.0), &t, &mut raster);
        assert_eq!(outcome, StrokeOutcome::IGNORED);
        assert!(raster.is_blank());
    }

    #[test]
    fn test_leave_ends_stroke() {
        let (t, mut raster) = setup(400.0, (400, 400));
        let mut brush = BrushEngine::default();
        brush.handle(&PointerEvent::down(50.0, 50.0), &t, &mut raster);
        let outcome = brush.handle(&PointerEvent::leave(60.0, 60.0), &t, &mut raster);
        assert_eq!(outcome.capture, CaptureChange::Release(0));
        assert!(!brush.is_drawing());

        // Moves after leaving no longer paint.
        let painted = raster.count_removed();
        brush.handle(&PointerEvent::moved(300.0, 300.0), &t, &mut raster);
        assert_eq!(raster.count_removed(), painted);
    }

    #[test]
    fn test_second_pointer_is_ignored() {
        let (t, mut raster) = setup(400.0, (400, 400));
        let mut brush = BrushEngine::new(10.0, PaintMode::Remove);
        brush.handle(&PointerEvent::down(50.0, 50.0), &t, &mut raster);

        let other = PointerEvent::down(300.0, 300.0).with_pointer_id(7);
        assert_eq!(brush.handle(&other, &t, &mut raster), StrokeOutcome::IGNORED);
        let other_move = PointerEvent::moved(310.0, 310.0).with_pointer_id(7);
        assert_eq!(
            brush.handle(&other_move, &t, &mut raster),
            StrokeOutcome::IGNORED
        );
        assert!(!is_removed(&raster.pixel(300, 300).expect("px")));
    }

    #[test]
    fn test_repeated_down_restarts_stroke() {
        let (t, mut raster) = setup(400.0, (400, 400));
        let mut brush = BrushEngine::new(10.0, PaintMode::Remove);
        brush.handle(&PointerEvent::down(50.0, 50.0), &t, &mut raster);

        // Same pointer goes down again without an up in between.
        let again = brush.handle(&PointerEvent::down(300.0, 300.0), &t, &mut raster);
        assert!(again.repaint);
        assert_eq!(again.capture, CaptureChange::Unchanged);
        assert!(is_removed(&raster.pixel(300, 300).expect("px")));

        brush.handle(&PointerEvent::moved(310.0, 300.0), &t, &mut raster);
        assert!(is_removed(&raster.pixel(305, 300).expect("px")));
        assert!(!is_removed(&raster.pixel(175, 175).expect("px")));
        assert_eq!(
            brush.state(),
            StrokeState::Drawing {
                pointer_id: 0,
                last: Point::new(310.0, 300.0),
            }
        );
    }

    #[test]
    fn test_restore_does_not_set_remove_hint() {
        let (t, mut raster) = setup(400.0, (400, 400));
        let mut brush = BrushEngine::new(10.0, PaintMode::Restore);
        brush.handle(&PointerEvent::down(50.0, 50.0), &t, &mut raster);
        assert!(!brush.painted_remove());
        assert!(raster.is_blank());
    }

    #[test]
    fn test_brush_size_is_clamped() {
        let mut brush = BrushEngine::default();
        assert!((brush.set_size(1.0) - MIN_BRUSH_SIZE).abs() < f32::EPSILON);
        assert!((brush.set_size(1000.0) - MAX_BRUSH_SIZE).abs() < f32::EPSILON);
        assert!((brush.set_size(f32::NAN) - DEFAULT_BRUSH_SIZE).abs() < f32::EPSILON);
    }
}
