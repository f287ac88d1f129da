//! Pointer input events delivered by the host surface.

use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed (or finger/pen down).
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer left the drawing surface.
    Leave,
    /// Platform cancelled the pointer (e.g., palm rejection).
    Cancel,
}

impl PointerPhase {
    /// Whether this phase ends an active stroke.
    #[must_use]
    pub fn ends_stroke(self) -> bool {
        matches!(self, Self::Up | Self::Leave | Self::Cancel)
    }
}

/// A single pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Pointer identifier (mouse, pen or touch id).
    #[serde(default)]
    pub pointer_id: u32,
    /// X position in viewport (CSS) pixels.
    pub x: f32,
    /// Y position in viewport (CSS) pixels.
    pub y: f32,
}

impl PointerEvent {
    /// Create a new pointer event for pointer id 0.
    #[must_use]
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            pointer_id: 0,
            x,
            y,
        }
    }

    /// Pointer down at a viewport position.
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Pointer move to a viewport position.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Pointer up at a viewport position.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Pointer left the surface at a viewport position.
    #[must_use]
    pub fn leave(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Leave, x, y)
    }

    /// Set the pointer id.
    #[must_use]
    pub fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ends_stroke() {
        assert!(!PointerPhase::Down.ends_stroke());
        assert!(!PointerPhase::Move.ends_stroke());
        assert!(PointerPhase::Up.ends_stroke());
        assert!(PointerPhase::Leave.ends_stroke());
        assert!(PointerPhase::Cancel.ends_stroke());
    }

    #[test]
    fn test_event_json_shape() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"phase":"move","x":10.5,"y":4.0}"#).expect("parse");
        assert_eq!(event.phase, PointerPhase::Move);
        assert_eq!(event.pointer_id, 0);
        assert!((event.x - 10.5).abs() < f32::EPSILON);
    }
}
