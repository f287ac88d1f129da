//! Conversion between viewport coordinates and image pixel coordinates.

use serde::{Deserialize, Serialize};

use crate::layout::FitTransform;

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Maps pointer positions to image space for the current layout.
///
/// Every pointer position must go through [`CoordinateTransform::to_image_coords`];
/// nothing else re-derives the mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    origin: Point,
    fit: FitTransform,
}

impl CoordinateTransform {
    /// Create a transform for a surface whose top-left corner sits at
    /// `origin` in viewport coordinates.
    #[must_use]
    pub fn new(origin: Point, fit: FitTransform) -> Self {
        Self { origin, fit }
    }

    /// The fit this transform was built from.
    #[must_use]
    pub fn fit(&self) -> &FitTransform {
        &self.fit
    }

    /// Viewport position of the surface's top-left corner.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Convert a viewport position to image pixel coordinates.
    #[must_use]
    pub fn to_image_coords(&self, viewport_x: f32, viewport_y: f32) -> Point {
        Point {
            x: (viewport_x - self.origin.x - self.fit.offset_x) / self.fit.scale,
            y: (viewport_y - self.origin.y - self.fit.offset_y) / self.fit.scale,
        }
    }

    /// Convert image pixel coordinates back to a viewport position.
    #[must_use]
    pub fn to_viewport_coords(&self, image_x: f32, image_y: f32) -> Point {
        Point {
            x: image_x * self.fit.scale + self.fit.offset_x + self.origin.x,
            y: image_y * self.fit.scale + self.fit.offset_y + self.origin.y,
        }
    }

    /// Image pixels per display pixel, horizontally and vertically.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn image_per_display(&self) -> (f32, f32) {
        (
            self.fit.image_width as f32 / self.fit.drawn_width(),
            self.fit.image_height as f32 / self.fit.drawn_height(),
        )
    }

    /// Convert a brush diameter in display pixels into a radius in image
    /// pixels.
    ///
    /// Uses the larger axis ratio, which is exact only while scaling stays
    /// uniform.
    #[must_use]
    pub fn brush_radius_in_image(&self, display_diameter: f32) -> f32 {
        let (sx, sy) = self.image_per_display();
        display_diameter / 2.0 * sx.max(sy)
    }
}
