//! # Maskpaint Core
//!
//! Core logic for painting inpainting masks over an image.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               maskpaint-core                │
//! ├─────────────────────────────────────────────┤
//! │  Layout/Fit Resolver → Coordinate Transform │
//! │                             │               │
//! │  Pointer events → Brush/Stroke Engine       │
//! │                             │               │
//! │                     Mask Raster Store       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The mask raster always has the source image's natural size. The display
//! surface is sized independently (logical CSS pixels plus a device pixel
//! ratio), and pointer input is mapped into image space before it touches
//! the raster.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod brush;
pub mod error;
pub mod event;
pub mod layout;
pub mod raster;
pub mod state;
pub mod transform;

pub use brush::{BrushEngine, CaptureChange, StrokeOutcome, StrokeState};
pub use error::{MaskError, MaskResult};
pub use event::{PointerEvent, PointerPhase};
pub use layout::{FitResolver, FitTransform, Layout, PixelRect, SurfaceSize};
pub use raster::{MaskRaster, PaintMode};
pub use state::{EditorConfig, EditorState};
pub use transform::{CoordinateTransform, Point};

/// Maskpaint core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
