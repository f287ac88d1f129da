//! # Maskpaint Renderer
//!
//! Pixel work on top of `maskpaint-core`: decoding the source image,
//! compositing the live preview, and exporting the binarized mask.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────────────┐
//! │ SourceImage  │──▶│ PreviewCompositor │──▶│  DisplaySurface  │
//! └──────────────┘   │ (base + red tint) │   │ (physical px)    │
//!        │           └───────────────────┘   └──────────────────┘
//!        │                    ▲
//!        ▼                    │ read only
//! ┌──────────────┐   ┌───────────────────┐
//! │ MaskExporter │◀──│    MaskRaster     │
//! │ (binarize)   │   │ (Wn × Hn, core)   │
//! └──────────────┘   └───────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod error;
pub mod export;
pub mod service;
pub mod session;
pub mod source;

pub use compositor::{CompositorStats, DisplaySurface, PreviewCompositor, PreviewConfig};
pub use error::{RenderError, RenderResult};
pub use export::{
    binarize, snapshot_source, ExportBundle, ExportOutcome, MaskExporter, PngCompression,
    PngRasterEncoder, RasterEncoder,
};
pub use service::{ImageProvider, InpaintRequest, InpaintService, ServiceError};
pub use session::{EditorSession, SubmitOutcome, Submission, UNTOUCHED_MESSAGE};
pub use source::{ImageFormat, SourceImage};
