//! # Maskpaint CLI
//!
//! Headless host for the maskpaint editor.
//!
//! Loads a source image, replays a recorded pointer script against an
//! [`EditorSession`](maskpaint_renderer::EditorSession), writes the final
//! preview, and spools every submission to an output directory where an
//! offline inpainting worker can pick it up.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p maskpaint-cli -- --input cover.png --script strokes.json --output out/
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `StudioConfig` - Resolved configuration for the session and output
//! - `Script` - JSON list of editor actions to replay
//! - `FileImageProvider` / `DirectoryInpaintService` - filesystem collaborators

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod script;
mod spool;

pub use script::{Script, ScriptError, ScriptReport, Step};
pub use spool::{DirectoryInpaintService, FileImageProvider};

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use maskpaint_core::{EditorConfig, PaintMode};
use maskpaint_renderer::{PngCompression, PreviewConfig};

/// Paint mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Paint areas to regenerate.
    Remove,
    /// Erase previously painted areas.
    Restore,
}

impl From<ModeArg> for PaintMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Remove => Self::Remove,
            ModeArg::Restore => Self::Restore,
        }
    }
}

/// PNG compression as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    /// Fastest encoding.
    Fast,
    /// Balanced.
    Default,
    /// Smallest output.
    Best,
}

impl From<CompressionArg> for PngCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Fast => Self::Fast,
            CompressionArg::Default => Self::Default,
            CompressionArg::Best => Self::Best,
        }
    }
}

/// Command-line arguments for maskpaint.
#[derive(Debug, Clone, Parser)]
#[command(name = "maskpaint")]
#[command(about = "Replay mask strokes over an image and spool inpainting requests")]
#[command(version)]
pub struct CliArgs {
    /// Source image: a file path, `file://` URL or `data:` URI
    #[arg(long, env = "MASKPAINT_INPUT")]
    pub input: String,

    /// JSON script of editor actions to replay
    #[arg(long, env = "MASKPAINT_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Directory for the preview and spooled submissions
    #[arg(long, env = "MASKPAINT_OUTPUT", default_value = "maskpaint-out")]
    pub output: PathBuf,

    /// Cover identifier passed along with each submission
    #[arg(long, env = "MASKPAINT_COVER_ID", default_value = "cover")]
    pub cover_id: String,

    /// Container content width in CSS pixels
    #[arg(long, default_value = "900")]
    pub container_width: f32,

    /// Device pixel ratio of the display
    #[arg(long, default_value = "1")]
    pub device_pixel_ratio: f32,

    /// Initial brush diameter in display pixels
    #[arg(long, default_value = "40")]
    pub brush_size: f32,

    /// Initial paint mode
    #[arg(long, value_enum, default_value = "remove")]
    pub mode: ModeArg,

    /// PNG compression for exported images
    #[arg(long, value_enum, default_value = "default")]
    pub compression: CompressionArg,
}

/// Resolved configuration for a headless run.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Source image location.
    pub input: String,
    /// Optional script to replay.
    pub script: Option<PathBuf>,
    /// Output directory.
    pub output: PathBuf,
    /// Cover identifier for submissions.
    pub cover_id: String,
    /// Container content width in CSS pixels.
    pub container_width: f32,
    /// Device pixel ratio.
    pub device_pixel_ratio: f32,
    /// Editor configuration.
    pub editor: EditorConfig,
    /// Preview configuration.
    pub preview: PreviewConfig,
    /// PNG compression for exports.
    pub compression: PngCompression,
}

impl StudioConfig {
    /// Path of the rendered preview.
    #[must_use]
    pub fn preview_path(&self) -> PathBuf {
        self.output.join("preview.png")
    }
}

impl From<CliArgs> for StudioConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            input: args.input,
            script: args.script,
            output: args.output,
            cover_id: args.cover_id,
            container_width: args.container_width,
            device_pixel_ratio: args.device_pixel_ratio,
            editor: EditorConfig {
                brush_size: args.brush_size,
                mode: args.mode.into(),
                ..EditorConfig::default()
            },
            preview: PreviewConfig::default(),
            compression: args.compression.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_args() {
        let args = CliArgs::try_parse_from(["maskpaint", "--input", "cover.png"]).expect("parse");
        let config = StudioConfig::from(args);

        assert_eq!(config.input, "cover.png");
        assert!(config.script.is_none());
        assert!((config.container_width - 900.0).abs() < f32::EPSILON);
        assert!((config.device_pixel_ratio - 1.0).abs() < f32::EPSILON);
        assert!((config.editor.brush_size - 40.0).abs() < f32::EPSILON);
        assert_eq!(config.editor.mode, PaintMode::Remove);
        assert_eq!(config.compression, PngCompression::Default);
        assert_eq!(config.preview_path(), PathBuf::from("maskpaint-out/preview.png"));
    }

    #[test]
    fn test_explicit_args() {
        let args = CliArgs::try_parse_from([
            "maskpaint",
            "--input",
            "cover.png",
            "--script",
            "strokes.json",
            "--output",
            "/tmp/out",
            "--cover-id",
            "abc",
            "--container-width",
            "480",
            "--device-pixel-ratio",
            "2",
            "--brush-size",
            "90",
            "--mode",
            "restore",
            "--compression",
            "best",
        ])
        .expect("parse");
        let config = StudioConfig::from(args);

        assert_eq!(config.script, Some(PathBuf::from("strokes.json")));
        assert_eq!(config.cover_id, "abc");
        assert!((config.container_width - 480.0).abs() < f32::EPSILON);
        assert!((config.device_pixel_ratio - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.editor.mode, PaintMode::Restore);
        assert_eq!(config.compression, PngCompression::Best);
    }

    #[test]
    fn test_input_is_required() {
        assert!(CliArgs::try_parse_from(["maskpaint"]).is_err());
    }
}
