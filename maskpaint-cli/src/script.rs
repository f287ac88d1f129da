//! Replayable editor scripts.
//!
//! A script is a JSON document with a list of steps:
//!
//! ```json
//! {
//!   "steps": [
//!     { "action": "resize", "width": 480, "device_pixel_ratio": 2 },
//!     { "action": "pointer", "phase": "down", "x": 120, "y": 80 },
//!     { "action": "pointer", "phase": "move", "x": 180, "y": 90 },
//!     { "action": "pointer", "phase": "up", "x": 180, "y": 90 },
//!     { "action": "submit" }
//!   ]
//! }
//! ```

use std::path::Path;

use maskpaint_core::{MaskError, PaintMode, PointerEvent};
use maskpaint_renderer::{EditorSession, InpaintService, RenderError, SubmitOutcome};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    /// The script is not valid JSON for the step format.
    #[error("failed to parse script: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_device_pixel_ratio() -> f32 {
    1.0
}

/// One editor action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// The container was resized.
    Resize {
        /// Content width in CSS pixels.
        width: f32,
        /// Device pixel ratio.
        #[serde(default = "default_device_pixel_ratio")]
        device_pixel_ratio: f32,
    },
    /// The surface moved within the viewport.
    Origin {
        /// Left edge in viewport pixels.
        left: f32,
        /// Top edge in viewport pixels.
        top: f32,
    },
    /// A pointer event.
    Pointer(PointerEvent),
    /// Switch paint mode.
    Mode {
        /// New mode.
        mode: PaintMode,
    },
    /// Change brush diameter.
    Brush {
        /// Diameter in display pixels.
        size: f32,
    },
    /// Clear the mask.
    Clear,
    /// Submit the mask.
    Submit,
}

/// A sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Steps in replay order.
    pub steps: Vec<Step>,
}

/// Summary of a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Steps that changed the mask.
    pub repaints: usize,
    /// Steps the editor refused (frozen or no source).
    pub rejected: usize,
    /// Outcome of each successful submission.
    pub submissions: Vec<SubmitOutcome>,
    /// Submissions that failed.
    pub failed_submissions: usize,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Json`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Replay every step against `session`.
    ///
    /// Refused steps and failed submissions are counted and logged; the
    /// replay continues with the next step.
    pub async fn run<S>(
        &self,
        session: &mut EditorSession,
        service: &S,
        cover_id: &str,
    ) -> ScriptReport
    where
        S: InpaintService + ?Sized,
    {
        let mut report = ScriptReport::default();

        for (index, step) in self.steps.iter().enumerate() {
            tracing::trace!("Step {}: {:?}", index, step);
            let result = match step {
                Step::Resize {
                    width,
                    device_pixel_ratio,
                } => {
                    session.resize_container(*width, *device_pixel_ratio);
                    continue;
                }
                Step::Origin { left, top } => {
                    session.set_surface_origin(*left, *top);
                    continue;
                }
                Step::Mode { mode } => {
                    session.set_mode(*mode);
                    continue;
                }
                Step::Brush { size } => {
                    session.set_brush_size(*size);
                    continue;
                }
                Step::Pointer(event) => session.handle_pointer(event),
                Step::Clear => session.clear(),
                Step::Submit => {
                    match session.submit(service, cover_id).await {
                        Ok(outcome) => report.submissions.push(outcome),
                        Err(e) => {
                            tracing::warn!("Step {}: submission failed: {}", index, e);
                            report.failed_submissions += 1;
                        }
                    }
                    continue;
                }
            };

            match result {
                Ok(outcome) if outcome.repaint => report.repaints += 1,
                Ok(_) => {}
                Err(RenderError::Core(
                    e @ (MaskError::InteractionFrozen | MaskError::SourceNotReady(_)),
                )) => {
                    tracing::debug!("Step {} refused: {}", index, e);
                    report.rejected += 1;
                }
                Err(e) => {
                    tracing::warn!("Step {} failed: {}", index, e);
                    report.rejected += 1;
                }
            }
        }

        report
    }
}
