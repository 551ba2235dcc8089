//! inkscribe recognition library
//!
//! The handwriting recognition pipeline: the external OCR collaborator
//! contract, the silent debounced auto-conversion path, and on-demand
//! full-canvas recognition.

pub mod auto_convert;
pub mod engine;
pub mod full_canvas;

pub use auto_convert::{AutoConverter, MIN_CONFIDENCE, REGION_PADDING};
pub use engine::{
    BoxFuture, RecognitionEngine, RecognitionService, RegionText, Word, WordBox,
};
pub use full_canvas::{recognize_canvas, MIN_WORD_CONFIDENCE};

use inkscribe_render::RenderError;
use thiserror::Error;

/// Recognition pipeline errors.
///
/// These never escape to the host through the advisory paths; the pipeline
/// logs and degrades to "no conversion" instead.
#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("Recognition engine failed: {0}")]
    Engine(String),
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
}
