//! inkscribe render library
//!
//! Deterministic CPU rasterization of drawing documents: full-document
//! redraw, region rasterization for recognition, converted-text glyph
//! painting, recognition-input preprocessing, and PNG export.

pub mod preprocess;
pub mod renderer;
pub mod text;

pub use renderer::Renderer;
pub use text::GlyphPainter;

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface dimensions: {0}x{1}")]
    InvalidSurface(u32, u32),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
