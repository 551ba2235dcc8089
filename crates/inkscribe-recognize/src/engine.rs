//! The external recognition collaborator contract.

use crate::RecognizeError;
use std::future::Future;
use std::pin::Pin;

/// Boxed future for async recognition operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Region-level recognition output, as reported by the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionText {
    pub text: String,
    /// Collaborator confidence, 0–100.
    pub confidence: f64,
}

/// A word bounding box on the submitted image, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Word-level recognition output from full-canvas recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    /// Collaborator confidence, 0–100.
    pub confidence: f64,
    pub bounds: WordBox,
}

/// The black-box OCR collaborator.
///
/// Engines with expensive startup are opened once and reused across calls;
/// the pipeline drives the lifecycle explicitly instead of relying on
/// ambient global state. Calls may be slow internally, which is why the
/// auto-conversion path is debounced and batched.
pub trait RecognitionEngine: Send + Sync {
    /// Prepare the engine for recognition. Called once before the first use.
    fn open(&self) -> BoxFuture<'_, Result<(), RecognizeError>>;

    /// Release engine resources.
    fn close(&self) -> BoxFuture<'_, Result<(), RecognizeError>>;

    /// Recognize the text in a cropped stroke region (PNG bytes).
    fn recognize_region(&self, png: Vec<u8>) -> BoxFuture<'_, Result<RegionText, RecognizeError>>;

    /// Recognize every word on a full-canvas image (PNG bytes).
    fn recognize_full(&self, png: Vec<u8>) -> BoxFuture<'_, Result<Vec<Word>, RecognizeError>>;
}

/// Lazily-opened wrapper around an injected [`RecognitionEngine`].
pub struct RecognitionService {
    engine: Box<dyn RecognitionEngine>,
    opened: bool,
}

impl RecognitionService {
    pub fn new(engine: Box<dyn RecognitionEngine>) -> Self {
        Self {
            engine,
            opened: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    async fn ensure_open(&mut self) -> Result<(), RecognizeError> {
        if !self.opened {
            self.engine.open().await?;
            self.opened = true;
        }
        Ok(())
    }

    /// Recognize a region crop, opening the engine on first use.
    pub async fn recognize_region(&mut self, png: Vec<u8>) -> Result<RegionText, RecognizeError> {
        self.ensure_open().await?;
        self.engine.recognize_region(png).await
    }

    /// Recognize a full-canvas image, opening the engine on first use.
    pub async fn recognize_full(&mut self, png: Vec<u8>) -> Result<Vec<Word>, RecognizeError> {
        self.ensure_open().await?;
        self.engine.recognize_full(png).await
    }

    /// Shut the engine down. A later call reopens it.
    pub async fn close(&mut self) -> Result<(), RecognizeError> {
        if self.opened {
            self.engine.close().await?;
            self.opened = false;
        }
        Ok(())
    }
}
