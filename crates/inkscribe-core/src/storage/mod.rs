//! Persistence adapter for drawing documents.
//!
//! The engine calls these backends only at explicit lifecycle points
//! (document open, explicit save); it never auto-saves.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::document::Document;
use crate::stroke::now_ms;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Current on-disk payload version.
pub const STORAGE_VERSION: u32 = 1;

/// Reserved file extension for drawing documents.
pub const DOC_EXTENSION: &str = "ink";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// The serialized payload wrapping a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Informal schema version tag.
    pub version: u32,
    /// Save time, milliseconds since the Unix epoch.
    pub saved_at_ms: u64,
    /// The document itself (strokes + converted texts).
    #[serde(flatten)]
    pub document: Document,
}

impl StoredDocument {
    /// Wrap a document for persistence, stamping the save time.
    pub fn wrap(document: &Document) -> Self {
        Self {
            version: STORAGE_VERSION,
            saved_at_ms: now_ms(),
            document: document.clone(),
        }
    }
}

/// Trait for document storage backends.
pub trait Storage: Send + Sync {
    /// Save a document under an id.
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a document by id.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// Delete a document.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all document ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
