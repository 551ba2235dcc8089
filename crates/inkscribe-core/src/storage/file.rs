//! File-based storage backend.

use super::{
    BoxFuture, Storage, StorageError, StorageResult, StoredDocument, DOC_EXTENSION,
};
use crate::document::Document;
use std::fs;
use std::path::PathBuf;

/// Stores documents as JSON files in a base directory, one file per id with
/// the reserved `.ink` extension.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at the given directory, creating it if
    /// needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// The file path for a document id, sanitized for the filesystem.
    fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.{}", safe_id, DOC_EXTENSION))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        let payload = StoredDocument::wrap(document);
        let json = match serde_json::to_string_pretty(&payload) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) })
            }
        };

        Box::pin(async move {
            fs::write(&path, json)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let path = self.document_path(id);
        let id_owned = id.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id_owned));
            }

            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

            let payload: StoredDocument = serde_json::from_str(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            if payload.version > super::STORAGE_VERSION {
                log::warn!(
                    "document {} has newer payload version {}",
                    id_owned,
                    payload.version
                );
            }
            Ok(payload.document)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == DOC_EXTENSION).unwrap_or(false) {
                    if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                        ids.push(name.to_string());
                    }
                }
            }
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SamplePoint;
    use crate::stroke::{Rgb, Stroke, Tool, ToolKind};
    use tempfile::tempdir;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    fn sample_document() -> Document {
        let mut doc = Document::new();
        let mut stroke = Stroke::new(
            Tool::new(ToolKind::Pen, Rgb::black(), 2.0),
            SamplePoint::plain(0.0, 0.0),
        );
        stroke.add_point(SamplePoint::plain(10.0, 10.0));
        doc.add_stroke(stroke);
        doc
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = sample_document();

        block_on(storage.save("note-1", &doc)).unwrap();
        let loaded = block_on(storage.load("note-1")).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_load_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("missing"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_only_reserved_extension() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let doc = Document::new();
        block_on(storage.save("a", &doc)).unwrap();
        block_on(storage.save("b", &doc)).unwrap();
        std::fs::write(dir.path().join("stray.txt"), "junk").unwrap();

        let mut list = block_on(storage.list()).unwrap();
        list.sort();
        assert_eq!(list, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("gone", &Document::new())).unwrap();
        assert!(block_on(storage.exists("gone")).unwrap());

        block_on(storage.delete("gone")).unwrap();
        assert!(!block_on(storage.exists("gone")).unwrap());
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = sample_document();

        block_on(storage.save("notes/math:chapter*2", &doc)).unwrap();
        let loaded = block_on(storage.load("notes/math:chapter*2")).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_payload_carries_version_tag() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("tagged", &Document::new())).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("tagged.ink")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["saved_at_ms"].is_u64());
    }
}
