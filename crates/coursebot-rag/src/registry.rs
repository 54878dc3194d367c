//! Per-collection index registry with on-disk persistence

use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use coursebot_core::{DocumentProvider, Embedder, Error, IndexKind, Result};

use crate::index::{self, IndexHandle, StoredIndex, INDEX_FILE};

/// Builds, persists and memoizes the indices of one course.
///
/// Layout under the course directory:
///
/// ```text
/// <course>/<collection>/            source documents
/// <course>/indices/<collection>/    persisted index
/// ```
///
/// Handles are cached per `(collection, kind)` for the lifetime of the
/// registry. [`IndexRegistry::invalidate`] deletes the persisted directory and
/// evicts the cache so the next request rebuilds from the source documents.
pub struct IndexRegistry {
    course_dir: PathBuf,
    provider: Arc<dyn DocumentProvider>,
    embedder: Arc<dyn Embedder>,
    cache: Mutex<HashMap<(String, IndexKind), Arc<IndexHandle>>>,
}

impl IndexRegistry {
    pub fn new(
        course_dir: impl Into<PathBuf>,
        provider: Arc<dyn DocumentProvider>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            course_dir: course_dir.into(),
            provider,
            embedder,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn course_dir(&self) -> &Path {
        &self.course_dir
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Directory the source documents of `collection` are read from
    pub fn documents_dir(&self, collection: &str) -> PathBuf {
        self.course_dir.join(collection)
    }

    /// Directory the index of `collection` is persisted to
    pub fn index_dir(&self, collection: &str) -> PathBuf {
        self.course_dir.join("indices").join(collection)
    }

    pub fn is_persisted(&self, collection: &str) -> bool {
        self.index_dir(collection).join(INDEX_FILE).is_file()
    }

    /// Like [`IndexRegistry::get_or_build_index`] with the kind given by name.
    ///
    /// An unknown kind fails with [`Error::InvalidKind`] before anything is
    /// read or written.
    pub fn get_or_build_index_named(&self, collection: &str, kind: &str) -> Result<Arc<IndexHandle>> {
        let kind: IndexKind = kind.parse()?;
        self.get_or_build_index(collection, kind)
    }

    /// Return the index of `collection`, loading it from disk or building and
    /// persisting it on first use.
    pub fn get_or_build_index(&self, collection: &str, kind: IndexKind) -> Result<Arc<IndexHandle>> {
        validate_collection(collection)?;

        let key = (collection.to_string(), kind);
        let mut cache = self
            .cache
            .lock()
            .map_err(|e| Error::Other(format!("Lock error: {}", e)))?;

        if let Some(handle) = cache.get(&key) {
            debug!(collection, %kind, "Index cache hit");
            return Ok(handle.clone());
        }

        let index_dir = self.index_dir(collection);
        let handle = if self.is_persisted(collection) {
            let stored = index::load(&index_dir)?;
            if stored.index.kind() != kind {
                return Err(Error::InvalidKind(format!(
                    "collection '{}' is persisted as a {} index, requested {}",
                    collection,
                    stored.index.kind(),
                    kind
                )));
            }
            info!(
                collection,
                %kind,
                documents = stored.index.len(),
                built_at = %stored.built_at,
                "Loaded persisted index"
            );
            stored.index
        } else {
            self.build(collection, kind, &index_dir)?
        };

        let handle = Arc::new(handle);
        cache.insert(key, handle.clone());
        Ok(handle)
    }

    fn build(&self, collection: &str, kind: IndexKind, index_dir: &Path) -> Result<IndexHandle> {
        let documents_dir = self.documents_dir(collection);
        info!(collection, %kind, dir = %documents_dir.display(), "Building index");

        let stamp = documents_dir.display().to_string();
        let mut documents = self.provider.load_documents(&documents_dir)?;
        for document in &mut documents {
            document.metadata.path = stamp.clone();
        }

        let handle = IndexHandle::build(kind, documents, self.embedder.as_ref())?;
        let stored = StoredIndex {
            collection: collection.to_string(),
            built_at: Utc::now(),
            index: handle,
        };
        index::persist(index_dir, &stored)?;

        info!(collection, %kind, documents = stored.index.len(), "Persisted index");
        Ok(stored.index)
    }

    /// Delete the persisted index of `collection` and forget cached handles.
    ///
    /// Returns whether anything was on disk.
    pub fn invalidate(&self, collection: &str) -> Result<bool> {
        validate_collection(collection)?;

        let mut cache = self
            .cache
            .lock()
            .map_err(|e| Error::Other(format!("Lock error: {}", e)))?;
        cache.retain(|(name, _), _| name != collection);

        let index_dir = self.index_dir(collection);
        if index_dir.exists() {
            fs::remove_dir_all(&index_dir)?;
            info!(collection, "Invalidated index");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Collection names become directory names, so keep them to one plain component
fn validate_collection(collection: &str) -> Result<()> {
    let valid = !collection.is_empty()
        && collection != "."
        && collection != ".."
        && collection != "indices"
        && !collection.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("Invalid collection name '{}'", collection)))
    }
}
