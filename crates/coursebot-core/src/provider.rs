//! Document ingestion trait

use std::path::Path;

use crate::{Document, Result};

/// Loads the raw documents of a collection from a directory.
///
/// Any failure aborts the whole load; callers never see a partial set.
pub trait DocumentProvider: Send + Sync {
    fn load_documents(&self, dir: &Path) -> Result<Vec<Document>>;
}
