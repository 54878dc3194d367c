//! Directory reader turning course PDFs into per-page documents

use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use coursebot_core::{Document, DocumentMetadata, DocumentProvider, Error, Result};

use crate::page::load;

/// Reads every PDF (and plain text file) directly inside a directory.
///
/// PDFs yield one document per non-empty page with `page_label` set to the
/// 1-based page number. Text and markdown files yield a single document with
/// `page_label` 1. Files are visited in file-name order.
#[derive(Debug, Clone, Default)]
pub struct PdfDirectoryReader;

impl PdfDirectoryReader {
    pub fn new() -> Self {
        Self
    }

    fn read_pdf(&self, path: &Path, file_name: &str, dir: &str) -> Result<Vec<Document>> {
        let doc = load(path)?;
        let pages = doc.get_pages();
        debug!(file = file_name, page_count = pages.len(), "Reading PDF");

        page_documents(path, file_name, dir, pages.keys().copied(), |page_number| {
            doc.extract_text(&[page_number]).map_err(|e| e.to_string())
        })
    }

    fn read_text(&self, path: &Path, file_name: &str, dir: &str) -> Result<Vec<Document>> {
        let text = clean_text(&fs::read_to_string(path)?);
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Document::new(text, DocumentMetadata::new(file_name, 1, dir))])
    }
}

impl DocumentProvider for PdfDirectoryReader {
    fn load_documents(&self, dir: &Path) -> Result<Vec<Document>> {
        if !dir.is_dir() {
            return Err(Error::NotFound(dir.display().to_string()));
        }

        let dir_label = dir.display().to_string();
        let mut documents = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().to_string();
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .unwrap_or_default();

            let mut loaded = match extension.as_str() {
                "pdf" => self.read_pdf(path, &file_name, &dir_label)?,
                "txt" | "md" => self.read_text(path, &file_name, &dir_label)?,
                _ => {
                    debug!(file = %file_name, "Ignoring unsupported file");
                    continue;
                }
            };
            documents.append(&mut loaded);
        }

        info!(dir = %dir_label, documents = documents.len(), "Loaded documents");
        Ok(documents)
    }
}

/// One document per non-empty page. A page whose text cannot be extracted
/// fails the whole file.
fn page_documents<F>(
    path: &Path,
    file_name: &str,
    dir: &str,
    page_numbers: impl IntoIterator<Item = u32>,
    mut extract: F,
) -> Result<Vec<Document>>
where
    F: FnMut(u32) -> std::result::Result<String, String>,
{
    let mut documents = Vec::new();
    for page_number in page_numbers {
        let text = extract(page_number).map_err(|message| Error::CorruptDocument {
            path: path.display().to_string(),
            message: format!("page {}: {}", page_number, message),
        })?;

        let text = clean_text(&text);
        if text.is_empty() {
            debug!(file = file_name, page = page_number, "Skipping empty page");
            continue;
        }

        documents.push(Document::new(
            text,
            DocumentMetadata::new(file_name, page_number, dir),
        ));
    }
    Ok(documents)
}

/// Collapse whitespace runs left over from content stream extraction
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
