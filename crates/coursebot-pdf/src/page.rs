//! Single-page extraction with lopdf

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use coursebot_core::{Error, Result};

/// Return the bytes of a PDF containing only page `page_number` (1-based) of
/// the file at `path`.
pub fn extract_page(path: &Path, page_number: u32) -> Result<Vec<u8>> {
    let mut doc = load(path)?;
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;

    if page_number == 0 || page_number > page_count {
        return Err(Error::OutOfRange {
            page: page_number,
            page_count,
        });
    }

    let others: Vec<u32> = pages
        .keys()
        .copied()
        .filter(|n| *n != page_number)
        .collect();
    doc.delete_pages(&others);
    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    debug!(
        path = %path.display(),
        page = page_number,
        bytes = bytes.len(),
        "Extracted single page"
    );

    Ok(bytes)
}

/// Number of pages in the PDF at `path`
pub fn page_count(path: &Path) -> Result<u32> {
    Ok(load(path)?.get_pages().len() as u32)
}

/// Text of page `page_number` (1-based) of an in-memory PDF
pub fn page_text(bytes: &[u8], page_number: u32) -> Result<String> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| corrupt(Path::new("<memory>"), e))?;
    let page_count = doc.get_pages().len() as u32;
    if page_number == 0 || page_number > page_count {
        return Err(Error::OutOfRange {
            page: page_number,
            page_count,
        });
    }
    doc.extract_text(&[page_number])
        .map_err(|e| corrupt(Path::new("<memory>"), e))
}

/// Write a plain text PDF with one page per entry of `pages`.
///
/// Each line of an entry becomes one line of Courier text on its page.
pub fn write_text_pdf(path: &Path, pages: &[&str]) -> Result<()> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![72.into(), 760.into()]),
        ];
        for line in text.lines() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| Error::Other(format!("Failed to encode page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read the whole file, then parse it from memory so the handle is closed
/// before any parsing error is reported.
pub(crate) fn load(path: &Path) -> Result<PdfDocument> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    PdfDocument::load_mem(&bytes).map_err(|e| corrupt(path, e))
}

fn corrupt(path: &Path, err: lopdf::Error) -> Error {
    Error::CorruptDocument {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
