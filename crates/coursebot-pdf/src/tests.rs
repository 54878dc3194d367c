//! Tests for page extraction, ingestion and citation rendering

#[cfg(test)]
mod pdf_tests {
    use crate::{
        extract_page, html_report, page_count, page_text, write_text_pdf, CitationRenderer,
        PdfDirectoryReader,
    };
    use coursebot_core::{
        DocumentMetadata, DocumentProvider, Error, RetrievalResult, SourceSnippet,
    };
    use insta::assert_yaml_snapshot;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const LECTURE_PAGES: [&str; 3] = [
        "Ecosystem ecology studies energy flow",
        "The IPAT equation describes human impact",
        "Biomes and climate zones",
    ];

    fn write_lecture(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("lecture1.pdf");
        write_text_pdf(&path, &LECTURE_PAGES).unwrap();
        path
    }

    #[test]
    fn test_extract_page_returns_single_matching_page() {
        let dir = tempdir().unwrap();
        let path = write_lecture(dir.path());

        for (i, expected) in LECTURE_PAGES.iter().enumerate() {
            let bytes = extract_page(&path, i as u32 + 1).unwrap();
            assert!(bytes.starts_with(b"%PDF"));

            let single = dir.path().join(format!("page{}.pdf", i + 1));
            fs::write(&single, &bytes).unwrap();
            assert_eq!(page_count(&single).unwrap(), 1);

            let text = page_text(&bytes, 1).unwrap();
            assert!(text.contains(expected), "page {} text was {:?}", i + 1, text);
        }
    }

    #[test]
    fn test_extract_page_out_of_range() {
        let dir = tempdir().unwrap();
        let path = write_lecture(dir.path());

        match extract_page(&path, 0) {
            Err(Error::OutOfRange { page, page_count }) => {
                assert_eq!(page, 0);
                assert_eq!(page_count, 3);
            }
            other => panic!("expected OutOfRange, got {:?}", other.map(|b| b.len())),
        }
        assert!(matches!(extract_page(&path, 4), Err(Error::OutOfRange { page: 4, .. })));
    }

    #[test]
    fn test_extract_page_missing_file() {
        let dir = tempdir().unwrap();
        let result = extract_page(&dir.path().join("missing.pdf"), 1);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_extract_page_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"this is not a pdf").unwrap();

        assert!(matches!(extract_page(&path, 1), Err(Error::CorruptDocument { .. })));
    }

    #[test]
    fn test_reader_yields_one_document_per_page() {
        let dir = tempdir().unwrap();
        write_lecture(dir.path());
        fs::write(dir.path().join("notes.txt"), "Office hours   on Friday").unwrap();
        fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();

        let documents = PdfDirectoryReader::new().load_documents(dir.path()).unwrap();
        assert_eq!(documents.len(), 4);

        let labels: Vec<(String, u32)> = documents
            .iter()
            .map(|d| (d.metadata.file_name.clone(), d.metadata.page_label))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("lecture1.pdf".to_string(), 1),
                ("lecture1.pdf".to_string(), 2),
                ("lecture1.pdf".to_string(), 3),
                ("notes.txt".to_string(), 1),
            ]
        );
        assert!(documents[1].text.contains("IPAT"));
        assert_eq!(documents[3].text, "Office hours on Friday");
    }

    #[test]
    fn test_reader_fails_fast_on_corrupt_pdf() {
        let dir = tempdir().unwrap();
        write_lecture(dir.path());
        fs::write(dir.path().join("zz_broken.pdf"), b"garbage").unwrap();

        let result = PdfDirectoryReader::new().load_documents(dir.path());
        assert!(matches!(result, Err(Error::CorruptDocument { .. })));
    }

    #[test]
    fn test_reader_missing_directory() {
        let dir = tempdir().unwrap();
        let result = PdfDirectoryReader::new().load_documents(&dir.path().join("lectures"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_render_embeds_cited_page() {
        let dir = tempdir().unwrap();
        write_lecture(dir.path());

        let snippet = SourceSnippet {
            text: LECTURE_PAGES[1].to_string(),
            score: 0.82,
            metadata: DocumentMetadata::new("lecture1.pdf", 2, dir.path().display().to_string()),
        };

        let view = CitationRenderer::new().render(&snippet);
        assert!(view.has_preview());
        assert!(view.error.is_none());

        let bytes = view.pdf_bytes.as_ref().unwrap();
        assert!(page_text(bytes, 1).unwrap().contains("IPAT"));

        let embed = view.embed_html().unwrap();
        assert!(embed.starts_with(r#"<embed src="data:application/pdf;base64,"#));
        assert!(embed.contains(view.pdf_base64.as_ref().unwrap()));
        assert!(embed.ends_with(r#"#page=1" width="700" height="500" type="application/pdf">"#));
    }

    #[test]
    fn test_render_degrades_for_deleted_file() {
        let snippet = SourceSnippet {
            text: "Grading policy".to_string(),
            score: 0.5,
            metadata: DocumentMetadata::new("syllabus.pdf", 2, "courses/ENST100/syllabus/"),
        };

        let view = CitationRenderer::new().render(&snippet);
        assert!(view.pdf_bytes.is_none());
        assert!(view.embed_html().is_none());
        assert!(view.error.as_ref().unwrap().starts_with("Not found"));

        assert_yaml_snapshot!(view.metadata, @r###"
        file_name: syllabus.pdf
        page_label: 2
        path: courses/ENST100/syllabus/
        score: 0.5
        "###);
    }

    #[test]
    fn test_render_all_keeps_every_snippet() {
        let dir = tempdir().unwrap();
        write_lecture(dir.path());
        let path = dir.path().display().to_string();

        let result = RetrievalResult {
            answer: "Energy flows through ecosystems.".to_string(),
            sources: vec![
                SourceSnippet {
                    text: LECTURE_PAGES[0].to_string(),
                    score: 0.9,
                    metadata: DocumentMetadata::new("lecture1.pdf", 1, path.clone()),
                },
                SourceSnippet {
                    text: "stale".to_string(),
                    score: 0.4,
                    metadata: DocumentMetadata::new("lecture9.pdf", 1, path),
                },
            ],
            engine: "lectures".to_string(),
        };

        let views = CitationRenderer::new().render_all(&result);
        assert_eq!(views.len(), 2);
        assert!(views[0].has_preview());
        assert!(!views[1].has_preview());

        let html = html_report("What is <ecosystem> ecology?", &result, &views);
        assert!(html.contains("What is &lt;ecosystem&gt; ecology?"));
        assert!(html.contains("data:application/pdf;base64,"));
        assert!(html.contains("Preview unavailable"));
        assert!(html.contains("&quot;page_label&quot;: 1"));
    }
}
