//! Snapshot tests for core types

#[cfg(test)]
mod snapshot_tests {
    use crate::{Document, DocumentMetadata, Error, IndexKind, RetrievalResult};
    use insta::assert_yaml_snapshot;
    use std::path::PathBuf;
    use std::str::FromStr;

    #[test]
    fn test_index_kind_parsing() {
        assert_eq!(IndexKind::from_str("list").unwrap(), IndexKind::List);
        assert_eq!(IndexKind::from_str(" Vector ").unwrap(), IndexKind::Vector);

        match IndexKind::from_str("bogus") {
            Err(Error::InvalidKind(kind)) => assert_eq!(kind, "bogus"),
            other => panic!("expected InvalidKind, got {:?}", other),
        }
    }

    #[test]
    fn test_index_kind_display_round_trips() {
        for kind in [IndexKind::List, IndexKind::Vector] {
            assert_eq!(IndexKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_source_file_joins_path_and_name() {
        let metadata = DocumentMetadata::new("syllabus.pdf", 1, "courses/ENST100/syllabus/");
        assert_eq!(
            metadata.source_file(),
            PathBuf::from("courses/ENST100/syllabus/syllabus.pdf")
        );
    }

    #[test]
    fn test_document_ids_are_stable() {
        let metadata = DocumentMetadata::new("lecture1.pdf", 3, "lectures");
        let a = Document::new("Ecosystem ecology", metadata.clone());
        let b = Document::new("Ecosystem ecology", metadata.clone());
        let c = Document::new("Population ecology", metadata);

        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_snippet_metadata_snapshot() {
        let document = Document::new(
            "Grading: exams 50%, projects 50%",
            DocumentMetadata::new("syllabus.pdf", 2, "courses/ENST100/syllabus/"),
        );
        let result = RetrievalResult {
            answer: "Exams and projects are weighted equally.".to_string(),
            sources: vec![document.to_snippet(0.75)],
            engine: "syllabus".to_string(),
        };

        assert_eq!(result.top_source().unwrap().metadata.page_label, 2);
        assert_yaml_snapshot!(result.sources[0].metadata, @r###"
        file_name: syllabus.pdf
        page_label: 2
        path: courses/ENST100/syllabus/
        "###);
    }
}
