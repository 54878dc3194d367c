//! Rendering retrieved snippets as citations

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use coursebot_core::{RetrievalResult, SourceSnippet};

use crate::page::extract_page;

const EMBED_WIDTH: u32 = 700;
const EMBED_HEIGHT: u32 = 500;

/// Provenance and score shown next to a citation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationMetadata {
    pub file_name: String,
    pub page_label: u32,
    pub path: String,
    pub score: f32,
}

/// A snippet ready for display: page preview plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CitationView {
    pub text: String,
    pub metadata: CitationMetadata,
    /// Single-page PDF holding the cited page, if it could be extracted
    pub pdf_bytes: Option<Vec<u8>>,
    pub pdf_base64: Option<String>,
    /// Why there is no preview
    pub error: Option<String>,
}

impl CitationView {
    pub fn has_preview(&self) -> bool {
        self.pdf_base64.is_some()
    }

    /// `<embed>` element showing the page, or `None` for metadata-only views
    pub fn embed_html(&self) -> Option<String> {
        self.pdf_base64.as_ref().map(|encoded| {
            format!(
                r#"<embed src="data:application/pdf;base64,{}#page=1" width="{}" height="{}" type="application/pdf">"#,
                encoded, EMBED_WIDTH, EMBED_HEIGHT
            )
        })
    }

    pub fn metadata_json(&self) -> Value {
        serde_json::to_value(&self.metadata).unwrap_or(Value::Null)
    }
}

/// Turns snippets into citation views.
///
/// Rendering never fails: a snippet whose source page cannot be extracted
/// becomes a metadata-only view so the rest of the answer still shows.
#[derive(Debug, Clone, Default)]
pub struct CitationRenderer;

impl CitationRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, snippet: &SourceSnippet) -> CitationView {
        let metadata = CitationMetadata {
            file_name: snippet.metadata.file_name.clone(),
            page_label: snippet.metadata.page_label,
            path: snippet.metadata.path.clone(),
            score: snippet.score,
        };

        let source = snippet.metadata.source_file();
        match extract_page(&source, snippet.metadata.page_label) {
            Ok(bytes) => {
                let encoded = STANDARD.encode(&bytes);
                CitationView {
                    text: snippet.text.clone(),
                    metadata,
                    pdf_bytes: Some(bytes),
                    pdf_base64: Some(encoded),
                    error: None,
                }
            }
            Err(e) => {
                warn!(
                    file = %source.display(),
                    page = snippet.metadata.page_label,
                    error = %e,
                    "Citation preview unavailable"
                );
                CitationView {
                    text: snippet.text.clone(),
                    metadata,
                    pdf_bytes: None,
                    pdf_base64: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn render_all(&self, result: &RetrievalResult) -> Vec<CitationView> {
        result.sources.iter().map(|snippet| self.render(snippet)).collect()
    }
}

/// Standalone HTML page with the answer and every citation
pub fn html_report(question: &str, result: &RetrievalResult, views: &[CitationView]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(question)));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(question)));
    html.push_str(&format!(
        "<p><em>Answered by the {} engine</em></p>\n",
        escape_html(&result.engine)
    ));
    html.push_str(&format!("<h2>Response</h2>\n<p>{}</p>\n", escape_html(&result.answer)));
    html.push_str("<h2>Sources</h2>\n");

    for (i, view) in views.iter().enumerate() {
        html.push_str(&format!(
            "<section>\n<h3>{}. {} (page {})</h3>\n",
            i + 1,
            escape_html(&view.metadata.file_name),
            view.metadata.page_label
        ));
        match (view.embed_html(), &view.error) {
            (Some(embed), _) => {
                html.push_str(&embed);
                html.push('\n');
            }
            (None, Some(error)) => {
                html.push_str(&format!(
                    "<p><strong>Preview unavailable:</strong> {}</p>\n",
                    escape_html(error)
                ));
            }
            (None, None) => {}
        }
        let metadata = serde_json::to_string_pretty(&view.metadata_json()).unwrap_or_default();
        html.push_str(&format!("<pre>{}</pre>\n", escape_html(&metadata)));
        html.push_str(&format!("<blockquote>{}</blockquote>\n</section>\n", escape_html(&view.text)));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
