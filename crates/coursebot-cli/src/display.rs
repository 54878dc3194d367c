//! Printing answers and citations

use colored::*;
use coursebot_core::RetrievalResult;
use coursebot_pdf::CitationView;

/// Print the answer of `result`, then its citations
pub fn print_result(result: &RetrievalResult, views: &[CitationView]) {
    println!();
    println!("{} {}", "Response".bold(), format!("(via {})", result.engine).dimmed());
    println!("{}", result.answer);
    print_citations(views);
}

pub fn print_citations(views: &[CitationView]) {
    println!();
    println!("{}", "Sources".bold());

    if views.is_empty() {
        println!("  {}", "No sources returned".dimmed());
        return;
    }

    for (i, view) in views.iter().enumerate() {
        println!("{}", format_citation(i + 1, view));
        match &view.error {
            Some(error) => println!("     {} {}", "⚠️".yellow(), error.yellow()),
            None => println!(
                "     {} page preview ready ({} bytes)",
                "📄".green(),
                view.pdf_bytes.as_ref().map_or(0, |b| b.len())
            ),
        }
        println!("     {}", excerpt(&view.text, 160).dimmed());
    }
}

/// One-line header for a citation, without colors
pub fn format_citation(position: usize, view: &CitationView) -> String {
    format!(
        "  {}. {} p.{} (score {:.2})",
        position, view.metadata.file_name, view.metadata.page_label, view.metadata.score
    )
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
