//! Terminal interface for coursebot

mod display;
mod ui;


pub use display::{format_citation, print_citations, print_result};
pub use ui::{display_banner, handle_input_with_history, print_help};

// Re-export core types
pub use coursebot_core::{Error, Result};
