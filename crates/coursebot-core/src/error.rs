//! Error types for coursebot

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the coursebot system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    OutOfRange { page: u32, page_count: u32 },

    #[error("Corrupt document {path}: {message}")]
    CorruptDocument { path: String, message: String },

    #[error("Invalid index kind: {0}")]
    InvalidKind(String),

    #[error("Selection ambiguous: {0}")]
    SelectionAmbiguous(String),

    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
