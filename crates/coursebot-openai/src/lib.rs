//! OpenAI-compatible chat client for coursebot
//!
//! This crate provides the implementation of the LLMProvider trait used for
//! answer synthesis, HyDE and engine selection.

mod client;
mod config;


pub use client::OpenAiClient;
pub use config::OpenAiConfig;

// Re-export core types for convenience
pub use coursebot_core::{Error, GenerationConfig, GenerationResult, LLMProvider, Result};
