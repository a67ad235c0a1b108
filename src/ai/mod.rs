//! All AI/LLM functionality

pub mod client;
pub mod prompt_builder;
pub mod schema;

// Re-export main types for convenience
pub use client::{GeminiClient, estimate_tokens};
pub use prompt_builder::SummaryPrompt;
