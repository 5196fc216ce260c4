//! Inference client for Kantodex.
//!
//! Wraps a single OpenAI-compatible endpoint behind the [`LanguageModel`]
//! trait, exposing a plain-completion call and a chat call with uniform
//! option defaults and strict response-text extraction.

pub mod client;
pub mod error;
pub mod types;

pub use client::{LanguageModel, LlmStats, OpenAiClient};
pub use error::LlmError;
pub use types::{ChatMessage, CompletionOptions, LlmResponse};
