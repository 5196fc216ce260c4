//! Request and response shapes for the inference backend.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// One role-tagged message in a chat request or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    /// Build a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Build a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Caller overrides for a single inference call.
///
/// Unset fields fall back to the client's configured defaults.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// The two response shapes the backend may return.
///
/// Plain completions carry a flat `text` field; chat completions carry a
/// nested message. Extraction normalizes both into a single trimmed string
/// and fails loudly when neither shape yields text.
#[derive(Debug, Clone)]
pub enum LlmResponse {
    Text { text: String },
    Chat { message: ChatMessage },
}

impl LlmResponse {
    /// Extract the response text, preferring the flat `text` shape.
    pub fn extract_text(&self) -> Result<String, LlmError> {
        match self {
            LlmResponse::Text { text } => non_empty(text),
            LlmResponse::Chat { message } => non_empty(&message.content),
        }
    }

    /// Extract the response text, preferring the chat message shape.
    pub fn extract_chat_text(&self) -> Result<String, LlmError> {
        match self {
            LlmResponse::Chat { message } => non_empty(&message.content),
            LlmResponse::Text { text } => non_empty(text),
        }
    }
}

fn non_empty(text: &str) -> Result<String, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(LlmError::MalformedResponse(
            "response contained no text".to_string(),
        ))
    } else {
        Ok(trimmed.to_string())
    }
}
