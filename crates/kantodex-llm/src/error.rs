//! Error types for the inference client.

use thiserror::Error;

/// Errors from the inference backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The credential was absent at construction. Every call fails with
    /// this until the process is restarted with a key present.
    #[error("LLM not initialized. Please set the OPENAI_API_KEY environment variable")]
    NotInitialized,

    /// Transport-level failure (connect, timeout, TLS).
    #[error("LLM request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success HTTP status. The body is
    /// kept for operator logs, never shown to end users.
    #[error("LLM API error: status {status}")]
    Api { status: u16, body: String },

    /// The response envelope carried no extractable text. This is a
    /// protocol violation, not an empty answer.
    #[error("No valid response received from LLM: {0}")]
    MalformedResponse(String),
}
