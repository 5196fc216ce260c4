//! Error types for the conversational pipeline.
//!
//! Two failure classes surface to callers: a missing credential
//! (configuration) and an inference failure (upstream). Dataset absence and
//! correction failures are not errors; both resolve to first-class `Ok`
//! values further up the pipeline.

use kantodex_llm::LlmError;

/// Errors from the chat pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The inference backend holds no credential. Surfaced verbatim so the
    /// operator sees a configuration problem, not a generic failure.
    #[error("language model not initialized, set the OPENAI_API_KEY environment variable")]
    NotInitialized,

    /// The inference call backing an answer failed. Wrapped with context
    /// and propagated; the caller decides end-user visibility.
    #[error("failed to process query: {source}")]
    Query {
        #[source]
        source: LlmError,
    },
}
