//! Grounded query processing.
//!
//! Composes the answer prompt in a fixed order (persona, dataset digest,
//! prior conversation, question) and returns the model's extracted text
//! unmodified. When no dataset is loaded the processor answers with a
//! fixed degraded response that still quotes the question.

use std::sync::Arc;

use kantodex_llm::{CompletionOptions, LanguageModel};

use crate::dataset::DatasetService;
use crate::error::ChatError;

const PERSONA: &str = "\
You are a helpful assistant that answers questions about Pokemon from \
Generation 1. You have access to comprehensive Pokemon data including:

- Pokemon base stats (HP, Attack, Defense, Special, Speed)
- Pokemon types
- Evolution information
- Level-up moves
- TM/HM compatibility
- Move information (power, PP, accuracy, priority, type, class)
- Which Pokemon can learn each move

IMPORTANT: When someone asks about a Pokemon's \"stats\", they are asking \
about the base stats (HP, Attack, Defense, Special, Speed), NOT move \
statistics.

RESPONSE GUIDELINES:
- Provide only factual information from the data
- Use clear, direct statements
- Avoid subjective opinions, recommendations, or commentary
- Do not include phrases like \"it's great\", \"it's useful\", \"you should\"
- Focus on the raw data and facts only
- Do not mention data sources, file names, or internal processes
- Answer naturally as if you just know this information

Here is the Pokemon data you have access to:";

/// Answers questions against the loaded dataset via the inference backend.
pub struct QueryProcessor {
    llm: Arc<dyn LanguageModel>,
    dataset: Arc<DatasetService>,
}

impl QueryProcessor {
    pub fn new(llm: Arc<dyn LanguageModel>, dataset: Arc<DatasetService>) -> Self {
        Self { llm, dataset }
    }

    /// Answer `query` with `session_context` as prior conversation.
    ///
    /// Fails with [`ChatError::NotInitialized`] before any network call
    /// when the backend holds no credential. Returns the degraded response
    /// as a successful value when no dataset is available.
    pub async fn process(&self, query: &str, session_context: &str) -> Result<String, ChatError> {
        if !self.llm.is_initialized() {
            return Err(ChatError::NotInitialized);
        }

        let Some(digest) = self.dataset.digest() else {
            return Ok(degraded_response(query, session_context));
        };

        let prompt = compose_prompt(digest, session_context, query);
        let response = self
            .llm
            .complete(&prompt, &CompletionOptions::default())
            .await
            .map_err(|source| ChatError::Query { source })?;

        // Answer fidelity is a contract: no post-processing beyond extraction
        response
            .extract_text()
            .map_err(|source| ChatError::Query { source })
    }
}

fn compose_prompt(digest: &str, session_context: &str, query: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(digest);
    prompt.push_str("\n\n");
    if !session_context.is_empty() {
        prompt.push_str("Previous conversation:\n");
        prompt.push_str(session_context);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Please answer the following question based on the data above: ");
    prompt.push_str(query);
    prompt
}

/// Fixed response when no dataset is available. Quotes the literal query
/// and acknowledges ongoing conversation when context exists.
fn degraded_response(query: &str, session_context: &str) -> String {
    if !session_context.is_empty() {
        format!(
            "I can see we've been chatting, but I don't have any Pokemon data loaded to \
             analyze. Please ensure CSV files are placed in the data directory. \
             Your question was: \"{}\"",
            query
        )
    } else {
        format!(
            "Hello! I'm a voice-activated Pokedex that can answer questions about \
             Generation 1 Pokemon. Please ensure CSV files are placed in the data \
             directory, and then I'll be able to answer your questions. \
             Your question was: \"{}\"",
            query
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
