//! Pokémon name correction for transcribed speech.
//!
//! Speech-to-text mangles Pokémon names ("pick a chew" for "pikachu").
//! Correction runs in two stages: a deterministic rule pass covering the
//! common mishearings, then an LLM verification pass for the long tail.
//! The rule pass is pure and total; the verification pass degrades to the
//! rule output on any failure and never blocks the query flow.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use kantodex_llm::{ChatMessage, CompletionOptions, LanguageModel, LlmError};

/// Output cap for the verification call; corrections are short.
const VERIFY_MAX_TOKENS: u32 = 100;

/// Rule table for the most common mishearings.
///
/// Case-insensitive, word-boundary anchored, applied in order. Replacements
/// are canonical spellings the same patterns do not match again, so the
/// pass is idempotent.
static CORRECTION_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\bmu\b", "mew"),
        (r"(?i)\bmew two\b", "mewtwo"),
        (r"(?i)\bpick a chew\b", "pikachu"),
        (r"(?i)\bchar man der\b", "charmander"),
        (r"(?i)\bsquirt el\b", "squirtle"),
        (r"(?i)\bbulb a saur\b", "bulbasaur"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("Invalid correction regex"),
            replacement,
        )
    })
    .collect()
});

/// Explanation prefixes models leak despite the no-prose instruction.
static CLEANUP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^I corrected .* to .*: ",
        r"(?i)^Based on the correction, ",
        r"(?i)^After correcting .* to .*, ",
        r"(?i)^The corrected text is: ",
        r"(?i)^Here's the corrected version: ",
        r"(?i)^I changed .* to .*: ",
        r"(?i)^Correction: ",
        r"(?i)^Fixed: ",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid cleanup regex"))
    .collect()
});

const CORRECTION_SYSTEM_PROMPT: &str = "\
You are a Pokemon name correction assistant. Your job is to identify and \
correct misheard Pokemon names in transcribed speech.

Common speech-to-text errors for Pokemon names:
- \"mu\" -> \"mew\"
- \"mew two\" -> \"mewtwo\"
- \"pick a chew\" -> \"pikachu\"
- \"char man der\" -> \"charmander\"
- \"squirt el\" -> \"squirtle\"
- \"bulb a saur\" -> \"bulbasaur\"
- And many other similar phonetic mishearings

Rules:
1. Only correct Pokemon names, leave all other words unchanged
2. Only correct if you're confident it's a Pokemon name
3. Return ONLY the corrected text with the same structure and capitalization
4. Do NOT include any explanations, comments, or mention of corrections
5. Do NOT say things like \"I corrected X to Y\" or \"based on the correction\"
6. If no Pokemon names need correction, return the original text unchanged
7. Your response should be the corrected text and nothing else

Examples:
Input: \"can mu learn tm01\"
Output: \"can mew learn tm01\"

Input: \"what are pick a chew stats\"
Output: \"what are pikachu stats\"

Input: \"how do I evolve char man der\"
Output: \"how do I evolve charmander\"";

/// Introspection of the corrector state.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectorStats {
    pub backend_initialized: bool,
    pub rule_count: usize,
}

/// Two-stage corrector for misheard Pokémon names.
pub struct NameCorrector {
    llm: Arc<dyn LanguageModel>,
}

impl NameCorrector {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Correct misheard names in `text`.
    ///
    /// Always returns usable text: the verified correction when the LLM
    /// pass succeeds and changes something, otherwise the rule-pass output.
    pub async fn correct(&self, text: &str) -> String {
        let pre_corrected = apply_rules(text);
        if pre_corrected != text {
            info!(
                "Rule correction: \"{}\" -> \"{}\"",
                text, pre_corrected
            );
        }

        match self.verify(&pre_corrected).await {
            Ok(Some(verified)) => {
                info!(
                    "LLM correction: \"{}\" -> \"{}\"",
                    pre_corrected, verified
                );
                verified
            }
            Ok(None) => pre_corrected,
            Err(e) => {
                debug!("Name verification pass failed: {}", e);
                pre_corrected
            }
        }
    }

    /// Service statistics for health reporting.
    pub fn stats(&self) -> CorrectorStats {
        CorrectorStats {
            backend_initialized: self.llm.is_initialized(),
            rule_count: CORRECTION_RULES.len(),
        }
    }

    /// Stage 2: ask the model to verify the pre-corrected text.
    ///
    /// `Ok(Some(_))` carries a cleaned result that differs from the input;
    /// `Ok(None)` means the model confirmed the input.
    async fn verify(&self, pre_corrected: &str) -> Result<Option<String>, LlmError> {
        let messages = vec![
            ChatMessage::system(CORRECTION_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Please correct any misheard Pokemon names in this transcribed text: \"{}\"",
                pre_corrected
            )),
        ];
        let options = CompletionOptions {
            max_tokens: Some(VERIFY_MAX_TOKENS),
            temperature: None,
        };

        let response = self.llm.chat(&messages, &options).await?;
        let text = response.extract_chat_text()?;
        let cleaned = strip_leaked_explanations(&text);

        if !cleaned.is_empty() && cleaned != pre_corrected {
            Ok(Some(cleaned))
        } else {
            Ok(None)
        }
    }
}

/// Stage 1: apply every correction rule in order. Pure and total.
pub fn apply_rules(text: &str) -> String {
    let mut corrected = text.to_string();
    for (pattern, replacement) in CORRECTION_RULES.iter() {
        corrected = pattern.replace_all(&corrected, *replacement).into_owned();
    }
    corrected
}

/// Strip known leaked-explanation prefixes from a model reply.
fn strip_leaked_explanations(text: &str) -> String {
    let mut cleaned = text.to_string();
    for pattern in CLEANUP_PATTERNS.iter() {
        cleaned = pattern.replace(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

// =============================================================================
// Tests
// =============================================================================
