//! OpenAI-compatible HTTP client behind the [`LanguageModel`] trait.
//!
//! The client is constructed with an optional credential. Without one it
//! stays uninitialized: every call returns [`LlmError::NotInitialized`]
//! instead of silently producing empty text, and the process keeps running.
//! No retries are performed; a failed call fails the whole request.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use kantodex_core::config::LlmConfig;

use crate::error::LlmError;
use crate::types::{ChatMessage, CompletionOptions, LlmResponse};

/// Environment variable holding the inference credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Abstraction over the inference backend.
///
/// Production code uses [`OpenAiClient`]; tests substitute a scripted fake.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Whether the backend holds a credential and can serve calls.
    fn is_initialized(&self) -> bool;

    /// Run a plain completion over a composed prompt.
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<LlmResponse, LlmError>;

    /// Run a chat completion over a messages array.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<LlmResponse, LlmError>;
}

/// Read-only introspection of the client state.
#[derive(Debug, Clone, Serialize)]
pub struct LlmStats {
    pub initialized: bool,
    pub model: String,
}

struct Inner {
    http: reqwest::Client,
    api_key: String,
}

/// HTTP client for an OpenAI-compatible completions API.
pub struct OpenAiClient {
    inner: Option<Inner>,
    config: LlmConfig,
}

impl OpenAiClient {
    /// Create a client from a config and an optional credential.
    ///
    /// An absent or empty credential leaves the client uninitialized. This
    /// is deliberate: a missing key disables LLM-backed features without
    /// taking the process down.
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Self {
        let key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let inner = match key {
            Some(api_key) => {
                let builder =
                    reqwest::Client::builder().timeout(Duration::from_millis(config.timeout_ms));
                match builder.build() {
                    Ok(http) => {
                        info!(model = %config.model, "LLM client initialized");
                        Some(Inner { http, api_key })
                    }
                    Err(e) => {
                        error!("Failed to build LLM http client: {}", e);
                        None
                    }
                }
            }
            None => {
                warn!(
                    "{} not set. LLM-backed features are disabled until a key is provided",
                    API_KEY_ENV
                );
                None
            }
        };

        Self { inner, config }
    }

    /// Create a client reading the credential from the environment.
    pub fn from_env(config: LlmConfig) -> Self {
        let api_key = std::env::var(API_KEY_ENV).ok();
        Self::new(config, api_key)
    }

    /// Service statistics for health reporting.
    pub fn stats(&self) -> LlmStats {
        LlmStats {
            initialized: self.is_initialized(),
            model: if self.is_initialized() {
                self.config.model.clone()
            } else {
                "none".to_string()
            },
        }
    }

    fn inner(&self) -> Result<&Inner, LlmError> {
        self.inner.as_ref().ok_or(LlmError::NotInitialized)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, LlmError> {
        let inner = self.inner()?;
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        let response = inner
            .http
            .post(&url)
            .bearer_auth(&inner.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %body, "LLM API returned an error status");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))
    }

    fn resolved(&self, options: &CompletionOptions) -> (u32, f32) {
        (
            options.max_tokens.unwrap_or(self.config.max_tokens),
            options.temperature.unwrap_or(self.config.temperature),
        )
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<LlmResponse, LlmError> {
        let (max_tokens, temperature) = self.resolved(options);
        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let envelope: CompletionEnvelope = self.post("/completions", &body).await?;
        let choice = envelope.choices.into_iter().next().ok_or_else(|| {
            LlmError::MalformedResponse("completion response contained no choices".to_string())
        })?;
        Ok(LlmResponse::Text { text: choice.text })
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<LlmResponse, LlmError> {
        let (max_tokens, temperature) = self.resolved(options);
        let body = json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let envelope: ChatEnvelope = self.post("/chat/completions", &body).await?;
        let choice = envelope.choices.into_iter().next().ok_or_else(|| {
            LlmError::MalformedResponse("chat response contained no choices".to_string())
        })?;
        Ok(LlmResponse::Chat {
            message: choice.message,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

// =============================================================================
// Tests
// =============================================================================
