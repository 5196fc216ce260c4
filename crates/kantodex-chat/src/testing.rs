//! Scripted test double for the inference backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use kantodex_llm::{ChatMessage, CompletionOptions, LanguageModel, LlmError, LlmResponse};

/// In-memory fake backend with separate reply queues per call kind.
///
/// Records every completion prompt and chat batch it receives, and pops
/// queued replies in order. With an empty queue, `complete` returns a
/// canned answer and `chat` echoes the quoted text from the last user
/// message, behaving like an obedient correction model.
pub(crate) struct FakeModel {
    pub initialized: bool,
    pub completion_replies: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    pub chat_replies: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    pub prompts: Mutex<Vec<String>>,
    pub chats: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            initialized: true,
            completion_replies: Mutex::new(VecDeque::new()),
            chat_replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
        }
    }

    pub fn uninitialized() -> Self {
        Self {
            initialized: false,
            ..Self::new()
        }
    }

    /// Queue a plain-completion reply.
    pub fn push_text(&self, text: &str) {
        self.completion_replies
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::Text {
                text: text.to_string(),
            }));
    }

    /// Queue a plain-completion failure.
    pub fn push_completion_err(&self, err: LlmError) {
        self.completion_replies.lock().unwrap().push_back(Err(err));
    }

    /// Queue a chat reply.
    pub fn push_chat(&self, content: &str) {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::Chat {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: content.to_string(),
                },
            }));
    }

    /// Queue a chat failure.
    pub fn push_chat_err(&self, err: LlmError) {
        self.chat_replies.lock().unwrap().push_back(Err(err));
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    async fn complete(
        &self,
        prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<LlmResponse, LlmError> {
        if !self.initialized {
            return Err(LlmError::NotInitialized);
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.completion_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(LlmResponse::Text {
                    text: "canned answer".to_string(),
                })
            })
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<LlmResponse, LlmError> {
        if !self.initialized {
            return Err(LlmError::NotInitialized);
        }
        self.chats.lock().unwrap().push(messages.to_vec());
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
                Ok(LlmResponse::Chat {
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content: quoted_text(last).to_string(),
                    },
                })
            })
    }
}

/// Extract the text between the first and last double quote, if any.
fn quoted_text(content: &str) -> &str {
    match (content.find('"'), content.rfind('"')) {
        (Some(start), Some(end)) if end > start => &content[start + 1..end],
        _ => content,
    }
}
