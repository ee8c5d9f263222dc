//! Remote chat-completion inference.
//!
//! Messages go out as `{model, messages}` JSON; the completion text comes back
//! from `choices[0].message.content` (or `choices[0].text` for the legacy
//! completion shape). Transient failures are retried with randomized
//! exponential backoff; see [`retry::RetryPolicy`].

pub mod client;
pub mod errors;
pub mod retry;
pub mod transport;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{parse_completion, Endpoint, InferenceClient};
pub use errors::InferenceError;
pub use retry::RetryPolicy;
pub use transport::{HttpRequest, HttpTransport, Transport};

use crate::config::Settings;

/// System prompt used for plain question answering.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Speaker of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message. Identity is its position in the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Something that turns a message list into completion text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Completion text, trimmed, or the error that ended the last attempt.
    async fn complete(&self, messages: &[Message]) -> Result<String, InferenceError>;

    /// Like [`complete`](Self::complete), but a failure comes back as its
    /// error text in place of a completion.
    ///
    /// Callers cannot tell success from failure by type here. Kept for
    /// callers that relied on that behaviour; prefer `complete`.
    async fn complete_lossy(&self, messages: &[Message]) -> String {
        match self.complete(messages).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Unable to generate ChatCompletion response");
                log::error!("Exception: {}", e);
                e.to_string()
            }
        }
    }
}

/// Stand-in used when no endpoint is configured. Every call fails with
/// [`InferenceError::MissingCredentials`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl ChatCompletion for Unconfigured {
    async fn complete(&self, _messages: &[Message]) -> Result<String, InferenceError> {
        Err(InferenceError::MissingCredentials(
            "OPENAI_API_KEY or AZURE_OPENAI_API_KEY/AZURE_OPENAI_ENDPOINT",
        ))
    }
}

/// The configured chat-completion client, or [`Unconfigured`] when no
/// endpoint has credentials. Never fails; the problem is logged instead.
pub fn chat_from_settings(settings: &Settings) -> Arc<dyn ChatCompletion> {
    match InferenceClient::from_settings(settings) {
        Ok(client) => {
            log::info!("Using chat-completion endpoint {}", client.endpoint().url());
            Arc::new(client)
        }
        Err(e) => {
            log::error!("Chat completion disabled: {}", e);
            Arc::new(Unconfigured)
        }
    }
}

/// `[system, user]` request for a one-off question.
pub fn question_messages(question: &str) -> Vec<Message> {
    vec![
        Message::system(DEFAULT_SYSTEM_PROMPT),
        Message::user(question),
    ]
}
