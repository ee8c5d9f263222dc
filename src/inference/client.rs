//! Chat-completion client with bounded, jittered retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::errors::InferenceError;
use super::retry::RetryPolicy;
use super::transport::{HttpRequest, HttpTransport, Transport};
use super::{ChatCompletion, Message};
use crate::config::Settings;

/// OpenAI chat-completions URL.
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Request timeout for the default HTTP transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Where requests go and how they authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `Authorization: Bearer <key>`.
    OpenAi { api_key: String, url: String },
    /// `api-key: <key>` against a deployment URL.
    Azure { api_key: String, url: String },
}

impl Endpoint {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAi {
            api_key: api_key.into(),
            url: OPENAI_CHAT_URL.to_string(),
        }
    }

    pub fn azure(api_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Azure {
            api_key: api_key.into(),
            url: url.into(),
        }
    }

    /// OpenAI when its key is set, otherwise Azure when fully configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, InferenceError> {
        if let Some(key) = &settings.openai_api_key {
            return Ok(Self::openai(key.clone()));
        }
        match (&settings.azure_openai_api_key, &settings.azure_openai_endpoint) {
            (Some(key), Some(url)) => Ok(Self::azure(key.clone(), url.clone())),
            _ => Err(InferenceError::MissingCredentials(
                "OPENAI_API_KEY or AZURE_OPENAI_API_KEY/AZURE_OPENAI_ENDPOINT",
            )),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::OpenAi { url, .. } | Self::Azure { url, .. } => url,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let auth = match self {
            Self::OpenAi { api_key, .. } => ("Authorization".to_string(), format!("Bearer {}", api_key)),
            Self::Azure { api_key, .. } => ("api-key".to_string(), api_key.clone()),
        };
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            auth,
        ]
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat-completion client.
///
/// Retries transport errors and non-2xx statuses per its [`RetryPolicy`];
/// malformed bodies fail immediately. There is no cancellation beyond
/// dropping the returned future.
#[derive(Clone)]
pub struct InferenceClient {
    endpoint: Endpoint,
    model: String,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("url", &self.endpoint.url())
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish()
    }
}

impl InferenceClient {
    /// Client over the default `reqwest` transport.
    pub fn new(endpoint: Endpoint, model: impl Into<String>) -> Result<Self, InferenceError> {
        let transport = HttpTransport::new(REQUEST_TIMEOUT)?;
        Ok(Self::with_transport(endpoint, model, Arc::new(transport)))
    }

    pub fn with_transport(
        endpoint: Endpoint,
        model: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            endpoint,
            model: model.into(),
            retry: RetryPolicy::default(),
            transport,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, InferenceError> {
        Self::new(Endpoint::from_settings(settings)?, settings.model.clone())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The JSON body sent for `messages`.
    pub fn request_body(&self, messages: &[Message]) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
        })
    }

    fn build_request(&self, messages: &[Message]) -> HttpRequest {
        HttpRequest {
            url: self.endpoint.url().to_string(),
            headers: self.endpoint.headers(),
            body: self.request_body(messages),
        }
    }
}

#[async_trait]
impl ChatCompletion for InferenceClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, InferenceError> {
        let request = self.build_request(messages);
        log::debug!(
            "InferenceClient.complete: model={}, messages={}",
            self.model,
            messages.len()
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match self.transport.post_json(&request).await {
                Ok(body) => return parse_completion(&body),
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(error);
            }
            if !self.retry.should_retry(attempt) {
                log::error!(
                    "Chat completion failed after {} attempts: {}",
                    attempt,
                    error
                );
                return Err(InferenceError::Exhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.retry.delay_for(attempt, &mut rand::thread_rng());
            log::warn!(
                "Chat completion attempt {} failed ({}); retrying in {:?}",
                attempt,
                error,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Extract the trimmed completion text from a response body.
///
/// Reads `choices[0].message.content`, falling back to `choices[0].text`.
pub fn parse_completion(body: &Value) -> Result<String, InferenceError> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown API error");
        return Err(InferenceError::Malformed(message.to_string()));
    }

    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| InferenceError::Malformed("response has no choices".to_string()))?;

    choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .or_else(|| choice.get("text").and_then(Value::as_str))
        .map(|text| text.trim().to_string())
        .ok_or_else(|| InferenceError::Malformed("choice has no content".to_string()))
}
