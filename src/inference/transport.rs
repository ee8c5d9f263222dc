//! HTTP transport seam for the inference client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::errors::InferenceError;

/// A JSON POST request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// Sends one request and returns the decoded JSON body.
///
/// Implementations report connection failures as
/// [`InferenceError::Transport`] and non-2xx answers as
/// [`InferenceError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: &HttpRequest) -> Result<Value, InferenceError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: &HttpRequest) -> Result<Value, InferenceError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        log::debug!("Response status code: {}", status);

        let text = response.text().await?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(500).collect();
            InferenceError::Malformed(format!("{} - Body: {}", e, preview))
        })
    }
}
