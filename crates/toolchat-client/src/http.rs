//! HTTP transport for the chat endpoint.

use std::time::Duration;

use tracing::debug;

use crate::error::ClientError;
use crate::protocol::ChatRequest;

/// Default server the client talks to.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default endpoint path of the chat route.
pub const DEFAULT_API_PATH: &str = "/api/chat-tools";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the chat endpoint lives.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub base_url: String,
    pub api: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api: DEFAULT_API_PATH.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn new(base_url: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api: api.into(),
        }
    }

    /// Full endpoint URL.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api.trim_start_matches('/')
        )
    }
}

/// Posts chat requests and hands back the streaming response.
#[derive(Debug, Clone)]
pub struct ChatTransport {
    inner: reqwest::Client,
    url: String,
}

impl ChatTransport {
    pub fn new(config: &ChatConfig) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            inner,
            url: config.endpoint(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the request and return the response once headers arrive.
    pub async fn open(&self, request: &ChatRequest<'_>) -> Result<reqwest::Response, ClientError> {
        debug!(url = %self.url, messages = request.messages.len(), "POST chat request");

        let response = self
            .inner
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}
