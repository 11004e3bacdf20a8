use std::time::Duration;

use reqwest::blocking::Client;

use crate::types::{GenerationRequest, ResponseBody};
use crate::{Result, TextGenError};

// ─── TextGenerator ────────────────────────────────────────────────────────

/// A backend that turns a [`GenerationRequest`] into plain text.
///
/// Implemented by [`HttpTextGenerator`] for real endpoints; tests and callers
/// with canned output provide their own implementations.
pub trait TextGenerator: Send + Sync {
    /// Identifier of the model behind this generator, used in log lines.
    fn model_id(&self) -> &str;

    fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

// ─── ClientConfig ─────────────────────────────────────────────────────────

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for [`HttpTextGenerator`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL; requests go to `<endpoint>/model/<model_id>/invoke`.
    pub endpoint: String,
    pub model_id: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model_id: model_id.into(),
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

// ─── HttpTextGenerator ────────────────────────────────────────────────────

/// Blocking HTTP generator. A timeout surfaces as [`TextGenError::Http`] like
/// any other transport failure.
pub struct HttpTextGenerator {
    client: Client,
    url: String,
    model_id: String,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.model_id.trim().is_empty() {
            return Err(TextGenError::Config("model id is empty".into()));
        }
        if config.endpoint.trim().is_empty() {
            return Err(TextGenError::Config("endpoint is empty".into()));
        }
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(concat!("textgen-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let url = format!(
            "{}/model/{}/invoke",
            config.endpoint.trim_end_matches('/'),
            config.model_id
        );
        Ok(Self {
            client,
            url,
            model_id: config.model_id,
            api_key: config.api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TextGenerator for HttpTextGenerator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        tracing::debug!(
            url = %self.url,
            turns = request.conversation.len(),
            temperature = request.temperature,
            "invoking text-generation backend"
        );

        let mut builder = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request.to_wire());
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(TextGenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_text(&body)
    }
}

/// Read the generated text out of a raw response body.
pub fn extract_text(body: &str) -> Result<String> {
    let parsed: ResponseBody = serde_json::from_str(body).map_err(|e| {
        TextGenError::Unparseable(format!("{e}; body starts with {:?}", preview(body)))
    })?;
    Ok(parsed.text())
}

fn preview(body: &str) -> String {
    body.chars().take(80).collect()
}
