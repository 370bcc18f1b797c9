//! Anthropic Claude backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::Backend;
use crate::error::{Error, Result};

const PROVIDER: &str = "Anthropic";
const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic backend for Claude models.
pub struct AnthropicBackend {
    pub model: String,
    temperature: f32,
    api_key: String,
    base_url: String,
    client: Client,
}

impl AnthropicBackend {
    /// Create a new Anthropic backend.
    pub fn new(model: String, temperature: f32, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            model,
            temperature,
            api_key,
            base_url: ANTHROPIC_API_BASE.to_string(),
            client,
        })
    }

    /// Point the backend at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Backend for AnthropicBackend {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn invoke(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        debug!("POST {} (model {})", url, self.model);

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: system_prompt,
            messages: vec![AnthropicMessage {
                role: "user",
                content: user_prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::Connection {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body: std::result::Result<AnthropicError, _> = response.json().await;
            let message = body
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Status {
                provider: PROVIDER,
                status,
                message,
            });
        }

        let anthropic_response: AnthropicResponse =
            response.json().await.map_err(|source| Error::Decode {
                provider: PROVIDER,
                source,
            })?;

        anthropic_response
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(Error::EmptyResponse(PROVIDER))
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}
