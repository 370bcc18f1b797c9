//! OpenAI backend implementation.
//!
//! Uses the chat completions API with a system and a user message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::Backend;
use crate::error::{Error, Result};

const PROVIDER: &str = "OpenAI";
const OPENAI_API_BASE: &str = "https://api.openai.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI backend for GPT models.
pub struct OpenAIBackend {
    pub model: String,
    temperature: f32,
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend.
    pub fn new(model: String, temperature: f32, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            model,
            temperature,
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
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
impl Backend for OpenAIBackend {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn invoke(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("POST {} (model {})", url, self.model);

        let request = OpenAIRequest {
            model: &self.model,
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: system_prompt,
                },
                OpenAIMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::Connection {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body: std::result::Result<OpenAIError, _> = response.json().await;
            let message = body
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Status {
                provider: PROVIDER,
                status,
                message,
            });
        }

        let openai_response: OpenAIResponse =
            response.json().await.map_err(|source| Error::Decode {
                provider: PROVIDER,
                source,
            })?;

        openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(Error::EmptyResponse(PROVIDER))
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}
