//! Ollama backend implementation.
//!
//! Ollama's `/api/generate` endpoint takes a single prompt string, so the
//! system and user messages are flattened into one block before sending.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::Backend;
use crate::error::{Error, Result};

const PROVIDER: &str = "Ollama";

/// Request timeout for local generation.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Returned when the daemon's reply carries no `response` field.
pub const NO_RESPONSE: &str = "No response from Ollama";

/// Ollama backend for local LLM inference.
pub struct OllamaBackend {
    pub model: String,
    host: String,
    temperature: f32,
    client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    pub fn new(model: String, host: String, temperature: f32) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            model,
            host,
            temperature,
            client,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.host.trim_end_matches('/'))
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn invoke(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = self.generate_url();
        debug!("POST {} (model {})", url, self.model);

        let request = OllamaRequest {
            model: &self.model,
            prompt: flatten_prompt(system_prompt, user_prompt),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::Connection {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                provider: PROVIDER,
                status,
                message,
            });
        }

        let ollama_response: OllamaResponse =
            response.json().await.map_err(|source| Error::Decode {
                provider: PROVIDER,
                source,
            })?;

        Ok(ollama_response
            .response
            .unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

/// Fold the role-tagged messages into Ollama's single prompt string.
fn flatten_prompt(system_prompt: &str, user_prompt: &str) -> String {
    format!("System: {}\n\nUser: {}\n\n", system_prompt, user_prompt)
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: Option<String>,
}
