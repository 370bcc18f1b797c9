//! LLM backend implementations.
//!
//! Every backend exposes the same `invoke(system, user)` call, so callers
//! never care which provider is configured. The provider is picked once, at
//! construction, by [`create_backend`].

pub mod anthropic;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{Config, Provider};
use crate::error::{Error, Result};

/// A chat-style LLM that turns a system and user prompt into text.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Provider name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Send one prompt pair and wait for the complete response.
    async fn invoke(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Create the backend named by `config.provider`.
pub fn create_backend(config: &Config) -> Result<Box<dyn Backend>> {
    let provider = config.provider()?;
    debug!("Creating {} backend for model {}", provider, config.model);

    let backend: Box<dyn Backend> = match provider {
        Provider::Ollama => Box::new(ollama::OllamaBackend::new(
            config.model.clone(),
            config.endpoint_url.clone(),
            config.temperature,
        )?),
        Provider::OpenAI => {
            let mut backend = openai::OpenAIBackend::new(
                config.model.clone(),
                config.temperature,
                resolve_api_key(config.api_key.as_deref(), "OpenAI", openai::API_KEY_ENV)?,
            )?;
            if let Some(base_url) = &config.api_base_url {
                backend = backend.with_base_url(base_url.as_str());
            }
            Box::new(backend)
        }
        Provider::Anthropic => {
            let mut backend = anthropic::AnthropicBackend::new(
                config.model.clone(),
                config.temperature,
                resolve_api_key(config.api_key.as_deref(), "Anthropic", anthropic::API_KEY_ENV)?,
            )?;
            if let Some(base_url) = &config.api_base_url {
                backend = backend.with_base_url(base_url.as_str());
            }
            Box::new(backend)
        }
    };
    Ok(backend)
}

/// Take the API key from config, else from the provider's env var.
fn resolve_api_key(
    configured: Option<&str>,
    provider: &'static str,
    env_var: &'static str,
) -> Result<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.is_empty())
        .ok_or(Error::MissingApiKey { provider, env_var })
}
