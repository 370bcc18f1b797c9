//! Configuration management for devai.
//!
//! Configuration is loaded from `$AI_CONFIG_DIR/config.json` (default
//! `~/.config/dev-ai/config.json`). Values in the file override the defaults
//! key by key; the defaults are written out on first run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::Error;

pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_MODEL: &str = "llama3.1:8b";
const DEFAULT_PROVIDER: &str = "ollama";
const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Values provided by the environment at startup.
///
/// These only seed the first-run configuration; once a config file exists
/// its contents win.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Directory holding `config.json` (`AI_CONFIG_DIR`).
    pub config_dir: PathBuf,
    /// Workspace directory (`AI_WORKSPACE`).
    pub workspace: PathBuf,
    /// Default model name (`AI_MODEL`).
    pub default_model: String,
    /// Default provider name (`AI_PROVIDER`).
    pub default_provider: String,
}

impl Environment {
    /// Read the environment once.
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::from_lookup(&home, |key| std::env::var(key).ok()))
    }

    /// Build from an arbitrary variable lookup rooted at `home`.
    pub fn from_lookup<F>(home: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            config_dir: non_empty("AI_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".config").join("dev-ai")),
            workspace: non_empty("AI_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join("dev-ai")),
            default_model: non_empty("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            default_provider: non_empty("AI_PROVIDER")
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        }
    }

    /// Path of the config file.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

/// LLM providers devai knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Local Ollama daemon.
    Ollama,
    /// OpenAI chat completions.
    OpenAI,
    /// Anthropic messages API.
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(Error::UnknownProvider(other.to_string())),
        }
    }
}

/// The process-wide configuration record. Built once at startup, never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model name passed to the backend.
    pub model: String,
    /// Provider name; resolved with [`Config::provider`].
    pub provider: String,
    /// Base URL of the Ollama daemon. Ignored by hosted providers.
    pub endpoint_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// API key for hosted providers (prefer the provider's env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL override for hosted providers (proxies, gateways).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl Config {
    /// Defaults seeded from the environment.
    pub fn defaults(env: &Environment) -> Self {
        Self {
            model: env.default_model.clone(),
            provider: env.default_provider.clone(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            api_base_url: None,
        }
    }

    /// Load the config file, creating it with defaults when absent.
    ///
    /// A file that exists but cannot be read or parsed is left alone and the
    /// defaults are used for this run.
    pub fn load(env: &Environment) -> Result<Self> {
        let defaults = Self::defaults(env);
        let path = env.config_path();

        if !path.exists() {
            defaults.save(&path)?;
            info!("Created default config at {}", path.display());
            return Ok(defaults);
        }

        match Self::read_merged(&path, &defaults) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring unreadable config file: {:#}", e);
                Ok(defaults)
            }
        }
    }

    fn read_merged(path: &Path, defaults: &Self) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let user: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        defaults
            .merged_with(user)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Shallow-merge a user JSON object over these values.
    pub fn merged_with(&self, user: Value) -> Result<Self> {
        let Value::Object(mut overrides) = user else {
            anyhow::bail!("config must be a JSON object");
        };

        // Older config files call the endpoint `ollama_url`.
        if let Some(url) = overrides.remove("ollama_url") {
            overrides.entry("endpoint_url").or_insert(url);
        }

        let mut merged: Map<String, Value> = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in overrides {
            merged.insert(key, value);
        }

        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Resolve the provider name.
    pub fn provider(&self) -> std::result::Result<Provider, Error> {
        self.provider.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_env(dir: &Path) -> Environment {
        Environment {
            config_dir: dir.join("cfg"),
            workspace: dir.join("ws"),
            default_model: "llama3.1:8b".to_string(),
            default_provider: "ollama".to_string(),
        }
    }

    #[test]
    fn test_environment_defaults() {
        let env = Environment::from_lookup(Path::new("/home/dev"), |_| None);
        assert_eq!(env.config_dir, PathBuf::from("/home/dev/.config/dev-ai"));
        assert_eq!(env.workspace, PathBuf::from("/home/dev/dev-ai"));
        assert_eq!(env.default_model, "llama3.1:8b");
        assert_eq!(env.default_provider, "ollama");
    }

    #[test]
    fn test_environment_overrides() {
        let env = Environment::from_lookup(Path::new("/home/dev"), |key| match key {
            "AI_CONFIG_DIR" => Some("/etc/ai".to_string()),
            "AI_MODEL" => Some("qwen2.5-coder:7b".to_string()),
            "AI_PROVIDER" => Some("anthropic".to_string()),
            "AI_WORKSPACE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(env.config_path(), PathBuf::from("/etc/ai/config.json"));
        assert_eq!(env.default_model, "qwen2.5-coder:7b");
        assert_eq!(env.default_provider, "anthropic");
        assert_eq!(env.workspace, PathBuf::from("/home/dev/dev-ai"));
    }

    #[test]
    fn test_first_run_persists_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env = test_env(dir.path());

        let config = Config::load(&env).unwrap();
        assert_eq!(config, Config::defaults(&env));

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(env.config_path()).unwrap()).unwrap();
        assert_eq!(written["provider"], "ollama");
        assert_eq!(written["endpoint_url"], DEFAULT_ENDPOINT_URL);
        assert!(written.get("api_key").is_none());
        assert!(written.get("api_base_url").is_none());
    }

    #[test]
    fn test_shallow_merge() {
        let dir = tempfile::tempdir().unwrap();
        let env = test_env(dir.path());
        std::fs::create_dir_all(&env.config_dir).unwrap();
        std::fs::write(
            env.config_path(),
            r#"{"provider": "openai", "model": "gpt-4o-mini"}"#,
        )
        .unwrap();

        let config = Config::load(&env).unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_legacy_ollama_url_key() {
        let env = test_env(Path::new("/tmp"));
        let config = Config::defaults(&env)
            .merged_with(json!({"ollama_url": "http://gpu-box:11434"}))
            .unwrap();
        assert_eq!(config.endpoint_url, "http://gpu-box:11434");
    }

    #[test]
    fn test_broken_file_falls_back_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let env = test_env(dir.path());
        std::fs::create_dir_all(&env.config_dir).unwrap();
        std::fs::write(env.config_path(), "{ not json").unwrap();

        let config = Config::load(&env).unwrap();
        assert_eq!(config, Config::defaults(&env));
        assert_eq!(
            std::fs::read_to_string(env.config_path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        let env = test_env(Path::new("/tmp"));
        assert!(Config::defaults(&env).merged_with(json!([1, 2])).is_err());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("ollama".parse::<Provider>().unwrap(), Provider::Ollama);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!("anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert!(matches!(
            "bard".parse::<Provider>(),
            Err(Error::UnknownProvider(name)) if name == "bard"
        ));
    }
}
