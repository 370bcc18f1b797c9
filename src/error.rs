//! Error types for devai.
//!
//! Git failures never show up here: the context gatherer degrades them to a
//! sentinel string instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing a task or building and calling a backend.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured provider does not name a known backend.
    #[error("Unknown provider '{0}' (expected one of: ollama, openai, anthropic)")]
    UnknownProvider(String),

    /// A hosted backend has no API key in config or environment.
    #[error("{provider} API key not found. Set {env_var} environment variable or add api_key to config file.")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never completed (connection refused, timeout, ...).
    #[error("Failed to connect to {provider}: {source}")]
    Connection {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{provider} request failed with status {status}: {message}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        message: String,
    },

    /// The backend answered 2xx but the body could not be decoded.
    #[error("Failed to parse {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with no usable content.
    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),

    /// A file that exists could not be read (directory, permissions, not UTF-8).
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// A remediation hint to print under the diagnostic, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::Connection { provider, .. } | Error::Status { provider, .. }
                if *provider == "Ollama" =>
            {
                Some("Make sure Ollama is running: ollama serve")
            }
            Error::UnknownProvider(_) | Error::MissingApiKey { .. } | Error::Client(_) => {
                Some("Make sure the service is running and accessible")
            }
            _ => None,
        }
    }

    /// Whether this error happened while constructing a backend.
    pub fn is_init(&self) -> bool {
        matches!(
            self,
            Error::UnknownProvider(_) | Error::MissingApiKey { .. } | Error::Client(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
