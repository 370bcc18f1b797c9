//! devai - a command-line development assistant.
//!
//! Reviews files, generates code, analyzes projects and answers questions by
//! sending prompts, enriched with git and filesystem context, to a local
//! Ollama daemon or a hosted OpenAI / Anthropic model.

pub mod assistant;
pub mod config;
pub mod context;
pub mod error;
pub mod language;
pub mod llm;
pub mod prompt;

pub use assistant::Assistant;
pub use config::{Config, Environment, Provider};
pub use error::{Error, Result};
pub use llm::{create_backend, Backend};
