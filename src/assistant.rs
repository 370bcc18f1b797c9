//! The four assistant tasks.
//!
//! Each task gathers its inputs (file content, git context, file listing),
//! builds one prompt pair and sends it to whichever backend was configured.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::context;
use crate::error::{Error, Result};
use crate::language;
use crate::llm::Backend;
use crate::prompt::{self, PromptPair};

/// Runs tasks against a single backend.
pub struct Assistant {
    backend: Box<dyn Backend>,
}

impl Assistant {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Review a single file. A missing file is reported as the result.
    pub async fn review(&self, file_path: &str) -> Result<String> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Ok(format!("File not found: {}", file_path));
        }

        let code = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let language = language::detect(path);
        let git_context = context::gather(parent_dir(path));

        info!("Reviewing {} ({}, {} bytes)", file_path, language, code.len());
        self.send(prompt::review(file_path, language, &git_context, &code))
            .await
    }

    /// Generate code for `description`.
    ///
    /// `context_dir` is both the directory scanned for a language and the
    /// path git context is gathered from (current directory when absent).
    pub async fn generate(
        &self,
        description: &str,
        language: Option<&str>,
        context_dir: Option<&Path>,
    ) -> Result<String> {
        let language = prompt::resolve_language(language, context_dir);
        let git_context = context::gather(context_dir.unwrap_or(Path::new(".")));

        info!("Generating {} code", language);
        self.send(prompt::generate(description, &language, &git_context))
            .await
    }

    /// Analyze the project rooted at `path`. A missing path is reported as
    /// the result.
    pub async fn analyze(&self, path: &Path) -> Result<String> {
        let Ok(project_path) = path.canonicalize() else {
            return Ok(format!("Path not found: {}", path.display()));
        };

        let files = prompt::list_project_files(&project_path);
        let git_context = context::gather(&project_path);

        info!(
            "Analyzing {} ({} files listed)",
            project_path.display(),
            files.len()
        );
        self.send(prompt::analyze(&project_path, &git_context, &files))
            .await
    }

    /// Free-form chat.
    pub async fn chat(&self, message: &str) -> Result<String> {
        info!("Chatting");
        self.send(prompt::chat(message)).await
    }

    async fn send(&self, prompt: PromptPair) -> Result<String> {
        info!("Sending prompt to {}", self.backend.name());
        self.backend.invoke(&prompt.system, &prompt.user).await
    }
}

/// Directory containing `path`, or `.` for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
