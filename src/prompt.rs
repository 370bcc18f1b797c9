//! Prompt templates for each task.
//!
//! Every builder returns a single [`PromptPair`]. File content is embedded in
//! full: nothing is truncated or chunked, however large the file is.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::language::{self, Language};

/// Fallback for `generate` when no language can be determined.
pub const DEFAULT_GENERATE_LANGUAGE: &str = "Python";

/// Maximum number of files listed in the analyze prompt.
pub const MAX_LISTED_FILES: usize = 50;

/// Relative paths at or above this length are left out of the listing.
pub const MAX_LISTED_PATH_LEN: usize = 100;

/// A system instruction and a user instruction, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Build the code review prompt.
pub fn review(path: &str, language: Language, git_context: &str, code: &str) -> PromptPair {
    let system = format!(
        r#"You are a senior software engineer reviewing {language} code.
Analyze the code for:
- Logic errors and bugs
- Security vulnerabilities
- Performance issues
- Best practices compliance
- Code style and readability
- Potential improvements

Be concise and actionable in your feedback."#
    );

    let user = format!(
        "File: {path}\nLanguage: {language}\n\nGit Context:\n{git_context}\n\nCode to review:\n```{fence}\n{code}\n```\n\nPlease provide a detailed code review.",
        fence = language.fence_tag(),
    );

    PromptPair { system, user }
}

/// Build the code generation prompt.
pub fn generate(description: &str, language: &str, git_context: &str) -> PromptPair {
    let system = format!(
        r#"You are an expert {language} developer.
Generate high-quality, production-ready code that:
- Follows {language} best practices and conventions
- Is well-structured and maintainable
- Includes proper error handling
- Has clear comments explaining complex logic
- Uses appropriate design patterns
- Is secure and performant"#
    );

    let user = format!(
        r#"Generate {language} code for: {description}

Git Context:
{git_context}

Please provide:
1. Complete, working code
2. Brief explanation of the approach
3. Usage example if applicable"#
    );

    PromptPair { system, user }
}

/// Build the project analysis prompt.
pub fn analyze(project_path: &Path, git_context: &str, files: &[String]) -> PromptPair {
    let system = r#"You are a software architect analyzing a project.
Provide insights on:
- Project structure and organization
- Technology stack and dependencies
- Potential improvements
- Security considerations
- Scalability aspects
- Code quality observations"#
        .to_string();

    let user = format!(
        "Analyze this project:\n\nPath: {}\n\nGit Context:\n{}\n\nProject files (first {}):\n{}\n\nPlease provide a comprehensive project analysis.",
        project_path.display(),
        git_context,
        MAX_LISTED_FILES,
        files.join("\n"),
    );

    PromptPair { system, user }
}

/// Build the free-form chat prompt. The message is passed through untouched.
pub fn chat(message: &str) -> PromptPair {
    let system = r#"You are a helpful software development assistant.
You can help with:
- Code review and debugging
- Architecture decisions
- Best practices
- Technology recommendations
- Problem solving

Be concise and practical in your responses."#
        .to_string();

    PromptPair {
        system,
        user: message.to_string(),
    }
}

/// Pick the target language for `generate`.
///
/// An explicit language is used verbatim. Otherwise the immediate children
/// of `context_dir` are scanned in name order and the first recognised
/// extension wins. Falls back to [`DEFAULT_GENERATE_LANGUAGE`].
pub fn resolve_language(explicit: Option<&str>, context_dir: Option<&Path>) -> String {
    if let Some(language) = explicit.filter(|l| !l.is_empty()) {
        return language.to_string();
    }

    context_dir
        .filter(|dir| dir.is_dir())
        .and_then(detect_dir_language)
        .map(|language| language.name().to_string())
        .unwrap_or_else(|| DEFAULT_GENERATE_LANGUAGE.to_string())
}

fn detect_dir_language(dir: &Path) -> Option<Language> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Could not scan {} for a language: {}", dir.display(), e);
            return None;
        }
    };

    let mut names: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    names.sort();

    names
        .iter()
        .map(language::detect)
        .find(Language::is_known)
}

/// List regular files under `root` for the analyze prompt.
///
/// `root` should be canonical. When any of its own components starts with
/// `.` the listing is empty. Otherwise paths are relative to `root`, skip
/// anything with a component starting with `.`, must be shorter than
/// [`MAX_LISTED_PATH_LEN`] characters, are sorted, and capped at
/// [`MAX_LISTED_FILES`]. Symlinks are followed; a link back to a directory
/// already being walked is skipped.
pub fn list_project_files(root: &Path) -> Vec<String> {
    if has_hidden_component(root) {
        debug!("{} is under a hidden directory, listing nothing", root.display());
        return Vec::new();
    }

    let mut files = Vec::new();
    let mut ancestors = HashSet::new();
    collect_files(root, root, &mut ancestors, &mut files);
    files.sort();
    files.truncate(MAX_LISTED_FILES);
    files
}

fn has_hidden_component(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn collect_files(
    root: &Path,
    dir: &Path,
    ancestors: &mut HashSet<PathBuf>,
    out: &mut Vec<String>,
) {
    let real = match dir.canonicalize() {
        Ok(real) => real,
        Err(e) => {
            debug!("Skipping unresolvable directory {}: {}", dir.display(), e);
            return;
        }
    };
    if !ancestors.insert(real.clone()) {
        debug!("Skipping symlink cycle at {}", dir.display());
        return;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping unreadable directory {}: {}", dir.display(), e);
            ancestors.remove(&real);
            return;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        // Follows symlinks; dangling links are skipped.
        let Ok(metadata) = std::fs::metadata(&path) else {
            continue;
        };

        if metadata.is_dir() {
            collect_files(root, &path, ancestors, out);
        } else if metadata.is_file() {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let relative = relative.to_string_lossy().to_string();
            if relative.chars().count() < MAX_LISTED_PATH_LEN {
                out.push(relative);
            }
        }
    }

    ancestors.remove(&real);
}
