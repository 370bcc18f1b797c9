//! Programming language detection from file extensions.

use std::fmt;
use std::path::Path;

/// Languages recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Php,
    Ruby,
    Java,
    C,
    Cpp,
    CSharp,
    Shell,
    Sql,
    Html,
    Css,
    Json,
    Yaml,
    Xml,
    Markdown,
    Unknown,
}

impl Language {
    /// Human-readable name, as it appears in prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Php => "PHP",
            Language::Ruby => "Ruby",
            Language::Java => "Java",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Shell => "Shell",
            Language::Sql => "SQL",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Json => "JSON",
            Language::Yaml => "YAML",
            Language::Xml => "XML",
            Language::Markdown => "Markdown",
            Language::Unknown => "Unknown",
        }
    }

    /// Tag used on the opening code fence.
    pub fn fence_tag(&self) -> String {
        self.name().to_lowercase()
    }

    /// Map a bare extension (no dot) to a language. Case-insensitive.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Language::Python,
            "js" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "php" => Language::Php,
            "rb" => Language::Ruby,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            "cs" => Language::CSharp,
            "sh" => Language::Shell,
            "sql" => Language::Sql,
            "html" => Language::Html,
            "css" => Language::Css,
            "json" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            "xml" => Language::Xml,
            "md" => Language::Markdown,
            _ => Language::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Language::Unknown
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the language of `path` from its extension. The file need not exist.
pub fn detect(path: impl AsRef<Path>) -> Language {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Unknown)
}
