//! Integration tests for the `ai` binary.
//!
//! Each test gets its own config directory; the Ollama backend is replaced by
//! a wiremock server.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Isolated home and config directory for one test run.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            // Not `.tmp`-prefixed, so analyze does not see a hidden parent.
            dir: tempfile::Builder::new()
                .prefix("devai-sandbox")
                .tempdir()
                .expect("failed to create temp dir"),
        }
    }

    fn config_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("config")
    }

    /// Write a config file pointing at `endpoint` with the given provider.
    fn write_config(&self, provider: &str, endpoint: &str) {
        std::fs::create_dir_all(self.config_dir()).unwrap();
        std::fs::write(
            self.config_dir().join("config.json"),
            json!({ "provider": provider, "endpoint_url": endpoint }).to_string(),
        )
        .unwrap();
    }

    fn ai(&self) -> Command {
        let mut cmd = Command::cargo_bin("ai").unwrap();
        cmd.env("HOME", self.dir.path())
            .env("AI_CONFIG_DIR", self.config_dir())
            .env("AI_WORKSPACE", self.dir.path().join("workspace"))
            .env_remove("AI_MODEL")
            .env_remove("AI_PROVIDER")
            .env_remove("RUST_LOG")
            .env_remove("OPENAI_API_KEY")
            .env_remove("ANTHROPIC_API_KEY")
            .current_dir(self.dir.path());
        cmd
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

async fn ollama_server(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": reply,
            "done": true
        })))
        .mount(&server)
        .await;
    server
}

async fn last_prompt(server: &MockServer) -> String {
    let requests = server.received_requests().await.unwrap_or_default();
    let body: Value = requests
        .last()
        .expect("no request reached the server")
        .body_json()
        .unwrap();
    body["prompt"].as_str().unwrap().to_string()
}

// =============================================================================
// Input errors
// =============================================================================

#[test]
fn review_without_target_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .ai()
        .arg("review")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please provide a file path to review"));
}

#[test]
fn generate_without_target_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .ai()
        .arg("generate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Please provide a description for code generation",
        ));
}

#[test]
fn chat_without_target_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .ai()
        .arg("chat")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please provide a message"));
}

#[test]
fn review_missing_file_is_a_result() {
    let sandbox = Sandbox::new();
    sandbox
        .ai()
        .args(["review", "nope.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File not found: nope.py"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn first_run_writes_default_config() {
    let sandbox = Sandbox::new();
    sandbox.ai().args(["review", "nope.py"]).assert().success();

    let written: Value = serde_json::from_str(
        &std::fs::read_to_string(sandbox.config_dir().join("config.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(written["provider"], "ollama");
    assert_eq!(written["model"], "llama3.1:8b");
    assert_eq!(written["endpoint_url"], "http://127.0.0.1:11434");
}

#[test]
fn unknown_provider_is_fatal() {
    let sandbox = Sandbox::new();
    sandbox.write_config("gemini", "http://127.0.0.1:11434");
    sandbox
        .ai()
        .args(["chat", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with(
            "Error initializing gemini: Unknown provider 'gemini'",
        ))
        .stderr(predicate::str::contains(
            "Make sure the service is running and accessible",
        ));
}

#[test]
fn hosted_provider_without_key_is_fatal() {
    let sandbox = Sandbox::new();
    sandbox.write_config("openai", "http://127.0.0.1:11434");
    sandbox
        .ai()
        .args(["chat", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error initializing openai: "))
        .stderr(predicate::str::contains("OPENAI_API_KEY"))
        .stderr(predicate::str::contains(
            "Make sure the service is running and accessible",
        ));
}

// =============================================================================
// Ollama round trips
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn review_go_file_through_ollama() {
    let server = ollama_server("LGTM, but add a doc comment.").await;
    let sandbox = Sandbox::new();
    sandbox.write_config("ollama", &server.uri());
    std::fs::write(sandbox.path().join("app.go"), "package main\nfunc main(){}").unwrap();

    sandbox
        .ai()
        .args(["review", "app.go"])
        .assert()
        .success()
        .stdout("LGTM, but add a doc comment.\n");

    let prompt = last_prompt(&server).await;
    assert!(prompt.starts_with("System: You are a senior software engineer reviewing Go code."));
    assert!(prompt.contains("User: File: app.go\nLanguage: Go\n"));
    assert!(prompt.contains("```go\npackage main\nfunc main(){}\n```"));
}

#[tokio::test(flavor = "multi_thread")]
async fn analyze_defaults_to_current_directory() {
    let server = ollama_server("Tidy project.").await;
    let sandbox = Sandbox::new();
    sandbox.write_config("ollama", &server.uri());
    std::fs::write(sandbox.path().join("main.py"), "print('hi')\n").unwrap();
    std::fs::create_dir_all(sandbox.path().join(".cache")).unwrap();
    std::fs::write(sandbox.path().join(".cache").join("blob"), "").unwrap();

    sandbox
        .ai()
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tidy project."));

    let prompt = last_prompt(&server).await;
    assert!(prompt.contains("Project files (first 50):\n"));
    assert!(prompt.contains("main.py"));
    assert!(!prompt.contains("blob"));
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_honours_language_flag() {
    let server = ollama_server("fn main() {}").await;
    let sandbox = Sandbox::new();
    sandbox.write_config("ollama", &server.uri());

    sandbox
        .ai()
        .args(["generate", "hello world", "--language", "Rust"])
        .assert()
        .success()
        .stdout("fn main() {}\n");

    let prompt = last_prompt(&server).await;
    assert!(prompt.contains("User: Generate Rust code for: hello world"));
}

#[tokio::test(flavor = "multi_thread")]
async fn ollama_error_status_is_fatal_with_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("out of memory"))
        .mount(&server)
        .await;
    let sandbox = Sandbox::new();
    sandbox.write_config("ollama", &server.uri());

    sandbox
        .ai()
        .args(["chat", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of memory"))
        .stderr(predicate::str::contains("Make sure Ollama is running"));
}
