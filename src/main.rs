//! `ai` - command-line front end for devai.
//!
//! Runs exactly one task per invocation and prints the model's answer on
//! stdout. Diagnostics and logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use devai::{create_backend, Assistant, Config, Environment};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ai")]
#[command(author, version, about = "Simple AI development assistant")]
#[command(long_about = "Reviews code, generates code, analyzes projects and chats, \
using a local Ollama daemon or a hosted OpenAI/Anthropic model.\n\n\
Configuration lives in $AI_CONFIG_DIR/config.json (default ~/.config/dev-ai).")]
struct Cli {
    /// Command to run
    #[arg(value_enum)]
    command: Task,

    /// File path (review), description (generate), project path (analyze) or message (chat)
    #[arg(value_name = "TARGET")]
    target: Option<String>,

    /// Programming language for generation
    #[arg(short, long)]
    language: Option<String>,

    /// Context directory for generation
    #[arg(short, long, value_name = "PATH")]
    context: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Task {
    /// Review a source file
    Review,
    /// Generate code from a description
    Generate,
    /// Analyze a project directory
    Analyze,
    /// Ask a free-form question
    Chat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let task = tokio::spawn(run(cli));

    tokio::select! {
        joined = task => match joined {
            Ok(Ok(code)) => code,
            Ok(Err(e)) => {
                report(&e);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\nOperation cancelled by user");
            ExitCode::SUCCESS
        }
    }
}

/// Set up stderr logging. `RUST_LOG` overrides the defaults.
fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("devai={level},ai={level},reqwest=warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print an error and, when there is one, what to do about it.
fn report(err: &anyhow::Error) {
    eprintln!("{}", diagnostic(err));
    if let Some(hint) = err.downcast_ref::<devai::Error>().and_then(devai::Error::hint) {
        eprintln!("{}", hint);
    }
}

/// First diagnostic line. Backend init failures already carry their
/// `Error initializing {provider}` context.
fn diagnostic(err: &anyhow::Error) -> String {
    match err.downcast_ref::<devai::Error>() {
        Some(inner) if inner.is_init() => format!("{:#}", err),
        _ => format!("Error: {:#}", err),
    }
}

/// Message printed when a task is missing its required target.
fn missing_target_message(task: Task) -> Option<&'static str> {
    match task {
        Task::Review => Some("Please provide a file path to review"),
        Task::Generate => Some("Please provide a description for code generation"),
        Task::Chat => Some("Please provide a message"),
        Task::Analyze => None,
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let target = match (cli.target, missing_target_message(cli.command)) {
        (Some(target), _) => target,
        (None, None) => ".".to_string(),
        (None, Some(message)) => {
            eprintln!("{}", message);
            return Ok(ExitCode::FAILURE);
        }
    };

    let env = Environment::from_env()?;
    debug!(
        "Config dir: {}, workspace: {}",
        env.config_dir.display(),
        env.workspace.display()
    );
    let config = Config::load(&env).context("Failed to load configuration")?;
    info!("Using {} ({})", config.provider, config.model);

    let backend = create_backend(&config)
        .with_context(|| format!("Error initializing {}", config.provider))?;
    let assistant = Assistant::new(backend);
    debug!("Backend ready: {}", assistant.backend_name());

    let result = match cli.command {
        Task::Review => assistant.review(&target).await,
        Task::Generate => {
            assistant
                .generate(&target, cli.language.as_deref(), cli.context.as_deref())
                .await
        }
        Task::Analyze => assistant.analyze(Path::new(&target)).await,
        Task::Chat => assistant.chat(&target).await,
    }?;

    println!("{}", result);
    Ok(ExitCode::SUCCESS)
}
