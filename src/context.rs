//! Git context gathering for prompts.
//!
//! Collects the current branch, recent commits and working-tree status so the
//! LLM sees what the user is working on. Best effort: any failure yields
//! [`NO_REPOSITORY`] instead of partial data.

use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Returned when the path is not inside a repository or any git query fails.
pub const NO_REPOSITORY: &str = "No git repository found";

/// Gather git context for `path`.
pub fn gather(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();

    let branch = git(path, &["branch", "--show-current"]);
    let commits = git(path, &["log", "--oneline", "-5"]);
    let status = git(path, &["status", "--porcelain"]);

    match (branch, commits, status) {
        (Some(branch), Some(commits), Some(status)) => format!(
            "Branch: {}\n\nRecent commits:\n{}\n\nCurrent status:\n{}",
            branch, commits, status
        ),
        _ => NO_REPOSITORY.to_string(),
    }
}

/// Run one git query in `cwd`, returning trimmed stdout on success.
fn git(cwd: &Path, args: &[&str]) -> Option<String> {
    let output = match Command::new("git").args(args).current_dir(cwd).output() {
        Ok(output) => output,
        Err(e) => {
            debug!("git {} failed to start in {}: {}", args.join(" "), cwd.display(), e);
            return None;
        }
    };

    if !output.status.success() {
        debug!(
            "git {} exited with {} in {}",
            args.join(" "),
            output.status,
            cwd.display()
        );
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
