//! Git command runner
//!
//! Central place where `git` processes are spawned. Failures are translated
//! into the crate error type here; nothing above this module sees an
//! `Output` or raw stderr handling.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run a git command in `dir` and return the raw Output.
///
/// Only spawn failures are errors; the exit status is left to the caller.
pub fn run_git(args: &[&str], dir: &Path) -> Result<Output> {
    tracing::debug!(cwd = %dir.display(), "git {}", args.join(" "));
    Command::new("git")
        .args(args)
        .current_dir(dir)
        // Keep messages stable for the few places that inspect stderr
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| Error::io(format!("failed to execute: git {}", args.join(" ")), e))
}

/// Run a git command, check for success, and return stdout trimmed.
pub fn run_git_checked(args: &[&str], dir: &Path) -> Result<String> {
    let output = run_git(args, dir)?;
    if !output.status.success() {
        return Err(git_failure(args, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a git command and return true if it exited with 0.
///
/// Spawn failures are still errors; only the exit status is folded into
/// the boolean.
pub fn run_git_bool(args: &[&str], dir: &Path) -> Result<bool> {
    Ok(run_git(args, dir)?.status.success())
}

/// Build the error for a git process that exited non-zero.
pub fn git_failure(args: &[&str], output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let command = args.first().copied().unwrap_or_default().to_string();
    if stderr.contains("not a git repository") {
        return Error::NotARepository {
            path: std::path::PathBuf::from(stderr_path(&stderr).unwrap_or_default()),
        };
    }
    Error::Git { command, stderr }
}

fn stderr_path(stderr: &str) -> Option<String> {
    // "fatal: not a git repository (or any of the parent directories): .git"
    stderr.rsplit(": ").next().map(str::to_string)
}
