use anyhow::{Context, Result};
use colored::Colorize;

use crate::cancel::CancelToken;

use super::context::open_orchestrator;

/// Create (or reuse) the worktree for `branch`
pub fn add(branch: &str, base: Option<&str>, cancel: &CancelToken) -> Result<()> {
    let orchestrator = open_orchestrator()?;
    let path = orchestrator
        .create_worktree(branch, base.unwrap_or_default(), cancel)
        .with_context(|| format!("Failed to add worktree '{branch}'"))?;

    println!(
        "{} Worktree {} ready at {}",
        "✓".green().bold(),
        branch.cyan(),
        path.display()
    );
    Ok(())
}
