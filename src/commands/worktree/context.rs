use anyhow::{Context, Result};

use crate::config::Config;
use crate::orchestrator::WorktreeOrchestrator;

/// Orchestrator for the project containing the current directory.
pub(super) fn open_orchestrator() -> Result<WorktreeOrchestrator> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::from_env()?;
    let orchestrator = WorktreeOrchestrator::discover(&cwd, config)
        .context("Failed to resolve the current project")?;
    tracing::debug!(
        project = %orchestrator.project().slug,
        root = %orchestrator.project().root.display(),
        "resolved project"
    );
    Ok(orchestrator)
}
