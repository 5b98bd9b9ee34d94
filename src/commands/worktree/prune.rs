use anyhow::{Context, Result};
use colored::Colorize;

use crate::cancel::CancelToken;

use super::context::open_orchestrator;

/// Drop registry entries whose directory and git metadata are both gone
pub fn prune(dry_run: bool, cancel: &CancelToken) -> Result<()> {
    let orchestrator = open_orchestrator()?;
    let report = orchestrator
        .prune_stale_worktrees(dry_run, cancel)
        .context("Failed to prune worktrees")?;

    if report.candidates.is_empty() {
        println!("{} No stale worktrees to prune", "✓".green().bold());
        return Ok(());
    }

    if report.dry_run {
        println!(
            "Would prune {} stale worktree(s):",
            report.candidates.len().to_string().yellow()
        );
        for name in &report.candidates {
            println!("  {}", name.cyan());
        }
        return Ok(());
    }

    for name in &report.removed {
        println!("  {} {}", "pruned:".green(), name.cyan());
    }
    for (name, err) in &report.failures {
        eprintln!("  {} {}: {err}", "failed:".red(), name.cyan());
    }
    println!(
        "Pruned {} of {} stale worktree(s)",
        report.removed.len(),
        report.candidates.len()
    );

    match report.aggregate_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
