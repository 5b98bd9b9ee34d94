use anyhow::Result;
use colored::Colorize;

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind};
use crate::orchestrator::{BranchOutcome, RemoveOptions, RemoveOutcome};

use super::context::open_orchestrator;

/// Remove each named worktree, reporting every failure at the end
pub fn remove(
    names: &[String],
    force: bool,
    delete_branch: bool,
    cancel: &CancelToken,
) -> Result<()> {
    let orchestrator = open_orchestrator()?;
    let options = RemoveOptions {
        force,
        delete_branch,
    };

    let mut removed = 0;
    let mut failures = Vec::new();
    for name in names {
        match orchestrator.remove_worktree(name, options, cancel) {
            Ok(outcome) => {
                removed += 1;
                report_removed(&outcome);
            }
            // Only the branch step fails this way; the worktree is gone
            Err(err) if err.is(ErrorKind::IsCurrentBranch) => {
                removed += 1;
                println!("{} Removed worktree {}", "✓".green().bold(), name.cyan());
                eprintln!("{} {}: {err}", "error:".red().bold(), name);
                failures.push(format!("{name}: {err}"));
            }
            Err(err) => {
                eprintln!("{} {}: {err}", "error:".red().bold(), name);
                failures.push(format!("{name}: {err}"));
            }
        }
    }

    println!("Removed {removed} of {} worktree(s)", names.len());
    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Aggregate {
            operation: "remove".to_string(),
            failures,
        }
        .into())
    }
}

fn report_removed(outcome: &RemoveOutcome) {
    println!(
        "{} Removed worktree {}",
        "✓".green().bold(),
        outcome.name.cyan()
    );
    match outcome.branch {
        Some(BranchOutcome::Deleted) => println!(
            "{} Deleted branch {}",
            "✓".green().bold(),
            outcome.branch_name.cyan()
        ),
        Some(BranchOutcome::NotMerged) => {
            eprintln!(
                "{} branch {} has commits not merged into HEAD; kept it",
                "warning:".yellow().bold(),
                outcome.branch_name.cyan()
            );
            eprintln!(
                "  {}",
                format!(
                    "Delete it anyway with: git branch -D {}",
                    outcome.branch_name
                )
                .dimmed()
            );
        }
        Some(BranchOutcome::AlreadyGone) | None => {}
    }
}
