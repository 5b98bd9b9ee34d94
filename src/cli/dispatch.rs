use anyhow::Result;
use berth::cancel::CancelToken;
use berth::commands::worktree;

use super::types::{Commands, WorktreeCommands};

pub fn dispatch(command: Commands, cancel: &CancelToken) -> Result<()> {
    match command {
        Commands::Worktree { command } => match command {
            WorktreeCommands::Add { branch, base } => {
                worktree::add(&branch, base.as_deref(), cancel)
            }
            WorktreeCommands::List { quiet, all, json } => worktree::list(quiet, all, json),
            WorktreeCommands::Prune { dry_run } => worktree::prune(dry_run, cancel),
            WorktreeCommands::Remove {
                branches,
                force,
                delete_branch,
            } => worktree::remove(&branches, force, delete_branch, cancel),
        },
    }
}
