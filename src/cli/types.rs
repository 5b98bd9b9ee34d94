use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "Git worktree lifecycle manager", long_about = None)]
#[command(version)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Show debug logs on stderr (overridden by BERTH_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the project's worktrees
    Worktree {
        #[command(subcommand)]
        command: WorktreeCommands,
    },
}

#[derive(Subcommand)]
pub enum WorktreeCommands {
    /// Create a worktree for a branch, creating the branch if needed
    Add {
        /// Branch name (may contain slashes, e.g. feat/x)
        branch: String,

        /// Revision to start a new branch from (default: HEAD)
        #[arg(long, value_name = "REF")]
        base: Option<String>,
    },

    /// List registered worktrees and their health
    List {
        /// Print worktree names only
        #[arg(short, long)]
        quiet: bool,

        /// Include every registered project
        #[arg(short, long)]
        all: bool,

        /// Emit JSON
        #[arg(long, conflicts_with = "quiet")]
        json: bool,
    },

    /// Drop registry entries whose directory and git metadata are both gone
    Prune {
        /// Show what would be pruned without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove worktrees (directory, git metadata and registry entry)
    Remove {
        /// Branch names of the worktrees to remove
        #[arg(required = true)]
        branches: Vec<String>,

        /// Remove even if the worktree has uncommitted changes
        #[arg(short, long)]
        force: bool,

        /// Also delete the branch if it is merged into HEAD
        #[arg(long)]
        delete_branch: bool,
    },
}
