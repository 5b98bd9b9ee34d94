//! Integration tests for berth's worktree lifecycle
//!
//! Every test builds a throwaway git repository and a private config root,
//! so nothing touches the user's real registry.

pub mod cli;
pub mod list;
pub mod prune;
pub mod registry;
pub mod remove;
