//! Caller-owned workspace layout for worktree directories

pub mod provider;

pub use provider::{ProjectWorkspace, WorktreeDirProvider};
