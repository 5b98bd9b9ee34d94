//! Git facade for worktree lifecycle management
//!
//! This module provides:
//! - Revision and branch queries against the main checkout
//! - Branch deletion guarded by merge and current-branch checks
//! - Linked worktree metadata access and creation in detached mode
//!
//! Every git failure is translated into [`crate::error::Error`] here; git
//! process details never escape this module.

pub mod branch;
pub mod repo;
pub mod runner;
pub mod status;
pub mod worktree;

pub use repo::GitRepo;
pub use worktree::{short_hash, LinkedWorktree, LinkedWorktrees, GIT_LINK};
