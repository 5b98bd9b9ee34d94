//! Computed health of a registered worktree
//!
//! Health is derived on demand from the presence of the worktree directory
//! and of git's metadata for its slug. It is never persisted, because the
//! user's own `git worktree` commands may change either side at any time.

use serde::Serialize;

use crate::error::Result;

/// Source of the two presence flags a health status is derived from.
pub trait HealthProbe {
    /// Whether the worktree directory for `slug` exists.
    fn directory_present(&self, slug: &str) -> Result<bool>;

    /// Whether git still has linked-worktree metadata for `slug`.
    fn git_metadata_present(&self, slug: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthState {
    Healthy,
    GitMissing,
    DirMissing,
    /// Neither side exists; only the registry entry remains
    Stale,
    Error,
}

/// Status triple of one worktree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorktreeHealth {
    pub state: HealthState,
    pub dir_present: bool,
    pub git_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorktreeHealth {
    pub fn from_presence(dir_present: bool, git_present: bool) -> Self {
        let state = match (dir_present, git_present) {
            (true, true) => HealthState::Healthy,
            (true, false) => HealthState::GitMissing,
            (false, true) => HealthState::DirMissing,
            (false, false) => HealthState::Stale,
        };
        Self {
            state,
            dir_present,
            git_present,
            error: None,
        }
    }

    /// Status of an entry whose location could not be resolved.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            state: HealthState::Error,
            dir_present: false,
            git_present: false,
            error: Some(reason.into()),
        }
    }

    pub fn probe(probe: &dyn HealthProbe, slug: &str) -> Self {
        let dir_present = match probe.directory_present(slug) {
            Ok(present) => present,
            Err(e) => return Self::failed(e.to_string()),
        };
        let git_present = match probe.git_metadata_present(slug) {
            Ok(present) => present,
            Err(e) => return Self::failed(e.to_string()),
        };
        Self::from_presence(dir_present, git_present)
    }

    /// Only stale entries may be dropped from the registry.
    pub fn is_prunable(&self) -> bool {
        self.state == HealthState::Stale
    }

    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }

    /// Status string shown by `list`.
    pub fn label(&self) -> String {
        match self.state {
            HealthState::Healthy => "healthy".to_string(),
            HealthState::GitMissing => "git missing".to_string(),
            HealthState::DirMissing => "dir missing".to_string(),
            HealthState::Stale => "dir missing, git missing".to_string(),
            HealthState::Error => format!(
                "error: {}",
                self.error.as_deref().unwrap_or("unknown failure")
            ),
        }
    }
}
