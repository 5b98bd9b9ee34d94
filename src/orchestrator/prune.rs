use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::registry::WorktreeHealth;
use crate::workspace::WorktreeDirProvider;

use super::WorktreeOrchestrator;

/// Result of a prune run.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub dry_run: bool,
    /// Entries found stale
    pub candidates: Vec<String>,
    /// Entries actually dropped from the registry
    pub removed: Vec<String>,
    pub failures: Vec<(String, Error)>,
}

impl PruneReport {
    /// Aggregate error when at least one delete failed.
    pub fn aggregate_error(&self) -> Option<Error> {
        if self.failures.is_empty() {
            return None;
        }
        Some(Error::Aggregate {
            operation: "prune".to_string(),
            failures: self
                .failures
                .iter()
                .map(|(name, e)| format!("{name}: {e}"))
                .collect(),
        })
    }
}

impl<P: WorktreeDirProvider> WorktreeOrchestrator<P> {
    /// Drop the registry entry of every stale worktree.
    ///
    /// Only entries with neither directory nor git metadata are touched;
    /// entries whose status cannot be computed are left alone. Per-entry
    /// failures are collected in the report instead of stopping the run.
    pub fn prune_stale_worktrees(&self, dry_run: bool, cancel: &CancelToken) -> Result<PruneReport> {
        let handles = self.entries().list_worktrees()?;
        let mut report = PruneReport {
            dry_run,
            ..Default::default()
        };
        report.candidates = handles
            .iter()
            .filter(|h| h.is_prunable(self))
            .map(|h| h.name().to_string())
            .collect();
        if dry_run {
            return Ok(report);
        }

        for handle in handles.iter().filter(|h| h.is_prunable(self)) {
            let name = handle.name();
            if let Err(e) = cancel.check() {
                report.failures.push((name.to_string(), e));
                continue;
            }
            // Re-probe: the worktree may have been recreated meanwhile
            if !WorktreeHealth::probe(self, handle.slug()).is_prunable() {
                tracing::debug!(worktree = name, "no longer stale, skipping");
                continue;
            }
            match self.entries().delete_worktree(name, cancel) {
                Ok(true) => {
                    tracing::info!(worktree = name, "pruned stale registry entry");
                    report.removed.push(name.to_string());
                }
                Ok(false) => tracing::debug!(worktree = name, "entry already gone"),
                Err(e) => report.failures.push((name.to_string(), e)),
            }
        }
        Ok(report)
    }
}
