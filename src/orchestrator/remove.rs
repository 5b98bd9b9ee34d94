use std::path::PathBuf;

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::registry::WorktreeHandle;
use crate::workspace::WorktreeDirProvider;

use super::WorktreeOrchestrator;

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Skip the uncommitted-changes check
    pub force: bool,
    /// Delete the branch after the worktree is gone
    pub delete_branch: bool,
}

/// What happened to the branch of a removed worktree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    Deleted,
    AlreadyGone,
    /// Kept because it has commits not merged into HEAD
    NotMerged,
}

#[derive(Debug, Clone)]
pub struct RemoveOutcome {
    pub name: String,
    pub path: PathBuf,
    pub branch_name: String,
    pub branch: Option<BranchOutcome>,
}

impl<P: WorktreeDirProvider> WorktreeOrchestrator<P> {
    /// Remove the worktree registered as `name` from git, disk and registry.
    ///
    /// An unmerged branch is reported through [`BranchOutcome::NotMerged`]
    /// rather than as an error, since the worktree itself is already gone by
    /// then.
    pub fn remove_worktree(
        &self,
        name: &str,
        options: RemoveOptions,
        cancel: &CancelToken,
    ) -> Result<RemoveOutcome> {
        cancel.check()?;
        let handle = self
            .entries()
            .get_worktree(name)?
            .ok_or_else(|| Error::WorktreeNotRegistered(name.to_string()))?;

        if !options.force {
            self.ensure_safe_to_remove(&handle)?;
        }

        self.git
            .worktrees()
            .remove(handle.slug())
            .step("removing git worktree metadata")?;
        self.dirs
            .delete_dir(handle.slug())
            .step("removing worktree directory")?;
        self.entries()
            .delete_worktree(name, cancel)
            .step("removing registry entry")?;
        tracing::info!(worktree = name, "removed worktree");

        let branch = if options.delete_branch {
            Some(self.delete_branch_of(handle.branch())?)
        } else {
            None
        };

        Ok(RemoveOutcome {
            name: name.to_string(),
            path: handle.path().to_path_buf(),
            branch_name: handle.branch().to_string(),
            branch,
        })
    }

    fn ensure_safe_to_remove(&self, handle: &WorktreeHandle) -> Result<()> {
        let name = handle.name();
        let refuse = |reason: String| Error::Refused {
            name: name.to_string(),
            reason: format!("{reason}; use --force to remove anyway"),
        };

        let path = match self.dirs.get_dir(handle.slug()) {
            Ok(path) => path,
            // Nothing on disk that could be lost
            Err(e) if e.is(ErrorKind::NotFound) => return Ok(()),
            Err(e) => return Err(refuse(e.to_string())),
        };
        let worktree = self
            .git
            .open_worktree(&path)
            .map_err(|e| refuse(e.to_string()))?;
        let changed = worktree
            .changed_paths()
            .map_err(|e| refuse(format!("cannot read status: {e}")))?;
        if !changed.is_empty() {
            return Err(refuse(format!(
                "{} uncommitted change(s) in {}",
                changed.len(),
                path.display()
            )));
        }
        Ok(())
    }

    fn delete_branch_of(&self, branch: &str) -> Result<BranchOutcome> {
        match self.git.delete_branch(branch) {
            Ok(()) => Ok(BranchOutcome::Deleted),
            Err(e) if e.is(ErrorKind::BranchNotFound) => Ok(BranchOutcome::AlreadyGone),
            Err(e) if e.is(ErrorKind::BranchNotMerged) => {
                tracing::warn!(branch, "branch has unmerged commits, keeping it");
                Ok(BranchOutcome::NotMerged)
            }
            Err(e) => Err(e.at_step("deleting branch")),
        }
    }
}
