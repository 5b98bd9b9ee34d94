//! Branch deletion with safety checks

use crate::error::{Error, Result};

use super::repo::GitRepo;
use super::runner::{git_failure, run_git, run_git_bool, run_git_checked};

impl GitRepo {
    /// Delete branch `name` and its `branch.<name>.*` config.
    ///
    /// Refuses with [`Error::IsCurrentBranch`] when `name` is checked out in
    /// the main checkout and with [`Error::BranchNotMerged`] when its tip is
    /// not an ancestor of HEAD; in both cases the reference is untouched.
    /// If only the config cleanup fails, the reference stays deleted and
    /// [`Error::BranchConfig`] is returned.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        if !self.branch_exists(name)? {
            return Err(Error::BranchNotFound(name.to_string()));
        }
        if self.current_branch()? == name {
            return Err(Error::IsCurrentBranch(name.to_string()));
        }

        let tip = self.resolve_revision(&format!("refs/heads/{name}"))?;
        if !self.is_ancestor_of_head(&tip)? {
            return Err(Error::BranchNotMerged(name.to_string()));
        }

        let ref_name = format!("refs/heads/{name}");
        run_git_checked(&["update-ref", "-d", &ref_name, &tip], self.root())?;
        tracing::debug!(branch = name, tip = %tip, "deleted branch reference");

        self.remove_branch_config(name)
            .map_err(|reason| Error::BranchConfig {
                branch: name.to_string(),
                reason,
            })
    }

    /// Delete the reference for `name` without any safety checks.
    pub(crate) fn delete_ref(&self, name: &str) -> Result<()> {
        let ref_name = format!("refs/heads/{name}");
        run_git_checked(&["update-ref", "-d", &ref_name], self.root())?;
        Ok(())
    }

    /// Whether git accepts `name` as a branch name.
    pub fn is_valid_branch_name(&self, name: &str) -> Result<bool> {
        if name.starts_with('-') {
            return Ok(false);
        }
        run_git_bool(&["check-ref-format", "--branch", name], self.root())
    }

    fn is_ancestor_of_head(&self, commit: &str) -> Result<bool> {
        let args = ["merge-base", "--is-ancestor", commit, "HEAD"];
        let output = run_git(&args, self.root())?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(git_failure(&args, &output)),
        }
    }

    fn remove_branch_config(&self, name: &str) -> std::result::Result<(), String> {
        let section = format!("branch.{name}");
        let output = run_git(&["config", "--local", "--remove-section", &section], self.root())
            .map_err(|e| e.to_string())?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("no such section") {
            Ok(())
        } else {
            Err(stderr.trim().to_string())
        }
    }
}
