//! Working tree status of linked worktrees

use crate::error::Result;

use super::runner::{git_failure, run_git};
use super::worktree::LinkedWorktree;

impl LinkedWorktree {
    /// Paths with staged, unstaged or untracked changes, in git's order.
    ///
    /// Untracked files count: removing the directory would lose them too.
    pub fn changed_paths(&self) -> Result<Vec<String>> {
        let args = ["status", "--porcelain"];
        let output = run_git(&args, self.path())?;
        if !output.status.success() {
            return Err(git_failure(&args, &output));
        }
        // Not trimmed: the first column of each line is significant
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter(|line| line.len() > 3)
            .map(|line| line[3..].to_string())
            .collect())
    }
}
