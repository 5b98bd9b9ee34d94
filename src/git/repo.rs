//! Repository handle
//!
//! [`GitRepo`] is the single seam between berth and git. It exposes only what
//! the orchestrator needs and composes the safe creation operations on top of
//! [`LinkedWorktrees::add_detached`].

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Error, ErrorKind, Result};

use super::runner::{git_failure, run_git, run_git_bool, run_git_checked};
use super::worktree::{LinkedWorktree, LinkedWorktrees};

/// Handle on a repository's main checkout.
#[derive(Debug)]
pub struct GitRepo {
    root: PathBuf,
    common_dir: PathBuf,
    worktrees: OnceLock<LinkedWorktrees>,
}

impl GitRepo {
    /// Open the repository containing `path`.
    ///
    /// `path` may be anywhere inside the main checkout or inside one of its
    /// linked worktrees; the handle always refers to the main checkout.
    pub fn open(path: &Path) -> Result<Self> {
        which::which("git").map_err(|e| {
            Error::io(
                "git is not installed or not in PATH",
                std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
            )
        })?;

        let not_a_repo = |e: Error| match e.kind() {
            ErrorKind::Io => e,
            _ => Error::NotARepository {
                path: path.to_path_buf(),
            },
        };
        let toplevel = run_git_checked(&["rev-parse", "--show-toplevel"], path).map_err(not_a_repo)?;
        let common = run_git_checked(&["rev-parse", "--git-common-dir"], path).map_err(not_a_repo)?;

        let common_dir = absolutize(path, Path::new(&common));
        let common_dir = common_dir.canonicalize().unwrap_or(common_dir);

        // For a non-bare repository the common dir is `<main>/.git`
        let root = match common_dir.file_name().and_then(|n| n.to_str()) {
            Some(".git") => common_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(&toplevel)),
            _ => PathBuf::from(&toplevel),
        };
        let root = root.canonicalize().unwrap_or(root);

        tracing::debug!(root = %root.display(), common_dir = %common_dir.display(), "opened repository");
        Ok(Self {
            root,
            common_dir,
            worktrees: OnceLock::new(),
        })
    }

    /// Absolute path of the main checkout.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Linked-worktree operations; built once and shared by all callers.
    pub fn worktrees(&self) -> &LinkedWorktrees {
        self.worktrees
            .get_or_init(|| LinkedWorktrees::new(self.root.clone(), &self.common_dir))
    }

    /// Resolve a branch, tag, `HEAD` or hash to a full commit hash.
    ///
    /// An empty revision means `HEAD` of the main checkout.
    pub fn resolve_revision(&self, rev: &str) -> Result<String> {
        let rev = if rev.is_empty() { "HEAD" } else { rev };
        let spec = format!("{rev}^{{commit}}");
        let output = run_git(&["rev-parse", "--verify", "--quiet", &spec], &self.root)?;
        if !output.status.success() {
            return Err(Error::RevisionNotFound(rev.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        let ref_name = format!("refs/heads/{name}");
        run_git_bool(&["show-ref", "--verify", "--quiet", &ref_name], &self.root)
    }

    /// Branch checked out in the main checkout; empty when HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        let args = ["symbolic-ref", "-q", "--short", "HEAD"];
        let output = run_git(&args, &self.root)?;
        match output.status.code() {
            Some(0) => Ok(String::from_utf8_lossy(&output.stdout).trim().to_string()),
            Some(1) => Ok(String::new()),
            _ => Err(git_failure(&args, &output)),
        }
    }

    /// Open the linked worktree checked out at `path`.
    pub fn open_worktree(&self, path: &Path) -> Result<LinkedWorktree> {
        self.worktrees().open(path)
    }

    /// Create a linked worktree at `path` on a new branch `branch` starting
    /// at `base_commit`.
    ///
    /// Exactly one branch reference is created and its short name is
    /// `branch`, never `slug`. If the branch cannot be checked out in the
    /// new worktree, the reference is deleted again.
    pub fn add_with_new_branch(
        &self,
        path: &Path,
        slug: &str,
        branch: &str,
        base_commit: &str,
    ) -> Result<LinkedWorktree> {
        self.worktrees().add_detached(path, slug, base_commit)?;
        run_git_checked(&["branch", "--no-track", branch, base_commit], &self.root)?;

        let checked_out = self
            .worktrees()
            .open(path)
            .and_then(|wt| wt.switch(branch).map(|()| wt));
        match checked_out {
            Ok(wt) => Ok(wt),
            Err(e) => {
                if let Err(undo) = self.delete_ref(branch) {
                    tracing::warn!(branch, error = %undo, "could not delete branch after failed checkout");
                }
                Err(e)
            }
        }
    }

    /// Create a linked worktree at `path` checked out on existing `branch`.
    pub fn add_with_existing_branch(
        &self,
        path: &Path,
        slug: &str,
        branch: &str,
    ) -> Result<LinkedWorktree> {
        let tip = self.resolve_revision(&format!("refs/heads/{branch}"))?;
        self.worktrees().add_detached(path, slug, &tip)?;
        let wt = self.worktrees().open(path)?;
        wt.switch(branch)?;
        Ok(wt)
    }
}

fn absolutize(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
