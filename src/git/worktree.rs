//! Linked worktree primitives
//!
//! Git keeps one metadata directory per linked worktree under
//! `<common-dir>/worktrees/<name>`, and each worktree directory holds a
//! `.git` *file* ("git-link") pointing back at it. Berth always makes
//! `<name>` equal to the worktree slug, which is also the directory's
//! basename.
//!
//! [`LinkedWorktrees`] only ever touches that metadata area; worktree
//! directories themselves belong to the workspace provider.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::runner::{git_failure, run_git, run_git_checked};

/// Name of the git-link file inside a linked worktree directory.
pub const GIT_LINK: &str = ".git";

/// Metadata file recording where the worktree's git-link lives.
const GITDIR_FILE: &str = "gitdir";

/// Access to a repository's linked-worktree metadata.
#[derive(Debug, Clone)]
pub struct LinkedWorktrees {
    repo_root: PathBuf,
    meta_root: PathBuf,
}

impl LinkedWorktrees {
    pub(crate) fn new(repo_root: PathBuf, common_dir: &Path) -> Self {
        Self {
            repo_root,
            meta_root: common_dir.join("worktrees"),
        }
    }

    /// Directory holding all per-worktree metadata directories.
    pub fn metadata_root(&self) -> &Path {
        &self.meta_root
    }

    fn metadata_dir(&self, slug: &str) -> Result<PathBuf> {
        if slug.is_empty() || slug.contains(['/', '\\']) || slug == "." || slug == ".." {
            return Err(Error::InvalidName(slug.to_string()));
        }
        Ok(self.meta_root.join(slug))
    }

    /// Returns true if git has metadata for a linked worktree named `slug`.
    pub fn exists(&self, slug: &str) -> Result<bool> {
        let dir = self.metadata_dir(slug)?;
        match fs::metadata(&dir) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(format!("inspecting {}", dir.display()), e)),
        }
    }

    /// Names of all linked worktrees, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.meta_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::io(
                    format!("reading {}", self.meta_root.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| Error::io(format!("reading {}", self.meta_root.display()), e))?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Worktree directory recorded in the metadata for `slug`, if readable.
    pub fn recorded_path(&self, slug: &str) -> Result<Option<PathBuf>> {
        let file = self.metadata_dir(slug)?.join(GITDIR_FILE);
        match fs::read_to_string(&file) {
            Ok(content) => {
                let link = PathBuf::from(content.trim());
                Ok(link.parent().map(Path::to_path_buf))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(format!("reading {}", file.display()), e)),
        }
    }

    /// Open the linked worktree checked out at `path`.
    ///
    /// Fails with [`Error::WorktreeInvalid`] unless `path/.git` is a git-link
    /// file pointing at metadata of *this* repository and HEAD resolves.
    pub fn open(&self, path: &Path) -> Result<LinkedWorktree> {
        let invalid = |reason: String| Error::WorktreeInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let link = path.join(GIT_LINK);
        let meta = match fs::symlink_metadata(&link) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(invalid("no .git link file".into()))
            }
            Err(e) => return Err(Error::io(format!("inspecting {}", link.display()), e)),
        };
        if !meta.is_file() {
            return Err(invalid(".git is not a link file".into()));
        }

        let gitdir = read_git_link(&link).map_err(invalid)?;
        let gitdir = if gitdir.is_absolute() {
            gitdir
        } else {
            path.join(gitdir)
        };
        if !gitdir.is_dir() {
            return Err(invalid(format!(
                "git metadata {} does not exist",
                gitdir.display()
            )));
        }

        let belongs_here = match (
            gitdir.parent().and_then(|p| p.canonicalize().ok()),
            self.meta_root.canonicalize().ok(),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if !belongs_here {
            return Err(invalid(format!(
                "git metadata {} belongs to another repository",
                gitdir.display()
            )));
        }

        let worktree = LinkedWorktree {
            path: path.to_path_buf(),
            slug: gitdir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        worktree
            .head()
            .map_err(|e| invalid(format!("HEAD does not resolve: {e}")))?;
        Ok(worktree)
    }

    /// Remove git's metadata for `slug`. Never touches the worktree directory.
    ///
    /// Already-absent metadata is not an error.
    pub fn remove(&self, slug: &str) -> Result<()> {
        let dir = self.metadata_dir(slug)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::debug!(slug, "removed linked worktree metadata");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("removing {}", dir.display()), e)),
        }
    }

    /// Create a linked worktree at `path` with a detached HEAD at `commit`.
    ///
    /// `path` must be absent or an empty directory whose basename is `slug`.
    /// Detached mode keeps git from inventing a branch named after the slug.
    pub fn add_detached(&self, path: &Path, slug: &str, commit: &str) -> Result<()> {
        if path.file_name().and_then(|n| n.to_str()) != Some(slug) {
            return Err(Error::InvalidName(format!(
                "{} does not end in worktree slug '{slug}'",
                path.display()
            )));
        }
        self.metadata_dir(slug)?;

        let path_str = path.to_string_lossy().into_owned();
        let args = [
            "worktree",
            "add",
            "--detach",
            "--quiet",
            path_str.as_str(),
            commit,
        ];
        let output = run_git(&args, &self.repo_root)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("already exists") || stderr.contains("already registered") {
                return Err(Error::WorktreeAlreadyExists(path.display().to_string()));
            }
            return Err(git_failure(&args, &output));
        }

        // A concurrent add may have claimed `slug`, in which case git picks
        // a suffixed name for ours.
        let registered = read_git_link(&path.join(GIT_LINK))
            .ok()
            .and_then(|gitdir| gitdir.file_name().map(|n| n.to_string_lossy().into_owned()));
        match registered {
            Some(name) if name == slug => Ok(()),
            other => {
                if let Some(name) = other.as_deref() {
                    if let Err(e) = self.remove(name) {
                        tracing::warn!(slug = name, error = %e, "could not remove stray worktree metadata");
                    }
                }
                self.restore_link(path, slug);
                Err(Error::WorktreeAlreadyExists(format!(
                    "{} (registered concurrently by another process)",
                    path.display()
                )))
            }
        }
    }

    /// Point `path/.git` back at the metadata for `slug` if that metadata
    /// records `path` as its worktree.
    fn restore_link(&self, path: &Path, slug: &str) {
        if let Ok(Some(recorded)) = self.recorded_path(slug) {
            if recorded == path {
                let content = format!("gitdir: {}\n", self.meta_root.join(slug).display());
                if let Err(e) = fs::write(path.join(GIT_LINK), content) {
                    tracing::warn!(path = %path.display(), error = %e, "could not restore git link");
                }
            }
        }
    }
}

/// Parse a `gitdir: <path>` git-link file.
fn read_git_link(link: &Path) -> std::result::Result<PathBuf, String> {
    let content =
        fs::read_to_string(link).map_err(|e| format!("cannot read {}: {e}", link.display()))?;
    content
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))
        .map(|p| PathBuf::from(p.trim()))
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| format!("{} is not a git-link file", link.display()))
}

/// An opened linked worktree.
#[derive(Debug, Clone)]
pub struct LinkedWorktree {
    path: PathBuf,
    slug: String,
}

impl LinkedWorktree {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name git knows this worktree by.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Full hash of the worktree's HEAD commit.
    pub fn head(&self) -> Result<String> {
        run_git_checked(&["rev-parse", "--verify", "HEAD"], &self.path)
    }

    /// Short name of the checked-out branch, `None` when detached.
    pub fn branch(&self) -> Result<Option<String>> {
        let args = ["symbolic-ref", "-q", "--short", "HEAD"];
        let output = run_git(&args, &self.path)?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            Some(1) => Ok(None),
            _ => Err(git_failure(&args, &output)),
        }
    }

    /// Check out an existing branch in this worktree.
    ///
    /// Git refuses if the branch is checked out in another worktree.
    pub fn switch(&self, branch: &str) -> Result<()> {
        run_git_checked(&["switch", "--quiet", branch], &self.path)?;
        Ok(())
    }
}

/// First 7 characters of a commit hash, for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
