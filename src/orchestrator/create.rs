use std::path::{Path, PathBuf};

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::fs::dir_has_entries;
use crate::git::{LinkedWorktree, GIT_LINK};
use crate::registry::WorktreeEntry;
use crate::slug::slugify;
use crate::workspace::WorktreeDirProvider;

use super::{WorktreeOrchestrator, DETACHED};

impl<P: WorktreeDirProvider> WorktreeOrchestrator<P> {
    /// Create (or adopt) the worktree for branch `name`.
    ///
    /// `base` is only used when the branch does not exist yet; empty means
    /// HEAD of the main checkout. Returns the absolute worktree path once
    /// the directory, the git metadata and the registry entry are in place.
    pub fn create_worktree(&self, name: &str, base: &str, cancel: &CancelToken) -> Result<PathBuf> {
        self.validate_name(name)?;
        cancel.check()?;

        let registered = self.entries().list_worktrees()?;
        // A re-run for a registered name keeps the slug it was created under
        let slug = registered
            .iter()
            .find(|h| h.name() == name)
            .map_or_else(|| slugify(name), |h| h.slug().to_string());
        if let Some(other) = registered
            .iter()
            .find(|h| h.slug() == slug && h.name() != name)
        {
            return Err(Error::WorktreeAlreadyExists(format!(
                "'{name}' would share directory '{slug}' with '{}'",
                other.name()
            )));
        }

        let pre_existed = self.dirs.dir_path(&slug)?.exists();
        let path = self
            .dirs
            .get_or_create_dir(&slug)
            .step("creating worktree directory")?;

        if dir_has_entries(&path)? {
            let worktree = self
                .git
                .open_worktree(&path)
                .step("reusing existing worktree directory")?;
            self.warn_on_branch_mismatch(&worktree, name);
            tracing::info!(worktree = name, path = %path.display(), "worktree already present");
            self.record(name, &path, cancel)?;
            return Ok(path);
        }

        if self.git.worktrees().exists(&slug)? {
            if path.join(GIT_LINK).exists() {
                // The directory was empty a moment ago: another process is
                // creating this worktree right now.
                return Err(Error::WorktreeAlreadyExists(path.display().to_string()));
            }
            // Metadata without a checkout cannot be adopted
            tracing::warn!(slug = %slug, "removing orphaned git worktree metadata");
            if let Err(e) = self.git.worktrees().remove(&slug) {
                tracing::warn!(slug = %slug, error = %e, "could not remove orphaned metadata");
            }
        }

        if let Err(e) = self.materialize(&path, &slug, name, base) {
            self.clean_up_failed_create(&path, &slug, pre_existed, &e);
            return Err(e);
        }

        self.record(name, &path, cancel)?;
        tracing::info!(worktree = name, path = %path.display(), "created worktree");
        Ok(path)
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() || slugify(name).is_empty() || !self.git.is_valid_branch_name(name)? {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(())
    }

    fn materialize(&self, path: &Path, slug: &str, name: &str, base: &str) -> Result<()> {
        if self.git.branch_exists(name)? {
            if !base.is_empty() {
                tracing::debug!(branch = name, base, "branch exists, ignoring base");
            }
            self.git
                .add_with_existing_branch(path, slug, name)
                .step("creating git worktree")?;
        } else {
            let commit = self
                .git
                .resolve_revision(base)
                .step("resolving base revision")?;
            self.git
                .add_with_new_branch(path, slug, name, &commit)
                .step("creating git worktree")?;
        }
        Ok(())
    }

    /// Undo what a failed create left behind.
    ///
    /// Metadata and checkout are only removed when git registered the
    /// worktree for this call. Otherwise git has already discarded its own
    /// partial state, or another process owns it, and at most an empty
    /// directory is removed.
    fn clean_up_failed_create(&self, path: &Path, slug: &str, pre_existed: bool, err: &Error) {
        if err.is(ErrorKind::WorktreeAlreadyExists) {
            if !pre_existed {
                remove_empty_dir(path);
            }
            return;
        }
        if !self.registered_at(path, slug) {
            remove_empty_dir(path);
            return;
        }
        if let Err(e) = self.git.worktrees().remove(slug) {
            tracing::warn!(slug, error = %e, "could not remove partial git metadata");
        }
        if let Err(e) = self.dirs.delete_dir(slug) {
            tracing::warn!(path = %path.display(), error = %e, "could not remove partial worktree directory");
        }
    }

    /// Whether git's metadata for `slug` records `path` as its worktree.
    fn registered_at(&self, path: &Path, slug: &str) -> bool {
        match self.git.worktrees().recorded_path(slug) {
            Ok(Some(recorded)) => {
                recorded == path
                    || matches!(
                        (recorded.canonicalize(), path.canonicalize()),
                        (Ok(a), Ok(b)) if a == b
                    )
            }
            _ => false,
        }
    }

    fn warn_on_branch_mismatch(&self, worktree: &LinkedWorktree, name: &str) {
        match worktree.branch() {
            Ok(Some(branch)) if branch == name => {}
            Ok(other) => tracing::warn!(
                worktree = name,
                checked_out = other.as_deref().unwrap_or(DETACHED),
                "adopting worktree checked out on a different branch"
            ),
            Err(e) => tracing::warn!(worktree = name, error = %e, "could not read worktree branch"),
        }
    }

    fn record(&self, name: &str, path: &Path, cancel: &CancelToken) -> Result<()> {
        let entry = WorktreeEntry::new(name, path);
        self.entries()
            .put_worktree(&entry, cancel)
            .step("recording worktree in registry")?;
        Ok(())
    }
}

/// Remove `path` if it is still an empty directory.
fn remove_empty_dir(path: &Path) {
    match std::fs::remove_dir(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed empty worktree directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        // Populated by a concurrent create that won the race
        Err(_) if path.join(GIT_LINK).exists() => {
            tracing::debug!(path = %path.display(), "directory now holds another worktree");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not remove empty worktree directory")
        }
    }
}
