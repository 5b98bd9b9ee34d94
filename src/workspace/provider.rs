//! Worktree directory provider
//!
//! Owns the namespace `<CONFIG_ROOT>/projects/<project-slug>/worktrees/`.
//! Every path handed out is absolute, lives directly under that root and
//! ends in the slug of the requested name. The provider never looks inside
//! a directory; emptiness and git-link checks belong to the orchestrator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::slug::slugify;

/// Maps worktree names to directories.
///
/// A name already in slug form maps to itself, so callers holding a
/// worktree's slug may pass it wherever a name is expected.
pub trait WorktreeDirProvider {
    /// Directory containing every worktree directory of the project.
    fn worktrees_root(&self) -> &Path;

    /// Create (idempotently) and return the directory for `name`.
    fn get_or_create_dir(&self, name: &str) -> Result<PathBuf>;

    /// Return the directory for `name`, or [`Error::DirNotFound`].
    fn get_dir(&self, name: &str) -> Result<PathBuf>;

    /// Recursively remove the directory for `name`; absent is not an error.
    fn delete_dir(&self, name: &str) -> Result<()>;

    /// Absolute directory path for `name`, whether or not it exists.
    fn dir_path(&self, name: &str) -> Result<PathBuf> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(self.worktrees_root().join(slug))
    }
}

/// Filesystem-backed provider for one project.
#[derive(Debug, Clone)]
pub struct ProjectWorkspace {
    root: PathBuf,
}

impl ProjectWorkspace {
    pub fn new(config: &Config, project_slug: &str) -> Self {
        Self {
            root: config.worktrees_root(project_slug),
        }
    }
}

impl WorktreeDirProvider for ProjectWorkspace {
    fn worktrees_root(&self) -> &Path {
        &self.root
    }

    fn get_or_create_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir_path(name)?;
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder
            .create(&path)
            .map_err(|e| Error::io(format!("creating worktree directory {}", path.display()), e))?;
        Ok(path)
    }

    fn get_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir_path(name)?;
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(path),
            Ok(_) => Err(Error::WorktreeInvalid {
                path,
                reason: "exists but is not a directory".into(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::DirNotFound(path)),
            Err(e) => Err(Error::io(format!("inspecting {}", path.display()), e)),
        }
    }

    fn delete_dir(&self, name: &str) -> Result<()> {
        let path = self.dir_path(name)?;
        match fs::remove_dir_all(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed worktree directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("removing {}", path.display()), e)),
        }
    }
}
