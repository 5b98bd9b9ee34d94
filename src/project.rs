//! The project a command operates on

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::git::GitRepo;
use crate::registry::Registry;
use crate::slug::slugify;

/// Resolved identity of a project: its slug, display name and main checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub slug: String,
    pub name: String,
    pub root: PathBuf,
}

impl ProjectContext {
    /// Context for a project named `name`, slugged from the name.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(Error::InvalidName(name));
        }
        Ok(Self {
            slug,
            name,
            root: root.into(),
        })
    }

    /// Resolve the project containing `cwd`.
    ///
    /// A project registered with the same main checkout wins. Otherwise the
    /// checkout's directory name is used, which fails with
    /// [`Error::Conflict`] if that slug already belongs to another root.
    pub fn discover(cwd: &Path, registry: &Registry) -> Result<(Self, GitRepo)> {
        let repo = GitRepo::open(cwd)?;
        let root = repo.root().to_path_buf();

        if let Some((slug, entry)) = registry.find_project_by_root(&root)? {
            let name = if entry.name.is_empty() {
                slug.clone()
            } else {
                entry.name
            };
            tracing::debug!(project = %slug, "using registered project");
            return Ok((Self { slug, name, root }, repo));
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let context = Self::new(name, &root)?;

        let file = registry.load()?;
        if let Some(other) = file.projects.get(&context.slug) {
            if !other.root.as_os_str().is_empty() && other.root != root {
                return Err(Error::Conflict(format!(
                    "project '{}' is already registered for {}",
                    context.slug,
                    other.root.display()
                )));
            }
        }
        Ok((context, repo))
    }
}
