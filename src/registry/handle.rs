//! Project and worktree views over the registry

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::project::ProjectContext;
use crate::slug::{is_slug, slugify};

use super::health::{HealthProbe, WorktreeHealth};
use super::schema::WorktreeRecord;
use super::store::Registry;

/// Persisted record of one worktree, with all derived fields filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub name: String,
    pub path: PathBuf,
    pub branch: String,
    /// Directory and git metadata name; not persisted
    pub slug: String,
}

impl WorktreeEntry {
    /// Entry for a worktree checked out on a branch named like itself.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = path.into();
        Self {
            slug: effective_slug(&name, &path),
            branch: name.clone(),
            name,
            path,
        }
    }

    fn from_record(name: &str, record: WorktreeRecord) -> Self {
        let path = record.path.unwrap_or_default();
        Self {
            slug: effective_slug(name, &path),
            name: name.to_string(),
            path,
            branch: record.branch.unwrap_or_else(|| name.to_string()),
        }
    }
}

/// Slug a worktree lives under.
///
/// The recorded directory name wins when it is slug-shaped. Legacy entries
/// stored their slug explicitly and it may differ from `slugify(name)`; the
/// path derived from it is the only place it survives.
fn effective_slug(name: &str, path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| is_slug(n))
        .map(str::to_string)
        .unwrap_or_else(|| slugify(name))
}

/// Access to one project's worktrees in the registry.
#[derive(Debug)]
pub struct ProjectHandle<'r> {
    registry: &'r Registry,
    context: ProjectContext,
}

impl<'r> ProjectHandle<'r> {
    pub(crate) fn new(registry: &'r Registry, context: ProjectContext) -> Self {
        Self { registry, context }
    }

    /// Registered worktrees, ordered by name.
    pub fn list_worktrees(&self) -> Result<Vec<WorktreeHandle>> {
        let mut file = self.registry.load()?;
        let Some(project) = file.projects.remove(&self.context.slug) else {
            return Ok(Vec::new());
        };
        Ok(project
            .worktrees
            .into_iter()
            .map(|(name, record)| WorktreeHandle::new(WorktreeEntry::from_record(&name, record)))
            .collect())
    }

    pub fn get_worktree(&self, name: &str) -> Result<Option<WorktreeHandle>> {
        let mut file = self.registry.load()?;
        Ok(file
            .projects
            .remove(&self.context.slug)
            .and_then(|mut project| project.worktrees.remove(name))
            .map(|record| WorktreeHandle::new(WorktreeEntry::from_record(name, record))))
    }

    /// Upsert `entry` by name. Returns whether the registry file changed.
    ///
    /// The project entry is created on first use; existing project fields
    /// and unknown keys of an existing record are kept.
    pub fn put_worktree(&self, entry: &WorktreeEntry, cancel: &CancelToken) -> Result<bool> {
        self.registry.update(cancel, |file| {
            let project = file.projects.entry(self.context.slug.clone()).or_default();
            if project.name.is_empty() {
                project.name = self.context.name.clone();
            }
            if project.root.as_os_str().is_empty() {
                project.root = self.context.root.clone();
            }
            let record = project.worktrees.entry(entry.name.clone()).or_default();
            record.path = Some(entry.path.clone());
            record.branch = Some(entry.branch.clone());
            Ok(())
        })
    }

    /// Drop the entry for `name`. Returns whether it was present.
    pub fn delete_worktree(&self, name: &str, cancel: &CancelToken) -> Result<bool> {
        let mut removed = false;
        self.registry.update(cancel, |file| {
            if let Some(project) = file.projects.get_mut(&self.context.slug) {
                removed = project.worktrees.remove(name).is_some();
            }
            Ok(())
        })?;
        Ok(removed)
    }
}

/// A registered worktree plus its lazily computed health.
#[derive(Debug)]
pub struct WorktreeHandle {
    entry: WorktreeEntry,
    health: OnceLock<WorktreeHealth>,
}

impl WorktreeHandle {
    pub fn new(entry: WorktreeEntry) -> Self {
        Self {
            entry,
            health: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn slug(&self) -> &str {
        &self.entry.slug
    }

    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    pub fn branch(&self) -> &str {
        &self.entry.branch
    }

    /// Health computed on first call and reused afterwards.
    pub fn status(&self, probe: &dyn HealthProbe) -> &WorktreeHealth {
        self.health
            .get_or_init(|| WorktreeHealth::probe(probe, &self.entry.slug))
    }

    pub fn is_prunable(&self, probe: &dyn HealthProbe) -> bool {
        self.status(probe).is_prunable()
    }

    pub fn is_healthy(&self, probe: &dyn HealthProbe) -> bool {
        self.status(probe).is_healthy()
    }
}
