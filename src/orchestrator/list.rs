use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::Result;
use crate::git::{short_hash, GitRepo};
use crate::project::ProjectContext;
use crate::registry::{Registry, WorktreeHandle, WorktreeHealth};
use crate::workspace::{ProjectWorkspace, WorktreeDirProvider};

use super::WorktreeOrchestrator;

/// Branch label for a worktree whose HEAD is detached
pub const DETACHED: &str = "(detached)";

const ORPHAN_REASON: &str = "git worktree metadata has no registry entry";

/// One row of `berth worktree list`.
#[derive(Debug, Clone, Serialize)]
pub struct WorktreeListing {
    pub project: String,
    pub name: String,
    pub path: PathBuf,
    /// Short HEAD hash, when the worktree could be opened
    pub head: Option<String>,
    pub branch: String,
    pub modified: Option<DateTime<Local>>,
    pub status: String,
    pub prunable: bool,
    /// Git knows the worktree but the registry does not
    pub orphan: bool,
}

impl<P: WorktreeDirProvider> WorktreeOrchestrator<P> {
    /// Describe every registered worktree, plus orphaned git metadata under
    /// this project's worktrees root.
    ///
    /// Read-only: stale entries are reported, never dropped.
    pub fn list_worktrees(&self) -> Result<Vec<WorktreeListing>> {
        let handles = self.entries().list_worktrees()?;
        let mut listings: Vec<WorktreeListing> =
            handles.iter().map(|h| self.describe(h)).collect();

        let known: HashSet<&str> = handles.iter().map(WorktreeHandle::slug).collect();
        listings.extend(self.orphans(&known));
        Ok(listings)
    }

    fn describe(&self, handle: &WorktreeHandle) -> WorktreeListing {
        let mut health = handle.status(self).clone();
        let mut listing = WorktreeListing {
            project: self.project.slug.clone(),
            name: handle.name().to_string(),
            path: handle.path().to_path_buf(),
            head: None,
            branch: handle.branch().to_string(),
            modified: None,
            status: String::new(),
            prunable: false,
            orphan: false,
        };

        if health.dir_present {
            if let Ok(dir) = self.dirs.get_dir(handle.slug()) {
                if let Err(reason) = self.inspect(&dir, &mut listing) {
                    // Directory and metadata both exist but do not form a worktree
                    if health.git_present {
                        health = WorktreeHealth::failed(reason);
                    }
                }
            }
        }

        listing.status = health.label();
        listing.prunable = health.is_prunable();
        listing
    }

    /// Fill HEAD, branch and mtime from the worktree at `dir`.
    fn inspect(&self, dir: &Path, listing: &mut WorktreeListing) -> std::result::Result<(), String> {
        listing.modified = modified_time(dir);
        let worktree = self.git.open_worktree(dir).map_err(|e| e.to_string())?;
        listing.head = worktree.head().ok().map(|h| short_hash(&h).to_string());
        match worktree.branch() {
            Ok(Some(branch)) => listing.branch = branch,
            Ok(None) => listing.branch = DETACHED.to_string(),
            Err(e) => tracing::debug!(path = %dir.display(), error = %e, "cannot read branch"),
        }
        Ok(())
    }

    fn orphans(&self, known: &HashSet<&str>) -> Vec<WorktreeListing> {
        let slugs = match self.git.worktrees().list() {
            Ok(slugs) => slugs,
            Err(e) => {
                tracing::warn!(error = %e, "cannot enumerate git worktree metadata");
                return Vec::new();
            }
        };

        let root = self.dirs.worktrees_root();
        let canonical_root = root.canonicalize().ok();
        let under_root = |path: &Path| {
            path.starts_with(root)
                || canonical_root
                    .as_deref()
                    .is_some_and(|canonical| path.starts_with(canonical))
        };

        slugs
            .into_iter()
            .filter(|slug| !known.contains(slug.as_str()))
            .filter_map(|slug| {
                let path = self.git.worktrees().recorded_path(&slug).ok().flatten()?;
                if !under_root(&path) {
                    return None;
                }
                let mut listing = WorktreeListing {
                    project: self.project.slug.clone(),
                    name: slug,
                    path,
                    head: None,
                    branch: "-".to_string(),
                    modified: None,
                    status: WorktreeHealth::failed(ORPHAN_REASON).label(),
                    prunable: false,
                    orphan: true,
                };
                if listing.path.is_dir() {
                    let dir = listing.path.clone();
                    let _ = self.inspect(&dir, &mut listing);
                }
                Some(listing)
            })
            .collect()
    }
}

/// List the worktrees of every registered project.
///
/// A project whose root no longer opens as a repository still lists its
/// entries, each with an error status.
pub fn list_all_projects(registry: &Registry) -> Result<Vec<WorktreeListing>> {
    let mut listings = Vec::new();
    for (slug, entry) in registry.load()?.projects {
        let context = ProjectContext {
            name: if entry.name.is_empty() {
                slug.clone()
            } else {
                entry.name.clone()
            },
            slug: slug.clone(),
            root: entry.root.clone(),
        };

        match GitRepo::open(&entry.root) {
            Ok(git) => {
                let dirs = ProjectWorkspace::new(registry.config(), &slug);
                let orchestrator =
                    WorktreeOrchestrator::new(context, git, dirs, registry.clone());
                listings.extend(orchestrator.list_worktrees()?);
            }
            Err(e) => {
                let health = WorktreeHealth::failed(e.to_string());
                for (name, record) in entry.worktrees {
                    listings.push(WorktreeListing {
                        project: slug.clone(),
                        branch: record.branch.unwrap_or_else(|| name.clone()),
                        name,
                        path: record.path.unwrap_or_default(),
                        head: None,
                        modified: None,
                        status: health.label(),
                        prunable: false,
                        orphan: false,
                    });
                }
            }
        }
    }
    Ok(listings)
}

fn modified_time(path: &Path) -> Option<DateTime<Local>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}
