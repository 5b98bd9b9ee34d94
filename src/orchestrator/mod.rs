//! Worktree lifecycle orchestration
//!
//! [`WorktreeOrchestrator`] keeps the three pieces of state of a worktree in
//! agreement: the registry entry, the directory handed out by the
//! [`WorktreeDirProvider`], and git's linked-worktree metadata. On every
//! mutating path the registry write is the last step, so an interrupted
//! operation leaves at most an orphan directory or orphan metadata behind.

mod create;
mod list;
mod prune;
mod remove;

pub use list::{list_all_projects, WorktreeListing, DETACHED};
pub use prune::PruneReport;
pub use remove::{BranchOutcome, RemoveOptions, RemoveOutcome};

use std::path::Path;

use crate::config::Config;
use crate::error::{ErrorKind, Result};
use crate::git::GitRepo;
use crate::project::ProjectContext;
use crate::registry::{HealthProbe, ProjectHandle, Registry};
use crate::workspace::{ProjectWorkspace, WorktreeDirProvider};

/// Composes git, the workspace directories and the registry for one project.
#[derive(Debug)]
pub struct WorktreeOrchestrator<P: WorktreeDirProvider = ProjectWorkspace> {
    project: ProjectContext,
    git: GitRepo,
    dirs: P,
    registry: Registry,
}

impl WorktreeOrchestrator<ProjectWorkspace> {
    /// Orchestrator for the project containing `cwd`.
    pub fn discover(cwd: &Path, config: Config) -> Result<Self> {
        let registry = Registry::new(config);
        let (project, git) = ProjectContext::discover(cwd, &registry)?;
        let dirs = ProjectWorkspace::new(registry.config(), &project.slug);
        Ok(Self::new(project, git, dirs, registry))
    }
}

impl<P: WorktreeDirProvider> WorktreeOrchestrator<P> {
    pub fn new(project: ProjectContext, git: GitRepo, dirs: P, registry: Registry) -> Self {
        Self {
            project,
            git,
            dirs,
            registry,
        }
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn git(&self) -> &GitRepo {
        &self.git
    }

    pub fn dirs(&self) -> &P {
        &self.dirs
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn entries(&self) -> ProjectHandle<'_> {
        self.registry.project(&self.project)
    }

    /// Delete a branch with the facade's safety checks.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        self.git.delete_branch(name)
    }
}

impl<P: WorktreeDirProvider> HealthProbe for WorktreeOrchestrator<P> {
    fn directory_present(&self, slug: &str) -> Result<bool> {
        match self.dirs.get_dir(slug) {
            Ok(_) => Ok(true),
            Err(e) if e.is(ErrorKind::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn git_metadata_present(&self, slug: &str) -> Result<bool> {
        self.git.worktrees().exists(slug)
    }
}
