//! Whole-file registry persistence
//!
//! The registry is read fully on every call; nothing is cached between
//! reads. Mutations go through [`Registry::update`], which holds the
//! advisory lock across read, mutate, write and rename.

use std::path::PathBuf;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fs::{atomic_write, FileLock};
use crate::project::ProjectContext;
use crate::slug::slugify;

use super::handle::ProjectHandle;
use super::schema::{ProjectEntry, RegistryFile};

/// Handle on the registry file of one config root.
#[derive(Debug, Clone)]
pub struct Registry {
    config: Config,
}

impl Registry {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> PathBuf {
        self.config.registry_path()
    }

    /// Read and normalize the registry.
    ///
    /// A missing or empty file is an empty registry. Anything that does not
    /// decode is [`Error::RegistryCorrupt`]; the file is never cleared.
    pub fn load(&self) -> Result<RegistryFile> {
        let path = self.path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RegistryFile::default());
            }
            Err(e) => return Err(Error::io(format!("reading {}", path.display()), e)),
        };
        self.parse(&content)
    }

    fn parse(&self, content: &str) -> Result<RegistryFile> {
        if content.trim().is_empty() {
            return Ok(RegistryFile::default());
        }
        let mut file: RegistryFile =
            serde_yaml::from_str(content).map_err(|e| self.corrupt(e.to_string()))?;
        self.normalize(&mut file)?;
        Ok(file)
    }

    /// Fill derived fields and reject records that break the entry invariants.
    fn normalize(&self, file: &mut RegistryFile) -> Result<()> {
        for (project_slug, project) in file.projects.iter_mut() {
            let root = self.config.worktrees_root(project_slug);
            for (name, record) in project.worktrees.iter_mut() {
                if name.is_empty() {
                    return Err(
                        self.corrupt(format!("empty worktree name in project '{project_slug}'"))
                    );
                }

                let slug = match record.legacy_slug.take() {
                    Some(slug) if !slug.is_empty() => slug,
                    _ => slugify(name),
                };
                match &record.path {
                    Some(path) if path.as_os_str().is_empty() => {
                        record.path = Some(root.join(&slug));
                    }
                    None => record.path = Some(root.join(&slug)),
                    Some(path) if !path.is_absolute() => {
                        return Err(self.corrupt(format!(
                            "worktree '{name}' in project '{project_slug}' has relative path {}",
                            path.display()
                        )));
                    }
                    Some(_) => {}
                }

                if record.branch.as_deref().map_or(true, str::is_empty) {
                    record.branch = Some(name.clone());
                }
            }
        }
        Ok(())
    }

    fn corrupt(&self, reason: String) -> Error {
        Error::RegistryCorrupt {
            path: self.path(),
            reason,
        }
    }

    /// Read-modify-write under the registry lock.
    ///
    /// Returns whether the file was rewritten. When `mutate` leaves the
    /// document unchanged nothing is written.
    pub fn update<F>(&self, cancel: &CancelToken, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut RegistryFile) -> Result<()>,
    {
        cancel.check()?;
        let _lock = FileLock::acquire(&self.config.lock_path(), cancel)?;

        let current = self.load()?;
        let mut next = current.clone();
        mutate(&mut next)?;
        if next == current {
            tracing::debug!(registry = %self.path().display(), "registry unchanged");
            return Ok(false);
        }

        cancel.check()?;
        let yaml = serde_yaml::to_string(&next).map_err(|e| {
            Error::io(
                "serializing registry",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            )
        })?;
        atomic_write(&self.path(), yaml.as_bytes())?;
        tracing::debug!(registry = %self.path().display(), "registry written");
        Ok(true)
    }

    /// Registered project whose main checkout is `root`.
    pub fn find_project_by_root(
        &self,
        root: &std::path::Path,
    ) -> Result<Option<(String, ProjectEntry)>> {
        Ok(self
            .load()?
            .projects
            .into_iter()
            .find(|(_, entry)| same_path(&entry.root, root)))
    }

    pub fn project(&self, context: &ProjectContext) -> ProjectHandle<'_> {
        ProjectHandle::new(self, context.clone())
    }
}

fn same_path(a: &std::path::Path, b: &std::path::Path) -> bool {
    if a.as_os_str().is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
