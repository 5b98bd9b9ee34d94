//! Location of berth's user-level state
//!
//! ```text
//! <CONFIG_ROOT>/
//!   projects.yaml
//!   projects.yaml.lock
//!   projects/<project-slug>/worktrees/<worktree-slug>/
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable overriding the config root.
pub const CONFIG_DIR_ENV: &str = "BERTH_CONFIG_DIR";

/// Name of the registry file inside the config root.
pub const REGISTRY_FILE_NAME: &str = "projects.yaml";

/// Suffix appended to the registry file name for its advisory lockfile.
pub const LOCK_FILE_SUFFIX: &str = ".lock";

const APP_DIR_NAME: &str = "berth";

/// Resolved filesystem configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    root: PathBuf,
}

impl Config {
    /// Resolve the config root from the environment.
    ///
    /// Uses `$BERTH_CONFIG_DIR` when set and non-empty, otherwise the
    /// platform config directory (`$XDG_CONFIG_HOME` on Linux), otherwise
    /// `$HOME/.config`.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Self::with_root(PathBuf::from(dir));
        }

        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or_else(|| {
                Error::io(
                    "resolving config directory",
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no config or home directory available",
                    ),
                )
            })?;
        Self::with_root(base.join(APP_DIR_NAME))
    }

    /// Use an explicit config root. Relative paths are resolved against the
    /// current directory so every derived path is absolute.
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map_err(|e| Error::io("resolving current directory", e))?
                .join(root)
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE_NAME)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root
            .join(format!("{REGISTRY_FILE_NAME}{LOCK_FILE_SUFFIX}"))
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// Directory holding every worktree of the project with `project_slug`.
    pub fn worktrees_root(&self, project_slug: &str) -> PathBuf {
        self.projects_dir().join(project_slug).join("worktrees")
    }
}
