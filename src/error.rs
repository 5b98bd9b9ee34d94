//! Error taxonomy for worktree lifecycle operations
//!
//! Every failure the core can produce maps to exactly one [`ErrorKind`].
//! Callers classify errors with [`Error::kind`] / [`Error::is`], never by
//! matching on the rendered message. Step context added with
//! [`ResultExt::step`] is transparent to classification.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Stable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotARepository,
    BranchNotFound,
    BranchNotMerged,
    IsCurrentBranch,
    BranchConfig,
    WorktreeNotRegistered,
    WorktreeInvalid,
    WorktreeAlreadyExists,
    RegistryCorrupt,
    Conflict,
    NotFound,
    InvalidName,
    Refused,
    Git,
    Io,
    Canceled,
    Aggregate,
}

/// Errors that can occur while managing worktrees
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("branch '{0}' has commits that are not merged into HEAD")]
    BranchNotMerged(String),

    #[error("branch '{0}' is checked out in the main checkout")]
    IsCurrentBranch(String),

    /// The branch reference was deleted but its `branch.<name>.*` config was not
    #[error("branch '{branch}' deleted but its config could not be removed: {reason}")]
    BranchConfig { branch: String, reason: String },

    #[error("no worktree registered under '{0}'")]
    WorktreeNotRegistered(String),

    #[error("{} is not a valid linked worktree: {reason}", path.display())]
    WorktreeInvalid { path: PathBuf, reason: String },

    #[error("worktree already exists: {0}")]
    WorktreeAlreadyExists(String),

    #[error("registry {} is corrupt: {reason}", path.display())]
    RegistryCorrupt { path: PathBuf, reason: String },

    #[error("{0}")]
    Conflict(String),

    #[error("revision '{0}' not found")]
    RevisionNotFound(String),

    #[error("directory not found: {}", .0.display())]
    DirNotFound(PathBuf),

    #[error("invalid worktree name '{0}'")]
    InvalidName(String),

    /// A safety check refused a destructive operation
    #[error("refusing to remove worktree '{name}': {reason}")]
    Refused { name: String, reason: String },

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("operation canceled")]
    Canceled,

    #[error("{operation}: {} failed ({})", failures.len(), failures.join("; "))]
    Aggregate {
        operation: String,
        failures: Vec<String>,
    },

    #[error("{step}: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error, looking through any step wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotARepository { .. } => ErrorKind::NotARepository,
            Error::BranchNotFound(_) => ErrorKind::BranchNotFound,
            Error::BranchNotMerged(_) => ErrorKind::BranchNotMerged,
            Error::IsCurrentBranch(_) => ErrorKind::IsCurrentBranch,
            Error::BranchConfig { .. } => ErrorKind::BranchConfig,
            Error::WorktreeNotRegistered(_) => ErrorKind::WorktreeNotRegistered,
            Error::WorktreeInvalid { .. } => ErrorKind::WorktreeInvalid,
            Error::WorktreeAlreadyExists(_) => ErrorKind::WorktreeAlreadyExists,
            Error::RegistryCorrupt { .. } => ErrorKind::RegistryCorrupt,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::RevisionNotFound(_) | Error::DirNotFound(_) => ErrorKind::NotFound,
            Error::InvalidName(_) => ErrorKind::InvalidName,
            Error::Refused { .. } => ErrorKind::Refused,
            Error::Git { .. } => ErrorKind::Git,
            Error::Io { .. } => ErrorKind::Io,
            Error::Canceled => ErrorKind::Canceled,
            Error::Aggregate { .. } => ErrorKind::Aggregate,
            Error::Step { source, .. } => source.kind(),
        }
    }

    /// Returns true if this error (or the error it wraps) is of `kind`.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    /// Build an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap this error with the name of the step that failed.
    pub fn at_step(self, step: impl Into<String>) -> Self {
        Error::Step {
            step: step.into(),
            source: Box::new(self),
        }
    }
}

/// Extension for attaching step context to core results
pub trait ResultExt<T> {
    fn step(self, step: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn step(self, step: &str) -> Result<T> {
        self.map_err(|e| e.at_step(step))
    }
}

/// Classify an `anyhow` error produced by wrapping a core [`Error`].
pub fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::kind)
}
