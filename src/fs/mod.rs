//! Filesystem helpers shared by the registry

pub mod locking;

pub use locking::{atomic_write, FileLock};

use std::path::Path;

use crate::error::{Error, Result};

/// Returns true if `path` is a directory with at least one entry.
pub fn dir_has_entries(path: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(path)
        .map_err(|e| Error::io(format!("reading directory {}", path.display()), e))?;
    Ok(entries.next().is_some())
}
