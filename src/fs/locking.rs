//! Advisory locking and atomic replacement for shared state files
//!
//! Writers take an exclusive `fs2` lock on a sibling lockfile for the whole
//! read-modify-write cycle and replace the target with an atomic rename, so
//! readers never need the lock: they see either the old or the new file.
//!
//! Advisory locks are cooperative - all writers must go through
//! [`FileLock::acquire`] for the locking to be effective.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};

/// Interval between lock attempts while another process holds the lock.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exclusive advisory lock on a lockfile, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Block until the exclusive lock on `path` is acquired.
    ///
    /// Creates the lockfile (and its parent directory) if needed. Waiting
    /// stops with [`Error::Conflict`] once `cancel` is tripped.
    pub fn acquire(path: &Path, cancel: &CancelToken) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let mut opts = OpenOptions::new();
        opts.create(true).read(true).write(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let file = opts
            .open(path)
            .map_err(|e| Error::io(format!("opening lockfile {}", path.display()), e))?;

        let mut waited = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock || is_contended(&e) => {
                    if cancel.is_canceled() {
                        return Err(Error::Conflict(format!(
                            "could not acquire lock {} before cancellation",
                            path.display()
                        )));
                    }
                    if !waited {
                        tracing::debug!(lock = %path.display(), "waiting for registry lock");
                        waited = true;
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(Error::io(format!("locking {}", path.display()), e));
                }
            }
        }

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Replace `path` with `content` atomically.
///
/// Writes a temp file in the same directory, fsyncs it, then renames it over
/// the target. A crash leaves either the old or the new content.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::io(format!("creating directory {}", dir.display()), e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::io(format!("creating temp file in {}", dir.display()), e))?;
    tmp.write_all(content)
        .map_err(|e| Error::io(format!("writing {}", tmp.path().display()), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io(format!("syncing {}", tmp.path().display()), e))?;
    tmp.persist(path)
        .map_err(|e| Error::io(format!("renaming into {}", path.display()), e.error))?;
    Ok(())
}
