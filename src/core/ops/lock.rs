//! core::ops::lock
//!
//! Exclusive lock on a working copy.
//!
//! # Architecture
//!
//! A working copy is a singular resource: an interleaved checkout from one
//! process and commit from another leaves it in an undefined state. Every
//! operation that touches the working copy through git (sync, publish)
//! holds this lock for its whole duration.
//!
//! Locks are per working copy, stored under the repos directory:
//!
//! - `<repos_dir>/.locks/<name>.lock` - lock file with an OS-level exclusive lock
//!
//! Distinct repositories use distinct files and never contend.
//!
//! # Invariants
//!
//! - The lock is released on drop
//! - [`RepoLock::acquire`] fails fast; [`RepoLock::acquire_blocking`] waits
//!
//! # Example
//!
//! ```no_run
//! use ruledesk::core::ops::lock::RepoLock;
//! use std::path::Path;
//!
//! let lock = RepoLock::acquire(Path::new("./repos/.locks/pricing.lock"))?;
//! // ... sync or publish ...
//! drop(lock);
//! # Ok::<(), ruledesk::core::ops::lock::LockError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process holds the lock.
    #[error("working copy is locked by another operation ({})", path.display())]
    AlreadyLocked { path: PathBuf },

    /// Failed to create the lock file or its directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on one working copy, released on drop.
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
    /// Open handle holding the lock; `None` once released.
    file: Option<File>,
}

impl RepoLock {
    /// Acquire the lock at `path` without waiting.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another holder exists
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock fails for another reason
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = open_lock_file(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "acquired working copy lock");
                Ok(Self {
                    path: path.to_path_buf(),
                    file: Some(file),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Acquire the lock at `path`, waiting for the current holder.
    pub fn acquire_blocking(path: &Path) -> Result<Self, LockError> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;
        debug!(path = %path.display(), "acquired working copy lock (blocking)");
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
        })
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release early. Releasing twice is a no-op.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

fn open_lock_file(path: &Path) -> Result<File, LockError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e)))
}
