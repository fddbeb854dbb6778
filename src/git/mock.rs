//! git::mock
//!
//! In-memory [`VcsClient`] for deterministic testing.
//!
//! # Design
//!
//! `MockVcs` keeps remotes and working copies in memory and records every
//! call, so tests can assert on exactly which primitives ran. Cloning
//! creates the target directory on disk (the workflow decides between
//! clone and pull by checking it), but nothing else touches the
//! filesystem.
//!
//! # Example
//!
//! ```
//! use ruledesk::git::mock::{MockOperation, MockVcs};
//! use ruledesk::git::VcsClient;
//!
//! let vcs = MockVcs::new();
//! vcs.add_remote_head("https://h/o/r.git", "main", "aaaa", 100);
//!
//! let heads = vcs.ls_remote_heads("https://h/o/r.git").unwrap();
//! assert_eq!(heads[0].name, "main");
//! assert_eq!(
//!     vcs.operations(),
//!     vec![MockOperation::LsRemoteHeads { url: "https://h/o/r.git".into() }]
//! );
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::vcs::{RemoteHead, VcsClient, VcsError};
use crate::core::types::CommitId;

/// Mock VCS for testing.
///
/// Clones share state, so a test can keep a handle while the workflow owns another.
#[derive(Debug, Clone, Default)]
pub struct MockVcs {
    inner: Arc<Mutex<MockVcsInner>>,
}

#[derive(Debug, Default)]
struct MockVcsInner {
    /// Heads per remote URL, in advertised order.
    remotes: HashMap<String, Vec<RemoteHead>>,
    /// Commit times known to any working copy.
    timestamps: HashMap<CommitId, i64>,
    /// Working copies by path.
    copies: HashMap<PathBuf, MockCopy>,
    /// Primitive to fail, with the output to report.
    fail_on: Option<(FailOn, String)>,
    operations: Vec<MockOperation>,
}

#[derive(Debug, Default)]
struct MockCopy {
    branch: String,
    branches: Vec<String>,
    dirty: bool,
    staged: Vec<String>,
    commits: Vec<String>,
}

/// Which primitive should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Clone,
    Checkout,
    Fetch,
    ResetHard,
    Add,
    Commit,
    Push,
    LsRemoteHeads,
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Clone {
        url: String,
        target: PathBuf,
        branch: String,
    },
    Checkout {
        branch: String,
        create: bool,
    },
    Fetch {
        remote: String,
        branch: String,
    },
    ResetHard {
        reference: String,
    },
    StatusIsClean,
    Add {
        pathspec: String,
    },
    Commit {
        message: String,
    },
    Push {
        remote: String,
        branch: String,
    },
    LsRemoteHeads {
        url: String,
    },
    CommitTimestamp {
        commit: String,
    },
}

impl MockVcs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockVcsInner> {
        // A poisoned mock only happens after a test already panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Advertise `branch` at `commit` on `url`, with a known commit time.
    pub fn add_remote_head(&self, url: &str, branch: &str, commit: &str, timestamp: i64) {
        let commit = CommitId::new(commit).unwrap_or_else(|e| panic!("bad mock commit: {}", e));
        let mut inner = self.lock();
        inner.timestamps.insert(commit.clone(), timestamp);
        inner.remotes.entry(url.to_string()).or_default().push(RemoteHead {
            name: branch.to_string(),
            commit,
        });
    }

    /// Advertise `branch` without a resolvable commit time.
    pub fn add_unresolvable_head(&self, url: &str, branch: &str, commit: &str) {
        let commit = CommitId::new(commit).unwrap_or_else(|e| panic!("bad mock commit: {}", e));
        self.lock()
            .remotes
            .entry(url.to_string())
            .or_default()
            .push(RemoteHead {
                name: branch.to_string(),
                commit,
            });
    }

    /// Register an empty but reachable remote.
    pub fn add_empty_remote(&self, url: &str) {
        self.lock().remotes.entry(url.to_string()).or_default();
    }

    /// Register an existing working copy at `path` on `branch`.
    pub fn add_working_copy(&self, path: &Path, branch: &str) {
        self.lock().copies.insert(
            path.to_path_buf(),
            MockCopy {
                branch: branch.to_string(),
                branches: vec![branch.to_string()],
                ..Default::default()
            },
        );
    }

    /// Mark a working copy as having uncommitted changes.
    pub fn set_dirty(&self, path: &Path, dirty: bool) {
        if let Some(copy) = self.lock().copies.get_mut(path) {
            copy.dirty = dirty;
        }
    }

    /// Make `primitive` fail with `output`.
    pub fn fail_on(&self, primitive: FailOn, output: &str) {
        self.lock().fail_on = Some((primitive, output.to_string()));
    }

    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Branch checked out in the working copy at `path`.
    pub fn current_branch(&self, path: &Path) -> Option<String> {
        self.lock().copies.get(path).map(|c| c.branch.clone())
    }

    /// Local branches of the working copy at `path`.
    pub fn local_branches(&self, path: &Path) -> Vec<String> {
        self.lock()
            .copies
            .get(path)
            .map(|c| c.branches.clone())
            .unwrap_or_default()
    }

    /// Commit messages recorded in the working copy at `path`.
    pub fn commits(&self, path: &Path) -> Vec<String> {
        self.lock()
            .copies
            .get(path)
            .map(|c| c.commits.clone())
            .unwrap_or_default()
    }

    fn check_fail(inner: &MockVcsInner, primitive: FailOn, command: &str) -> Result<(), VcsError> {
        match &inner.fail_on {
            Some((p, output)) if *p == primitive => Err(VcsError::CommandFailed {
                command: command.to_string(),
                code: Some(1),
                output: output.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn copy_mut<'a>(
        inner: &'a mut MockVcsInner,
        repo: &Path,
        command: &str,
    ) -> Result<&'a mut MockCopy, VcsError> {
        inner
            .copies
            .get_mut(repo)
            .ok_or_else(|| VcsError::CommandFailed {
                command: command.to_string(),
                code: Some(128),
                output: format!("fatal: not a git repository: {}", repo.display()),
            })
    }
}

impl VcsClient for MockVcs {
    fn clone_repo(&self, url: &str, target: &Path, branch: &str) -> Result<(), VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Clone {
            url: url.to_string(),
            target: target.to_path_buf(),
            branch: branch.to_string(),
        });
        Self::check_fail(&inner, FailOn::Clone, "git clone")?;
        std::fs::create_dir_all(target).map_err(|e| VcsError::Repository {
            path: target.to_path_buf(),
            message: e.to_string(),
        })?;
        inner.copies.insert(
            target.to_path_buf(),
            MockCopy {
                branch: branch.to_string(),
                branches: vec![branch.to_string()],
                ..Default::default()
            },
        );
        Ok(())
    }

    fn checkout(&self, repo: &Path, branch: &str, create: bool) -> Result<(), VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Checkout {
            branch: branch.to_string(),
            create,
        });
        Self::check_fail(&inner, FailOn::Checkout, "git checkout")?;
        let command = format!("git checkout {}", branch);
        let copy = Self::copy_mut(&mut inner, repo, &command)?;
        let exists = copy.branches.iter().any(|b| b == branch);
        match (create, exists) {
            (true, true) => {
                return Err(VcsError::CommandFailed {
                    command,
                    code: Some(128),
                    output: format!("fatal: a branch named '{}' already exists", branch),
                })
            }
            (true, false) => copy.branches.push(branch.to_string()),
            (false, false) => {
                return Err(VcsError::CommandFailed {
                    command,
                    code: Some(1),
                    output: format!("error: pathspec '{}' did not match", branch),
                })
            }
            (false, true) => {}
        }
        copy.branch = branch.to_string();
        Ok(())
    }

    fn fetch(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Fetch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Self::check_fail(&inner, FailOn::Fetch, "git fetch")?;
        Self::copy_mut(&mut inner, repo, "git fetch").map(drop)
    }

    fn reset_hard(&self, repo: &Path, reference: &str) -> Result<(), VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::ResetHard {
            reference: reference.to_string(),
        });
        Self::check_fail(&inner, FailOn::ResetHard, "git reset --hard")?;
        let copy = Self::copy_mut(&mut inner, repo, "git reset --hard")?;
        copy.dirty = false;
        copy.staged.clear();
        Ok(())
    }

    fn status_is_clean(&self, repo: &Path) -> Result<bool, VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::StatusIsClean);
        let copy = Self::copy_mut(&mut inner, repo, "git status")?;
        Ok(!copy.dirty)
    }

    fn add(&self, repo: &Path, pathspec: &str) -> Result<(), VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Add {
            pathspec: pathspec.to_string(),
        });
        Self::check_fail(&inner, FailOn::Add, "git add")?;
        let copy = Self::copy_mut(&mut inner, repo, "git add")?;
        copy.staged.push(pathspec.to_string());
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<(), VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Commit {
            message: message.to_string(),
        });
        Self::check_fail(&inner, FailOn::Commit, "git commit")?;
        let copy = Self::copy_mut(&mut inner, repo, "git commit")?;
        copy.staged.clear();
        copy.dirty = false;
        copy.commits.push(message.to_string());
        Ok(())
    }

    fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Self::check_fail(&inner, FailOn::Push, "git push")?;
        Self::copy_mut(&mut inner, repo, "git push").map(drop)
    }

    fn ls_remote_heads(&self, url: &str) -> Result<Vec<RemoteHead>, VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::LsRemoteHeads {
            url: url.to_string(),
        });
        if let Some((FailOn::LsRemoteHeads, output)) = &inner.fail_on {
            return Err(VcsError::Network {
                url: url.to_string(),
                output: output.clone(),
            });
        }
        inner.remotes.get(url).cloned().ok_or_else(|| VcsError::Network {
            url: url.to_string(),
            output: format!("fatal: repository '{}' not found", url),
        })
    }

    fn commit_timestamp(&self, repo: &Path, commit: &CommitId) -> Result<i64, VcsError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::CommitTimestamp {
            commit: commit.to_string(),
        });
        inner
            .timestamps
            .get(commit)
            .copied()
            .ok_or_else(|| VcsError::Repository {
                path: repo.to_path_buf(),
                message: format!("object not found: {}", commit),
            })
    }
}
