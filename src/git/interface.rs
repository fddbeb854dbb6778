//! git::interface
//!
//! Read-only repository queries using git2.
//!
//! Mutations (clone, checkout, commit, push) go through the `git` binary in
//! [`GitCli`](super::GitCli) so they honour the user's credential helpers
//! and hooks. Reads that do not need either are answered here in-process.
//!
//! # Error Handling
//!
//! - [`GitError::NotARepo`]: no repository at or above the path
//! - [`GitError::BareRepo`]: the repository has no working directory
//! - [`GitError::ObjectNotFound`]: a commit is not present locally
//!
//! # Example
//!
//! ```no_run
//! use ruledesk::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("./repos/pricing"))?;
//! if !git.is_worktree_clean()? {
//!     println!("commit or discard your changes first");
//! }
//! # Ok::<(), ruledesk::git::GitError>(())
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::CommitId;

/// Errors from repository reads.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {}", .path.display())]
    NotARepo { path: PathBuf },

    #[error("bare repository not supported")]
    BareRepo,

    #[error("object not found: {oid}")]
    ObjectNotFound { oid: String },

    #[error("git error: {message}")]
    Internal { message: String },
}

impl GitError {
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files (if requested)
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// No staged, unstaged or conflicted entries. Untracked files do not count.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }
}

/// A working copy opened for reading.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the working copy at `path`.
    ///
    /// Unlike discovery, this does not search parent directories: a working
    /// copy that has not been cloned yet must not resolve to an enclosing
    /// repository.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }
        Ok(Self { repo })
    }

    /// Count changes in the working tree.
    pub fn worktree_status(&self, include_untracked: bool) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(include_untracked)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();
            if status.is_conflicted() {
                result.has_conflicts = true;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }
            if status.is_wt_new() {
                result.untracked += 1;
            }
        }
        Ok(result)
    }

    /// Whether tracked files are unchanged.
    pub fn is_worktree_clean(&self) -> Result<bool, GitError> {
        Ok(self.worktree_status(false)?.is_clean())
    }

    /// Name of the checked-out branch, or `None` when HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                return Ok(None)
            }
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(String::from))
    }

    /// Committer time of `commit` in seconds since the epoch.
    pub fn commit_time(&self, commit: &CommitId) -> Result<i64, GitError> {
        let object = self
            .repo
            .revparse_single(commit.as_str())
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?;
        Ok(commit.time().seconds())
    }
}
