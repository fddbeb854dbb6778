//! git::vcs
//!
//! The version-control capability consumed by the publish workflow.
//!
//! # Architecture
//!
//! The workflow never spawns processes itself. It talks to a [`VcsClient`],
//! which has one method per primitive it needs. [`GitCli`](super::GitCli)
//! implements it against the `git` binary; [`MockVcs`](super::MockVcs)
//! implements it in memory for tests.
//!
//! Every failing primitive surfaces the command line, the exit code and the
//! captured output, so callers can report what happened and recover by hand.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::CommitId;

/// Errors from version-control primitives.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The process could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The process exceeded its time budget and was killed.
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// The process exited unsuccessfully.
    #[error("`{command}` failed ({}): {output}", describe_exit(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    /// The remote could not be listed.
    #[error("cannot reach remote {url}: {output}")]
    Network { url: String, output: String },

    /// A local repository read failed.
    #[error("repository error at {}: {message}", .path.display())]
    Repository { path: PathBuf, message: String },
}

impl VcsError {
    /// Captured process output, if this error carries any.
    pub fn output(&self) -> Option<&str> {
        match self {
            VcsError::CommandFailed { output, .. } | VcsError::Network { output, .. } => {
                Some(output)
            }
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// One head advertised by a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHead {
    /// Branch name without `refs/heads/`
    pub name: String,
    pub commit: CommitId,
}

/// Version-control primitives used by the publish workflow.
///
/// Paths name a working copy; the client runs each primitive inside it.
pub trait VcsClient: Send + Sync {
    /// Clone `url` into `target`, checking out `branch`.
    fn clone_repo(&self, url: &str, target: &Path, branch: &str) -> Result<(), VcsError>;

    /// Check out `branch`, creating it from HEAD when `create` is set.
    fn checkout(&self, repo: &Path, branch: &str, create: bool) -> Result<(), VcsError>;

    /// Fetch `branch` from `remote`.
    fn fetch(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), VcsError>;

    /// Reset the working copy and index to `reference`, discarding local changes.
    fn reset_hard(&self, repo: &Path, reference: &str) -> Result<(), VcsError>;

    /// Whether the working copy has no staged or unstaged changes to tracked files.
    fn status_is_clean(&self, repo: &Path) -> Result<bool, VcsError>;

    /// Stage paths matching `pathspec`.
    fn add(&self, repo: &Path, pathspec: &str) -> Result<(), VcsError>;

    /// Commit the index with `message`.
    fn commit(&self, repo: &Path, message: &str) -> Result<(), VcsError>;

    /// Push `branch` to `remote`.
    fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), VcsError>;

    /// Heads advertised by the remote at `url`, in the order the remote lists them.
    fn ls_remote_heads(&self, url: &str) -> Result<Vec<RemoteHead>, VcsError>;

    /// Commit time of `commit` (seconds since the epoch), looked up from `repo`.
    fn commit_timestamp(&self, repo: &Path, commit: &CommitId) -> Result<i64, VcsError>;
}

/// Parse `git ls-remote --heads` output.
///
/// Lines that are not `<id>\trefs/heads/<name>` are ignored.
pub fn parse_ls_remote(output: &str) -> Vec<RemoteHead> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?;
            let reference = parts.next()?;
            let name = reference.strip_prefix("refs/heads/")?;
            let commit = CommitId::new(id).ok()?;
            Some(RemoteHead {
                name: name.to_string(),
                commit,
            })
        })
        .collect()
}
