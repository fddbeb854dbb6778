//! git::process
//!
//! [`VcsClient`] backed by the `git` binary.
//!
//! Each invocation runs on a current-thread tokio runtime under
//! `tokio::time::timeout`. The child is spawned with `kill_on_drop`, so a
//! timed-out command is killed rather than left running against the
//! working copy. Nothing is retried.
//!
//! Status and commit-time lookups are answered in-process by [`Git`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use super::interface::Git;
use super::vcs::{parse_ls_remote, RemoteHead, VcsClient, VcsError};
use crate::core::types::CommitId;

/// Default bound on one git invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs git primitives as child processes.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    timeout: Duration,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: PathBuf::from("git"),
            timeout,
        }
    }

    /// Use a specific git executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run git with `args` in `cwd`, returning combined stdout and stderr.
    fn run<S: AsRef<OsStr>>(&self, cwd: Option<&Path>, args: &[S]) -> Result<String, VcsError> {
        let command = render_command(args);
        debug!(command = %command, cwd = ?cwd, "running git");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| VcsError::Spawn {
                command: command.clone(),
                source: e,
            })?;

        runtime.block_on(async move {
            let mut cmd = Command::new(&self.program);
            cmd.args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .env("GIT_TERMINAL_PROMPT", "0")
                .kill_on_drop(true);
            if let Some(dir) = cwd {
                cmd.current_dir(dir);
            }

            let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
                Ok(result) => result.map_err(|e| VcsError::Spawn {
                    command: command.clone(),
                    source: e,
                })?,
                Err(_) => {
                    return Err(VcsError::Timeout {
                        command: command.clone(),
                        timeout: self.timeout,
                    })
                }
            };

            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            let text = text.trim().to_string();

            if output.status.success() {
                Ok(text)
            } else {
                debug!(command = %command, code = ?output.status.code(), "git failed");
                Err(VcsError::CommandFailed {
                    command,
                    code: output.status.code(),
                    output: text,
                })
            }
        })
    }
}

fn render_command<S: AsRef<OsStr>>(args: &[S]) -> String {
    let mut rendered = String::from("git");
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

fn repository_error(path: &Path, err: impl std::fmt::Display) -> VcsError {
    VcsError::Repository {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl VcsClient for GitCli {
    fn clone_repo(&self, url: &str, target: &Path, branch: &str) -> Result<(), VcsError> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| repository_error(parent, e))?;
        }
        let args: [&OsStr; 6] = [
            "clone".as_ref(),
            "--branch".as_ref(),
            branch.as_ref(),
            "--".as_ref(),
            url.as_ref(),
            target.as_os_str(),
        ];
        self.run(None, &args).map(drop)
    }

    fn checkout(&self, repo: &Path, branch: &str, create: bool) -> Result<(), VcsError> {
        if create {
            self.run(Some(repo), &["checkout", "-b", branch]).map(drop)
        } else {
            self.run(Some(repo), &["checkout", branch]).map(drop)
        }
    }

    fn fetch(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.run(Some(repo), &["fetch", remote, branch]).map(drop)
    }

    fn reset_hard(&self, repo: &Path, reference: &str) -> Result<(), VcsError> {
        self.run(Some(repo), &["reset", "--hard", reference]).map(drop)
    }

    fn status_is_clean(&self, repo: &Path) -> Result<bool, VcsError> {
        Git::open(repo)
            .and_then(|git| git.is_worktree_clean())
            .map_err(|e| repository_error(repo, e))
    }

    fn add(&self, repo: &Path, pathspec: &str) -> Result<(), VcsError> {
        self.run(Some(repo), &["add", "--", pathspec]).map(drop)
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<(), VcsError> {
        self.run(Some(repo), &["commit", "-m", message]).map(drop)
    }

    fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.run(Some(repo), &["push", remote, branch]).map(drop)
    }

    fn ls_remote_heads(&self, url: &str) -> Result<Vec<RemoteHead>, VcsError> {
        match self.run(None, &["ls-remote", "--heads", "--", url]) {
            Ok(output) => Ok(parse_ls_remote(&output)),
            Err(VcsError::CommandFailed { output, .. }) => Err(VcsError::Network {
                url: url.to_string(),
                output,
            }),
            Err(e) => Err(e),
        }
    }

    fn commit_timestamp(&self, repo: &Path, commit: &CommitId) -> Result<i64, VcsError> {
        Git::open(repo)
            .and_then(|git| git.commit_time(commit))
            .map_err(|e| repository_error(repo, e))
    }
}
