//! publish
//!
//! Turning an edited decision table into a pushed branch.
//!
//! # Lifecycle
//!
//! 1. [`PublishWorkflow::sync_branch`] makes the working copy match the
//!    remote branch exactly (clone when missing).
//! 2. The table is edited in place while an [`EditGuard`] from
//!    [`PublishWorkflow::begin_edit`] holds the working copy.
//! 3. [`PublishWorkflow::publish`] checks the table's structure, then
//!    creates a branch from HEAD, commits the one changed file and pushes it.
//! 4. [`PublishWorkflow::announce_pull_request`] reports where to open a
//!    pull request. It never fails.
//!
//! [`PublishWorkflow::list_remote_branches`] is independent and lets a
//! caller choose a base branch.
//!
//! # Concurrency
//!
//! Sync, publish and edits hold the working copy's [`RepoLock`] for their
//! whole duration. Distinct repositories use distinct locks.
//!
//! # Example
//!
//! ```no_run
//! use ruledesk::core::config::RepositoryConfig;
//! use ruledesk::core::paths::RepositoryLocator;
//! use ruledesk::git::GitCli;
//! use ruledesk::publish::PublishWorkflow;
//!
//! let url = "https://github.com/acme/pricing.git";
//! let locator = RepositoryLocator::new("./repos/", "")
//!     .with_config(Some(RepositoryConfig::git(url, "main", None)));
//! let workflow = PublishWorkflow::new(GitCli::default(), locator);
//!
//! workflow.sync_branch(url, "main")?;
//! // ... edit rules/Pricing.xlsx ...
//! let branch = workflow.publish("Pricing.xlsx", url, None, "Raise senior discount")?;
//! println!("{}", workflow.announce_pull_request(url, "main", &branch, "Raise senior discount", None));
//! # Ok::<(), ruledesk::publish::WorkflowError>(())
//! ```

pub mod announce;
pub mod branches;

pub use announce::{compare_url, Announcement};
pub use branches::{
    list_remote_branches, rank_branches, resolve_branch_timestamps, BranchTimestamp,
    RemoteBranchInfo, TimestampLookup,
};

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::config::RepositoryConfig;
use crate::core::naming::generate_branch_name;
use crate::core::ops::lock::{LockError, RepoLock};
use crate::core::paths::{LocatorError, RepositoryLocator};
use crate::core::types::BranchName;
use crate::git::{VcsClient, VcsError};
use crate::table::{missing_column_groups, DecisionTable, Workbook, WorkbookError};

/// Steps of a publish, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    CreateBranch,
    Stage,
    Commit,
    Push,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PublishStep::CreateBranch => "create branch",
            PublishStep::Stage => "stage",
            PublishStep::Commit => "commit",
            PublishStep::Push => "push",
        })
    }
}

/// Errors from the publish workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("repository not configured")]
    NotConfigured,

    #[error("invalid repository URL: {0}")]
    InvalidUrl(String),

    #[error("this operation needs a git repository, but a local folder is configured")]
    NotGitRepository,

    #[error("working copy {} has not been synced yet", .path.display())]
    NotCloned { path: PathBuf },

    #[error("working copy {} has uncommitted changes; commit or discard them first", .path.display())]
    DirtyWorkingCopy { path: PathBuf },

    #[error("invalid branch name: {0}")]
    InvalidBranch(String),

    #[error("cannot read table '{file}': {source}")]
    TableUnreadable { file: String, source: WorkbookError },

    /// The table lacks a mandatory column group; nothing was published.
    #[error("'{file}' is not a valid decision table: missing {}", .missing.join(", "))]
    InvalidTable {
        file: String,
        missing: Vec<&'static str>,
    },

    #[error("sync failed: {source}")]
    Sync { source: VcsError },

    /// A publish step failed. Earlier steps stay applied: once the branch
    /// exists locally it is not removed.
    #[error("publish of branch '{branch}' failed at {step}: {source}")]
    Publish {
        step: PublishStep,
        branch: String,
        branch_created: bool,
        source: VcsError,
    },

    #[error("listing remote branches failed: {source}")]
    Network { source: VcsError },

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl WorkflowError {
    /// Captured git output, when the failure came from a git command.
    pub fn output(&self) -> Option<&str> {
        match self {
            WorkflowError::Sync { source }
            | WorkflowError::Publish { source, .. }
            | WorkflowError::Network { source } => source.output(),
            _ => None,
        }
    }
}

impl From<LocatorError> for WorkflowError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::NotConfigured => WorkflowError::NotConfigured,
            LocatorError::InvalidUrl(url) => WorkflowError::InvalidUrl(url),
        }
    }
}

/// How a sync brought the working copy up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The working copy did not exist and was cloned.
    Cloned { path: PathBuf },
    /// The existing working copy was reset to the remote tip.
    Updated { path: PathBuf },
    /// A local folder is configured; nothing to synchronize.
    Local { path: PathBuf },
}

impl SyncOutcome {
    pub fn path(&self) -> &Path {
        match self {
            SyncOutcome::Cloned { path }
            | SyncOutcome::Updated { path }
            | SyncOutcome::Local { path } => path,
        }
    }
}

/// A working copy held for editing. The lock is released on drop.
#[derive(Debug)]
pub struct EditGuard {
    path: PathBuf,
    _lock: RepoLock,
}

impl EditGuard {
    /// Root of the locked working copy.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Orchestrates sync, publish and branch listing against a [`VcsClient`].
pub struct PublishWorkflow<V: VcsClient> {
    vcs: V,
    locator: RepositoryLocator,
    remote: String,
    rules_dir: String,
    offset: FixedOffset,
    clock: fn() -> DateTime<Utc>,
}

impl<V: VcsClient> PublishWorkflow<V> {
    /// A workflow pushing to `origin`, with tables under `rules/` and
    /// branch timestamps in UTC.
    pub fn new(vcs: V, locator: RepositoryLocator) -> Self {
        Self {
            vcs,
            locator,
            remote: "origin".to_string(),
            rules_dir: "rules".to_string(),
            offset: Utc.fix(),
            clock: Utc::now,
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_rules_dir(mut self, rules_dir: impl Into<String>) -> Self {
        self.rules_dir = rules_dir.into();
        self
    }

    /// Reference time zone for branch-name timestamps.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn locator(&self) -> &RepositoryLocator {
        &self.locator
    }

    fn lock(&self, repo_path: &Path) -> Result<RepoLock, WorkflowError> {
        Ok(RepoLock::acquire_blocking(
            &self.locator.lock_path(repo_path),
        )?)
    }

    fn configured_git(&self) -> Result<(&str, &str), WorkflowError> {
        match self.locator.require()? {
            RepositoryConfig::Git {
                repo_url, branch, ..
            } => Ok((repo_url, branch)),
            RepositoryConfig::LocalFilesystem { .. } => Err(WorkflowError::NotGitRepository),
        }
    }

    /// Make the working copy for `repo_url` match `origin/<branch>` exactly.
    ///
    /// An existing working copy must be clean; otherwise this fails with
    /// [`WorkflowError::DirtyWorkingCopy`] before any checkout or reset.
    /// Local commits on the branch are discarded. A missing working copy is
    /// cloned.
    pub fn sync_branch(&self, repo_url: &str, branch: &str) -> Result<SyncOutcome, WorkflowError> {
        self.locator.require()?;
        let path = self.locator.path_for_url(repo_url)?;
        let _lock = self.lock(&path)?;

        let sync_err = |source| WorkflowError::Sync { source };

        if !path.exists() {
            info!(url = %repo_url, branch = %branch, path = %path.display(), "cloning");
            self.vcs
                .clone_repo(repo_url, &path, branch)
                .map_err(sync_err)?;
            return Ok(SyncOutcome::Cloned { path });
        }

        if !self.vcs.status_is_clean(&path).map_err(sync_err)? {
            return Err(WorkflowError::DirtyWorkingCopy { path });
        }

        info!(branch = %branch, path = %path.display(), "resetting to remote tip");
        self.vcs.checkout(&path, branch, false).map_err(sync_err)?;
        self.vcs
            .fetch(&path, &self.remote, branch)
            .map_err(sync_err)?;
        self.vcs
            .reset_hard(&path, &format!("{}/{}", self.remote, branch))
            .map_err(sync_err)?;
        Ok(SyncOutcome::Updated { path })
    }

    /// Sync the configured repository and branch.
    ///
    /// For a local folder this only checks that the folder exists.
    pub fn sync_configured(&self) -> Result<SyncOutcome, WorkflowError> {
        match self.locator.require()? {
            RepositoryConfig::Git {
                repo_url, branch, ..
            } => self.sync_branch(repo_url, branch),
            RepositoryConfig::LocalFilesystem { local_path, .. } => {
                let path = PathBuf::from(local_path);
                if !path.is_dir() {
                    return Err(WorkflowError::NotCloned { path });
                }
                Ok(SyncOutcome::Local { path })
            }
        }
    }

    /// Lock the configured working copy for an edit.
    ///
    /// A git working copy is also checked out to the configured branch, so
    /// the edit lands on the tracked branch rather than on a previously
    /// published one. The lock is held until the guard is dropped, so no
    /// sync or publish can run between reading and writing a table.
    pub fn begin_edit(&self) -> Result<EditGuard, WorkflowError> {
        let path = self.locator.repository_path()?;
        if !path.is_dir() {
            return Err(WorkflowError::NotCloned { path });
        }
        let lock = self.lock(&path)?;

        if let RepositoryConfig::Git { branch, .. } = self.locator.require()? {
            self.vcs
                .checkout(&path, branch, false)
                .map_err(|source| WorkflowError::Sync { source })?;
        }
        Ok(EditGuard { path, _lock: lock })
    }

    /// Branch name for publishing `file_name` to `repo_url` now.
    ///
    /// Same file, same repository and same minute give the same name.
    pub fn generate_branch_name(&self, file_name: &str, repo_url: &str) -> String {
        let now = (self.clock)().with_timezone(&self.offset);
        generate_branch_name(file_name, &self.locator.direct_url(repo_url), &now)
    }

    /// Commit `rules/<file_name>` on a new branch and push it.
    ///
    /// `branch` is used when non-blank, otherwise a name is generated. The
    /// branch is created from the current HEAD. Returns the branch name.
    ///
    /// The table must have `NAME`, `CONDITION` and `ACTION` columns;
    /// otherwise this fails with [`WorkflowError::InvalidTable`] before any
    /// git command runs.
    ///
    /// If a later step fails, the error reports whether the branch was
    /// already created locally, together with the git output.
    pub fn publish(
        &self,
        file_name: &str,
        repo_url: &str,
        branch: Option<&str>,
        message: &str,
    ) -> Result<String, WorkflowError> {
        self.locator.require()?;
        let branch = match branch.map(str::trim).filter(|b| !b.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => self.generate_branch_name(file_name, repo_url),
        };
        BranchName::new(branch.as_str()).map_err(|e| WorkflowError::InvalidBranch(e.to_string()))?;

        let path = self.locator.path_for_url(repo_url)?;
        if !path.exists() {
            return Err(WorkflowError::NotCloned { path });
        }
        let _lock = self.lock(&path)?;

        let pathspec = format!("{}/{}", self.rules_dir, file_name);
        check_table(&path.join(&pathspec), file_name)?;

        let failed = |step, branch_created, source| WorkflowError::Publish {
            step,
            branch: branch.clone(),
            branch_created,
            source,
        };

        self.vcs
            .checkout(&path, &branch, true)
            .map_err(|e| failed(PublishStep::CreateBranch, false, e))?;

        self.vcs
            .add(&path, &pathspec)
            .map_err(|e| failed(PublishStep::Stage, true, e))?;
        self.vcs
            .commit(&path, message)
            .map_err(|e| failed(PublishStep::Commit, true, e))?;
        self.vcs
            .push(&path, &self.remote, &branch)
            .map_err(|e| failed(PublishStep::Push, true, e))?;

        info!(branch = %branch, file = %pathspec, "published");
        Ok(branch)
    }

    /// Report where a pull request from `head` into `base` can be opened.
    ///
    /// Never fails; a URL that cannot be turned into a compare page yields
    /// an announcement without one.
    pub fn announce_pull_request(
        &self,
        repo_url: &str,
        base: &str,
        head: &str,
        title: &str,
        body: Option<&str>,
    ) -> Announcement {
        let compare_url = compare_url(&self.locator.direct_url(repo_url), base, head);
        if compare_url.is_none() {
            warn!(url = %repo_url, "no compare page for repository URL");
        }
        info!(base = %base, head = %head, title = %title, "pull request ready");
        Announcement {
            title: title.to_string(),
            body: body.map(String::from),
            base: base.to_string(),
            head: head.to_string(),
            compare_url,
        }
    }

    /// Branches on the remote at `repo_url`, newest first.
    ///
    /// Commit times are looked up in the local working copy when it exists.
    pub fn list_remote_branches(
        &self,
        repo_url: &str,
    ) -> Result<Vec<RemoteBranchInfo>, WorkflowError> {
        let lookup_dir = self
            .locator
            .path_for_url(repo_url)
            .ok()
            .filter(|p| p.exists())
            .unwrap_or_else(|| PathBuf::from("."));
        let now = (self.clock)().timestamp();
        list_remote_branches(&self.vcs, repo_url, &lookup_dir, now)
            .map_err(|source| WorkflowError::Network { source })
    }

    /// The configured repository URL, for commands that default to it.
    pub fn configured_url(&self) -> Result<&str, WorkflowError> {
        self.configured_git().map(|(url, _)| url)
    }

    /// The configured branch.
    pub fn configured_branch(&self) -> Result<&str, WorkflowError> {
        self.configured_git().map(|(_, branch)| branch)
    }
}

/// Refuse tables without the decision-table shape.
fn check_table(table_path: &Path, file_name: &str) -> Result<(), WorkflowError> {
    let workbook = Workbook::load(table_path).map_err(|source| WorkflowError::TableUnreadable {
        file: file_name.to_string(),
        source,
    })?;
    let table = DecisionTable::load(workbook.table_sheet()).ok();
    let missing = missing_column_groups(table.as_ref());
    if missing.is_empty() {
        Ok(())
    } else {
        warn!(file = %file_name, missing = ?missing, "refusing to publish table");
        Err(WorkflowError::InvalidTable {
            file: file_name.to_string(),
            missing,
        })
    }
}
