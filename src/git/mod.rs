//! git
//!
//! Version-control access for the publish workflow.
//!
//! # Architecture
//!
//! This module is the only doorway to git. Nothing outside it spawns git or
//! imports `git2`.
//!
//! - [`VcsClient`] - the primitives the workflow needs (clone, checkout,
//!   fetch, reset, status, add, commit, push, remote listing, commit time)
//! - [`GitCli`] - implementation over the `git` binary, bounded by a timeout
//! - [`Git`] - in-process reads through git2
//! - [`mock::MockVcs`] - in-memory implementation for tests
//!
//! # Example
//!
//! ```no_run
//! use ruledesk::git::{GitCli, VcsClient};
//! use std::time::Duration;
//!
//! let git = GitCli::new(Duration::from_secs(30));
//! for head in git.ls_remote_heads("https://github.com/acme/pricing.git")? {
//!     println!("{} {}", head.commit.short(), head.name);
//! }
//! # Ok::<(), ruledesk::git::VcsError>(())
//! ```

mod interface;
pub mod mock;
mod process;
mod vcs;

pub use interface::{Git, GitError, WorktreeStatus};
pub use mock::MockVcs;
pub use process::{GitCli, DEFAULT_TIMEOUT};
pub use vcs::{parse_ls_remote, RemoteHead, VcsClient, VcsError};
