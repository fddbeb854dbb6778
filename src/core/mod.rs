//! core
//!
//! Core domain types, configuration and working-copy bookkeeping.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, CommitId
//! - [`naming`] - Branch names for published edits
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Repository locator (URL to working copy)
//! - [`ops`] - Per-working-copy locking

pub mod config;
pub mod naming;
pub mod ops;
pub mod paths;
pub mod types;
