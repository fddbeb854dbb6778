//! core::ops
//!
//! Serialization of operations on a working copy.
//!
//! - [`lock`] - Exclusive per-working-copy lock

pub mod lock;

pub use lock::{LockError, RepoLock};
