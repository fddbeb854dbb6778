//! publish::branches
//!
//! Remote branch ranking.
//!
//! # Algorithm
//!
//! 1. List every head on the remote, in the order the remote advertises them.
//! 2. Resolve each head's commit time. A failed lookup does not drop the
//!    branch: it is recorded as [`TimestampLookup::Fallback`] and ranks with
//!    timestamp `0`.
//! 3. Stable-sort by timestamp, newest first. Equal timestamps keep the
//!    advertised order.
//! 4. The first entry is `is_latest`; every `main` or `master` is `is_main`.
//!
//! A reachable remote with no heads yields a single synthesized `main`
//! entry stamped with the current time, flagged both main and latest.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::core::types::is_main_branch;
use crate::git::{VcsClient, VcsError};

/// Timestamp reported for branches whose commit time could not be resolved.
pub const FALLBACK_TIMESTAMP: i64 = 0;

/// A branch on the remote, ranked by freshness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBranchInfo {
    pub name: String,
    /// Commit time in seconds since the epoch
    pub commit_timestamp: i64,
    pub is_main: bool,
    pub is_latest: bool,
}

/// Outcome of resolving one branch's commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampLookup {
    Resolved(i64),
    /// Lookup failed; carries the reason.
    Fallback(String),
}

impl TimestampLookup {
    /// The timestamp to rank by.
    pub fn seconds(&self) -> i64 {
        match self {
            TimestampLookup::Resolved(seconds) => *seconds,
            TimestampLookup::Fallback(_) => FALLBACK_TIMESTAMP,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TimestampLookup::Fallback(_))
    }
}

/// A listed branch before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTimestamp {
    pub name: String,
    pub timestamp: TimestampLookup,
}

/// List the remote's heads and resolve their commit times from `lookup_dir`.
///
/// Fails only if the remote itself cannot be listed.
pub fn resolve_branch_timestamps(
    vcs: &dyn VcsClient,
    url: &str,
    lookup_dir: &Path,
) -> Result<Vec<BranchTimestamp>, VcsError> {
    let heads = vcs.ls_remote_heads(url)?;
    Ok(heads
        .into_iter()
        .map(|head| {
            let timestamp = match vcs.commit_timestamp(lookup_dir, &head.commit) {
                Ok(seconds) => TimestampLookup::Resolved(seconds),
                Err(e) => {
                    warn!(branch = %head.name, commit = %head.commit.short(), error = %e,
                        "commit time unavailable, ranking branch last");
                    TimestampLookup::Fallback(e.to_string())
                }
            };
            BranchTimestamp {
                name: head.name,
                timestamp,
            }
        })
        .collect())
}

/// Rank resolved branches newest first and flag main and latest entries.
///
/// `now` stamps the placeholder returned for a remote without heads.
pub fn rank_branches(branches: Vec<BranchTimestamp>, now: i64) -> Vec<RemoteBranchInfo> {
    if branches.is_empty() {
        return vec![RemoteBranchInfo {
            name: "main".to_string(),
            commit_timestamp: now,
            is_main: true,
            is_latest: true,
        }];
    }

    let mut ranked: Vec<RemoteBranchInfo> = branches
        .into_iter()
        .map(|b| RemoteBranchInfo {
            is_main: is_main_branch(&b.name),
            commit_timestamp: b.timestamp.seconds(),
            name: b.name,
            is_latest: false,
        })
        .collect();

    // sort_by is stable: ties keep the advertised order.
    ranked.sort_by(|a, b| b.commit_timestamp.cmp(&a.commit_timestamp));
    if let Some(first) = ranked.first_mut() {
        first.is_latest = true;
    }
    ranked
}

/// List and rank the remote's branches.
pub fn list_remote_branches(
    vcs: &dyn VcsClient,
    url: &str,
    lookup_dir: &Path,
    now: i64,
) -> Result<Vec<RemoteBranchInfo>, VcsError> {
    let resolved = resolve_branch_timestamps(vcs, url, lookup_dir)?;
    Ok(rank_branches(resolved, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockVcs;

    fn resolved(name: &str, seconds: i64) -> BranchTimestamp {
        BranchTimestamp {
            name: name.to_string(),
            timestamp: TimestampLookup::Resolved(seconds),
        }
    }

    #[test]
    fn empty_remote_synthesizes_main() {
        let ranked = rank_branches(Vec::new(), 1_700_000_000);
        assert_eq!(
            ranked,
            vec![RemoteBranchInfo {
                name: "main".into(),
                commit_timestamp: 1_700_000_000,
                is_main: true,
                is_latest: true,
            }]
        );
    }

    #[test]
    fn newest_first_with_single_latest() {
        let ranked = rank_branches(
            vec![resolved("main", 10), resolved("feature", 30), resolved("master", 20)],
            0,
        );
        let names: Vec<_> = ranked.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["feature", "master", "main"]);
        assert_eq!(ranked.iter().filter(|b| b.is_latest).count(), 1);
        assert!(ranked[0].is_latest);
        assert!(ranked[1].is_main && ranked[2].is_main);
        assert!(!ranked[0].is_main);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank_branches(vec![resolved("b", 5), resolved("a", 5), resolved("c", 5)], 0);
        let names: Vec<_> = ranked.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert!(ranked[0].is_latest);
    }

    #[test]
    fn main_can_also_be_latest() {
        let ranked = rank_branches(vec![resolved("x", 1), resolved("main", 2)], 0);
        assert!(ranked[0].is_main && ranked[0].is_latest);
    }

    #[test]
    fn failed_lookup_is_kept_with_fallback() {
        let vcs = MockVcs::new();
        let url = "https://h/o/r.git";
        vcs.add_remote_head(url, "main", "aaaa", 100);
        vcs.add_unresolvable_head(url, "orphan", "bbbb");

        let resolved = resolve_branch_timestamps(&vcs, url, Path::new(".")).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].timestamp, TimestampLookup::Resolved(100));
        assert!(resolved[1].timestamp.is_fallback());

        let ranked = rank_branches(resolved, 0);
        assert_eq!(ranked[1].name, "orphan");
        assert_eq!(ranked[1].commit_timestamp, FALLBACK_TIMESTAMP);
    }

    #[test]
    fn unreachable_remote_fails() {
        let vcs = MockVcs::new();
        assert!(list_remote_branches(&vcs, "https://h/o/none", Path::new("."), 0).is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(RemoteBranchInfo {
            name: "main".into(),
            commit_timestamp: 1,
            is_main: true,
            is_latest: false,
        })
        .unwrap();
        assert_eq!(json["commitTimestamp"], 1);
        assert_eq!(json["isMain"], true);
        assert_eq!(json["isLatest"], false);
    }
}
