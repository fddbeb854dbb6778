//! core::types
//!
//! Strong types for values that cross the git boundary.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`CommitId`] - Hex commit identifier as reported by a remote
//!
//! # Validation
//!
//! These types enforce validity at construction time, so a branch name
//! that would be rejected by `git check-ref-format` never reaches a
//! `git checkout -b` or `git push`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid commit id: {0}")]
    InvalidCommitId(String),
}

/// A validated Git branch name.
///
/// Names follow Git's refname rules: not empty, not `@`, no leading `.`
/// or `-`, no trailing `/` or `.lock`, no `..`, `@{` or `//`, no spaces,
/// control characters or any of `~^:\?*[`.
///
/// # Example
///
/// ```
/// use ruledesk::core::types::BranchName;
///
/// let name = BranchName::new("PRI_PRI_101920261530").unwrap();
/// assert_eq!(name.as_str(), "PRI_PRI_101920261530");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("rules..old").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let fail = |why: &str| Err(TypeError::InvalidBranchName(format!("'{}' {}", name, why)));

        if name.is_empty() {
            return fail("is empty");
        }
        if name == "@" {
            return fail("is reserved");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return fail("starts with '.' or '-'");
        }
        if name.ends_with('/') || name.ends_with(".lock") {
            return fail("ends with '/' or '.lock'");
        }
        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return fail(&format!("contains '{}'", bad));
            }
        }
        if let Some(c) = name
            .chars()
            .find(|c| c.is_ascii_control() || " ~^:\\?*[".contains(*c))
        {
            return fail(&format!("contains {:?}", c));
        }
        if name
            .split('/')
            .any(|part| part.starts_with('.') || part.ends_with(".lock"))
        {
            return fail("has a path component starting with '.' or ending with '.lock'");
        }
        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `name` is a conventional default branch (`main` or `master`).
pub fn is_main_branch(name: &str) -> bool {
    name == "main" || name == "master"
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A commit identifier, normalized to lowercase hex.
///
/// Accepts full SHA-1/SHA-256 ids and abbreviations of at least 4
/// characters.
///
/// # Example
///
/// ```
/// use ruledesk::core::types::CommitId;
///
/// let id = CommitId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(id.short(), "abc123d");
/// assert!(CommitId::new("xyz").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create a validated commit id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        if !(4..=64).contains(&id.len()) {
            return Err(TypeError::InvalidCommitId(format!(
                "expected 4 to 64 hex characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidCommitId(format!("'{}' is not hexadecimal", id)));
        }
        Ok(Self(id))
    }

    /// First seven characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(7)]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_generated_names() {
            assert!(BranchName::new("MY-_PRI_101920261530").is_ok());
            assert!(BranchName::new("feature/pricing").is_ok());
        }

        #[test]
        fn rejects_git_invalid() {
            for bad in [
                "", "@", ".x", "-x", "x/", "x.lock", "a..b", "a@{b", "a//b", "a b", "a~b",
                "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b", "a/.b", "a.lock/b",
            ] {
                assert!(BranchName::new(bad).is_err(), "{:?} should be rejected", bad);
            }
        }

        #[test]
        fn main_detection() {
            assert!(is_main_branch("main"));
            assert!(is_main_branch("master"));
            assert!(!is_main_branch("mainline"));
        }

        #[test]
        fn serde_validates() {
            let ok: Result<BranchName, _> = serde_json::from_str("\"main\"");
            assert!(ok.is_ok());
            let bad: Result<BranchName, _> = serde_json::from_str("\"a b\"");
            assert!(bad.is_err());
        }
    }

    mod commit_id {
        use super::*;

        #[test]
        fn normalizes_case() {
            assert_eq!(CommitId::new("ABCD").unwrap().as_str(), "abcd");
        }

        #[test]
        fn rejects_bad_lengths() {
            assert!(CommitId::new("abc").is_err());
            assert!(CommitId::new("a".repeat(65)).is_err());
        }

        #[test]
        fn short_is_bounded() {
            assert_eq!(CommitId::new("abcd").unwrap().short(), "abcd");
        }
    }
}
