//! publish::announce
//!
//! Pull-request announcements.
//!
//! No hosting-provider API is called. An announcement is the compare page
//! where a reviewer can open the pull request, reported to the user.

use std::fmt;

use serde::Serialize;
use url::Url;

/// What to tell the user after a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub title: String,
    pub body: Option<String>,
    pub base: String,
    pub head: String,
    /// Compare page, when the repository URL could be understood
    pub compare_url: Option<String>,
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pull request: {}", self.title)?;
        write!(f, "Base: {} <- Head: {}", self.base, self.head)?;
        if let Some(url) = &self.compare_url {
            write!(f, "\nCreate it at: {}", url)?;
        }
        Ok(())
    }
}

/// Compare page for `head` against `base` on the repository at `repo_url`.
///
/// Accepts `http(s)://host/owner/repo(.git)` and `git@host:owner/repo(.git)`.
/// Returns `None` for anything else.
///
/// # Example
///
/// ```
/// use ruledesk::publish::compare_url;
///
/// assert_eq!(
///     compare_url("https://github.com/acme/pricing.git", "main", "PRI_Rat_010120260000").as_deref(),
///     Some("https://github.com/acme/pricing/compare/main...PRI_Rat_010120260000")
/// );
/// assert_eq!(compare_url("/srv/git/pricing.git", "main", "x"), None);
/// ```
pub fn compare_url(repo_url: &str, base: &str, head: &str) -> Option<String> {
    let (host, path) = host_and_path(repo_url)?;
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(format!(
        "https://{}/{}/compare/{}...{}",
        host,
        segments.join("/"),
        base,
        head
    ))
}

fn host_and_path(repo_url: &str) -> Option<(String, String)> {
    if let Ok(url) = Url::parse(repo_url) {
        if !matches!(url.scheme(), "http" | "https" | "ssh") {
            return None;
        }
        let host = url.host_str()?;
        return Some((host.to_string(), url.path().to_string()));
    }
    // scp-like: git@host:owner/repo.git
    let (user_host, path) = repo_url.split_once(':')?;
    let host = user_host.rsplit('@').next()?;
    if host.is_empty() || host.contains('/') {
        return None;
    }
    Some((host.to_string(), path.to_string()))
}
