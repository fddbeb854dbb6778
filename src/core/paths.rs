//! core::paths
//!
//! Mapping repositories to local working copies.
//!
//! # Layout
//!
//! Every git repository is cloned into `<repos_dir>/<name>`, where `<name>`
//! is the last path segment of the repository URL without `.git`. URLs that
//! go through the hosting proxy (`<proxy-origin>/proxy/host/org/repo`) are
//! rewritten to `https://host/org/repo` first.
//!
//! Local-filesystem repositories are used in place.
//!
//! ```text
//! <repos_dir>/
//!   .locks/<name>.lock      RepoLock for the working copy
//!   <name>/                 working copy
//!     rules/*.xlsx          decision tables
//! ```
//!
//! # Example
//!
//! ```
//! use ruledesk::core::config::RepositoryConfig;
//! use ruledesk::core::paths::RepositoryLocator;
//! use std::path::PathBuf;
//!
//! let mut locator = RepositoryLocator::new("./repos/", "https://proxy.example/proxy/");
//! assert!(!locator.is_configured());
//!
//! locator.set_config(RepositoryConfig::git("https://github.com/acme/pricing.git", "main", None));
//! assert_eq!(locator.repository_path().unwrap(), PathBuf::from("./repos/pricing"));
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use super::config::RepositoryConfig;

/// Name of the directory under `repos_dir` holding per-repository locks.
const LOCKS_DIR: &str = ".locks";

/// Fallback display name when nothing better is known.
pub const DEFAULT_DISPLAY_NAME: &str = "Repository";

/// Errors from resolving repository locations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    /// No repository is configured.
    #[error("repository not configured")]
    NotConfigured,

    /// The repository URL has no usable path segment.
    #[error("invalid repository URL: {0}")]
    InvalidUrl(String),
}

/// Rewrite a proxied URL to its direct `https://` form.
///
/// # Example
///
/// ```
/// use ruledesk::core::paths::rewrite_proxy_url;
///
/// assert_eq!(
///     rewrite_proxy_url("https://proxy.example/proxy/github.com/o/r", "https://proxy.example/proxy/"),
///     "https://github.com/o/r"
/// );
/// assert_eq!(rewrite_proxy_url("https://github.com/o/r", "https://proxy.example/proxy/"), "https://github.com/o/r");
/// ```
pub fn rewrite_proxy_url(url: &str, proxy_prefix: &str) -> String {
    match url.strip_prefix(proxy_prefix) {
        Some(rest) if !proxy_prefix.is_empty() => format!("https://{}", rest),
        _ => url.to_string(),
    }
}

/// Repository name from a URL: last path segment without `.git`.
///
/// Handles `scp`-style remotes (`git@host:org/repo.git`) as well. A final
/// segment of `.` or `..` names no repository, since it would place the
/// working copy outside the repositories directory.
///
/// # Example
///
/// ```
/// use ruledesk::core::paths::repo_name_from_url;
///
/// assert_eq!(repo_name_from_url("https://github.com/acme/pricing.git").as_deref(), Some("pricing"));
/// assert_eq!(repo_name_from_url("git@github.com:acme/pricing.git").as_deref(), Some("pricing"));
/// assert_eq!(repo_name_from_url("https://github.com/"), None);
/// assert_eq!(repo_name_from_url("git@github.com:acme/.."), None);
/// ```
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => url.to_string(),
    };
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    path.rsplit(['/', ':'])
        .next()
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(String::from)
}

/// Resolves the configured repository to a local working copy.
///
/// Holds the current [`RepositoryConfig`] explicitly; there is no global.
#[derive(Debug, Clone)]
pub struct RepositoryLocator {
    base_dir: PathBuf,
    proxy_prefix: String,
    config: Option<RepositoryConfig>,
}

impl RepositoryLocator {
    /// Create an unconfigured locator.
    pub fn new(base_dir: impl Into<PathBuf>, proxy_prefix: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            proxy_prefix: proxy_prefix.into(),
            config: None,
        }
    }

    /// Builder-style variant of [`Self::set_config`].
    pub fn with_config(mut self, config: Option<RepositoryConfig>) -> Self {
        self.config = config;
        self
    }

    /// Replace the current configuration.
    pub fn set_config(&mut self, config: RepositoryConfig) {
        self.config = Some(config);
    }

    /// Forget the current configuration.
    pub fn clear(&mut self) {
        self.config = None;
    }

    pub fn config(&self) -> Option<&RepositoryConfig> {
        self.config.as_ref()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Whether a complete configuration is held.
    pub fn is_configured(&self) -> bool {
        self.config.as_ref().is_some_and(RepositoryConfig::is_configured)
    }

    /// The configured config, or `NotConfigured`.
    pub fn require(&self) -> Result<&RepositoryConfig, LocatorError> {
        self.config
            .as_ref()
            .filter(|c| c.is_configured())
            .ok_or(LocatorError::NotConfigured)
    }

    /// Local working copy of the configured repository.
    pub fn repository_path(&self) -> Result<PathBuf, LocatorError> {
        match self.require()? {
            RepositoryConfig::Git { repo_url, .. } => self.path_for_url(repo_url),
            RepositoryConfig::LocalFilesystem { local_path, .. } => Ok(PathBuf::from(local_path)),
        }
    }

    /// Local working copy for an arbitrary repository URL.
    pub fn path_for_url(&self, repo_url: &str) -> Result<PathBuf, LocatorError> {
        Ok(self.base_dir.join(self.repo_name(repo_url)?))
    }

    /// Repository name for a URL, after proxy rewriting.
    pub fn repo_name(&self, repo_url: &str) -> Result<String, LocatorError> {
        let direct = self.direct_url(repo_url);
        repo_name_from_url(&direct).ok_or_else(|| LocatorError::InvalidUrl(repo_url.to_string()))
    }

    /// The URL with any proxy prefix rewritten away.
    pub fn direct_url(&self, repo_url: &str) -> String {
        rewrite_proxy_url(repo_url, &self.proxy_prefix)
    }

    /// Lock file guarding the working copy at `repo_path`.
    pub fn lock_path(&self, repo_path: &Path) -> PathBuf {
        let name = repo_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());
        self.base_dir.join(LOCKS_DIR).join(format!("{}.lock", name))
    }

    /// Human-readable name of the configured repository.
    ///
    /// The explicit display name if set, otherwise the name derived from the
    /// URL or local path, otherwise [`DEFAULT_DISPLAY_NAME`].
    pub fn display_name(&self) -> String {
        let Ok(config) = self.require() else {
            return DEFAULT_DISPLAY_NAME.to_string();
        };
        if let Some(name) = config.display_name().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        let derived = match config {
            RepositoryConfig::Git { repo_url, .. } => self.repo_name(repo_url).ok(),
            RepositoryConfig::LocalFilesystem { local_path, .. } => Path::new(local_path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        };
        derived.unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROXY: &str = "https://git-manager.devin.ai/proxy/";

    fn locator() -> RepositoryLocator {
        RepositoryLocator::new("/srv/repos", PROXY)
    }

    #[test]
    fn unconfigured_path_fails() {
        assert_eq!(locator().repository_path(), Err(LocatorError::NotConfigured));
    }

    #[test]
    fn proxied_url_maps_to_repo_dir() {
        let mut loc = locator();
        loc.set_config(RepositoryConfig::git(
            &format!("{}github.com/acme/rules-lite.git", PROXY),
            "main",
            None,
        ));
        assert_eq!(
            loc.repository_path().unwrap(),
            PathBuf::from("/srv/repos/rules-lite")
        );
    }

    #[test]
    fn incomplete_git_config_is_unconfigured() {
        let mut loc = locator();
        loc.set_config(RepositoryConfig::git("https://github.com/acme/r.git", " ", None));
        assert!(!loc.is_configured());
        assert_eq!(loc.repository_path(), Err(LocatorError::NotConfigured));
    }

    #[test]
    fn local_path_is_used_in_place() {
        let mut loc = locator();
        loc.set_config(RepositoryConfig::local("/data/tables", None));
        assert_eq!(loc.repository_path().unwrap(), PathBuf::from("/data/tables"));
        assert_eq!(loc.display_name(), "tables");
    }

    #[test]
    fn display_name_precedence() {
        let mut loc = locator();
        assert_eq!(loc.display_name(), DEFAULT_DISPLAY_NAME);

        loc.set_config(RepositoryConfig::git("https://github.com/acme/pricing.git", "main", None));
        assert_eq!(loc.display_name(), "pricing");

        loc.set_config(RepositoryConfig::git(
            "https://github.com/acme/pricing.git",
            "main",
            Some("Pricing rules"),
        ));
        assert_eq!(loc.display_name(), "Pricing rules");
    }

    #[test]
    fn clear_unconfigures() {
        let mut loc = locator();
        loc.set_config(RepositoryConfig::local("/x", None));
        loc.clear();
        assert!(!loc.is_configured());
    }

    #[test]
    fn url_without_name_is_invalid() {
        assert!(matches!(
            locator().path_for_url("https://github.com/"),
            Err(LocatorError::InvalidUrl(_))
        ));
    }

    #[test]
    fn lock_path_is_per_repository() {
        let loc = locator();
        assert_eq!(
            loc.lock_path(Path::new("/srv/repos/pricing")),
            PathBuf::from("/srv/repos/.locks/pricing.lock")
        );
    }

    #[test]
    fn repo_names() {
        assert_eq!(repo_name_from_url("https://h/o/r/").as_deref(), Some("r"));
        assert_eq!(repo_name_from_url("file:///tmp/remote.git").as_deref(), Some("remote"));
        assert_eq!(repo_name_from_url("/tmp/bare.git").as_deref(), Some("bare"));
    }

    #[test]
    fn dot_segments_are_not_repository_names() {
        assert_eq!(repo_name_from_url("git@host:org/.."), None);
        assert_eq!(repo_name_from_url("git@host:org/."), None);
        assert_eq!(repo_name_from_url("/srv/git/.."), None);
        assert_eq!(repo_name_from_url("ssh://host/org/..git"), None);
    }

    #[test]
    fn dot_segment_url_cannot_escape_repos_dir() {
        let loc = locator().with_config(Some(RepositoryConfig::git("git@host:org/..", "main", None)));
        assert!(matches!(
            loc.repository_path(),
            Err(LocatorError::InvalidUrl(_))
        ));
        assert!(matches!(
            loc.path_for_url("git@host:org/."),
            Err(LocatorError::InvalidUrl(_))
        ));
    }

    #[test]
    fn empty_proxy_prefix_never_rewrites() {
        assert_eq!(rewrite_proxy_url("http://x/y", ""), "http://x/y");
    }
}
