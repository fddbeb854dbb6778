//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$RULEDESK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/ruledesk/config.toml`
//! 3. `~/.ruledesk/config.toml` (canonical write location)
//!
//! # Repository Config
//!
//! The repository being edited is stored separately, in the state file
//! (`.ruledesk/repository.toml` by default), because it is replaced
//! wholesale whenever the user points the tool at another repository.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the branch must be a valid branch name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// repos_dir = "/var/lib/ruledesk/repos"
/// rules_dir = "rules"
/// proxy_prefix = "https://git-manager.devin.ai/proxy/"
/// branch_utc_offset_minutes = -300
/// command_timeout_secs = 120
/// remote = "origin"
/// state_file = ".ruledesk/repository.toml"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Directory that holds cloned working copies
    pub repos_dir: Option<String>,

    /// Folder inside a working copy that holds decision tables
    pub rules_dir: Option<String>,

    /// URL prefix of the hosting proxy, rewritten to `https://`
    pub proxy_prefix: Option<String>,

    /// Reference time zone for branch-name timestamps, as minutes east of UTC
    pub branch_utc_offset_minutes: Option<i32>,

    /// Upper bound for any single git invocation
    pub command_timeout_secs: Option<u64>,

    /// Remote that publishes are pushed to
    pub remote: Option<String>,

    /// Where the repository configuration is persisted
    pub state_file: Option<String>,
}

/// Largest accepted reference offset (UTC±14:00).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

impl GlobalConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(offset) = self.branch_utc_offset_minutes {
            if offset.abs() > MAX_OFFSET_MINUTES {
                return Err(ConfigError::InvalidValue(format!(
                    "branch_utc_offset_minutes must be within ±{}, got {}",
                    MAX_OFFSET_MINUTES, offset
                )));
            }
        }
        if self.command_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "command_timeout_secs must be greater than 0".into(),
            ));
        }
        for (key, value) in [
            ("repos_dir", &self.repos_dir),
            ("rules_dir", &self.rules_dir),
            ("remote", &self.remote),
            ("state_file", &self.state_file),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!("{} cannot be empty", key)));
            }
        }
        Ok(())
    }
}

/// The repository whose decision tables are being edited.
///
/// # Example
///
/// ```toml
/// repositoryType = "GIT"
/// repoUrl = "https://github.com/acme/pricing.git"
/// branch = "main"
/// displayName = "Pricing"
/// configured = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "repositoryType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepositoryConfig {
    #[serde(rename_all = "camelCase")]
    Git {
        repo_url: String,
        branch: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        #[serde(default)]
        configured: bool,
    },
    #[serde(rename_all = "camelCase")]
    LocalFilesystem {
        local_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        #[serde(default)]
        configured: bool,
    },
}

impl RepositoryConfig {
    /// A configured git repository.
    pub fn git(repo_url: &str, branch: &str, display_name: Option<&str>) -> Self {
        RepositoryConfig::Git {
            repo_url: repo_url.to_string(),
            branch: branch.to_string(),
            display_name: display_name.map(String::from),
            configured: true,
        }
    }

    /// A configured local-filesystem repository.
    pub fn local(local_path: &str, display_name: Option<&str>) -> Self {
        RepositoryConfig::LocalFilesystem {
            local_path: local_path.to_string(),
            display_name: display_name.map(String::from),
            configured: true,
        }
    }

    /// Whether this configuration is complete and marked configured.
    ///
    /// Git needs a URL and a branch; local needs a path.
    pub fn is_configured(&self) -> bool {
        let filled = |s: &str| !s.trim().is_empty();
        match self {
            RepositoryConfig::Git {
                repo_url,
                branch,
                configured,
                ..
            } => *configured && filled(repo_url) && filled(branch),
            RepositoryConfig::LocalFilesystem {
                local_path,
                configured,
                ..
            } => *configured && filled(local_path),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            RepositoryConfig::Git { display_name, .. }
            | RepositoryConfig::LocalFilesystem { display_name, .. } => display_name.as_deref(),
        }
    }

    /// The git URL, for git repositories.
    pub fn repo_url(&self) -> Option<&str> {
        match self {
            RepositoryConfig::Git { repo_url, .. } => Some(repo_url),
            RepositoryConfig::LocalFilesystem { .. } => None,
        }
    }

    /// The tracked branch, for git repositories.
    pub fn branch(&self) -> Option<&str> {
        match self {
            RepositoryConfig::Git { branch, .. } => Some(branch),
            RepositoryConfig::LocalFilesystem { .. } => None,
        }
    }

    /// Copy of this config with `configured` forced on.
    pub fn marked_configured(mut self) -> Self {
        match &mut self {
            RepositoryConfig::Git { configured, .. }
            | RepositoryConfig::LocalFilesystem { configured, .. } => *configured = true,
        }
        self
    }

    /// Validate a configuration about to be saved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            RepositoryConfig::Git {
                repo_url, branch, ..
            } => {
                if repo_url.trim().is_empty() {
                    return Err(ConfigError::InvalidValue("repoUrl cannot be empty".into()));
                }
                BranchName::new(branch.as_str())
                    .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
            }
            RepositoryConfig::LocalFilesystem { local_path, .. } => {
                if local_path.trim().is_empty() {
                    return Err(ConfigError::InvalidValue("localPath cannot be empty".into()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn default_is_valid() {
            assert!(GlobalConfig::default().validate().is_ok());
        }

        #[test]
        fn parse_full() {
            let toml = r#"
                repos_dir = "/srv/repos"
                rules_dir = "tables"
                branch_utc_offset_minutes = 330
                command_timeout_secs = 30
            "#;
            let config: GlobalConfig = toml::from_str(toml).unwrap();
            assert_eq!(config.repos_dir.as_deref(), Some("/srv/repos"));
            assert_eq!(config.branch_utc_offset_minutes, Some(330));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn unknown_fields_rejected() {
            let result: Result<GlobalConfig, _> = toml::from_str("colour = \"blue\"");
            assert!(result.is_err());
        }

        #[test]
        fn offset_out_of_range() {
            let config = GlobalConfig {
                branch_utc_offset_minutes: Some(15 * 60),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn zero_timeout_rejected() {
            let config = GlobalConfig {
                command_timeout_secs: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn empty_dir_rejected() {
            let config = GlobalConfig {
                repos_dir: Some(" ".into()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    mod repository_config {
        use super::*;

        #[test]
        fn git_roundtrip_uses_wire_names() {
            let config = RepositoryConfig::git("https://h/o/r.git", "main", Some("Rules"));
            let text = toml::to_string(&config).unwrap();
            assert!(text.contains("repositoryType = \"GIT\""));
            assert!(text.contains("repoUrl = "));
            let back: RepositoryConfig = toml::from_str(&text).unwrap();
            assert_eq!(back, config);
        }

        #[test]
        fn local_parses() {
            let config: RepositoryConfig = toml::from_str(
                "repositoryType = \"LOCAL_FILESYSTEM\"\nlocalPath = \"/x\"\nconfigured = true\n",
            )
            .unwrap();
            assert!(config.is_configured());
            assert_eq!(config.repo_url(), None);
        }

        #[test]
        fn configured_flag_required() {
            let config: RepositoryConfig = toml::from_str(
                "repositoryType = \"GIT\"\nrepoUrl = \"https://h/o/r\"\nbranch = \"main\"\n",
            )
            .unwrap();
            assert!(!config.is_configured());
            assert!(config.marked_configured().is_configured());
        }

        #[test]
        fn validate_branch() {
            assert!(RepositoryConfig::git("https://h/o/r", "main", None)
                .validate()
                .is_ok());
            assert!(RepositoryConfig::git("https://h/o/r", "bad branch", None)
                .validate()
                .is_err());
            assert!(RepositoryConfig::git("", "main", None).validate().is_err());
            assert!(RepositoryConfig::local("  ", None).validate().is_err());
        }
    }
}
