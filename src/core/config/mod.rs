//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Two kinds of configuration exist:
//! - **Global settings** ([`GlobalConfig`]): where working copies live,
//!   the reference time zone for branch names, command timeouts.
//! - **Repository state** ([`RepositoryConfig`]): which repository and
//!   branch are being edited. Persisted by [`RepositoryStore`].
//!
//! # Precedence
//!
//! Settings are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Environment (`RULEDESK_REPO_DIR` for the repos directory)
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$RULEDESK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/ruledesk/config.toml`
//! 3. `~/.ruledesk/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use ruledesk::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Working copies live in {}", config.repos_dir().display());
//! println!("Git commands time out after {:?}", config.command_timeout());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepositoryConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding the global config location.
pub const CONFIG_ENV: &str = "RULEDESK_CONFIG";

/// Environment variable overriding the repos directory.
pub const REPO_DIR_ENV: &str = "RULEDESK_REPO_DIR";

/// Default directory for cloned working copies.
pub const DEFAULT_REPOS_DIR: &str = "./repos/";

/// Default folder holding decision tables inside a working copy.
pub const DEFAULT_RULES_DIR: &str = "rules";

/// Default hosting proxy prefix.
pub const DEFAULT_PROXY_PREFIX: &str = "https://git-manager.devin.ai/proxy/";

/// Default bound on a single git invocation.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;

/// Default location of the persisted repository config.
pub const DEFAULT_STATE_FILE: &str = ".ruledesk/repository.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Resolved settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the global config file
    pub global: GlobalConfig,
    /// Path the global config was read from (if any)
    path: Option<PathBuf>,
    /// Value of `RULEDESK_REPO_DIR` captured at load time
    repo_dir_env: Option<String>,
}

impl Config {
    /// Load configuration from the default locations and environment.
    ///
    /// A missing config file is not an error; defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        let (global, path) = Self::load_global()?;
        global.validate()?;
        let repo_dir_env = std::env::var(REPO_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(Self {
            global,
            path,
            repo_dir_env,
        })
    }

    /// Build a configuration from explicit values, ignoring files and
    /// environment.
    pub fn from_global(global: GlobalConfig) -> Result<Self, ConfigError> {
        global.validate()?;
        Ok(Self {
            global,
            path: None,
            repo_dir_env: None,
        })
    }

    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("ruledesk/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".ruledesk/config.toml"));
        }

        for path in candidates {
            if path.exists() {
                debug!(path = %path.display(), "loading global config");
                let config = read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }
        Ok((GlobalConfig::default(), None))
    }

    /// Path the global config was loaded from.
    pub fn source_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Canonical write location for the global config: `~/.ruledesk/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".ruledesk/config.toml"))
    }

    /// Validate and write the global config atomically.
    pub fn write_global(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = Self::global_config_path()?;
        write_toml_atomic(&path, config)?;
        Ok(path)
    }

    // =========================================================================
    // Accessors with defaults applied
    // =========================================================================

    /// Directory holding cloned working copies.
    ///
    /// `RULEDESK_REPO_DIR` wins over the config file; defaults to `./repos/`.
    pub fn repos_dir(&self) -> PathBuf {
        let dir = self
            .repo_dir_env
            .as_deref()
            .or(self.global.repos_dir.as_deref())
            .unwrap_or(DEFAULT_REPOS_DIR);
        PathBuf::from(dir)
    }

    /// Folder holding decision tables inside a working copy.
    pub fn rules_dir(&self) -> &str {
        self.global.rules_dir.as_deref().unwrap_or(DEFAULT_RULES_DIR)
    }

    /// Hosting proxy prefix rewritten to `https://`.
    pub fn proxy_prefix(&self) -> &str {
        self.global
            .proxy_prefix
            .as_deref()
            .unwrap_or(DEFAULT_PROXY_PREFIX)
    }

    /// Reference time zone for branch-name timestamps. Defaults to UTC.
    pub fn branch_offset(&self) -> FixedOffset {
        let minutes = self.global.branch_utc_offset_minutes.unwrap_or(0);
        FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    /// Upper bound for one git invocation.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(
            self.global
                .command_timeout_secs
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
        )
    }

    /// Remote that publishes are pushed to. Defaults to `origin`.
    pub fn remote(&self) -> &str {
        self.global.remote.as_deref().unwrap_or("origin")
    }

    /// Location of the persisted repository config.
    pub fn state_file(&self) -> PathBuf {
        PathBuf::from(
            self.global
                .state_file
                .as_deref()
                .unwrap_or(DEFAULT_STATE_FILE),
        )
    }
}

/// Persistence for the current [`RepositoryConfig`].
///
/// Lifecycle: [`load`](Self::load) once at start-up, [`save`](Self::save)
/// to replace the configuration wholesale, [`clear`](Self::clear) to go
/// back to unconfigured.
#[derive(Debug, Clone)]
pub struct RepositoryStore {
    path: PathBuf,
}

impl RepositoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted configuration, if any.
    pub fn load(&self) -> Result<Option<RepositoryConfig>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_toml(&self.path).map(Some)
    }

    /// Validate, mark configured and persist `config`. Returns what was stored.
    pub fn save(&self, config: RepositoryConfig) -> Result<RepositoryConfig, ConfigError> {
        config.validate()?;
        let config = config.marked_configured();
        write_toml_atomic(&self.path, &config)?;
        debug!(path = %self.path.display(), "saved repository config");
        Ok(config)
    }

    /// Remove the persisted configuration. Clearing twice is not an error.
    pub fn clear(&self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConfigError::WriteError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a TOML file atomically (temp file in the same directory, then rename).
fn write_toml_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let write_err = |path: &Path, source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_err(path, e))?;
    }

    let contents =
        toml::to_string_pretty(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| write_err(&temp_path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| write_err(&temp_path, e))?;
    file.sync_all().map_err(|e| write_err(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| write_err(path, e))
}
