//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads what it needs into a [`Workspace`]
//! 2. Calls the table model or the publish workflow
//! 3. Formats and displays output
//!
//! Table files are `.xlsx` workbooks read and written through
//! [`Workbook`](crate::table::Workbook). Edits run under the
//! [`EditGuard`](crate::publish::EditGuard) of the working copy.

mod branch_name;
mod branches;
mod completion;
mod publish;
mod repo;
mod sync;
mod table;

pub use branch_name::branch_name;
pub use branches::branches;
pub use completion::completion;
pub use publish::publish;
pub use sync::sync;

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use super::args::{Command, RepoAction, TableAction};
use super::Context;
use crate::core::config::{Config, RepositoryConfig, RepositoryStore};
use crate::core::paths::RepositoryLocator;
use crate::git::GitCli;
use crate::publish::PublishWorkflow;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Repo { action } => match action {
            RepoAction::Set { url, branch, name } => {
                repo::set(ctx, &url, &branch, name.as_deref())
            }
            RepoAction::SetLocal { path, name } => repo::set_local(ctx, &path, name.as_deref()),
            RepoAction::Show => repo::show(ctx),
            RepoAction::Clear => repo::clear(ctx),
            RepoAction::Folders => repo::folders(ctx),
        },
        Command::Table { action } => match action {
            TableAction::List => table::list(ctx),
            TableAction::Show { file, json } => table::show(ctx, &file, json),
            TableAction::Validate { file } => table::validate(ctx, &file),
            TableAction::AddColumn {
                file,
                kind,
                name,
                template,
            } => table::add_column(
                ctx,
                &file,
                kind.into(),
                name.as_deref(),
                template.as_deref(),
            ),
            TableAction::DeleteColumn { file, index } => table::delete_column(ctx, &file, index),
            TableAction::SetRows { file, rows } => table::set_rows(ctx, &file, &rows),
        },
        Command::Sync => sync::sync(ctx),
        Command::BranchName { file } => branch_name::branch_name(ctx, &file),
        Command::Publish {
            file,
            message,
            branch,
            base,
            title,
            body,
        } => publish::publish(
            ctx,
            &file,
            &message,
            branch.as_deref(),
            base.as_deref(),
            title.as_deref(),
            body.as_deref(),
        ),
        Command::Branches { url, json } => branches::branches(ctx, url.as_deref(), json),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Configuration, persisted repository state and the locator built from them.
#[derive(Debug)]
pub struct Workspace {
    pub config: Config,
    pub store: RepositoryStore,
    pub locator: RepositoryLocator,
}

impl Workspace {
    /// Load settings and the persisted repository configuration.
    ///
    /// Relative directories in the config resolve against the context root.
    pub fn load(ctx: &Context) -> Result<Self> {
        let root = ctx.root()?;
        let config = Config::load().context("Failed to load config")?;
        let store = RepositoryStore::new(root.join(config.state_file()));
        let repository = store
            .load()
            .context("Failed to read repository configuration")?;
        let locator = RepositoryLocator::new(root.join(config.repos_dir()), config.proxy_prefix())
            .with_config(repository);
        Ok(Self {
            config,
            store,
            locator,
        })
    }

    /// Persist `repository` and make it current.
    pub fn configure(&mut self, repository: RepositoryConfig) -> Result<&RepositoryConfig> {
        let saved = self
            .store
            .save(repository)
            .context("Failed to save repository configuration")?;
        self.locator.set_config(saved);
        self.locator
            .config()
            .context("Repository configuration missing after save")
    }

    /// Workflow over the `git` binary with the configured settings.
    pub fn workflow(&self) -> PublishWorkflow<GitCli> {
        PublishWorkflow::new(
            GitCli::new(self.config.command_timeout()),
            self.locator.clone(),
        )
        .with_remote(self.config.remote())
        .with_rules_dir(self.config.rules_dir())
        .with_offset(self.config.branch_offset())
    }

    /// Working copy of the configured repository.
    pub fn repository_path(&self) -> Result<PathBuf> {
        self.locator
            .repository_path()
            .context("Repository not configured. Run 'ruledesk repo set' first.")
    }

    /// Folder holding decision tables.
    pub fn rules_path(&self) -> Result<PathBuf> {
        Ok(self.repository_path()?.join(self.config.rules_dir()))
    }

    /// Path of a table file inside the rules folder.
    ///
    /// Only plain file names are accepted.
    pub fn table_path(&self, file: &str) -> Result<PathBuf> {
        if !is_plain_file_name(file) {
            bail!("'{}' is not a file name inside the rules folder", file);
        }
        let path = self.rules_path()?.join(file);
        if !path.is_file() {
            bail!("Table '{}' not found in {}", file, self.config.rules_dir());
        }
        Ok(path)
    }
}

fn is_plain_file_name(file: &str) -> bool {
    let mut components = Path::new(file).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_file_names() {
        assert!(is_plain_file_name("Pricing.xlsx"));
        assert!(!is_plain_file_name("../Pricing.xlsx"));
        assert!(!is_plain_file_name("sub/Pricing.xlsx"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name(""));
    }
}
