//! repo command - configure the repository holding the tables

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use super::Workspace;
use crate::cli::Context;
use crate::core::config::RepositoryConfig;
use crate::table::files::list_folders;
use crate::ui::output;

/// Use a git repository.
pub fn set(ctx: &Context, url: &str, branch: &str, name: Option<&str>) -> Result<()> {
    let mut ws = Workspace::load(ctx)?;
    ws.locator
        .repo_name(url)
        .with_context(|| format!("Cannot derive a folder name from '{}'", url))?;
    ws.configure(RepositoryConfig::git(url, branch, name))?;

    output::print(
        format!(
            "Configured {} ({} @ {})",
            ws.locator.display_name(),
            url,
            branch
        ),
        ctx.verbosity(),
    );
    Ok(())
}

/// Use a folder on disk.
pub fn set_local(ctx: &Context, path: &Path, name: Option<&str>) -> Result<()> {
    let path = ctx.resolve(path)?;
    if !path.is_dir() {
        bail!("'{}' is not a directory", path.display());
    }
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve '{}'", path.display()))?;

    let mut ws = Workspace::load(ctx)?;
    ws.configure(RepositoryConfig::local(&path.to_string_lossy(), name))?;

    output::print(
        format!(
            "Configured {} ({})",
            ws.locator.display_name(),
            path.display()
        ),
        ctx.verbosity(),
    );
    Ok(())
}

/// Show the configured repository.
pub fn show(ctx: &Context) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let Ok(config) = ws.locator.require() else {
        output::result("Repository not configured");
        return Ok(());
    };

    output::result(format!("name:   {}", ws.locator.display_name()));
    match config {
        RepositoryConfig::Git {
            repo_url, branch, ..
        } => {
            output::result("type:   git");
            output::result(format!("url:    {}", repo_url));
            output::result(format!("branch: {}", branch));
        }
        RepositoryConfig::LocalFilesystem { .. } => output::result("type:   local folder"),
    }
    let path = ws.repository_path()?;
    let state = if path.exists() { "" } else { " (not synced)" };
    output::result(format!("path:   {}{}", path.display(), state));
    Ok(())
}

/// Forget the configured repository.
pub fn clear(ctx: &Context) -> Result<()> {
    let mut ws = Workspace::load(ctx)?;
    ws.store
        .clear()
        .context("Failed to clear repository configuration")?;
    ws.locator.clear();
    output::print("Repository configuration cleared", ctx.verbosity());
    Ok(())
}

/// List folders inside the working copy.
pub fn folders(ctx: &Context) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let path = ws.repository_path()?;
    let folders = list_folders(&path).context("Run 'ruledesk sync' first")?;
    output::result(output::format_list(&folders, ""));
    Ok(())
}
