//! branches command - list remote branches, newest first

use anyhow::{Context as _, Result};

use super::Workspace;
use crate::cli::Context;
use crate::ui::output;

/// List the branches of `url`, or of the configured repository.
pub fn branches(ctx: &Context, url: Option<&str>, json: bool) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let workflow = ws.workflow();
    let url = match url {
        Some(url) => url,
        None => workflow
            .configured_url()
            .context("Pass a repository URL or configure a git repository")?,
    };

    let branches = workflow
        .list_remote_branches(url)
        .with_context(|| format!("Failed to list branches of {}", url))?;

    if json {
        output::result(serde_json::to_string_pretty(&branches).context("Failed to encode branches")?);
    } else {
        output::result(output::format_branches(&branches));
    }
    Ok(())
}
