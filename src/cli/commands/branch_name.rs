//! branch-name command - preview the generated branch name

use anyhow::{Context as _, Result};

use super::Workspace;
use crate::cli::Context;
use crate::ui::output;

/// Print the name a publish of `file` would use now.
pub fn branch_name(ctx: &Context, file: &str) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let workflow = ws.workflow();
    let url = workflow
        .configured_url()
        .context("A git repository must be configured")?;
    output::result(workflow.generate_branch_name(file, url));
    Ok(())
}
