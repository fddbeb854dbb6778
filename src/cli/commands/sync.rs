//! sync command - make the working copy match the remote branch
//!
//! # Example
//!
//! ```bash
//! ruledesk sync
//! ```

use anyhow::{Context as _, Result};

use super::Workspace;
use crate::cli::Context;
use crate::publish::SyncOutcome;
use crate::ui::output;

/// Sync the configured repository.
pub fn sync(ctx: &Context) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let outcome = ws
        .workflow()
        .sync_configured()
        .context("Sync failed")?;

    let message = match &outcome {
        SyncOutcome::Cloned { path } => format!("Cloned into {}", path.display()),
        SyncOutcome::Updated { path } => format!("Updated {}", path.display()),
        SyncOutcome::Local { path } => {
            format!("Using local folder {}; nothing to sync", path.display())
        }
    };
    output::print(message, ctx.verbosity());
    Ok(())
}
