//! publish command - commit one table on a new branch and push it
//!
//! # Example
//!
//! ```bash
//! ruledesk publish Pricing.xlsx -m "Raise senior discount"
//! ruledesk publish Pricing.xlsx -m "Q3 rates" --branch rates-q3 --base release
//! ```

use anyhow::{anyhow, Context as _, Result};

use super::Workspace;
use crate::cli::Context;
use crate::publish::WorkflowError;
use crate::ui::output;

/// Publish `file` and announce the pull request.
pub fn publish(
    ctx: &Context,
    file: &str,
    message: &str,
    branch: Option<&str>,
    base: Option<&str>,
    title: Option<&str>,
    body: Option<&str>,
) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    ws.table_path(file)?;

    let workflow = ws.workflow();
    let url = workflow
        .configured_url()
        .context("Publishing needs a git repository")?;
    let base = match base {
        Some(base) => base,
        None => workflow.configured_branch()?,
    };

    let head = match workflow.publish(file, url, branch, message) {
        Ok(head) => head,
        Err(WorkflowError::Publish {
            step,
            branch,
            branch_created: true,
            source,
        }) => {
            output::warn(
                format!(
                    "branch '{}' was created locally but the {} step failed; \
                     fix the problem and push it with 'git push {} {}', \
                     or run 'ruledesk sync' to return to {}",
                    branch,
                    step,
                    ws.config.remote(),
                    branch,
                    base
                ),
                ctx.verbosity(),
            );
            return Err(anyhow!(source).context(format!("Publish of '{}' failed", branch)));
        }
        Err(e) => return Err(anyhow!(e).context("Publish failed")),
    };

    output::result(format!("Pushed {} to {}", head, ws.config.remote()));
    let announcement =
        workflow.announce_pull_request(url, base, &head, title.unwrap_or(message), body);
    output::print(announcement, ctx.verbosity());
    Ok(())
}
