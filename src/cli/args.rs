//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if started in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::table::ColumnKind;

/// ruledesk - edit spreadsheet decision tables and publish them for review
#[derive(Parser, Debug)]
#[command(name = "ruledesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if ruledesk was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configure which repository holds the decision tables
    #[command(
        name = "repo",
        long_about = "Configure which repository holds the decision tables.\n\n\
            A git repository is cloned under the repos directory on first sync. \
            A local folder is used in place and cannot be published.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Point at a git repository and branch
    ruledesk repo set --url https://github.com/acme/pricing.git --branch main

    # Use a folder on disk instead
    ruledesk repo set-local --path ./tables

    # See what is configured
    ruledesk repo show"
    )]
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },

    /// Inspect and edit decision tables
    #[command(
        name = "table",
        long_about = "Inspect and edit decision tables in the rules folder.\n\n\
            Column edits shift every row of the sheet, so condition columns stay \
            together before the action columns. NAME and the last remaining \
            CONDITION or ACTION column cannot be deleted.",
        after_help = "\
WORKFLOW EXAMPLES:
    # List tables, then look at one
    ruledesk table list
    ruledesk table show Pricing.xlsx

    # Add a condition column with its own template
    ruledesk table add-column Pricing.xlsx --kind condition --template 'customer.getTier() == $param'

    # Remove column 2 (indices are shown by 'table show')
    ruledesk table delete-column Pricing.xlsx 2"
    )]
    Table {
        #[command(subcommand)]
        action: TableAction,
    },

    /// Make the working copy match the remote branch
    #[command(
        name = "sync",
        long_about = "Make the working copy match the configured remote branch exactly.\n\n\
            Clones the repository when it is not present yet. An existing working copy \
            must have no uncommitted changes; it is then checked out, fetched and hard \
            reset to the remote tip, discarding local commits on that branch."
    )]
    Sync,

    /// Print the branch name a publish would use now
    #[command(name = "branch-name")]
    BranchName {
        /// Table file inside the rules folder
        file: String,
    },

    /// Commit one table on a new branch and push it
    #[command(
        name = "publish",
        long_about = "Commit one table on a new branch and push it.\n\n\
            The branch is created from the current HEAD. Without --branch its name is \
            generated from the repository, the file and the current minute, so two \
            publishes of the same file within one minute collide.\n\n\
            After pushing, the compare page for opening a pull request is printed.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Full edit cycle
    ruledesk sync
    ruledesk table add-column Pricing.xlsx --kind action
    ruledesk publish Pricing.xlsx -m 'Add loyalty discount'

    # Pick the branch name and pull-request title yourself
    ruledesk publish Pricing.xlsx -m 'Q3 rates' --branch rates-q3 --title 'Q3 pricing'"
    )]
    Publish {
        /// Table file inside the rules folder
        file: String,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Branch to create (generated when omitted)
        #[arg(long)]
        branch: Option<String>,

        /// Base branch for the pull request (defaults to the configured branch)
        #[arg(long)]
        base: Option<String>,

        /// Pull-request title (defaults to the commit message)
        #[arg(long)]
        title: Option<String>,

        /// Pull-request description
        #[arg(long)]
        body: Option<String>,
    },

    /// List remote branches, newest first
    #[command(
        name = "branches",
        long_about = "List the branches of a remote, newest commit first.\n\n\
            The newest branch is marked latest; main and master are marked main. \
            Branches whose commit time cannot be resolved are listed last."
    )]
    Branches {
        /// Repository URL (defaults to the configured repository)
        url: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    ruledesk completion bash > ~/.local/share/bash-completion/completions/ruledesk

    # Zsh
    ruledesk completion zsh > ~/.zfunc/_ruledesk

    # Fish
    ruledesk completion fish > ~/.config/fish/completions/ruledesk.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Repository configuration actions.
#[derive(Subcommand, Debug)]
pub enum RepoAction {
    /// Use a git repository
    Set {
        /// Repository URL
        #[arg(long)]
        url: String,

        /// Branch holding the tables
        #[arg(long)]
        branch: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Use a folder on disk
    SetLocal {
        /// Folder holding the repository
        #[arg(long)]
        path: PathBuf,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show the configured repository
    Show,

    /// Forget the configured repository
    Clear,

    /// List folders inside the working copy
    Folders,
}

/// Table actions.
#[derive(Subcommand, Debug)]
pub enum TableAction {
    /// List table files in the rules folder
    List,

    /// Print a table
    Show {
        file: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that a table has NAME, CONDITION and ACTION columns
    Validate { file: String },

    /// Insert a CONDITION or ACTION column
    AddColumn {
        file: String,

        /// Column kind
        #[arg(long, value_enum)]
        kind: KindArg,

        /// Column label (auto-numbered when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Template expression (a placeholder is used when omitted)
        #[arg(long)]
        template: Option<String>,
    },

    /// Delete the column at INDEX
    DeleteColumn { file: String, index: usize },

    /// Replace every rule row with the rows in a JSON file
    SetRows {
        file: String,

        /// JSON array of {"name": ..., "values": [...]}
        rows: PathBuf,
    },
}

/// Column kinds accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Condition,
    Action,
}

impl From<KindArg> for ColumnKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Condition => ColumnKind::Condition,
            KindArg::Action => ColumnKind::Action,
        }
    }
}

/// Supported shells for completion
#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
