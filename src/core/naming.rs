//! core::naming
//!
//! Branch naming for published table edits.
//!
//! # Format
//!
//! `<REPO>_<File>_<MMddyyyyHHmm>`
//!
//! - `REPO`: first three characters of the repository name, upper-cased
//! - `File`: first three characters of the table file's base name, with
//!   the `.xlsx`/`.xls` extension removed, case preserved
//! - timestamp: wall-clock time at minute granularity in the configured
//!   reference offset
//!
//! Two publishes of the same file to the same repository within one minute
//! get the same name. The name is not disambiguated further.

use chrono::{DateTime, FixedOffset};

use super::paths::repo_name_from_url;

/// Timestamp layout used in generated branch names.
pub const BRANCH_TIMESTAMP_FORMAT: &str = "%m%d%Y%H%M";

/// Generate a branch name for publishing `file_name` to `repo_url` at `at`.
///
/// # Example
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use ruledesk::core::naming::generate_branch_name;
///
/// let at = FixedOffset::east_opt(0).unwrap()
///     .with_ymd_and_hms(2026, 10, 19, 15, 30, 59).unwrap();
/// assert_eq!(
///     generate_branch_name("Pricing.xlsx", "https://host/org/my-repo.git", &at),
///     "MY-_Pri_101920261530"
/// );
/// ```
pub fn generate_branch_name(file_name: &str, repo_url: &str, at: &DateTime<FixedOffset>) -> String {
    let repo = repo_name_from_url(repo_url).unwrap_or_default();
    format!(
        "{}_{}_{}",
        prefix(&repo).to_uppercase(),
        prefix(table_base_name(file_name)),
        at.format(BRANCH_TIMESTAMP_FORMAT)
    )
}

/// Base name of a table file without directories or workbook extension.
///
/// # Example
///
/// ```
/// use ruledesk::core::naming::table_base_name;
///
/// assert_eq!(table_base_name("rules/Pricing.xlsx"), "Pricing");
/// assert_eq!(table_base_name("Legacy.XLS"), "Legacy");
/// assert_eq!(table_base_name("notes.txt"), "notes.txt");
/// ```
pub fn table_base_name(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    for ext in [".xlsx", ".xls"] {
        let Some(cut) = base.len().checked_sub(ext.len()).filter(|&cut| cut > 0) else {
            continue;
        };
        if base.get(cut..).is_some_and(|tail| tail.eq_ignore_ascii_case(ext)) {
            return &base[..cut];
        }
    }
    base
}

/// First three characters (fewer if the input is shorter).
fn prefix(s: &str) -> String {
    s.chars().take(3).collect()
}
