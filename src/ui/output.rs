//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! User-facing results go to stdout and respect `--quiet`. Diagnostics go
//! through `tracing` instead and never mix with results.

use std::fmt::Display;

use crate::publish::RemoteBranchInfo;
use crate::table::DecisionTable;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - results only, no chatter
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a result. Always shown: scripts depend on it.
pub fn result(message: impl Display) {
    println!("{}", message);
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Render a decision table as aligned text.
///
/// The first line holds the column labels with their indices, the second
/// the templates, then one line per rule.
pub fn format_table(table: &DecisionTable) -> String {
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(table.rows.len() + 2);
    lines.push(
        table
            .column_labels
            .iter()
            .enumerate()
            .map(|(i, label)| format!("{}:{}", i, label))
            .collect(),
    );
    lines.push(table.template_labels.clone());
    for row in &table.rows {
        let mut line = vec![row.name.clone()];
        line.extend(row.values.iter().map(|v| v.as_text().unwrap_or_default()));
        lines.push(line);
    }

    let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            lines
                .iter()
                .filter_map(|line| line.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    lines
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render ranked branches, one per line, with `latest`/`main` markers.
pub fn format_branches(branches: &[RemoteBranchInfo]) -> String {
    branches
        .iter()
        .map(|b| {
            let mut markers = Vec::new();
            if b.is_latest {
                markers.push("latest");
            }
            if b.is_main {
                markers.push("main");
            }
            let when = chrono::DateTime::from_timestamp(b.commit_timestamp, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| b.commit_timestamp.to_string());
            if markers.is_empty() {
                format!("{}  {}", when, b.name)
            } else {
                format!("{}  {} ({})", when, b.name, markers.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CellValue, RuleRow};

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn table_columns_align() {
        let table = DecisionTable {
            column_labels: vec!["NAME".into(), "CONDITION".into(), "ACTION".into()],
            template_labels: vec![String::new(), "age > $param".into(), "set($param);".into()],
            rows: vec![RuleRow::new(
                "senior",
                vec![CellValue::Number(65.0), CellValue::Number(10.0)],
            )],
        };
        let text = format_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0:NAME | 1:CONDITION  | 2:ACTION");
        assert_eq!(lines[2], "senior | 65.0         | 10.0");
    }

    #[test]
    fn branch_markers() {
        let text = format_branches(&[
            RemoteBranchInfo {
                name: "main".into(),
                commit_timestamp: 0,
                is_main: true,
                is_latest: true,
            },
            RemoteBranchInfo {
                name: "x".into(),
                commit_timestamp: 0,
                is_main: false,
                is_latest: false,
            },
        ]);
        assert_eq!(text, "1970-01-01 00:00  main (latest, main)\n1970-01-01 00:00  x");
    }

    #[test]
    fn list_prefix() {
        assert_eq!(format_list(&["a", "b"], "- "), "- a\n- b");
    }
}
