//! table command - inspect and edit decision tables

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use tracing::debug;

use super::Workspace;
use crate::cli::Context;
use crate::publish::EditGuard;
use crate::table::files::list_table_files;
use crate::table::{
    missing_column_groups, ColumnKind, DecisionTable, Grid, RuleRow, TableDocument, Workbook,
};
use crate::ui::output;

/// List table files in the rules folder.
pub fn list(ctx: &Context) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let rules = ws.rules_path()?;
    let files = list_table_files(&rules).context("Failed to list tables")?;
    if files.is_empty() {
        output::print(
            format!("No tables in {}", rules.display()),
            ctx.verbosity(),
        );
        return Ok(());
    }
    output::result(output::format_list(&files, ""));
    Ok(())
}

/// Print a table.
pub fn show(ctx: &Context, file: &str, json: bool) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let table = read_table(&ws, file)?;
    if json {
        output::result(serde_json::to_string_pretty(&table).context("Failed to encode table")?);
    } else {
        output::result(output::format_table(&table));
    }
    Ok(())
}

/// Check a table's structure.
pub fn validate(ctx: &Context, file: &str) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let workbook = read_workbook(&ws, file)?;
    let table = DecisionTable::load(workbook.table_sheet());
    if let Err(e) = &table {
        debug!(error = %e, "table did not load");
    }

    let missing = missing_column_groups(table.as_ref().ok());
    if !missing.is_empty() {
        bail!(
            "'{}' is not a valid decision table: missing {}",
            file,
            missing.join(", ")
        );
    }
    output::print(format!("'{}' is a valid decision table", file), ctx.verbosity());
    Ok(())
}

/// Insert a column and save the table.
pub fn add_column(
    ctx: &Context,
    file: &str,
    kind: ColumnKind,
    name: Option<&str>,
    template: Option<&str>,
) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let _guard = begin_edit(&ws)?;
    let path = ws.table_path(file)?;
    let mut workbook = load_workbook(&path, file)?;
    let mut doc = open_document(&mut workbook, file)?;

    let position = doc
        .add_column(kind, name, template)
        .with_context(|| format!("Cannot add a {} column to '{}'", kind, file))?;
    let label = doc.table().column_labels[position].clone();
    drop(doc);
    store(&workbook, &path, file)?;

    output::print(
        format!("Added {} at column {} of '{}'", label, position, file),
        ctx.verbosity(),
    );
    Ok(())
}

/// Delete a column and save the table.
pub fn delete_column(ctx: &Context, file: &str, index: usize) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let _guard = begin_edit(&ws)?;
    let path = ws.table_path(file)?;
    let mut workbook = load_workbook(&path, file)?;
    let mut doc = open_document(&mut workbook, file)?;

    let label = doc.table().column_labels.get(index).cloned();
    doc.delete_column(index)
        .with_context(|| format!("Cannot delete column {} of '{}'", index, file))?;
    drop(doc);
    store(&workbook, &path, file)?;

    output::print(
        format!(
            "Deleted {} (column {}) from '{}'",
            label.unwrap_or_default(),
            index,
            file
        ),
        ctx.verbosity(),
    );
    Ok(())
}

/// Replace every rule row and save the table.
pub fn set_rows(ctx: &Context, file: &str, rows_path: &Path) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let rows_path = ctx.resolve(rows_path)?;
    let contents = std::fs::read_to_string(&rows_path)
        .with_context(|| format!("Failed to read '{}'", rows_path.display()))?;
    let rows: Vec<RuleRow> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse rows in '{}'", rows_path.display()))?;

    let _guard = begin_edit(&ws)?;
    let path = ws.table_path(file)?;
    let mut workbook = load_workbook(&path, file)?;
    let mut doc = open_document(&mut workbook, file)?;
    let count = rows.len();
    doc.replace_rows(rows)
        .with_context(|| format!("Rows do not fit '{}'", file))?;
    doc.save().context("Failed to write rows")?;
    drop(doc);
    store(&workbook, &path, file)?;

    output::print(
        format!("Wrote {} rule(s) to '{}'", count, file),
        ctx.verbosity(),
    );
    Ok(())
}

/// Hold the working copy until the edit is written.
///
/// A git working copy is put on the configured branch first.
fn begin_edit(ws: &Workspace) -> Result<EditGuard> {
    ws.workflow()
        .begin_edit()
        .context("Failed to prepare the working copy for editing")
}

fn read_workbook(ws: &Workspace, file: &str) -> Result<Workbook> {
    let path = ws.table_path(file)?;
    load_workbook(&path, file)
}

fn read_table(ws: &Workspace, file: &str) -> Result<DecisionTable> {
    let workbook = read_workbook(ws, file)?;
    DecisionTable::load(workbook.table_sheet())
        .with_context(|| format!("Failed to load table '{}'", file))
}

fn load_workbook(path: &Path, file: &str) -> Result<Workbook> {
    Workbook::load(path).with_context(|| format!("Failed to read '{}'", file))
}

fn open_document<'a>(
    workbook: &'a mut Workbook,
    file: &str,
) -> Result<TableDocument<&'a mut Grid>> {
    TableDocument::open(workbook.table_sheet_mut())
        .with_context(|| format!("Failed to load table '{}'", file))
}

fn store(workbook: &Workbook, path: &Path, file: &str) -> Result<()> {
    workbook
        .store(path)
        .with_context(|| format!("Failed to write '{}'", file))
}
