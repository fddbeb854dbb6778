//! table
//!
//! The decision-table model: a Drools-shaped rule table read from, edited
//! against, and written back to a single worksheet.
//!
//! # Modules
//!
//! - [`cell`] - Typed cell values
//! - [`sheet`] - The worksheet capability and the in-memory [`Grid`]
//! - [`document`] - A table bound to its sheet; structural edits
//! - [`files`] - Listing table files and folders inside a working copy
//! - [`workbook`] - Reading and writing `.xlsx` workbooks
//!
//! # Layout
//!
//! ```text
//! row h     NAME | CONDITION      | CONDITION2 | ACTION
//! row h+1        | age >= $param  | ...        | setDiscount($param);
//! row h+2   r1   | 18             | ...        | 10
//! row h+3   r2   | 65             | ...        | 20
//! ```
//!
//! The header row `h` is the first row whose first cell reads `NAME`.
//! The template row follows it, and data rows start two rows below it.
//!
//! # Invariants
//!
//! - `column_labels[0] == "NAME"` for any table read from a sheet
//! - `template_labels.len() == column_labels.len()`
//! - every `RuleRow::values.len() == column_labels.len() - 1`
//! - `CONDITION*` columns form one block, followed by the `ACTION*` block

pub mod cell;
pub mod document;
pub mod files;
pub mod sheet;
pub mod workbook;

pub use cell::CellValue;
pub use document::TableDocument;
pub use sheet::{Grid, Sheet};
pub use workbook::{Workbook, WorkbookError};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label of the mandatory first column.
pub const NAME_LABEL: &str = "NAME";

/// Errors from reading or editing a decision table.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    /// The sheet does not have the shape of a decision table.
    #[error("invalid table structure: {0}")]
    Structure(String),

    /// A requested edit was rejected before anything changed.
    #[error("rejected edit: {0}")]
    Validation(String),

    /// The header row has blank cells between labels, so label positions
    /// do not match sheet columns.
    #[error("header row has blank cells between labels ({labels} labels over {width} columns)")]
    HeaderGaps { labels: usize, width: usize },
}

/// Kind of a structural column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnKind {
    Condition,
    Action,
}

impl ColumnKind {
    /// Label prefix shared by every column of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            ColumnKind::Condition => "CONDITION",
            ColumnKind::Action => "ACTION",
        }
    }

    /// Placeholder template used when none is supplied.
    pub fn default_template(self) -> &'static str {
        match self {
            ColumnKind::Condition => "customer.getAge() >= $param",
            ColumnKind::Action => "customer.setDiscount($param);",
        }
    }

    /// Classify a column label.
    pub fn of_label(label: &str) -> Option<Self> {
        if label.starts_with(ColumnKind::Condition.prefix()) {
            Some(ColumnKind::Condition)
        } else if label.starts_with(ColumnKind::Action.prefix()) {
            Some(ColumnKind::Action)
        } else {
            None
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for ColumnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONDITION" => Ok(ColumnKind::Condition),
            "ACTION" => Ok(ColumnKind::Action),
            _ => Err(format!(
                "invalid column kind '{}': use 'condition' or 'action'",
                s
            )),
        }
    }
}

/// One rule: its name plus one value per non-NAME column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRow {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl RuleRow {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// In-memory decision table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTable {
    pub column_labels: Vec<String>,
    pub template_labels: Vec<String>,
    pub rows: Vec<RuleRow>,
}

/// Locate the header row: the first row whose first cell reads `NAME`.
pub fn find_header_row(sheet: &impl Sheet) -> Result<usize, TableError> {
    let last = sheet
        .last_row()
        .ok_or_else(|| TableError::Structure("header row not found: sheet is empty".into()))?;
    (0..=last)
        .find(|&row| sheet.cell(row, 0).as_text().as_deref() == Some(NAME_LABEL))
        .ok_or_else(|| TableError::Structure("header row not found".into()))
}

/// Check that a table has the Drools shape: `NAME`, at least one
/// `CONDITION*` column and at least one `ACTION*` column.
///
/// Never fails; a missing table reads as invalid.
///
/// # Example
///
/// ```
/// use ruledesk::table::{validate_structure, DecisionTable};
///
/// let table = DecisionTable {
///     column_labels: vec!["NAME".into(), "CONDITION".into(), "ACTION".into()],
///     ..Default::default()
/// };
/// assert!(validate_structure(Some(&table)));
/// assert!(!validate_structure(None));
/// ```
pub fn validate_structure(table: Option<&DecisionTable>) -> bool {
    missing_column_groups(table).is_empty()
}

/// The column groups a table lacks, in `NAME`, `CONDITION`, `ACTION` order.
///
/// A missing table lacks all three.
pub fn missing_column_groups(table: Option<&DecisionTable>) -> Vec<&'static str> {
    let labels = table.map_or(&[][..], |t| t.column_labels.as_slice());
    let has_name = labels.iter().any(|l| l == NAME_LABEL);
    let has_kind = |kind| {
        labels
            .iter()
            .any(|l| l != NAME_LABEL && ColumnKind::of_label(l) == Some(kind))
    };

    let mut missing = Vec::new();
    if !has_name {
        missing.push(NAME_LABEL);
    }
    if !has_kind(ColumnKind::Condition) {
        missing.push(ColumnKind::Condition.prefix());
    }
    if !has_kind(ColumnKind::Action) {
        missing.push(ColumnKind::Action.prefix());
    }
    missing
}

impl DecisionTable {
    /// Read a table from a sheet.
    ///
    /// Labels are the non-blank header cells, left to right; blank cells
    /// between them are skipped. Rows whose first cell is blank are
    /// treated as separators and skipped.
    pub fn load(sheet: &impl Sheet) -> Result<Self, TableError> {
        let header = find_header_row(sheet)?;

        let column_labels: Vec<String> = (0..sheet.row_width(header))
            .filter_map(|col| sheet.cell(header, col).non_blank_text())
            .collect();

        let template_labels = (0..column_labels.len())
            .map(|col| sheet.cell(header + 1, col).as_text().unwrap_or_default())
            .collect();

        let mut rows = Vec::new();
        if let Some(last) = sheet.last_row() {
            for row in header + 2..=last {
                let Some(name) = sheet.cell(row, 0).non_blank_text() else {
                    continue;
                };
                let values = (1..column_labels.len())
                    .map(|col| sheet.cell(row, col))
                    .collect();
                rows.push(RuleRow { name, values });
            }
        }

        Ok(Self {
            column_labels,
            template_labels,
            rows,
        })
    }

    /// Write the data rows back to a sheet.
    ///
    /// Every existing data row is cleared first and `self.rows` is written
    /// contiguously from two rows below the header. Header and template
    /// rows are left as they are.
    pub fn save(&self, sheet: &mut impl Sheet) -> Result<(), TableError> {
        let header = find_header_row(sheet)?;
        let data_start = header + 2;

        if let Some(last) = sheet.last_row() {
            for row in (data_start..=last).rev() {
                sheet.remove_row(row);
            }
        }

        for (i, rule) in self.rows.iter().enumerate() {
            let row = data_start + i;
            sheet.set_cell(row, 0, CellValue::String(rule.name.clone()));
            for (j, value) in rule.values.iter().enumerate() {
                sheet.set_cell(row, j + 1, value.clone());
            }
        }
        Ok(())
    }

    /// Number of columns, NAME included.
    pub fn width(&self) -> usize {
        self.column_labels.len()
    }

    /// Number of columns of the given kind.
    pub fn count_of(&self, kind: ColumnKind) -> usize {
        self.column_labels
            .iter()
            .filter(|l| l.starts_with(kind.prefix()))
            .count()
    }

    /// Label for a new column of `kind`: `CONDITION`, then `CONDITION2`,
    /// `CONDITION3`, and so on. There is no `CONDITION1`.
    pub fn next_column_label(&self, kind: ColumnKind) -> String {
        match self.count_of(kind) {
            0 => kind.prefix().to_string(),
            n => format!("{}{}", kind.prefix(), n + 1),
        }
    }

    /// Position a new column of `kind` is inserted at.
    ///
    /// Conditions go right after the last condition (or at 1 when there
    /// are none); actions go right before the first action (or at the end).
    pub fn insert_position(&self, kind: ColumnKind) -> usize {
        match kind {
            ColumnKind::Condition => self
                .column_labels
                .iter()
                .rposition(|l| l.starts_with(kind.prefix()))
                .map_or(1, |idx| idx + 1),
            ColumnKind::Action => self
                .column_labels
                .iter()
                .position(|l| l.starts_with(kind.prefix()))
                .unwrap_or(self.column_labels.len()),
        }
    }

    /// Insert a column in memory, with a blank value in every rule.
    ///
    /// `position` must be in `1..=width()`.
    pub fn insert_column(&mut self, position: usize, label: String, template: String) {
        self.column_labels.insert(position, label);
        self.template_labels.insert(position, template);
        for rule in &mut self.rows {
            let at = position.saturating_sub(1).min(rule.values.len());
            rule.values.insert(at, CellValue::Blank);
        }
    }

    /// Check that the column at `index` may be deleted.
    pub fn check_deletable(&self, index: usize) -> Result<(), TableError> {
        if index == 0 {
            return Err(TableError::Validation(
                "the NAME column cannot be deleted".into(),
            ));
        }
        let label = self.column_labels.get(index).ok_or_else(|| {
            TableError::Validation(format!(
                "column index {} is out of range (table has {} columns)",
                index,
                self.width()
            ))
        })?;
        if let Some(kind) = ColumnKind::of_label(label) {
            if self.count_of(kind) == 1 {
                return Err(TableError::Validation(format!(
                    "'{}' is the only {} column; a decision table needs at least one",
                    label, kind
                )));
            }
        }
        Ok(())
    }

    /// Remove a column in memory. Callers check [`Self::check_deletable`] first.
    pub fn remove_column(&mut self, index: usize) {
        if index >= self.column_labels.len() {
            return;
        }
        self.column_labels.remove(index);
        if index < self.template_labels.len() {
            self.template_labels.remove(index);
        }
        let Some(at) = index.checked_sub(1) else {
            return;
        };
        for rule in &mut self.rows {
            if at < rule.values.len() {
                rule.values.remove(at);
            }
        }
    }

    /// Check that replacement rows fit this table.
    pub fn check_rows(&self, rows: &[RuleRow]) -> Result<(), TableError> {
        let expected = self.width().saturating_sub(1);
        for (i, rule) in rows.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(TableError::Validation(format!(
                    "row {} has a blank name",
                    i + 1
                )));
            }
            if rule.values.len() != expected {
                return Err(TableError::Validation(format!(
                    "row '{}' has {} values, expected {}",
                    rule.name,
                    rule.values.len(),
                    expected
                )));
            }
        }
        Ok(())
    }
}
