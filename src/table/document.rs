//! table::document
//!
//! A decision table bound to the sheet it was read from.
//!
//! # Design
//!
//! Structural edits (column insert/delete) are applied twice: physically
//! to every row of the sheet, and to the in-memory [`DecisionTable`], so
//! the two never drift apart. Row edits only touch memory until
//! [`TableDocument::save`] rewrites the data-row range.
//!
//! Nothing is cached across documents: every `open` re-reads the sheet.
//!
//! # Example
//!
//! ```
//! use ruledesk::table::{CellValue, ColumnKind, Grid, TableDocument};
//!
//! let grid = Grid::from_rows(vec![
//!     vec!["NAME".into(), "CONDITION".into(), "ACTION".into()],
//!     vec![CellValue::Blank, "age >= $param".into(), "discount($param);".into()],
//!     vec!["r1".into(), 18.0.into(), 10.0.into()],
//! ]);
//!
//! let mut doc = TableDocument::open(grid).unwrap();
//! doc.add_column(ColumnKind::Condition, None, None).unwrap();
//! assert_eq!(
//!     doc.table().column_labels,
//!     vec!["NAME", "CONDITION", "CONDITION2", "ACTION"]
//! );
//! ```

use tracing::debug;

use super::{find_header_row, CellValue, ColumnKind, DecisionTable, RuleRow, Sheet, TableError};

/// A decision table together with its backing sheet.
#[derive(Debug)]
pub struct TableDocument<S: Sheet> {
    sheet: S,
    table: DecisionTable,
}

impl<S: Sheet> TableDocument<S> {
    /// Read the table from `sheet`.
    pub fn open(sheet: S) -> Result<Self, TableError> {
        let table = DecisionTable::load(&sheet)?;
        Ok(Self { sheet, table })
    }

    /// The in-memory table.
    pub fn table(&self) -> &DecisionTable {
        &self.table
    }

    /// The backing sheet.
    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    /// Give back the sheet, dropping the table.
    pub fn into_sheet(self) -> S {
        self.sheet
    }

    /// Add a CONDITION or ACTION column.
    ///
    /// The label is `name` if given, otherwise the next auto-numbered label
    /// for `kind`. The template is `template` if non-blank, otherwise the
    /// kind's placeholder. Returns the column index the new column landed at.
    pub fn add_column(
        &mut self,
        kind: ColumnKind,
        name: Option<&str>,
        template: Option<&str>,
    ) -> Result<usize, TableError> {
        let header = self.dense_header()?;

        let label = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => self.table.next_column_label(kind),
        };
        let template = match template {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => kind.default_template().to_string(),
        };
        let position = self.table.insert_position(kind);

        debug!(%label, position, "inserting column");
        self.sheet.insert_column(position);
        self.sheet
            .set_cell(header, position, CellValue::String(label.clone()));
        self.sheet
            .set_cell(header + 1, position, CellValue::String(template.clone()));
        self.table.insert_column(position, label, template);

        Ok(position)
    }

    /// Delete the column at `index`.
    ///
    /// Rejects NAME (index 0) and the last remaining CONDITION or ACTION
    /// column without touching the sheet.
    pub fn delete_column(&mut self, index: usize) -> Result<(), TableError> {
        self.table.check_deletable(index)?;
        self.dense_header()?;

        debug!(index, label = %self.table.column_labels[index], "deleting column");
        self.sheet.remove_column(index);
        self.table.remove_column(index);
        Ok(())
    }

    /// Replace every rule row. Takes effect in the sheet on [`Self::save`].
    pub fn replace_rows(&mut self, rows: Vec<RuleRow>) -> Result<(), TableError> {
        self.table.check_rows(&rows)?;
        self.table.rows = rows;
        Ok(())
    }

    /// Write the in-memory rows back to the sheet.
    pub fn save(&mut self) -> Result<(), TableError> {
        self.table.save(&mut self.sheet)
    }

    /// Locate the header and require its labels to sit in adjacent columns.
    fn dense_header(&self) -> Result<usize, TableError> {
        let header = find_header_row(&self.sheet)?;
        if self.table.column_labels.first().map(String::as_str) != Some(super::NAME_LABEL) {
            return Err(TableError::Structure("first column must be NAME".into()));
        }
        let width = self.sheet.row_width(header);
        let labels = self.table.width();
        if width != labels {
            return Err(TableError::HeaderGaps { labels, width });
        }
        Ok(header)
    }
}
