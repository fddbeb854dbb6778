//! table::sheet
//!
//! The worksheet capability and its in-memory implementation.
//!
//! # Design
//!
//! The decision-table model never touches workbook bytes. It talks to a
//! single worksheet through the [`Sheet`] trait: a zero-based row/column
//! grid of [`CellValue`]s. Reading and writing an actual workbook file is
//! the job of whoever implements the trait.
//!
//! [`Grid`] is the in-memory implementation: rows of cells in an ordered
//! 2-D container, with column insert/delete expressed as index shifts.
//! [`Workbook`](super::Workbook) loads each worksheet of an `.xlsx` file
//! into one.

use super::CellValue;

/// A single worksheet addressed by zero-based `(row, col)`.
///
/// Only `cell`, `set_cell`, `last_row`, `row_width` and `remove_row` are
/// required. The column shifts have default implementations written in
/// terms of cell reads and writes, so any adapter gets them for free;
/// adapters with a native representation may override them.
pub trait Sheet {
    /// Read a cell. Absent cells read as [`CellValue::Blank`].
    fn cell(&self, row: usize, col: usize) -> CellValue;

    /// Write a cell. Writing `Blank` clears it.
    fn set_cell(&mut self, row: usize, col: usize, value: CellValue);

    /// Index of the last row that holds any populated cell.
    fn last_row(&self) -> Option<usize>;

    /// One past the last populated column of `row` (0 for an empty row).
    fn row_width(&self, row: usize) -> usize;

    /// Clear every cell of a row.
    fn remove_row(&mut self, row: usize);

    /// Shift every cell at or after `col` one column right, in every row.
    fn insert_column(&mut self, col: usize) {
        let Some(last) = self.last_row() else {
            return;
        };
        for row in 0..=last {
            let width = self.row_width(row);
            if width <= col {
                continue;
            }
            for c in (col..width).rev() {
                let value = self.cell(row, c);
                self.set_cell(row, c + 1, value);
            }
            self.set_cell(row, col, CellValue::Blank);
        }
    }

    /// Drop column `col` in every row, shifting later cells one left.
    fn remove_column(&mut self, col: usize) {
        let Some(last) = self.last_row() else {
            return;
        };
        for row in 0..=last {
            let width = self.row_width(row);
            if width <= col {
                continue;
            }
            for c in col + 1..width {
                let value = self.cell(row, c);
                self.set_cell(row, c - 1, value);
            }
            self.set_cell(row, width - 1, CellValue::Blank);
        }
    }
}

impl<S: Sheet + ?Sized> Sheet for &mut S {
    fn cell(&self, row: usize, col: usize) -> CellValue {
        (**self).cell(row, col)
    }

    fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        (**self).set_cell(row, col, value)
    }

    fn last_row(&self) -> Option<usize> {
        (**self).last_row()
    }

    fn row_width(&self, row: usize) -> usize {
        (**self).row_width(row)
    }

    fn remove_row(&mut self, row: usize) {
        (**self).remove_row(row)
    }

    fn insert_column(&mut self, col: usize) {
        (**self).insert_column(col)
    }

    fn remove_column(&mut self, col: usize) {
        (**self).remove_column(col)
    }
}

/// In-memory worksheet.
///
/// Rows are stored densely; each row is trimmed of trailing blanks so
/// `row_width` always reports the last populated cell.
///
/// # Example
///
/// ```
/// use ruledesk::table::{CellValue, Grid, Sheet};
///
/// let mut grid = Grid::from_rows(vec![
///     vec!["NAME".into(), "CONDITION".into(), "ACTION".into()],
/// ]);
/// grid.insert_column(1);
/// assert_eq!(grid.cell(0, 2), CellValue::text("CONDITION"));
/// assert!(grid.cell(0, 1).is_blank());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from literal rows.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let mut grid = Self { rows };
        for idx in 0..grid.rows.len() {
            grid.trim_row(idx);
        }
        grid.trim_tail();
        grid
    }

    fn trim_row(&mut self, idx: usize) {
        if let Some(row) = self.rows.get_mut(idx) {
            while row.last().is_some_and(CellValue::is_blank) {
                row.pop();
            }
        }
    }

    fn trim_tail(&mut self) {
        while self.rows.last().is_some_and(|r| r.is_empty()) {
            self.rows.pop();
        }
    }
}

impl Sheet for Grid {
    fn cell(&self, row: usize, col: usize) -> CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or_default()
    }

    fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if value.is_blank() {
            if let Some(r) = self.rows.get_mut(row) {
                if col < r.len() {
                    r[col] = CellValue::Blank;
                }
            }
            self.trim_row(row);
            self.trim_tail();
            return;
        }
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize(col + 1, CellValue::Blank);
        }
        r[col] = value;
    }

    fn last_row(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    fn row_width(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    fn remove_row(&mut self, row: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            r.clear();
        }
        self.trim_tail();
    }

    fn insert_column(&mut self, col: usize) {
        for row in &mut self.rows {
            if row.len() > col {
                row.insert(col, CellValue::Blank);
            }
        }
    }

    fn remove_column(&mut self, col: usize) {
        for idx in 0..self.rows.len() {
            if self.rows[idx].len() > col {
                self.rows[idx].remove(col);
                self.trim_row(idx);
            }
        }
        self.trim_tail();
    }
}
