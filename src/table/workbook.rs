//! table::workbook
//!
//! Reading and writing `.xlsx` workbooks.
//!
//! # Design
//!
//! The first worksheet of a workbook holds the decision table. Every
//! worksheet is read into a [`Grid`] with calamine and the whole workbook
//! is written back with rust_xlsxwriter, so saving a table keeps the other
//! worksheets' contents.
//!
//! Cell contents survive a save; presentation does not. Fonts, fills,
//! column widths and merged regions are dropped, and dates are written
//! with a single `yyyy-mm-dd hh:mm:ss` number format.
//!
//! # Example
//!
//! ```no_run
//! use ruledesk::table::{TableDocument, Workbook, ColumnKind};
//! use std::path::Path;
//!
//! let path = Path::new("repos/pricing/rules/Pricing.xlsx");
//! let mut workbook = Workbook::load(path)?;
//! let mut doc = TableDocument::open(workbook.table_sheet_mut())?;
//! doc.add_column(ColumnKind::Action, None, None)?;
//! drop(doc);
//! workbook.store(path)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Worksheet as XlsxWorksheet, XlsxError as WriteError};
use thiserror::Error;
use tracing::debug;

use super::{CellValue, Grid, Sheet};

/// Number format applied to date cells on save.
pub const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Name given to the only worksheet of a workbook built from a grid.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch.
const UNIX_EPOCH_SERIAL: f64 = 25_569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Errors from reading or writing a workbook.
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("failed to read workbook '{}': {source}", path.display())]
    Read { path: PathBuf, source: XlsxError },

    #[error("workbook '{}' has no worksheets", path.display())]
    NoWorksheets { path: PathBuf },

    #[error("cell ({row}, {col}) is outside the worksheet limits")]
    OutOfRange { row: usize, col: usize },

    #[error("failed to encode workbook '{}': {source}", path.display())]
    Encode { path: PathBuf, source: WriteError },

    #[error("failed to write workbook '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A named worksheet and its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    pub name: String,
    pub grid: Grid,
}

/// The worksheets of one workbook, in order.
///
/// There is always at least one worksheet; the first is the table sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    table: Worksheet,
    others: Vec<Worksheet>,
}

impl From<Grid> for Workbook {
    fn from(grid: Grid) -> Self {
        Self {
            table: Worksheet {
                name: DEFAULT_SHEET_NAME.to_string(),
                grid,
            },
            others: Vec::new(),
        }
    }
}

impl Workbook {
    /// Read every worksheet of the workbook at `path`.
    pub fn load(path: &Path) -> Result<Self, WorkbookError> {
        let read_err = |source| WorkbookError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook: Xlsx<_> = open_workbook(path).map_err(read_err)?;
        let names = workbook.sheet_names().to_owned();

        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            let grid = read_worksheet(&mut workbook, &name).map_err(read_err)?;
            sheets.push(Worksheet { name, grid });
        }
        debug!(path = %path.display(), sheets = sheets.len(), "read workbook");

        let mut sheets = sheets.into_iter();
        let table = sheets.next().ok_or_else(|| WorkbookError::NoWorksheets {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            table,
            others: sheets.collect(),
        })
    }

    /// Write the workbook to `path`, atomically.
    pub fn store(&self, path: &Path) -> Result<(), WorkbookError> {
        let encode_err = |source| WorkbookError::Encode {
            path: path.to_path_buf(),
            source,
        };
        let write_err = |path: &Path, source| WorkbookError::Write {
            path: path.to_path_buf(),
            source,
        };

        let date_format = Format::new().set_num_format(DATE_FORMAT);
        let mut out = rust_xlsxwriter::Workbook::new();
        for sheet in self.worksheets() {
            let worksheet = out.add_worksheet();
            worksheet.set_name(&sheet.name).map_err(encode_err)?;
            write_worksheet(worksheet, &sheet.grid, &date_format).map_err(|e| match e {
                CellWriteError::Range { row, col } => WorkbookError::OutOfRange { row, col },
                CellWriteError::Encode(source) => encode_err(source),
            })?;
        }
        let bytes = out.save_to_buffer().map_err(encode_err)?;

        let temp_path = path.with_extension("xlsx.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| write_err(&temp_path, e))?;
        file.write_all(&bytes).map_err(|e| write_err(&temp_path, e))?;
        file.sync_all().map_err(|e| write_err(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| write_err(path, e))?;

        debug!(path = %path.display(), bytes = bytes.len(), "wrote workbook");
        Ok(())
    }

    /// The worksheet holding the decision table.
    pub fn table_sheet(&self) -> &Grid {
        &self.table.grid
    }

    pub fn table_sheet_mut(&mut self) -> &mut Grid {
        &mut self.table.grid
    }

    /// Every worksheet, table sheet first.
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        std::iter::once(&self.table).chain(&self.others)
    }

    /// Append a worksheet after the existing ones.
    pub fn push_worksheet(&mut self, name: impl Into<String>, grid: Grid) {
        self.others.push(Worksheet {
            name: name.into(),
            grid,
        });
    }
}

fn read_worksheet<R>(workbook: &mut Xlsx<R>, name: &str) -> Result<Grid, XlsxError>
where
    R: std::io::Read + std::io::Seek,
{
    let mut grid = Grid::new();

    let range = workbook.worksheet_range(name)?;
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    for (row, col, data) in range.cells() {
        let value = cell_from_data(data);
        if !value.is_blank() {
            grid.set_cell(
                row_offset as usize + row,
                col_offset as usize + col,
                value,
            );
        }
    }

    // A formula replaces the cached value computed for it. Formula ranges
    // are optional.
    let Ok(formulas) = workbook.worksheet_formula(name) else {
        return Ok(grid);
    };
    let (row_offset, col_offset) = formulas.start().unwrap_or((0, 0));
    for (row, col, formula) in formulas.cells() {
        let formula = formula.trim();
        if formula.is_empty() {
            continue;
        }
        grid.set_cell(
            row_offset as usize + row,
            col_offset as usize + col,
            CellValue::Formula(formula.trim_start_matches('=').to_string()),
        );
    }

    Ok(grid)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(value) if value.is_datetime() => value
            .as_datetime()
            .map_or(CellValue::Number(value.as_f64()), CellValue::Date),
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
        Data::DateTimeIso(s) => s
            .parse::<NaiveDateTime>()
            .map_or_else(|_| CellValue::String(s.clone()), CellValue::Date),
        _ => CellValue::Blank,
    }
}

enum CellWriteError {
    Range { row: usize, col: usize },
    Encode(WriteError),
}

impl From<WriteError> for CellWriteError {
    fn from(err: WriteError) -> Self {
        CellWriteError::Encode(err)
    }
}

fn write_worksheet(
    worksheet: &mut XlsxWorksheet,
    grid: &Grid,
    date_format: &Format,
) -> Result<(), CellWriteError> {
    let Some(last) = grid.last_row() else {
        return Ok(());
    };
    for row in 0..=last {
        for col in 0..grid.row_width(row) {
            let value = grid.cell(row, col);
            if value.is_blank() {
                continue;
            }
            let (r, c) = match (u32::try_from(row), u16::try_from(col)) {
                (Ok(r), Ok(c)) => (r, c),
                _ => return Err(CellWriteError::Range { row, col }),
            };
            match value {
                CellValue::Blank => {}
                CellValue::String(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(r, c, n)?;
                }
                CellValue::Boolean(b) => {
                    worksheet.write_boolean(r, c, b)?;
                }
                CellValue::Date(d) => {
                    worksheet.write_number_with_format(r, c, date_serial(&d), date_format)?;
                }
                CellValue::Formula(f) => {
                    worksheet.write_formula(r, c, f.as_str())?;
                }
            }
        }
    }
    Ok(())
}

/// Spreadsheet serial number of a date-time (days since 1899-12-30).
fn date_serial(value: &NaiveDateTime) -> f64 {
    value.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_SERIAL
}
