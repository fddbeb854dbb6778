//! Integration tests for decision tables stored on disk.

mod common;

use tempfile::TempDir;

use ruledesk::table::files::{list_folders, list_table_files};
use ruledesk::table::{
    validate_structure, CellValue, ColumnKind, DecisionTable, Grid, RuleRow, Sheet, TableDocument,
    TableError, Workbook, WorkbookError,
};

use common::{pricing_grid, read_grid, write_table};

fn reopen(path: &std::path::Path) -> TableDocument<Grid> {
    TableDocument::open(read_grid(path)).unwrap()
}

fn store(doc: TableDocument<Grid>, path: &std::path::Path) {
    Workbook::from(doc.into_sheet()).store(path).unwrap();
}

#[test]
fn load_reads_header_templates_and_rows() {
    let table = DecisionTable::load(&pricing_grid()).unwrap();

    assert_eq!(
        table.column_labels,
        vec!["NAME", "CONDITION", "CONDITION2", "ACTION"]
    );
    assert_eq!(table.template_labels[0], "");
    assert_eq!(table.template_labels[3], "customer.setDiscount($param);");
    // The blank separator row is skipped.
    let names: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["senior", "adult", "child"]);
    assert_eq!(table.rows[0].values.len(), 3);
    assert!(validate_structure(Some(&table)));
}

#[test]
fn added_condition_survives_a_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_table(dir.path(), "Pricing.xlsx", &pricing_grid());

    let mut doc = reopen(&path);
    let position = doc.add_column(ColumnKind::Condition, None, None).unwrap();
    assert_eq!(position, 3);
    store(doc, &path);

    let doc = reopen(&path);
    let table = doc.table();
    assert_eq!(
        table.column_labels,
        vec!["NAME", "CONDITION", "CONDITION2", "CONDITION3", "ACTION"]
    );
    assert_eq!(table.template_labels[3], ColumnKind::Condition.default_template());
    // Existing cells moved right with their column.
    assert_eq!(table.rows[0].values[3], CellValue::Number(20.0));
    assert!(table.rows[0].values[2].is_blank());
    // The title above the header is untouched.
    assert_eq!(doc.sheet().cell(0, 0), CellValue::text("Pricing rules"));
}

#[test]
fn delete_then_reopen_shifts_later_columns_left() {
    let dir = TempDir::new().unwrap();
    let path = write_table(dir.path(), "Pricing.xlsx", &pricing_grid());

    let mut doc = reopen(&path);
    doc.delete_column(1).unwrap();
    store(doc, &path);

    let table = reopen(&path).table().clone();
    assert_eq!(table.column_labels, vec!["NAME", "CONDITION2", "ACTION"]);
    assert_eq!(
        table.rows[1].values,
        vec![CellValue::text("silver"), CellValue::Number(10.0)]
    );
}

#[test]
fn guarded_columns_cannot_be_deleted() {
    let grid = Grid::from_rows(vec![
        vec!["NAME".into(), "CONDITION".into(), "ACTION".into()],
        vec![CellValue::Blank, "a".into(), "b".into()],
    ]);
    let mut doc = TableDocument::open(grid.clone()).unwrap();

    for index in [0, 1, 2, 3] {
        assert!(matches!(
            doc.delete_column(index),
            Err(TableError::Validation(_))
        ));
    }
    assert_eq!(doc.sheet(), &grid);
}

#[test]
fn replaced_rows_are_written_contiguously() {
    let dir = TempDir::new().unwrap();
    let path = write_table(dir.path(), "Pricing.xlsx", &pricing_grid());

    let mut doc = reopen(&path);
    doc.replace_rows(vec![RuleRow::new(
        "vip",
        vec![21.0.into(), "platinum".into(), 30.0.into()],
    )])
    .unwrap();
    doc.save().unwrap();
    store(doc, &path);

    let grid = read_grid(&path);
    let table = DecisionTable::load(&grid).unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].name, "vip");
    // Header at row 2, template at 3, data from 4; nothing below.
    assert_eq!(grid.last_row(), Some(4));
}

#[test]
fn rows_of_the_wrong_width_are_rejected() {
    let mut doc = TableDocument::open(pricing_grid()).unwrap();
    let before = doc.table().clone();

    let err = doc
        .replace_rows(vec![RuleRow::new("short", vec![1.0.into()])])
        .unwrap_err();
    assert!(matches!(err, TableError::Validation(_)));
    assert_eq!(doc.table(), &before);
}

#[test]
fn sheet_without_name_header_is_not_a_table() {
    let grid = Grid::from_rows(vec![vec!["Rules".into(), "CONDITION".into()]]);
    assert!(matches!(
        DecisionTable::load(&grid),
        Err(TableError::Structure(_))
    ));
    assert!(!validate_structure(None));
}

#[test]
fn header_gaps_block_structural_edits() {
    let grid = Grid::from_rows(vec![
        vec![
            "NAME".into(),
            CellValue::Blank,
            "CONDITION".into(),
            "ACTION".into(),
        ],
        vec![CellValue::Blank, CellValue::Blank, "a".into(), "b".into()],
    ]);
    let mut doc = TableDocument::open(grid).unwrap();

    assert!(matches!(
        doc.add_column(ColumnKind::Action, None, None),
        Err(TableError::HeaderGaps { .. })
    ));
}

#[test]
fn files_listing_sees_only_workbooks() {
    let dir = TempDir::new().unwrap();
    write_table(dir.path(), "Pricing.xlsx", &pricing_grid());
    write_table(dir.path(), "Eligibility.XLSX", &pricing_grid());
    std::fs::write(dir.path().join("rules/README.md"), "notes").unwrap();
    std::fs::create_dir_all(dir.path().join("rules/archive")).unwrap();
    std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();

    let files = list_table_files(&dir.path().join("rules")).unwrap();
    assert_eq!(files, vec!["Eligibility.XLSX", "Pricing.xlsx"]);

    let folders = list_folders(dir.path()).unwrap();
    assert_eq!(folders, vec!["/", "/rules", "/rules/archive"]);
}

#[test]
fn unchanged_table_survives_a_save_through_disk() {
    let grid = Grid::from_rows(vec![
        vec!["NAME".into(), "CONDITION".into(), "ACTION".into()],
        vec![CellValue::Blank, "age >= $param".into(), "set($param);".into()],
        vec!["senior".into(), 65.0.into(), CellValue::Boolean(true)],
        vec!["adult".into(), 18.0.into(), CellValue::Formula("B4*2".into())],
    ]);
    let dir = TempDir::new().unwrap();
    let path = write_table(dir.path(), "Pricing.xlsx", &grid);

    let mut doc = reopen(&path);
    doc.save().unwrap();
    store(doc, &path);

    assert_eq!(read_grid(&path), grid);
}

#[test]
fn edits_keep_the_other_worksheets() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Pricing.xlsx");
    let notes = Grid::from_rows(vec![vec!["Owner".into(), "pricing team".into()]]);
    let mut workbook = Workbook::from(pricing_grid());
    workbook.push_worksheet("Notes", notes.clone());
    workbook.store(&path).unwrap();

    let mut workbook = Workbook::load(&path).unwrap();
    let mut doc = TableDocument::open(workbook.table_sheet_mut()).unwrap();
    doc.add_column(ColumnKind::Action, None, None).unwrap();
    drop(doc);
    workbook.store(&path).unwrap();

    let back = Workbook::load(&path).unwrap();
    let table = DecisionTable::load(back.table_sheet()).unwrap();
    assert_eq!(table.column_labels.last().map(String::as_str), Some("ACTION2"));
    let sheets: Vec<(&str, &Grid)> = back.worksheets().map(|s| (s.name.as_str(), &s.grid)).collect();
    assert_eq!(sheets[1], ("Notes", &notes));
}

#[test]
fn non_workbook_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Broken.xlsx");
    std::fs::write(&path, "{\"rows\": []}").unwrap();

    assert!(matches!(
        Workbook::load(&path),
        Err(WorkbookError::Read { .. })
    ));
}
