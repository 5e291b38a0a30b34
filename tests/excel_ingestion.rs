#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::Workbook;
use tabular_analyze::ingestion::excel::{
    ingest_excel_from_path, ingest_excel_inferred_from_path, ingest_excel_inferred_workbook_from_path,
    ingest_excel_workbook_from_path,
};
use tabular_analyze::types::{DataType, Field, Schema, Value};

#[derive(Clone, Copy)]
enum Cell<'a> {
    Text(&'a str),
    Num(f64),
    Flag(bool),
    Blank,
}

use Cell::{Blank, Flag, Num, Text};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tabular-analyze-{name}-{nanos}.xlsx"))
}

/// Writes one worksheet per `(name, rows)` entry; the first row is the header.
fn write_workbook(path: &PathBuf, sheets: &[(&str, Vec<Vec<Cell<'_>>>)]) {
    let mut wb = Workbook::new();
    for (name, rows) in sheets {
        let ws = wb.add_worksheet();
        ws.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match *cell {
                    Text(s) => {
                        ws.write_string(r, c, s).unwrap();
                    }
                    Num(n) => {
                        ws.write_number(r, c, n).unwrap();
                    }
                    Flag(b) => {
                        ws.write_boolean(r, c, b).unwrap();
                    }
                    Blank => {}
                }
            }
        }
    }
    wb.save(path).unwrap();
}

fn people_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("name", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("active", DataType::Bool),
    ])
}

fn people_rows<'a>(ids: [Cell<'a>; 2]) -> Vec<Vec<Cell<'a>>> {
    vec![
        vec![Text("id"), Text("name"), Text("score"), Text("active")],
        vec![ids[0], Text("Ada"), Num(98.5), Flag(true)],
        vec![ids[1], Text("Grace"), Num(87.25), Flag(false)],
    ]
}

#[test]
fn ingest_excel_with_schema() {
    let path = tmp_file("people");
    write_workbook(&path, &[("Sheet1", people_rows([Num(1.0), Num(2.0)]))]);

    let ds = ingest_excel_from_path(&path, None, &people_schema()).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0][0], Value::Int64(1));
    assert_eq!(ds.rows[0][1], Value::Utf8("Ada".to_string()));
    assert_eq!(ds.rows[1][3], Value::Bool(false));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_errors_on_missing_required_column() {
    let path = tmp_file("missing");
    let rows = vec![
        vec![Text("id"), Text("name"), Text("score")],
        vec![Num(1.0), Text("Ada"), Num(98.5)],
    ];
    write_workbook(&path, &[("Sheet1", rows)]);

    let err = ingest_excel_from_path(&path, None, &people_schema()).unwrap_err();
    assert!(err.to_string().contains("missing required column 'active'"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_parses_numbers_stored_as_text() {
    let path = tmp_file("string-nums");
    write_workbook(&path, &[("Sheet1", people_rows([Text("1"), Text("2")]))]);

    let ds = ingest_excel_from_path(&path, None, &people_schema()).unwrap();
    assert_eq!(ds.rows[0][0], Value::Int64(1));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_inferred_reads_whole_numbers_as_integers() {
    let path = tmp_file("inferred");
    write_workbook(&path, &[("Sheet1", people_rows([Num(1.0), Num(2.0)]))]);

    let ds = ingest_excel_inferred_from_path(&path, None).unwrap();
    assert_eq!(ds.schema, people_schema());
    assert_eq!(ds.rows[1][2], Value::Float64(87.25));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_inferred_blank_cells_become_null() {
    let path = tmp_file("blanks");
    let rows = vec![
        vec![Text("region"), Text("units"), Text("note")],
        vec![Text("north"), Num(4.0), Blank],
        vec![Blank, Num(1.5), Blank],
    ];
    write_workbook(&path, &[("Sheet1", rows)]);

    let ds = ingest_excel_inferred_from_path(&path, None).unwrap();
    assert_eq!(ds.schema.fields[1].data_type, DataType::Float64);
    assert_eq!(ds.rows[0][1], Value::Float64(4.0));
    assert_eq!(ds.rows[1][0], Value::Null);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_workbook_concatenates_sheets_in_order() {
    let path = tmp_file("multi");
    let second = vec![
        vec![Text("id"), Text("name"), Text("score"), Text("active")],
        vec![Num(3.0), Text("Linus"), Num(77.0), Flag(true)],
    ];
    write_workbook(
        &path,
        &[("Sheet1", people_rows([Num(1.0), Num(2.0)])), ("Second", second)],
    );

    let ds = ingest_excel_workbook_from_path(&path, None, &people_schema()).unwrap();
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.rows[2][1], Value::Utf8("Linus".to_string()));

    let only_second = ingest_excel_workbook_from_path(&path, Some(&["Second"]), &people_schema()).unwrap();
    assert_eq!(only_second.row_count(), 1);
    assert_eq!(only_second.rows[0][0], Value::Int64(3));

    let inferred = ingest_excel_inferred_workbook_from_path(&path, None).unwrap();
    assert_eq!(inferred.row_count(), 3);
    // 77.0 on the second sheet does not widen a column that already holds 98.5.
    assert_eq!(inferred.schema.fields[2].data_type, DataType::Float64);

    let _ = std::fs::remove_file(&path);
}
