#![cfg(feature = "excel")]
//! Spreadsheet ingestion (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`) via `calamine`.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{is_missing_token, parse_datetime, CellKind, TypeInference};

/// Ingest an Excel document into an in-memory `DataSet` using an explicit schema.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Validates that all schema fields exist as headers
/// - Reads remaining rows and converts cells into typed `Value`s
pub fn ingest_excel_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let sheets: Option<Vec<&str>> = sheet_name.map(|s| vec![s]);
    ingest_excel_workbook_from_path(path, sheets.as_deref(), schema)
}

/// Ingest multiple sheets from an Excel workbook and concatenate all rows into one `DataSet`.
///
/// - If `sheet_names` is `None`, ingests **all sheets** in workbook order.
/// - If `sheet_names` is `Some(&[...])`, ingests only those sheets (in the provided order).
///
/// All tabs must carry the schema's columns in their header row.
pub fn ingest_excel_workbook_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let names: Vec<String> = schema.column_names();
    let raw = read_projected_cells(path.as_ref(), sheet_names, Some(&names))?;

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(raw.rows.len());
    for (pos, cells) in &raw.rows {
        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, cell) in schema.fields.iter().zip(cells) {
            let col_label = format!("{}:{}", pos.sheet, field.name);
            out_row.push(convert_cell(pos.row, &col_label, field.data_type, cell)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest one sheet (the first when `sheet_name` is `None`), taking column names from its
/// header row and inferring column types from the cells.
pub fn ingest_excel_inferred_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let raw = match sheet_name {
        Some(name) => read_projected_cells(path, Some(&[name][..]), None)?,
        None => read_first_sheet_cells(path)?,
    };
    infer_dataset(raw)
}

/// Ingest several sheets (all when `sheet_names` is `None`) with inferred column types.
///
/// The first selected sheet's header row defines the columns; later sheets must contain them.
pub fn ingest_excel_inferred_workbook_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
) -> IngestionResult<DataSet> {
    let raw = read_projected_cells(path.as_ref(), sheet_names, None)?;
    infer_dataset(raw)
}

fn infer_dataset(raw: RawSheetCells) -> IngestionResult<DataSet> {
    let mut inference = vec![TypeInference::default(); raw.headers.len()];
    for (_, cells) in &raw.rows {
        for (cell, inf) in cells.iter().zip(inference.iter_mut()) {
            if let Some(kind) = classify_cell(cell) {
                inf.observe(kind);
            }
        }
    }

    let schema = Schema::new(
        raw.headers
            .iter()
            .zip(&inference)
            .map(|(name, inf)| Field::new(name.clone(), inf.resolve()))
            .collect(),
    );
    if let Some(dup) = schema.first_duplicate() {
        return Err(IngestionError::SchemaMismatch {
            message: format!("duplicate column '{dup}'"),
        });
    }

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(raw.rows.len());
    for (pos, cells) in &raw.rows {
        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, cell) in schema.fields.iter().zip(cells) {
            let col_label = format!("{}:{}", pos.sheet, field.name);
            out_row.push(convert_cell(pos.row, &col_label, field.data_type, cell)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema, rows))
}

/// Where a data row came from, for error messages.
struct CellPosition {
    sheet: String,
    row: usize,
}

/// Data rows (already projected onto `headers`) across the selected sheets.
struct RawSheetCells {
    headers: Vec<String>,
    rows: Vec<(CellPosition, Vec<Data>)>,
}

fn read_first_sheet_cells(path: &Path) -> IngestionResult<RawSheetCells> {
    let workbook = open_workbook_auto(path)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: "workbook has no sheets".to_string(),
        })?;
    let only = [first.as_str()];
    read_projected_cells(path, Some(&only[..]), None)
}

/// Reads every selected sheet, projecting each data row onto `wanted` column names.
///
/// When `wanted` is `None`, the first sheet's header row defines the columns and later sheets
/// must contain the same headers.
fn read_projected_cells(
    path: &Path,
    sheet_names: Option<&[&str]>,
    wanted: Option<&[String]>,
) -> IngestionResult<RawSheetCells> {
    let mut workbook = open_workbook_auto(path)?;

    let sheets: Vec<String> = match sheet_names {
        Some(names) => names.iter().map(|s| s.to_string()).collect(),
        None => workbook.sheet_names().to_vec(),
    };
    if sheets.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "workbook has no sheets".to_string(),
        });
    }

    let mut headers: Option<Vec<String>> = wanted.map(<[String]>::to_vec);
    let mut rows = Vec::new();
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        let (header_row_idx, header_cells) =
            find_header_row(&range).map_err(|e| wrap_schema_err_with_sheet(&sheet, e))?;
        let names = headers.get_or_insert_with(|| header_cells.clone());
        let col_idxs = project_headers(&header_cells, names)
            .map_err(|e| wrap_schema_err_with_sheet(&sheet, e))?;

        for (idx0, row) in range.rows().enumerate().skip(header_row_idx + 1) {
            let cells = col_idxs
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or(Data::Empty))
                .collect();
            // Report 1-based row number (Excel-like).
            let pos = CellPosition {
                sheet: sheet.clone(),
                row: idx0 + 1,
            };
            rows.push((pos, cells));
        }
    }

    Ok(RawSheetCells {
        headers: headers.unwrap_or_default(),
        rows,
    })
}

fn wrap_schema_err_with_sheet(sheet: &str, err: IngestionError) -> IngestionError {
    match err {
        IngestionError::SchemaMismatch { message } => IngestionError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn find_header_row(range: &calamine::Range<Data>) -> IngestionResult<(usize, Vec<String>)> {
    range
        .rows()
        .enumerate()
        .find(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(idx0, row)| {
            let cells = row
                .iter()
                .map(|c| cell_to_header_string(c).trim().to_string())
                .collect();
            (idx0, cells)
        })
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })
}

fn project_headers(header_cells: &[String], names: &[String]) -> IngestionResult<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            header_cells
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| IngestionError::SchemaMismatch {
                    message: format!("missing required column '{name}'. headers={header_cells:?}"),
                })
        })
        .collect()
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}

/// Blank cells, error cells, NaN and missing-value markers such as `NA`.
fn is_missing_cell(c: &Data) -> bool {
    match c {
        Data::Empty | Data::Error(_) => true,
        Data::Float(f) => f.is_nan(),
        Data::String(s) => is_missing_token(s.trim()),
        _ => false,
    }
}

fn classify_cell(c: &Data) -> Option<CellKind> {
    if is_missing_cell(c) {
        return None;
    }
    match c {
        Data::Empty | Data::Error(_) => None,
        Data::Int(_) => Some(CellKind::Int),
        // Workbooks store every number as a double; whole values read back as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(CellKind::Int),
        Data::Float(_) => Some(CellKind::Float),
        Data::Bool(_) => Some(CellKind::Bool),
        Data::DateTime(_) => Some(CellKind::DateTime),
        Data::DateTimeIso(s) | Data::String(s) if parse_datetime(s).is_some() => {
            Some(CellKind::DateTime)
        }
        Data::DateTimeIso(_) | Data::DurationIso(_) | Data::String(_) => Some(CellKind::Text),
    }
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Data) -> IngestionResult<Value> {
    if is_missing_cell(c) {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Null => Ok(Value::Null),
        DataType::Utf8 => Ok(Value::Utf8(cell_to_string(c))),
        DataType::Bool => parse_bool_cell(row, column, c).map(Value::Bool),
        DataType::Int64 => parse_i64_cell(row, column, c).map(Value::Int64),
        DataType::Float64 => parse_f64_cell(row, column, c).map(Value::Float64),
        DataType::DateTime => parse_datetime_cell(row, column, c).map(Value::DateTime),
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        _ => c.to_string(),
    }
}

fn parse_error(row: usize, column: &str, c: &Data, message: impl Into<String>) -> IngestionError {
    IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: c.to_string(),
        message: message.into(),
    }
}

fn parse_bool_cell(row: usize, column: &str, c: &Data) -> IngestionResult<bool> {
    match c {
        Data::Bool(b) => Ok(*b),
        Data::Int(i) => Ok(*i != 0),
        Data::Float(f) => Ok(*f != 0.0),
        Data::String(s) => parse_bool_str(s).map_err(|message| parse_error(row, column, c, message)),
        _ => Err(parse_error(row, column, c, "expected bool")),
    }
}

fn parse_bool_str(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

fn parse_i64_cell(row: usize, column: &str, c: &Data) -> IngestionResult<i64> {
    match c {
        Data::Int(i) => Ok(*i),
        Data::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
        Data::Float(_) => Err(parse_error(
            row,
            column,
            c,
            "expected integer (got non-integer float)",
        )),
        Data::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| parse_error(row, column, c, e.to_string())),
        _ => Err(parse_error(row, column, c, "expected integer")),
    }
}

fn parse_f64_cell(row: usize, column: &str, c: &Data) -> IngestionResult<f64> {
    match c {
        Data::Float(f) => Ok(*f),
        Data::Int(i) => Ok(*i as f64),
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| parse_error(row, column, c, e.to_string())),
        _ => Err(parse_error(row, column, c, "expected number")),
    }
}

fn parse_datetime_cell(row: usize, column: &str, c: &Data) -> IngestionResult<NaiveDateTime> {
    match c {
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .ok_or_else(|| parse_error(row, column, c, "date serial out of range")),
        Data::DateTimeIso(s) | Data::String(s) => parse_datetime(s)
            .ok_or_else(|| parse_error(row, column, c, "expected date or date-time")),
        _ => Err(parse_error(row, column, c, "expected date or date-time")),
    }
}

/// Converts a spreadsheet date serial (days since 1899-12-30) to a date-time, to the
/// nearest millisecond.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excel_serial_converts_to_datetime() {
        let dt = excel_serial_to_datetime(45_292.5).unwrap();
        assert_eq!(dt.to_string(), "2024-01-01 12:00:00");
    }

    #[test]
    fn whole_floats_classify_as_integers() {
        assert_eq!(classify_cell(&Data::Float(3.0)), Some(CellKind::Int));
        assert_eq!(classify_cell(&Data::Float(3.5)), Some(CellKind::Float));
        assert_eq!(
            classify_cell(&Data::String("2024-02-01".into())),
            Some(CellKind::DateTime)
        );
        assert_eq!(classify_cell(&Data::Empty), None);
    }
}
