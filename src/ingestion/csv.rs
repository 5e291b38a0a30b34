//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{classify_str, is_missing_token, parse_datetime, TypeInference};

/// Ingest a CSV file into an in-memory [`DataSet`] using an explicit schema.
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ); extra headers are ignored.
/// - Each value is parsed according to the schema field type.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = reader_for(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Ingest CSV data from an existing CSV reader using an explicit schema.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let (headers, records) = read_all(rdr)?;
    let positions = schema
        .fields
        .iter()
        .map(|field| {
            headers
                .iter()
                .position(|h| *h == field.name)
                .ok_or_else(|| IngestionError::SchemaMismatch {
                    message: format!("missing required column '{}'. headers={headers:?}", field.name),
                })
        })
        .collect::<IngestionResult<Vec<usize>>>()?;

    let rows = typed_rows(&records, schema, &positions)?;
    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest a CSV file, inferring each column's type from its values.
pub fn ingest_csv_inferred_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = reader_for(path)?;
    ingest_csv_inferred_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing reader, inferring column types.
///
/// Every header becomes a column, in header order. Duplicate header names are rejected.
pub fn ingest_csv_inferred_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<DataSet> {
    let (headers, records) = read_all(rdr)?;

    let mut inference = vec![TypeInference::default(); headers.len()];
    for record in &records {
        for (idx, inf) in inference.iter_mut().enumerate() {
            if let Some(kind) = classify_str(record.get(idx).unwrap_or("")) {
                inf.observe(kind);
            }
        }
    }

    let schema = Schema::new(
        headers
            .into_iter()
            .zip(&inference)
            .map(|(name, inf)| Field::new(name, inf.resolve()))
            .collect(),
    );
    if let Some(dup) = schema.first_duplicate() {
        return Err(IngestionError::SchemaMismatch {
            message: format!("duplicate column '{dup}'"),
        });
    }

    let positions: Vec<usize> = (0..schema.fields.len()).collect();
    let rows = typed_rows(&records, &schema, &positions)?;
    Ok(DataSet::new(schema, rows))
}

fn reader_for(path: impl AsRef<Path>) -> IngestionResult<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new().has_headers(true).from_path(path)?)
}

/// Trimmed header names plus every data record.
fn read_all<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<(Vec<String>, Vec<csv::StringRecord>)> {
    let headers = rdr.headers()?.iter().map(|h| h.trim().to_owned()).collect();
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    Ok((headers, records))
}

/// Parse `records` into rows laid out like `schema`; `positions[i]` is the record index that
/// feeds field `i`.
fn typed_rows(
    records: &[csv::StringRecord],
    schema: &Schema,
    positions: &[usize],
) -> IngestionResult<Vec<Vec<Value>>> {
    records
        .iter()
        .enumerate()
        .map(|(row_idx0, record)| {
            // 1-based, and the header is line 1.
            let line = row_idx0 + 2;
            schema
                .fields
                .iter()
                .zip(positions)
                .map(|(field, &pos)| {
                    parse_typed_value(line, &field.name, field.data_type, record.get(pos).unwrap_or(""))
                })
                .collect()
        })
        .collect()
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if is_missing_token(trimmed) {
        return Ok(Value::Null);
    }

    let parse_err = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Null => Ok(Value::Null),
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_err),
        DataType::DateTime => parse_datetime(trimmed)
            .map(Value::DateTime)
            .ok_or_else(|| parse_err("expected date or date-time (YYYY-MM-DD[ HH:MM:SS])".to_string())),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
