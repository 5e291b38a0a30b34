//! Conversion of reducer payloads into the JSON result document.
//!
//! Guarantees:
//! - row records keep the dataset's column order
//! - non-finite floats become `null`
//! - `percentage` and `memory_mb` are rounded to two decimals here and nowhere else
//! - date-times render as `YYYY-MM-DD HH:MM:SS`

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::AnalysisError;
use crate::processing::Describe;
use crate::types::{DataSet, Schema, Value, DATETIME_DISPLAY_FORMAT};

use super::payload::Payload;
use super::request::Operation;

/// Successful analysis: dataset metadata plus the operation's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub file: String,
    pub rows: usize,
    pub columns: Vec<String>,
    /// Column name to dtype label, in column order.
    pub dtypes: Map<String, JsonValue>,
    pub operation: String,
    pub result: JsonValue,
}

/// Exactly one of these is produced per analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Success(AnalysisReport),
    Error { error: String },
}

impl AnalysisResult {
    pub fn failure(err: &AnalysisError) -> Self {
        Self::Error {
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Process exit code: `0` on success, `1` when the result carries an error.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Success(report) => Some(report),
            Self::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Error { error } => Some(error),
        }
    }

    /// The operation result on success.
    pub fn result(&self) -> Option<&JsonValue> {
        self.report().map(|r| &r.result)
    }

    pub fn to_json(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }

    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Merge `payload` with metadata describing `dataset`.
pub fn build_report(dataset: &DataSet, source: &str, operation: Operation, payload: &Payload) -> AnalysisReport {
    AnalysisReport {
        file: source.to_string(),
        rows: dataset.row_count(),
        columns: dataset.schema.column_names(),
        dtypes: dtypes(&dataset.schema),
        operation: operation.as_str().to_string(),
        result: payload_to_json(payload, &dataset.schema),
    }
}

/// Column name to dtype label.
pub fn dtypes(schema: &Schema) -> Map<String, JsonValue> {
    schema
        .fields
        .iter()
        .map(|f| (f.name.clone(), JsonValue::from(f.data_type.label())))
        .collect()
}

pub fn payload_to_json(payload: &Payload, schema: &Schema) -> JsonValue {
    match payload {
        Payload::Info(summary) => {
            let mut out = Map::new();
            out.insert(
                "shape".into(),
                JsonValue::from(vec![summary.row_count, summary.columns.len()]),
            );
            out.insert("memory_mb".into(), float(round2(summary.memory_mb())));
            let null_counts: Map<String, JsonValue> = summary
                .columns
                .iter()
                .map(|c| (c.name.clone(), JsonValue::from(c.null_count)))
                .collect();
            out.insert("null_counts".into(), JsonValue::Object(null_counts));
            out.insert("sample".into(), records(schema, &summary.sample));
            JsonValue::Object(out)
        }
        Payload::Rows(rows) => records(schema, rows),
        Payload::Sum(total) => float(*total),
        Payload::Mean(mean) => optional_float(*mean),
        Payload::Describe(d) => describe(d),
        Payload::DescribeAll(all) => JsonValue::Object(
            all.iter()
                .map(|(name, d)| (name.clone(), describe(d)))
                .collect(),
        ),
        Payload::Groups(groups) => JsonValue::Object(
            groups
                .iter()
                .map(|g| (g.key.to_string(), cell(&g.total)))
                .collect(),
        ),
        Payload::Filter(summary) => {
            let mut out = Map::new();
            out.insert("matching_rows".into(), JsonValue::from(summary.matching_rows));
            out.insert("total_rows".into(), JsonValue::from(summary.total_rows));
            out.insert("percentage".into(), float(round2(summary.percentage)));
            out.insert("sample".into(), records(schema, &summary.sample));
            JsonValue::Object(out)
        }
        Payload::Unique(unique) => {
            let mut out = Map::new();
            out.insert("unique_count".into(), JsonValue::from(unique.unique_count));
            out.insert(
                "values".into(),
                JsonValue::Array(unique.values.iter().map(cell).collect()),
            );
            JsonValue::Object(out)
        }
        Payload::Duplicates(dupes) => {
            let mut out = Map::new();
            out.insert("duplicate_rows".into(), JsonValue::from(dupes.duplicate_rows));
            out.insert("sample".into(), records(schema, &dupes.sample));
            JsonValue::Object(out)
        }
        Payload::Correlation(corr) => {
            let mut out = Map::new();
            out.insert("correlation".into(), optional_float(corr.coefficient));
            out.insert("interpretation".into(), JsonValue::from(corr.interpretation));
            JsonValue::Object(out)
        }
    }
}

fn describe(d: &Describe) -> JsonValue {
    let mut out = Map::new();
    out.insert("count".into(), JsonValue::from(d.count));
    for (key, value) in [
        ("mean", d.mean),
        ("std", d.std),
        ("min", d.min),
        ("25%", d.p25),
        ("50%", d.p50),
        ("75%", d.p75),
        ("max", d.max),
    ] {
        out.insert(key.into(), optional_float(value));
    }
    JsonValue::Object(out)
}

/// Rows as `{column: value}` objects in column order.
pub fn records(schema: &Schema, rows: &[Vec<Value>]) -> JsonValue {
    JsonValue::Array(rows.iter().map(|row| record(schema, row)).collect())
}

fn record(schema: &Schema, row: &[Value]) -> JsonValue {
    JsonValue::Object(
        schema
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), row.get(i).map_or(JsonValue::Null, cell)))
            .collect(),
    )
}

/// JSON form of one cell.
pub fn cell(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Int64(v) => JsonValue::from(*v),
        Value::Float64(v) => float(*v),
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Utf8(s) => JsonValue::String(s.clone()),
        Value::DateTime(dt) => JsonValue::String(dt.format(DATETIME_DISPLAY_FORMAT).to_string()),
    }
}

/// Finite floats become numbers; NaN and infinities become `null`.
pub fn float(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}

fn optional_float(v: Option<f64>) -> JsonValue {
    v.map_or(JsonValue::Null, float)
}

/// Round half away from zero to two decimals. Non-finite input passes through.
pub fn round2(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    (v * 100.0).round() / 100.0
}
