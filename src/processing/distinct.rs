//! Distinct values and duplicate rows.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::types::{DataSet, Value};

/// Hashable view of a cell. `Null` equals `Null`; floats compare by bit pattern after folding
/// `-0.0` into `0.0` and every NaN into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(&'a str),
    DateTime(NaiveDateTime),
}

impl<'a> From<&'a Value> for CellKey<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Int64(v) => Self::Int(*v),
            Value::Float64(v) if v.is_nan() => Self::Float(f64::NAN.to_bits()),
            Value::Float64(v) => Self::Float((v + 0.0).to_bits()),
            Value::Bool(v) => Self::Bool(*v),
            Value::Utf8(s) => Self::Str(s),
            Value::DateTime(dt) => Self::DateTime(*dt),
        }
    }
}

/// Distinct values of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueValues {
    /// Total number of distinct values, including null.
    pub unique_count: usize,
    /// Distinct values in first-seen order, truncated to the requested limit.
    pub values: Vec<Value>,
}

/// Distinct values of column `idx` in first-seen order, keeping at most `limit` of them.
pub fn unique(dataset: &DataSet, idx: usize, limit: usize) -> UniqueValues {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for v in dataset.column(idx) {
        if seen.insert(CellKey::from(v)) && values.len() < limit {
            values.push(v.clone());
        }
    }
    UniqueValues {
        unique_count: seen.len(),
        values,
    }
}

/// Rows that share their `subset` values with at least one other row.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateRows {
    /// Number of such rows; every copy is counted, including the first.
    pub duplicate_rows: usize,
    /// Leading duplicate rows, in row order.
    pub sample: Vec<Vec<Value>>,
}

/// Find rows equal to another row on the columns in `subset`; an empty subset means every
/// column.
pub fn duplicates(dataset: &DataSet, subset: &[usize], sample_rows: usize) -> DuplicateRows {
    let all_columns: Vec<usize>;
    let subset = if subset.is_empty() {
        all_columns = (0..dataset.column_count()).collect();
        &all_columns
    } else {
        subset
    };

    let keys: Vec<Vec<CellKey<'_>>> = dataset.rows.iter().map(|row| row_key(row, subset)).collect();
    let mut occurrences: HashMap<&[CellKey<'_>], usize> = HashMap::new();
    for key in &keys {
        *occurrences.entry(key.as_slice()).or_default() += 1;
    }

    let mut duplicate_rows = 0;
    let mut sample = Vec::new();
    for (row, key) in dataset.rows.iter().zip(&keys) {
        if occurrences.get(key.as_slice()).is_some_and(|&count| count > 1) {
            duplicate_rows += 1;
            if sample.len() < sample_rows {
                sample.push(row.clone());
            }
        }
    }
    DuplicateRows {
        duplicate_rows,
        sample,
    }
}

fn row_key<'a>(row: &'a [Value], subset: &[usize]) -> Vec<CellKey<'a>> {
    subset
        .iter()
        .map(|&i| CellKey::from(row.get(i).unwrap_or(&Value::Null)))
        .collect()
}
