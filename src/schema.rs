//! Schema inspection: per-column types, null counts, a row sample, and a memory estimate.

use std::mem::size_of;

use crate::types::{DataSet, DataType, Value};

/// Summary of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    /// Column name.
    pub name: String,
    /// Column data type.
    pub data_type: DataType,
    /// Number of [`Value::Null`] cells.
    pub null_count: usize,
}

/// Shape and per-column facts about a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSummary {
    /// Columns in declared order.
    pub columns: Vec<ColumnSummary>,
    /// Number of rows.
    pub row_count: usize,
    /// Approximate in-memory footprint of the dataset, in bytes.
    pub memory_bytes: usize,
    /// The first rows of the dataset, in row order.
    pub sample: Vec<Vec<Value>>,
}

impl SchemaSummary {
    /// Approximate footprint in mebibytes (unrounded).
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / 1024.0 / 1024.0
    }
}

/// Inspect `dataset`, keeping at most `sample_rows` rows as a sample.
pub fn inspect(dataset: &DataSet, sample_rows: usize) -> SchemaSummary {
    let null_counts = null_counts(dataset);
    let columns = dataset
        .schema
        .fields
        .iter()
        .zip(null_counts)
        .map(|(field, null_count)| ColumnSummary {
            name: field.name.clone(),
            data_type: field.data_type,
            null_count,
        })
        .collect();

    SchemaSummary {
        columns,
        row_count: dataset.row_count(),
        memory_bytes: estimate_memory_bytes(dataset),
        sample: dataset.rows.iter().take(sample_rows).cloned().collect(),
    }
}

/// Number of missing cells (null or NaN) per column, in column order.
pub fn null_counts(dataset: &DataSet) -> Vec<usize> {
    dataset.reduce_rows(vec![0usize; dataset.column_count()], |mut acc, row| {
        for (count, value) in acc.iter_mut().zip(row) {
            if value.is_missing() {
                *count += 1;
            }
        }
        acc
    })
}

/// Rough footprint: row vectors, cell slots, and string heap bytes.
pub fn estimate_memory_bytes(dataset: &DataSet) -> usize {
    let schema_bytes: usize = dataset
        .schema
        .fields
        .iter()
        .map(|f| size_of::<crate::types::Field>() + f.name.capacity())
        .sum();

    let row_bytes: usize = dataset
        .rows
        .iter()
        .map(|row| {
            let heap: usize = row
                .iter()
                .map(|v| match v {
                    Value::Utf8(s) => s.capacity(),
                    _ => 0,
                })
                .sum();
            size_of::<Vec<Value>>() + row.capacity() * size_of::<Value>() + heap
        })
        .sum();

    schema_bytes + row_bytes
}
