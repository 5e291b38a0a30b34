//! Reduction operations for [`crate::types::DataSet`].

use crate::error::{AnalysisError, AnalyzeResult};
use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Count non-null values.
    CountNonNull,
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum value, ignoring nulls.
    Min,
    /// Maximum value, ignoring nulls.
    Max,
    /// Arithmetic mean of numeric values, ignoring nulls.
    Mean,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `ColumnNotFound` if `column` does not exist in the schema.
/// - `Sum` keeps the column type (`Int64` sums stay integers) and is zero when there are no values.
/// - `Min`/`Max`/`Mean` return [`Value::Null`] if there are no non-null values.
/// - `Sum`/`Mean` on a non-numeric column return `TypeMismatch`.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> AnalyzeResult<Value> {
    let idx = dataset
        .schema
        .index_of(column)
        .ok_or_else(|| AnalysisError::ColumnNotFound {
            label: "Column",
            column: column.to_string(),
            available: dataset.schema.column_names(),
        })?;
    let data_type = dataset.schema.fields[idx].data_type;

    match op {
        ReduceOp::Count => Ok(Value::Int64(dataset.row_count() as i64)),
        ReduceOp::CountNonNull => Ok(Value::Int64(count_non_null(dataset, idx) as i64)),
        ReduceOp::Min | ReduceOp::Max => Ok(extreme(dataset, idx, op)),
        ReduceOp::Sum | ReduceOp::Mean => {
            if !data_type.is_numeric() {
                return Err(AnalysisError::TypeMismatch {
                    column: column.to_string(),
                    dtype: data_type.label(),
                    operation: if op == ReduceOp::Sum { "sum" } else { "mean" },
                });
            }
            if op == ReduceOp::Sum {
                let mut acc = SumAccumulator::for_type(data_type);
                for v in dataset.column(idx) {
                    acc.add(v);
                }
                acc.finish(column)
            } else {
                Ok(mean(dataset, idx)?.map_or(Value::Null, Value::Float64))
            }
        }
    }
}

/// Number of present cells in column `idx`; nulls and NaN do not count.
pub fn count_non_null(dataset: &DataSet, idx: usize) -> usize {
    dataset.column(idx).filter(|v| !v.is_missing()).count()
}

fn extreme(dataset: &DataSet, idx: usize, op: ReduceOp) -> Value {
    let mut best: Option<&Value> = None;
    for v in dataset.column(idx).filter(|v| !v.is_missing()) {
        best = match best {
            None => Some(v),
            Some(b) => {
                let replace = match v.compare(b) {
                    Some(ord) if op == ReduceOp::Min => ord.is_lt(),
                    Some(ord) => ord.is_gt(),
                    None => false,
                };
                Some(if replace { v } else { b })
            }
        };
    }
    best.cloned().unwrap_or(Value::Null)
}

/// Running total for one numeric column.
///
/// Integer columns accumulate in `i128` and are checked against the `i64` range when finished,
/// so intermediate overflow cannot occur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SumAccumulator {
    Int(i128),
    Float(f64),
}

impl SumAccumulator {
    /// Zero total matching the column type (`Float` for anything that is not `Int64`).
    pub fn for_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Int64 => Self::Int(0),
            _ => Self::Float(0.0),
        }
    }

    /// Add one cell; nulls, NaN and non-numeric cells are skipped.
    pub fn add(&mut self, value: &Value) {
        match (self, value) {
            (Self::Int(acc), Value::Int64(v)) => *acc += i128::from(*v),
            (Self::Float(acc), Value::Float64(v)) if !v.is_nan() => *acc += v,
            (Self::Float(acc), Value::Int64(v)) => *acc += *v as f64,
            _ => {}
        }
    }

    /// Final typed total. Integer totals outside the `i64` range are a `Computation` error.
    pub fn finish(self, column: &str) -> AnalyzeResult<Value> {
        match self {
            Self::Int(total) => i64::try_from(total).map(Value::Int64).map_err(|_| {
                AnalysisError::Computation(format!(
                    "Integer overflow while summing column '{column}'"
                ))
            }),
            Self::Float(total) => Ok(Value::Float64(total)),
        }
    }
}

/// Total of numeric column `idx` as a float. Zero when the column has no values.
pub fn sum(dataset: &DataSet, idx: usize) -> AnalyzeResult<f64> {
    let field = &dataset.schema.fields[idx];
    let mut acc = SumAccumulator::for_type(field.data_type);
    for v in dataset.column(idx) {
        acc.add(v);
    }
    Ok(acc.finish(&field.name)?.as_f64().unwrap_or(0.0))
}

/// `sum / count` over the non-null values of numeric column `idx`, or `None` without values.
pub fn mean(dataset: &DataSet, idx: usize) -> AnalyzeResult<Option<f64>> {
    let count = count_non_null(dataset, idx);
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(sum(dataset, idx)? / count as f64))
}

#[cfg(test)]
mod tests {
    use super::{mean, reduce, sum, ReduceOp};
    use crate::error::AnalysisError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn numeric_dataset_with_nulls() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
            Field::new("name", DataType::Utf8),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Float64(10.0), Value::Utf8("b".into())],
            vec![Value::Int64(2), Value::Null, Value::Utf8("a".into())],
            vec![Value::Int64(3), Value::Float64(5.5), Value::Null],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn reduce_count_counts_rows() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Count).unwrap(), Value::Int64(3));
        assert_eq!(
            reduce(&ds, "score", ReduceOp::CountNonNull).unwrap(),
            Value::Int64(2)
        );
    }

    #[test]
    fn nan_cells_count_as_missing() {
        let mut ds = numeric_dataset_with_nulls();
        ds.rows[1][1] = Value::Float64(f64::NAN);
        assert_eq!(sum(&ds, 1).unwrap(), 15.5);
        assert_eq!(mean(&ds, 1).unwrap(), Some(15.5 / 2.0));
        assert_eq!(reduce(&ds, "score", ReduceOp::Max).unwrap(), Value::Float64(10.0));
    }

    #[test]
    fn reduce_sum_ignores_nulls_and_preserves_type() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(
            reduce(&ds, "score", ReduceOp::Sum).unwrap(),
            Value::Float64(15.5)
        );
        assert_eq!(reduce(&ds, "id", ReduceOp::Sum).unwrap(), Value::Int64(6));
        assert_eq!(sum(&ds, 0).unwrap(), 6.0);
    }

    #[test]
    fn reduce_min_max_ignore_nulls() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(
            reduce(&ds, "score", ReduceOp::Min).unwrap(),
            Value::Float64(5.5)
        );
        assert_eq!(
            reduce(&ds, "score", ReduceOp::Max).unwrap(),
            Value::Float64(10.0)
        );
        assert_eq!(
            reduce(&ds, "name", ReduceOp::Max).unwrap(),
            Value::Utf8("b".into())
        );
    }

    #[test]
    fn reduce_rejects_missing_and_non_numeric_columns() {
        let ds = numeric_dataset_with_nulls();
        assert!(matches!(
            reduce(&ds, "missing", ReduceOp::Count),
            Err(AnalysisError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            reduce(&ds, "name", ReduceOp::Sum),
            Err(AnalysisError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn mean_is_sum_over_non_null_count() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(mean(&ds, 1).unwrap(), Some(15.5 / 2.0));
        assert_eq!(
            reduce(&ds, "id", ReduceOp::Mean).unwrap(),
            Value::Float64(2.0)
        );
    }

    #[test]
    fn all_null_column_has_zero_sum_and_no_mean() {
        let schema = Schema::new(vec![Field::new("score", DataType::Float64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Null], vec![Value::Null]]);
        assert_eq!(reduce(&ds, "score", ReduceOp::Sum).unwrap(), Value::Float64(0.0));
        assert_eq!(reduce(&ds, "score", ReduceOp::Mean).unwrap(), Value::Null);
        assert_eq!(reduce(&ds, "score", ReduceOp::Min).unwrap(), Value::Null);
        assert_eq!(mean(&ds, 0).unwrap(), None);
    }

    #[test]
    fn integer_overflow_is_a_computation_error() {
        let schema = Schema::new(vec![Field::new("big", DataType::Int64)]);
        let ds = DataSet::new(
            schema,
            vec![vec![Value::Int64(i64::MAX)], vec![Value::Int64(1)]],
        );
        let err = reduce(&ds, "big", ReduceOp::Sum).unwrap_err();
        assert!(matches!(err, AnalysisError::Computation(_)));
        assert!(sum(&ds, 0).is_err());
    }
}
