//! Row filtering for [`crate::types::DataSet`].

use crate::expr::Predicate;
use crate::types::{DataSet, Value};

/// Returns a new [`DataSet`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataSet::filter_rows`].
pub fn filter<F>(dataset: &DataSet, predicate: F) -> DataSet
where
    F: FnMut(&[Value]) -> bool,
{
    dataset.filter_rows(predicate)
}

/// Outcome of applying a compiled condition to a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSummary {
    pub matching_rows: usize,
    pub total_rows: usize,
    /// Share of matching rows in percent, unrounded. `0.0` for an empty dataset.
    pub percentage: f64,
    /// Leading matching rows, in row order.
    pub sample: Vec<Vec<Value>>,
}

/// Apply `predicate` to every row and summarize the matches.
pub fn filter_summary(dataset: &DataSet, predicate: &Predicate, sample_rows: usize) -> FilterSummary {
    let matched = filter(dataset, |row| predicate.matches(row));
    let total_rows = dataset.row_count();
    let matching_rows = matched.row_count();
    let percentage = if total_rows == 0 {
        0.0
    } else {
        matching_rows as f64 / total_rows as f64 * 100.0
    };
    FilterSummary {
        matching_rows,
        total_rows,
        percentage,
        sample: matched.rows.into_iter().take(sample_rows).collect(),
    }
}
