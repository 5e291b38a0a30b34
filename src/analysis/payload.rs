//! Typed reducer outputs, before serialization.

use crate::processing::{Correlation, Describe, DuplicateRows, FilterSummary, GroupTotal, UniqueValues};
use crate::schema::SchemaSummary;
use crate::types::Value;

/// What one reducer produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `info`.
    Info(SchemaSummary),
    /// `top_n` / `bottom_n`: full rows, already in rank order.
    Rows(Vec<Vec<Value>>),
    /// `sum`: always present, `0.0` without values.
    Sum(f64),
    /// `mean`: `None` without values.
    Mean(Option<f64>),
    /// `stats` for one requested column.
    Describe(Describe),
    /// `stats` for every numeric column, in column order.
    DescribeAll(Vec<(String, Describe)>),
    /// `group_by`, in ascending key order.
    Groups(Vec<GroupTotal>),
    Filter(FilterSummary),
    Unique(UniqueValues),
    Duplicates(DuplicateRows),
    Correlation(Correlation),
}
