//! Operation names and request parameters.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::AnalysisError;

/// The fixed set of analysis operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Info,
    TopN,
    BottomN,
    Sum,
    Mean,
    Stats,
    GroupBy,
    Filter,
    Unique,
    Duplicates,
    Correlate,
}

impl Operation {
    /// Every operation, in the order they are listed to callers.
    pub const ALL: [Operation; 11] = [
        Self::Info,
        Self::TopN,
        Self::BottomN,
        Self::Sum,
        Self::Mean,
        Self::Stats,
        Self::GroupBy,
        Self::Filter,
        Self::Unique,
        Self::Duplicates,
        Self::Correlate,
    ];

    /// Wire names of [`Self::ALL`], same order.
    pub const NAMES: &'static [&'static str] = &[
        "info",
        "top_n",
        "bottom_n",
        "sum",
        "mean",
        "stats",
        "group_by",
        "filter",
        "unique",
        "duplicates",
        "correlate",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::TopN => "top_n",
            Self::BottomN => "bottom_n",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Stats => "stats",
            Self::GroupBy => "group_by",
            Self::Filter => "filter",
            Self::Unique => "unique",
            Self::Duplicates => "duplicates",
            Self::Correlate => "correlate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AnalysisError;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| AnalysisError::UnknownOperation {
                operation: s.to_string(),
            })
    }
}

/// Parameters of one analysis call.
///
/// Field names match the command-line flags, so a request can also be read from a JSON object
/// such as `{"operation": "top_n", "column": "revenue", "n": 3}`. Parameters an operation does
/// not use are ignored. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationRequest {
    pub operation: String,
    pub column: Option<String>,
    pub column1: Option<String>,
    pub column2: Option<String>,
    /// Comma-separated column subset for `duplicates`.
    pub columns: Option<String>,
    pub n: Option<usize>,
    pub group_by: Option<String>,
    pub aggregate: Option<String>,
    pub condition: Option<String>,
}

impl OperationRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_n(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_group(mut self, group_by: impl Into<String>, aggregate: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self.aggregate = Some(aggregate.into());
        self
    }

    pub fn with_pair(mut self, column1: impl Into<String>, column2: impl Into<String>) -> Self {
        self.column1 = Some(column1.into());
        self.column2 = Some(column2.into());
        self
    }

    pub fn with_columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Names listed in `columns`, trimmed, with empty entries dropped.
    pub fn column_subset(&self) -> Vec<&str> {
        self.columns
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Treats empty and whitespace-only strings as missing.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
