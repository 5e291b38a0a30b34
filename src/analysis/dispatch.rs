//! Request validation and reducer dispatch.

use std::fmt;
use std::path::Path;

use crate::error::{AnalysisError, AnalyzeResult};
use crate::expr::{compile, Predicate};
use crate::ingestion::{ingest_from_path, IngestionOptions};
use crate::processing::{self, RankOrder};
use crate::schema;
use crate::types::{DataSet, DataType, Schema};

use super::payload::Payload;
use super::request::{present, Operation, OperationRequest};
use super::serialize::{build_report, AnalysisResult};
use super::AnalysisOptions;

/// Where a request is in its lifecycle; recorded on every log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Validating,
    Executing,
    Serializing,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::Executing => "executing",
            Self::Serializing => "serializing",
        })
    }
}

/// A request whose columns have been resolved to positions and whose types have been checked.
#[derive(Debug, Clone)]
pub enum Plan {
    Info,
    Rank {
        column: usize,
        n: usize,
        order: RankOrder,
    },
    Sum {
        column: usize,
    },
    Mean {
        column: usize,
    },
    Stats {
        column: Option<usize>,
    },
    GroupBy {
        key: usize,
        aggregate: usize,
    },
    Filter {
        predicate: Predicate,
    },
    Unique {
        column: usize,
    },
    Duplicates {
        subset: Vec<usize>,
    },
    Correlate {
        x: usize,
        y: usize,
    },
}

/// Load `path` and run `request` against it.
///
/// Loader failures (missing file, unsupported extension, malformed content) become an error
/// result like any other failure.
pub fn analyze_path(
    path: impl AsRef<Path>,
    request: &OperationRequest,
    ingestion: &IngestionOptions,
    options: &AnalysisOptions,
) -> AnalysisResult {
    let path = path.as_ref();
    match ingest_from_path(path, ingestion) {
        Ok(dataset) => analyze(&dataset, &path.display().to_string(), request, options),
        Err(err) => {
            let err = AnalysisError::from(err);
            tracing::debug!(path = %path.display(), %err, "load failed");
            AnalysisResult::failure(&err)
        }
    }
}

/// Validate `request` against `dataset`, run the matching reducer and build the result.
///
/// `source` is echoed back as the result's `file` field.
pub fn analyze(
    dataset: &DataSet,
    source: &str,
    request: &OperationRequest,
    options: &AnalysisOptions,
) -> AnalysisResult {
    let span = tracing::debug_span!(
        "analyze",
        operation = %request.operation,
        rows = dataset.row_count()
    );
    let _enter = span.enter();

    tracing::debug!(stage = %DispatchStage::Validating, "validating request");
    let (operation, plan) = match validate(&dataset.schema, request, options) {
        Ok(validated) => validated,
        Err(err) => {
            tracing::debug!(stage = %DispatchStage::Validating, %err, "request rejected");
            return AnalysisResult::failure(&err);
        }
    };

    tracing::debug!(stage = %DispatchStage::Executing, ?plan, "running reducer");
    let payload = match execute(dataset, &plan, options) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(stage = %DispatchStage::Executing, %err, "reducer failed");
            return AnalysisResult::failure(&err);
        }
    };

    tracing::debug!(stage = %DispatchStage::Serializing, "building result");
    AnalysisResult::Success(build_report(dataset, source, operation, &payload))
}

/// Check the request against `schema` and resolve it into a [`Plan`].
pub fn validate(
    schema: &Schema,
    request: &OperationRequest,
    options: &AnalysisOptions,
) -> AnalyzeResult<(Operation, Plan)> {
    let operation: Operation = request.operation.parse()?;
    let op = operation.as_str();

    let plan = match operation {
        Operation::Info => Plan::Info,
        Operation::TopN | Operation::BottomN => Plan::Rank {
            column: numeric_column(schema, op, "column", &request.column)?,
            n: request.n.unwrap_or(options.default_n),
            order: if operation == Operation::TopN {
                RankOrder::Descending
            } else {
                RankOrder::Ascending
            },
        },
        Operation::Sum => Plan::Sum {
            column: numeric_column(schema, op, "column", &request.column)?,
        },
        Operation::Mean => Plan::Mean {
            column: numeric_column(schema, op, "column", &request.column)?,
        },
        Operation::Stats => match present(&request.column) {
            Some(_) => Plan::Stats {
                column: Some(numeric_column(schema, op, "column", &request.column)?),
            },
            None if schema.fields.iter().any(|f| f.data_type.is_numeric()) => {
                Plan::Stats { column: None }
            }
            None => {
                return Err(AnalysisError::Computation(format!(
                    "No numeric columns to describe. Available: [{}]",
                    schema.column_names().join(", ")
                )));
            }
        },
        Operation::GroupBy => {
            let key_name = required(schema, op, "group_by", &request.group_by)?;
            let agg_name = required(schema, op, "aggregate", &request.aggregate)?;
            let key = lookup(schema, "Group column", key_name)?;
            let aggregate = lookup(schema, "Aggregate column", agg_name)?;
            ensure_numeric(schema, op, aggregate)?;
            Plan::GroupBy { key, aggregate }
        }
        Operation::Filter => {
            let condition = required(schema, op, "condition", &request.condition)?;
            let predicate =
                compile(condition, schema).map_err(|err| AnalysisError::InvalidFilterExpression {
                    condition: condition.to_string(),
                    message: err.to_string(),
                })?;
            Plan::Filter { predicate }
        }
        Operation::Unique => {
            let name = required(schema, op, "column", &request.column)?;
            Plan::Unique {
                column: lookup(schema, "Column", name)?,
            }
        }
        Operation::Duplicates => Plan::Duplicates {
            subset: request
                .column_subset()
                .into_iter()
                .map(|name| lookup(schema, "Column", name))
                .collect::<AnalyzeResult<_>>()?,
        },
        Operation::Correlate => {
            let x = numeric_column(schema, op, "column1", &request.column1)?;
            let y = numeric_column(schema, op, "column2", &request.column2)?;
            Plan::Correlate { x, y }
        }
    };
    Ok((operation, plan))
}

/// Run the reducer for a validated plan.
pub fn execute(dataset: &DataSet, plan: &Plan, options: &AnalysisOptions) -> AnalyzeResult<Payload> {
    Ok(match plan {
        Plan::Info => Payload::Info(schema::inspect(dataset, options.info_sample_rows)),
        Plan::Rank { column, n, order } => {
            Payload::Rows(processing::rank_rows(dataset, *column, *n, *order))
        }
        Plan::Sum { column } => Payload::Sum(processing::reduce::sum(dataset, *column)?),
        Plan::Mean { column } => Payload::Mean(processing::reduce::mean(dataset, *column)?),
        Plan::Stats { column: Some(column) } => {
            Payload::Describe(processing::describe(dataset, *column)?)
        }
        Plan::Stats { column: None } => {
            let mut all = Vec::new();
            for (idx, field) in dataset.schema.fields.iter().enumerate() {
                if field.data_type.is_numeric() {
                    all.push((field.name.clone(), processing::describe(dataset, idx)?));
                }
            }
            Payload::DescribeAll(all)
        }
        Plan::GroupBy { key, aggregate } => {
            Payload::Groups(processing::group_sum(dataset, *key, *aggregate)?)
        }
        Plan::Filter { predicate } => Payload::Filter(processing::filter_summary(
            dataset,
            predicate,
            options.filter_sample_rows,
        )),
        Plan::Unique { column } => {
            Payload::Unique(processing::unique(dataset, *column, options.unique_limit))
        }
        Plan::Duplicates { subset } => Payload::Duplicates(processing::duplicates(
            dataset,
            subset,
            options.duplicate_sample_rows,
        )),
        Plan::Correlate { x, y } => Payload::Correlation(processing::pearson(dataset, *x, *y)),
    })
}

fn required<'a>(
    schema: &Schema,
    operation: &'static str,
    parameter: &'static str,
    value: &'a Option<String>,
) -> AnalyzeResult<&'a str> {
    present(value).ok_or_else(|| AnalysisError::MissingParameter {
        parameter,
        operation,
        available: schema.column_names(),
    })
}

fn lookup(schema: &Schema, label: &'static str, name: &str) -> AnalyzeResult<usize> {
    schema
        .index_of(name)
        .ok_or_else(|| AnalysisError::ColumnNotFound {
            label,
            column: name.to_string(),
            available: schema.column_names(),
        })
}

/// Numeric reducers accept `Int64`, `Float64`, and all-missing (`Null`) columns.
fn ensure_numeric(schema: &Schema, operation: &'static str, idx: usize) -> AnalyzeResult<()> {
    let field = &schema.fields[idx];
    if field.data_type.is_numeric() || field.data_type == DataType::Null {
        Ok(())
    } else {
        Err(AnalysisError::TypeMismatch {
            column: field.name.clone(),
            dtype: field.data_type.label(),
            operation,
        })
    }
}

fn numeric_column(
    schema: &Schema,
    operation: &'static str,
    parameter: &'static str,
    value: &Option<String>,
) -> AnalyzeResult<usize> {
    let name = required(schema, operation, parameter, value)?;
    let idx = lookup(schema, "Column", name)?;
    ensure_numeric(schema, operation, idx)?;
    Ok(idx)
}
