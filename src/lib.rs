//! `tabular-analyze` runs fixed, deterministic operations (aggregation, filtering, ranking,
//! correlation, deduplication) over an in-memory table and returns one JSON-ready result.
//!
//! The primary entrypoints are [`analysis::analyze_path`], which loads a file and runs one
//! operation, and [`analysis::analyze`] for a [`types::DataSet`] already in memory.
//!
//! ## What you can load
//!
//! **File formats (auto-detected by extension):**
//!
//! - **CSV**: `.csv`
//! - **JSON**: `.json` (array-of-objects or single object) and `.ndjson` (newline-delimited objects)
//! - **Excel/workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! Column types are inferred from the data unless an explicit [`types::Schema`] is passed in
//! [`ingestion::IngestionOptions`]. Supported logical types are:
//!
//! - [`types::DataType::Int64`]
//! - [`types::DataType::Float64`]
//! - [`types::DataType::Bool`]
//! - [`types::DataType::Utf8`]
//! - [`types::DataType::DateTime`]
//! - [`types::DataType::Null`] (a column with no values at all)
//!
//! Across formats, empty cells / empty strings / explicit JSON `null` map to [`types::Value::Null`].
//!
//! ## Operations
//!
//! `info`, `top_n`, `bottom_n`, `sum`, `mean`, `stats`, `group_by`, `filter`, `unique`,
//! `duplicates`, `correlate`. See [`analysis::Operation`] and [`analysis::OperationRequest`].
//!
//! ```no_run
//! use tabular_analyze::analysis::{analyze_path, AnalysisOptions, OperationRequest};
//! use tabular_analyze::ingestion::IngestionOptions;
//!
//! let request = OperationRequest::new("filter").with_condition("revenue > 25");
//! let result = analyze_path(
//!     "sales.csv",
//!     &request,
//!     &IngestionOptions::default(),
//!     &AnalysisOptions::default(),
//! );
//! println!("{}", result.to_json_string(true).unwrap());
//! std::process::exit(result.exit_code());
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified loading entrypoint and format-specific loaders
//! - [`types`]: schema + in-memory dataset types
//! - [`schema`]: per-column summaries used by `info`
//! - [`expr`]: the filter condition language
//! - [`processing`]: reducers (filter/reduce/rank/group/stats/distinct)
//! - [`analysis`]: request validation, dispatch and result serialization
//! - [`logging`]: `tracing` subscriber setup for binaries
//! - [`error`]: error types used across loading and analysis

pub mod analysis;
pub mod error;
pub mod expr;
pub mod ingestion;
pub mod logging;
pub mod processing;
pub mod schema;
pub mod types;

pub use error::{AnalysisError, AnalyzeResult, IngestionError, IngestionResult};
