//! Operation dispatch: validate a request, run one reducer, serialize the outcome.
//!
//! ```rust
//! use tabular_analyze::analysis::{analyze, AnalysisOptions, OperationRequest};
//! use tabular_analyze::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![Field::new("revenue", DataType::Int64)]),
//!     vec![vec![Value::Int64(10)], vec![Value::Int64(20)]],
//! );
//! let request = OperationRequest::new("sum").with_column("revenue");
//! let result = analyze(&ds, "inline", &request, &AnalysisOptions::default());
//! assert_eq!(result.result(), Some(&serde_json::json!(30.0)));
//! ```

pub mod dispatch;
pub mod payload;
pub mod request;
pub mod serialize;

pub use dispatch::{analyze, analyze_path, execute, validate, DispatchStage, Plan};
pub use payload::Payload;
pub use request::{Operation, OperationRequest};
pub use serialize::{AnalysisReport, AnalysisResult};

/// Tunables for the reducers. [`Default`] gives the documented values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// `n` for `top_n`/`bottom_n` when the request leaves it out.
    pub default_n: usize,
    /// Rows included in the `info` sample.
    pub info_sample_rows: usize,
    /// Matching rows included in the `filter` sample.
    pub filter_sample_rows: usize,
    /// Duplicate rows included in the `duplicates` sample.
    pub duplicate_sample_rows: usize,
    /// Maximum number of values listed by `unique`.
    pub unique_limit: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            default_n: 10,
            info_sample_rows: 3,
            filter_sample_rows: 5,
            duplicate_sample_rows: 10,
            unique_limit: 100,
        }
    }
}
