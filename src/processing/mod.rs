//! In-memory reducers over a [`crate::types::DataSet`].
//!
//! Every function here borrows the dataset and returns a fresh result; nothing mutates the
//! input. Column arguments are positions that the caller has already resolved and type-checked
//! (see [`crate::analysis`]).
//!
//! - [`filter()`] / [`filter_summary`]: row filtering by predicate or compiled condition
//! - [`reduce()`]: count/sum/min/max/mean over one column
//! - [`top_n`] / [`bottom_n`]: stable ranking by one column
//! - [`group_sum`]: partition by one column and sum another
//! - [`describe`] / [`pearson`]: descriptive statistics and correlation
//! - [`unique`] / [`duplicates`]: distinct values and repeated rows
//!
//! ## Example: filter then reduce
//!
//! ```rust
//! use tabular_analyze::expr::compile;
//! use tabular_analyze::processing::{filter, reduce, ReduceOp};
//! use tabular_analyze::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("id", DataType::Int64),
//!     Field::new("active", DataType::Bool),
//!     Field::new("score", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(1), Value::Bool(true), Value::Float64(10.0)],
//!         vec![Value::Int64(2), Value::Bool(false), Value::Float64(20.0)],
//!         vec![Value::Int64(3), Value::Bool(true), Value::Null],
//!     ],
//! );
//!
//! let active = compile("active", &ds.schema).unwrap();
//! let filtered = filter(&ds, |row| active.matches(row));
//!
//! // Sum scores (nulls ignored).
//! let sum = reduce(&filtered, "score", ReduceOp::Sum).unwrap();
//! assert_eq!(sum, Value::Float64(10.0));
//! ```

pub mod distinct;
pub mod filter;
pub mod group;
pub mod rank;
pub mod reduce;
pub mod stats;

pub use distinct::{duplicates, unique, DuplicateRows, UniqueValues};
pub use filter::{filter, filter_summary, FilterSummary};
pub use group::{group_sum, GroupTotal};
pub use rank::{bottom_n, rank_rows, top_n, RankOrder};
pub use reduce::{reduce, ReduceOp, SumAccumulator};
pub use stats::{describe, pearson, percentile_linear, Correlation, Describe};
