//! Loading files into a [`crate::types::DataSet`].
//!
//! [`ingest_from_path`] is the usual entrypoint. It refuses missing files, picks a loader from
//! the extension unless [`IngestionOptions::format`] overrides it, infers column types when no
//! schema is given, and reports the outcome to an optional [`IngestionObserver`].
//!
//! The per-format loaders in [`csv`], [`json`] and `excel` (behind the `excel` feature) can
//! also be called directly.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod infer;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use unified::{ingest_from_path, ExcelSheetSelection, IngestionFormat, IngestionOptions};
