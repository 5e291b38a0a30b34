//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which loads a file into an in-memory
//! [`crate::types::DataSet`].
//!
//! - If [`IngestionOptions::format`] is `None`, the ingestion format is inferred from the file
//!   extension.
//! - If [`IngestionOptions::schema`] is `None`, column names and types are inferred from the
//!   data; otherwise values are parsed strictly into the given schema.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Lowercase name used in log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Excel => "excel",
        }
    }

    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// How to choose sheet(s) when ingesting an Excel workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExcelSheetSelection {
    /// Ingest the first sheet (default).
    #[default]
    First,
    /// Ingest a single named sheet.
    Sheet(String),
    /// Ingest all sheets and concatenate rows.
    AllSheets,
    /// Ingest only the listed sheets (in order) and concatenate rows.
    Sheets(Vec<String>),
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// If `None`, infer column names and types from the data.
    pub schema: Option<Schema>,
    /// Excel-specific options.
    pub excel_sheet_selection: ExcelSheetSelection,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("schema_fields", &self.schema.as_ref().map(|s| s.fields.len()))
            .field("excel_sheet_selection", &self.excel_sheet_selection)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            schema: None,
            excel_sheet_selection: ExcelSheetSelection::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// Checks run in this order:
///
/// 1. the path must exist ([`IngestionError::FileNotFound`])
/// 2. the format must be known, from `options.format` or the extension
///    ([`IngestionError::UnsupportedFileType`])
/// 3. the format-specific loader runs, strict when `options.schema` is set, inferring otherwise
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ## Infer the schema (auto-detect format by extension)
///
/// ```no_run
/// use tabular_analyze::ingestion::{ingest_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), tabular_analyze::IngestionError> {
/// let ds = ingest_from_path("sales.csv", &IngestionOptions::default())?;
/// println!("rows={} columns={}", ds.row_count(), ds.column_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Explicit schema with nested JSON paths
///
/// ```no_run
/// use tabular_analyze::ingestion::{ingest_from_path, IngestionOptions};
/// use tabular_analyze::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), tabular_analyze::IngestionError> {
/// let schema = Schema::new(vec![
///     Field::new("id", DataType::Int64),
///     Field::new("user.name", DataType::Utf8),
/// ]);
/// let opts = IngestionOptions {
///     schema: Some(schema),
///     ..Default::default()
/// };
/// let ds = ingest_from_path("events.json", &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (tracing + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tabular_analyze::ingestion::{
///     ingest_from_path, IngestionOptions, IngestionSeverity, TracingObserver,
/// };
///
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(TracingObserver)),
///     alert_at_or_above: IngestionSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = ingest_from_path("does_not_exist.csv", &opts).unwrap_err();
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let fmt = resolve_format(path, options);

    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format: fmt.as_ref().ok().copied(),
    };

    let result = fmt.and_then(|fmt| load(path, fmt, options));

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(ds) => obs.on_success(
                &ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    columns: ds.column_count(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn resolve_format(path: &Path, options: &IngestionOptions) -> IngestionResult<IngestionFormat> {
    if !path.exists() {
        return Err(IngestionError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    match options.format {
        Some(f) => Ok(f),
        None => infer_format_from_path(path),
    }
}

fn load(path: &Path, fmt: IngestionFormat, options: &IngestionOptions) -> IngestionResult<DataSet> {
    match (fmt, options.schema.as_ref()) {
        (IngestionFormat::Csv, Some(schema)) => csv::ingest_csv_from_path(path, schema),
        (IngestionFormat::Csv, None) => csv::ingest_csv_inferred_from_path(path),
        (IngestionFormat::Json, Some(schema)) => json::ingest_json_from_path(path, schema),
        (IngestionFormat::Json, None) => json::ingest_json_inferred_from_path(path),
        (IngestionFormat::Excel, schema) => {
            ingest_excel_dispatch(path, schema, &options.excel_sheet_selection)
        }
    }
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::FileNotFound { .. } | IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        #[cfg(feature = "excel")]
        IngestionError::Excel(err) => {
            // Best-effort: workbook errors often wrap IO, but not always in a structured way.
            if error_chain_contains_io(err) {
                IngestionSeverity::Critical
            } else {
                IngestionSeverity::Error
            }
        }
        IngestionError::UnsupportedFileType { .. }
        | IngestionError::Json(_)
        | IngestionError::SchemaMismatch { .. }
        | IngestionError::ParseError { .. } => IngestionSeverity::Error,
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::UnsupportedFileType {
        extension: if ext.is_empty() {
            "(none)".to_string()
        } else {
            format!(".{ext}")
        },
    })
}

fn ingest_excel_dispatch(
    path: &Path,
    schema: Option<&Schema>,
    sel: &ExcelSheetSelection,
) -> IngestionResult<DataSet> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, schema, sel);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        let refs: Vec<&str> = match sel {
            ExcelSheetSelection::Sheets(names) => names.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        };

        match (sel, schema) {
            (ExcelSheetSelection::First, Some(s)) => excel::ingest_excel_from_path(path, None, s),
            (ExcelSheetSelection::First, None) => excel::ingest_excel_inferred_from_path(path, None),
            (ExcelSheetSelection::Sheet(name), Some(s)) => {
                excel::ingest_excel_from_path(path, Some(name.as_str()), s)
            }
            (ExcelSheetSelection::Sheet(name), None) => {
                excel::ingest_excel_inferred_from_path(path, Some(name.as_str()))
            }
            (ExcelSheetSelection::AllSheets, Some(s)) => {
                excel::ingest_excel_workbook_from_path(path, None, s)
            }
            (ExcelSheetSelection::AllSheets, None) => {
                excel::ingest_excel_inferred_workbook_from_path(path, None)
            }
            (ExcelSheetSelection::Sheets(_), Some(s)) => {
                excel::ingest_excel_workbook_from_path(path, Some(refs.as_slice()), s)
            }
            (ExcelSheetSelection::Sheets(_), None) => {
                excel::ingest_excel_inferred_workbook_from_path(path, Some(refs.as_slice()))
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::SchemaMismatch {
            message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_extension_is_case_insensitive() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("ndjson"), Some(IngestionFormat::Json));
        assert_eq!(IngestionFormat::from_extension("Xlsx"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_extension("txt"), None);
    }

    #[test]
    fn unknown_extension_reports_dotted_suffix() {
        let err = infer_format_from_path(Path::new("notes.txt")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: .txt");
        let err = infer_format_from_path(Path::new("Makefile")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: (none)");
    }
}
