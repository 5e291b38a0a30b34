use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for analysis operations.
pub type AnalyzeResult<T> = Result<T, AnalysisError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across CSV/JSON (and optional Excel) ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The input path does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// The input path has an extension no loader understands.
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    /// Underlying I/O error (e.g. permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON document could not be parsed at all.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have the expected shape (missing headers, duplicate columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Every way an analysis request can fail.
///
/// Messages name the offending parameter or column and, where it helps the caller
/// self-correct, list the columns that do exist.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    /// Any other loader failure (malformed CSV, bad JSON, unreadable workbook).
    #[error("{0}")]
    Load(IngestionError),

    #[error("Unknown operation: {operation}. Available: {}", crate::analysis::Operation::NAMES.join(", "))]
    UnknownOperation { operation: String },

    #[error("Missing required parameter '{parameter}' for operation '{operation}'{}", available_suffix(.available))]
    MissingParameter {
        parameter: &'static str,
        operation: &'static str,
        available: Vec<String>,
    },

    /// `label` is `Column`, `Group column` or `Aggregate column`.
    #[error("{label} '{column}' not found. Available: [{}]", .available.join(", "))]
    ColumnNotFound {
        label: &'static str,
        column: String,
        available: Vec<String>,
    },

    #[error("Invalid filter condition: {condition}. Error: {message}")]
    InvalidFilterExpression { condition: String, message: String },

    #[error("Column '{column}' has dtype '{dtype}'; operation '{operation}' requires a numeric column")]
    TypeMismatch {
        column: String,
        dtype: &'static str,
        operation: &'static str,
    },

    /// Failure raised while a reducer was running.
    #[error("{0}")]
    Computation(String),
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(". Available: [{}]", available.join(", "))
    }
}

impl From<IngestionError> for AnalysisError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::FileNotFound { path } => Self::FileNotFound { path },
            IngestionError::UnsupportedFileType { extension } => {
                Self::UnsupportedFileType { extension }
            }
            other => Self::Load(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols() -> Vec<String> {
        vec!["id".into(), "category".into(), "revenue".into()]
    }

    #[test]
    fn column_not_found_lists_available_columns() {
        let err = AnalysisError::ColumnNotFound {
            label: "Column",
            column: "xyz".into(),
            available: cols(),
        };
        assert_eq!(
            err.to_string(),
            "Column 'xyz' not found. Available: [id, category, revenue]"
        );
    }

    #[test]
    fn missing_parameter_suffix_is_optional() {
        let with_cols = AnalysisError::MissingParameter {
            parameter: "column",
            operation: "sum",
            available: cols(),
        };
        assert_eq!(
            with_cols.to_string(),
            "Missing required parameter 'column' for operation 'sum'. Available: [id, category, revenue]"
        );
        let without = AnalysisError::MissingParameter {
            parameter: "condition",
            operation: "filter",
            available: Vec::new(),
        };
        assert_eq!(
            without.to_string(),
            "Missing required parameter 'condition' for operation 'filter'"
        );
    }

    #[test]
    fn ingestion_errors_map_onto_taxonomy() {
        let err: AnalysisError = IngestionError::UnsupportedFileType {
            extension: ".txt".into(),
        }
        .into();
        assert!(matches!(err, AnalysisError::UnsupportedFileType { .. }));
        assert_eq!(err.to_string(), "Unsupported file type: .txt");

        let err: AnalysisError = IngestionError::SchemaMismatch {
            message: "bad".into(),
        }
        .into();
        assert!(matches!(err, AnalysisError::Load(_)));
        assert_eq!(err.to_string(), "schema mismatch: bad");
    }
}
