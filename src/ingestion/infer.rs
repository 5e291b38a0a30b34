//! Column type inference for schema-less ingestion.
//!
//! Each loader classifies every present cell into a [`CellKind`] and feeds it to one
//! [`TypeInference`] per column. Once all rows are seen, [`TypeInference::resolve`] picks the
//! narrowest [`DataType`] that holds every observed value:
//!
//! | observed kinds            | resolved type |
//! |---------------------------|---------------|
//! | none (all missing)        | `Null`        |
//! | `Int` only                | `Int64`       |
//! | `Int` and/or `Float`      | `Float64`     |
//! | `Bool` only               | `Bool`        |
//! | `DateTime` only           | `DateTime`    |
//! | anything else             | `Utf8`        |

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::DataType;

/// What a single present cell looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Integer that fits in `i64`.
    Int,
    /// Any other finite or non-finite number.
    Float,
    /// `true` / `false` (any case).
    Bool,
    /// ISO-like date or date-time.
    DateTime,
    /// Anything else.
    Text,
}

/// Accumulates the kinds observed in one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeInference {
    int: bool,
    float: bool,
    boolean: bool,
    datetime: bool,
    text: bool,
}

impl TypeInference {
    /// Record one present cell.
    pub fn observe(&mut self, kind: CellKind) {
        match kind {
            CellKind::Int => self.int = true,
            CellKind::Float => self.float = true,
            CellKind::Bool => self.boolean = true,
            CellKind::DateTime => self.datetime = true,
            CellKind::Text => self.text = true,
        }
    }

    /// Narrowest type holding every observed cell.
    pub fn resolve(&self) -> DataType {
        let numeric = self.int || self.float;
        let others = [self.boolean, self.datetime, self.text]
            .iter()
            .filter(|seen| **seen)
            .count();

        match (numeric, others) {
            (false, 0) => DataType::Null,
            (true, 0) if self.float => DataType::Float64,
            (true, 0) => DataType::Int64,
            (false, 1) if self.boolean => DataType::Bool,
            (false, 1) if self.datetime => DataType::DateTime,
            _ => DataType::Utf8,
        }
    }
}

/// Text cells read as missing, matching the usual spreadsheet and dataframe conventions.
const MISSING_TOKENS: [&str; 19] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "",
];

/// `true` when a trimmed text cell stands for a missing value.
pub fn is_missing_token(trimmed: &str) -> bool {
    MISSING_TOKENS.contains(&trimmed)
}

/// Classify a raw text cell. Returns `None` for empty cells and missing-value markers.
pub fn classify_str(raw: &str) -> Option<CellKind> {
    let s = raw.trim();
    if is_missing_token(s) {
        return None;
    }
    if s.parse::<i64>().is_ok() {
        Some(CellKind::Int)
    } else if s.parse::<f64>().is_ok() {
        Some(CellKind::Float)
    } else if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        Some(CellKind::Bool)
    } else if parse_datetime(s).is_some() {
        Some(CellKind::DateTime)
    } else {
        Some(CellKind::Text)
    }
}

/// Classify a JSON value. Returns `None` for `null`.
///
/// Unlike [`classify_str`], strings holding numbers stay text: JSON already says what they are.
pub fn classify_json(v: &serde_json::Value) -> Option<CellKind> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(_) => Some(CellKind::Bool),
        serde_json::Value::Number(n) => {
            if n.is_i64() {
                Some(CellKind::Int)
            } else {
                Some(CellKind::Float)
            }
        }
        serde_json::Value::String(s) => {
            if parse_datetime(s).is_some() {
                Some(CellKind::DateTime)
            } else {
                Some(CellKind::Text)
            }
        }
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Some(CellKind::Text),
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-like date (`2024-01-31`) or date-time (`2024-01-31 12:00:00`,
/// `2024-01-31T12:00:00.250`). A bare date resolves to midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    // Cheap rejection before trying every format.
    if s.len() < 10 || !s.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
