//! Observer hooks for ingestion outcomes.
//!
//! [`super::ingest_from_path`] reports every load to an optional [`IngestionObserver`].
//! [`TracingObserver`] forwards events to `tracing`, [`FileObserver`] appends them to a local
//! file as JSON lines, and [`CompositeObserver`] fans out to several observers.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::IngestionError;

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (missing input or other infrastructure failures).
    Critical,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The input path used for ingestion.
    pub path: PathBuf,
    /// Format used for ingestion, when one could be determined.
    pub format: Option<IngestionFormat>,
}

impl IngestionContext {
    fn format_name(&self) -> &'static str {
        self.format.map_or("unknown", IngestionFormat::as_str)
    }
}

/// Shape of a successfully loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of ingested rows.
    pub rows: usize,
    /// Number of ingested columns.
    pub columns: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Every method has a no-op default, so implementors only override what they record.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called after [`Self::on_failure`] when the severity meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards each callback to every wrapped observer, in insertion order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }

    /// Append one more observer.
    pub fn with(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers
            .iter()
            .for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers
            .iter()
            .for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Emits ingestion events as `tracing` events under the `ingest` target.
///
/// Successes log at `debug`, failures at `warn` (or `error` for `Critical`), alerts at `error`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::debug!(
            target: "ingest",
            format = ctx.format_name(),
            path = %ctx.path.display(),
            rows = stats.rows,
            columns = stats.columns,
            "ingestion succeeded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        if severity >= IngestionSeverity::Critical {
            tracing::error!(
                target: "ingest",
                ?severity,
                format = ctx.format_name(),
                path = %ctx.path.display(),
                %error,
                "ingestion failed"
            );
        } else {
            tracing::warn!(
                target: "ingest",
                ?severity,
                format = ctx.format_name(),
                path = %ctx.path.display(),
                %error,
                "ingestion failed"
            );
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            target: "ingest",
            alert = true,
            ?severity,
            format = ctx.format_name(),
            path = %ctx.path.display(),
            %error,
            "ingestion alert"
        );
    }
}

/// One line written by [`FileObserver`].
#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    ts: u64,
    event: &'static str,
    format: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<IngestionSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> LogRecord<'a> {
    fn new(event: &'static str, ctx: &IngestionContext) -> Self {
        Self {
            ts: unix_ts(),
            event,
            format: ctx.format_name(),
            path: ctx.path.display().to_string(),
            rows: None,
            columns: None,
            severity: None,
            error: None,
        }
    }

    fn failed(event: &'static str, ctx: &IngestionContext, severity: IngestionSeverity, error: &'a str) -> Self {
        Self {
            severity: Some(severity),
            error: Some(error),
            ..Self::new(event, ctx)
        }
    }
}

/// Appends one JSON object per event to a local file.
///
/// Writes are best-effort; failures to open or write the file are ignored.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, record: &LogRecord<'_>) {
        let Ok(line) = serde_json::to_string(record) else {
            return;
        };
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append(&LogRecord {
            rows: Some(stats.rows),
            columns: Some(stats.columns),
            ..LogRecord::new("ok", ctx)
        });
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        let message = error.to_string();
        self.append(&LogRecord::failed("failure", ctx, severity, &message));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        let message = error.to_string();
        self.append(&LogRecord::failed("alert", ctx, severity, &message));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
