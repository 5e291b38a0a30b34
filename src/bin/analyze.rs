//! Command-line front end: load one file, run one operation, print one JSON document.

use std::process;

use clap::Parser;
use tabular_analyze::analysis::{analyze_path, AnalysisOptions, OperationRequest};
use tabular_analyze::ingestion::{IngestionOptions, TracingObserver};
use tabular_analyze::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about = "Deterministic data analyzer", long_about = None)]
struct Args {
    /// Path to data file (CSV, Excel, JSON)
    filepath: String,

    /// Operation to perform
    operation: String,

    /// Column for single-column operations
    #[arg(long)]
    column: Option<String>,

    /// First column for correlation
    #[arg(long)]
    column1: Option<String>,

    /// Second column for correlation
    #[arg(long)]
    column2: Option<String>,

    /// Comma-separated columns for multi-column ops
    #[arg(long)]
    columns: Option<String>,

    /// Number of results for top/bottom
    #[arg(long, default_value_t = 10)]
    n: usize,

    /// Column to group by
    #[arg(long = "group_by")]
    group_by: Option<String>,

    /// Column to aggregate
    #[arg(long)]
    aggregate: Option<String>,

    /// Filter condition, e.g. "revenue > 25 and region == 'north'"
    #[arg(long)]
    condition: Option<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Log debug events to stderr (RUST_LOG overrides)
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn request(&self) -> OperationRequest {
        OperationRequest {
            operation: self.operation.clone(),
            column: self.column.clone(),
            column1: self.column1.clone(),
            column2: self.column2.clone(),
            columns: self.columns.clone(),
            n: Some(self.n),
            group_by: self.group_by.clone(),
            aggregate: self.aggregate.clone(),
            condition: self.condition.clone(),
        }
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let ingestion = IngestionOptions {
        observer: Some(std::sync::Arc::new(TracingObserver)),
        ..IngestionOptions::default()
    };
    let result = analyze_path(
        &args.filepath,
        &args.request(),
        &ingestion,
        &AnalysisOptions::default(),
    );

    match result.to_json_string(!args.compact) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to encode result: {err}");
            process::exit(1);
        }
    }
    process::exit(result.exit_code());
}
