//! CLI entry point for the dwell-time feature pipeline.
//!
//! Loads the raw load files, runs cleaning, dwell-time, calendar and
//! aggregation stages, and writes the one-hot matrix, the target vector and
//! the numeric matrix.

use anyhow::Result;
use clap::Parser;
use dwell_features::clean::RegionFilter;
use dwell_features::config::{DEFAULT_ENCODING, DEFAULT_INPUTS, PipelineConfig};
use dwell_features::output::{export, print_json};
use dwell_features::pipeline;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "dwell_features")]
#[command(
    about = "Build dwell-time feature matrices from raw truck-load records",
    long_about = None
)]
struct Cli {
    /// Raw load files, read in order
    #[arg(value_name = "FILE", default_values = DEFAULT_INPUTS)]
    inputs: Vec<String>,

    /// Directory to write indpt_vars.csv, dwelltime.csv and indpt_vars_num.csv to
    #[arg(short, long, default_value = ".")]
    output_dir: String,

    /// Text encoding of the input files (WHATWG label)
    #[arg(short, long, default_value = DEFAULT_ENCODING)]
    encoding: String,

    /// Keep HI and AK region records, as the historical exports did
    #[arg(long, default_value_t = false)]
    legacy_region_filter: bool,

    /// Abort when a stage leaves no records instead of warning
    #[arg(long, default_value_t = false)]
    fail_on_empty: bool,

    /// Log the run report as JSON
    #[arg(long, default_value_t = false)]
    summary: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            inputs: self.inputs,
            output_dir: self.output_dir,
            encoding: self.encoding,
            region_filter: if self.legacy_region_filter {
                RegionFilter::LegacyTautology
            } else {
                RegionFilter::ExcludeRemote
            },
            fail_on_empty: self.fail_on_empty,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/dwell_features.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("dwell_features.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let summary = cli.summary;
    let config = cli.into_config();
    info!(
        inputs = ?config.inputs,
        encoding = %config.encoding,
        region_filter = ?config.region_filter,
        "Starting feature pipeline"
    );

    let output = pipeline::run(&config)?;
    let written = export(Path::new(&config.output_dir), &output)?;

    if summary {
        print_json(&output.report)?;
    }

    for path in &written {
        info!(path = %path.display(), "Export written");
    }
    if !output.report.empty_stages.is_empty() {
        info!(
            empty_stages = ?output.report.empty_stages,
            "Run finished with empty stages"
        );
    }

    Ok(())
}
