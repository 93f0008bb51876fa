//! The feature pipeline as an explicit composition of stages.
//!
//! The per-record stages take the record set by value and hand back a new
//! one. Aggregation turns it into a polars frame, which both encoders share
//! read-only.

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, warn};

use crate::clean::clean_postload;
use crate::config::PipelineConfig;
use crate::dwell::apply_dwell_time;
use crate::encode::{OneHotEncoded, encode_numeric, encode_one_hot};
use crate::error::{PipelineError, Result};
use crate::features::aggregate::add_aggregates;
use crate::features::calendar::add_calendar_features;
use crate::frame::load_frame;
use crate::loader::{SourceSummary, load_sources};
use crate::record::LoadRecord;

/// Row counts and shapes of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub sources: Vec<SourceSummary>,
    pub rows_loaded: usize,
    pub rows_after_postload: usize,
    pub rows_aggregated: usize,
    pub one_hot_shape: (usize, usize),
    pub numeric_shape: (usize, usize),
    /// Stages that left no records.
    pub empty_stages: Vec<String>,
}

impl PipelineReport {
    fn check_stage(&mut self, stage: &str, rows: usize, fail_on_empty: bool) -> Result<()> {
        if rows > 0 {
            return Ok(());
        }
        warn!(stage, "Stage produced no records");
        if fail_on_empty {
            return Err(PipelineError::empty(stage));
        }
        self.empty_stages.push(stage.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub one_hot: OneHotEncoded,
    pub numeric: DataFrame,
    pub report: PipelineReport,
}

/// Loads the configured sources and runs every stage.
#[tracing::instrument(skip(config), fields(sources = config.inputs.len()))]
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let encoding = config.input_encoding()?;
    let (records, sources) = load_sources(&config.inputs, encoding)?;

    let mut report = PipelineReport::default();
    for source in &sources {
        report.check_stage(
            &format!("preload_clean:{}", source.path),
            source.rows_kept,
            config.fail_on_empty,
        )?;
    }
    report.sources = sources;

    process(records, config, report)
}

/// Runs every stage after loading over an in-memory record set.
pub fn process(
    records: Vec<LoadRecord>,
    config: &PipelineConfig,
    mut report: PipelineReport,
) -> Result<PipelineOutput> {
    let fail = config.fail_on_empty;

    report.rows_loaded = records.len();
    report.check_stage("load", records.len(), fail)?;

    let records = apply_dwell_time(records);
    let records = clean_postload(records, config.region_filter);
    report.rows_after_postload = records.len();
    report.check_stage("postload_clean", records.len(), fail)?;

    let records = add_calendar_features(records);
    let aggregated = add_aggregates(load_frame(&records)?)?;
    report.rows_aggregated = aggregated.height();
    report.check_stage("aggregate", aggregated.height(), fail)?;

    let one_hot = encode_one_hot(&aggregated)?;
    report.one_hot_shape = one_hot.features.shape();
    report.check_stage("encode_one_hot", one_hot.target.height(), fail)?;

    let numeric = encode_numeric(&aggregated)?;
    report.numeric_shape = numeric.shape();
    report.check_stage("encode_numeric", numeric.height(), fail)?;

    info!(
        rows_loaded = report.rows_loaded,
        rows_after_postload = report.rows_after_postload,
        rows_aggregated = report.rows_aggregated,
        one_hot_rows = report.one_hot_shape.0,
        numeric_rows = report.numeric_shape.0,
        "Pipeline finished"
    );

    Ok(PipelineOutput {
        one_hot,
        numeric,
        report,
    })
}
