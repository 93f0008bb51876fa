//! Reads raw load files and combines them into one record set.
//!
//! Each file is decoded from its legacy text encoding, checked for the
//! required columns, deserialized, and pre-load cleaned on its own before
//! the cleaned parts are concatenated in input order.

use encoding_rs::Encoding;
use serde::Serialize;
use std::fs;
use tracing::{debug, info};

use crate::clean::clean_preload;
use crate::error::{PipelineError, Result};
use crate::record::{LoadRecord, REQUIRED_COLUMNS};

/// Row counts for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub path: String,
    pub rows_read: usize,
    pub rows_kept: usize,
}

fn row_error(path: &str, err: csv::Error) -> PipelineError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let detail = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    };
    PipelineError::Encoding {
        path: path.to_string(),
        line,
        detail,
    }
}

/// Decodes `bytes` and deserializes every row. The first bad row aborts.
pub fn parse_records(
    path: &str,
    bytes: &[u8],
    encoding: &'static Encoding,
) -> Result<Vec<LoadRecord>> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(PipelineError::source_format(
            path,
            format!("bytes not valid in {}", used.name()),
        ));
    }

    let mut rdr = csv::ReaderBuilder::new().from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::source_format(path, format!("unreadable header: {e}")))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::source_format(
            path,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: LoadRecord = result.map_err(|e| row_error(path, e))?;
        records.push(record);
    }

    Ok(records)
}

/// Reads one file from disk.
#[tracing::instrument(skip(encoding), fields(encoding = encoding.name()))]
pub fn read_records(path: &str, encoding: &'static Encoding) -> Result<Vec<LoadRecord>> {
    let bytes = fs::read(path)
        .map_err(|e| PipelineError::source_format(path, format!("cannot read file: {e}")))?;
    debug!(bytes = bytes.len(), "Source bytes read");
    parse_records(path, &bytes, encoding)
}

/// Reads, pre-cleans and concatenates every source in order.
#[tracing::instrument(skip(encoding), fields(sources = paths.len()))]
pub fn load_sources(
    paths: &[String],
    encoding: &'static Encoding,
) -> Result<(Vec<LoadRecord>, Vec<SourceSummary>)> {
    let mut combined = Vec::new();
    let mut summaries = Vec::with_capacity(paths.len());

    for path in paths {
        let raw = read_records(path, encoding)?;
        let rows_read = raw.len();
        let cleaned = clean_preload(raw);

        info!(path = %path, rows_read, rows_kept = cleaned.len(), "Source loaded");
        summaries.push(SourceSummary {
            path: path.clone(),
            rows_read,
            rows_kept: cleaned.len(),
        });
        combined.extend(cleaned);
    }

    info!(rows = combined.len(), "Sources combined");
    Ok((combined, summaries))
}
