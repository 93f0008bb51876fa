//! Error types for the feature pipeline.

use polars::error::PolarsError;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing required column, unreadable header or undecodable bytes.
    #[error("malformed source {path}: {detail}")]
    SourceFormat { path: String, detail: String },

    /// A field or row that could not be parsed.
    #[error("{path}:{line}: {detail}")]
    Encoding {
        path: String,
        line: u64,
        detail: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("stage '{stage}' removed every record")]
    EmptyResult { stage: String },

    /// Aggregation, encoding or frame construction failed.
    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}

impl PipelineError {
    pub fn source_format(path: &str, detail: impl Into<String>) -> Self {
        PipelineError::SourceFormat {
            path: path.to_string(),
            detail: detail.into(),
        }
    }

    pub fn empty(stage: &str) -> Self {
        PipelineError::EmptyResult {
            stage: stage.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_error_carries_file_and_line() {
        let err = PipelineError::Encoding {
            path: "raw_data_2017.csv".to_string(),
            line: 42,
            detail: "bad timestamp".to_string(),
        };
        assert_eq!(err.to_string(), "raw_data_2017.csv:42: bad timestamp");
    }

    #[test]
    fn test_empty_result_names_stage() {
        let err = PipelineError::empty("postload_clean");
        assert!(matches!(
            err,
            PipelineError::EmptyResult { ref stage } if stage == "postload_clean"
        ));
    }

    #[test]
    fn test_polars_error_converts() {
        let err: PipelineError = PolarsError::ColumnNotFound("DwellTime".into()).into();
        assert!(matches!(err, PipelineError::Frame(_)));
        assert!(err.to_string().starts_with("frame error:"));
    }
}
