//! Run configuration.
//!
//! Defaults reproduce the fixed file layout of the historical runs: three
//! yearly raw files in the working directory, Mac Roman text, outputs next
//! to them.

use encoding_rs::Encoding;
use serde::Serialize;

use crate::clean::RegionFilter;
use crate::error::{PipelineError, Result};

pub const DEFAULT_INPUTS: [&str; 3] = [
    "raw_data_2017.csv",
    "raw_data_2018.csv",
    "raw_data_2019.csv",
];

/// WHATWG label for Mac Roman.
pub const DEFAULT_ENCODING: &str = "macintosh";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub inputs: Vec<String>,
    pub output_dir: String,
    /// Text encoding label of the input files.
    pub encoding: String,
    pub region_filter: RegionFilter,
    /// Abort instead of warning when a stage leaves no records.
    pub fail_on_empty: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            inputs: DEFAULT_INPUTS.iter().map(|p| p.to_string()).collect(),
            output_dir: ".".to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            region_filter: RegionFilter::default(),
            fail_on_empty: false,
        }
    }
}

impl PipelineConfig {
    pub fn input_encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.as_bytes())
            .ok_or_else(|| PipelineError::Config(format!("unknown encoding '{}'", self.encoding)))
    }
}
