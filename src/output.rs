//! Export of the encoded matrices and the run report.
//!
//! Writes three CSV files with a header row and no index column, and can log
//! the [`PipelineReport`] as JSON.

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::pipeline::{PipelineOutput, PipelineReport};

pub const ONE_HOT_FILE: &str = "indpt_vars.csv";
pub const TARGET_FILE: &str = "dwelltime.csv";
pub const NUMERIC_FILE: &str = "indpt_vars_num.csv";

/// Logs the run report as pretty-printed JSON.
pub fn print_json(report: &PipelineReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes a frame to `path` with its header, replacing any existing file.
pub fn write_frame(path: &Path, frame: &DataFrame) -> Result<()> {
    debug!(path = %path.display(), rows = frame.height(), "Writing frame");

    let mut file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut frame = frame.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)
        .with_context(|| format!("cannot write {}", path.display()))?;

    Ok(())
}

/// Writes all three outputs under `dir` and returns their paths.
pub fn export(dir: &Path, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let one_hot = dir.join(ONE_HOT_FILE);
    let target = dir.join(TARGET_FILE);
    let numeric = dir.join(NUMERIC_FILE);

    write_frame(&one_hot, &output.one_hot.features)?;
    write_frame(&target, &output.one_hot.target)?;
    write_frame(&numeric, &output.numeric)?;

    info!(dir = %dir.display(), "Outputs written");
    Ok(vec![one_hot, target, numeric])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::OneHotEncoded;
    use polars::df;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir); // clean up any prior run
        dir
    }

    fn parse_rows(content: &str) -> Vec<Vec<f64>> {
        content
            .lines()
            .skip(1)
            .map(|line| line.split(',').map(|v| v.parse().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&PipelineReport::default()).unwrap();
    }

    #[test]
    fn test_write_frame_header_and_rows() {
        let dir = temp_dir("dwell_features_test_matrix");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("m.csv");

        let frame = df!("Miles" => [12.5, 3.0], "Hot" => [1.0, 0.0]).unwrap();
        write_frame(&path, &frame).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next(), Some("Miles,Hot"));
        assert_eq!(parse_rows(&content), vec![vec![12.5, 1.0], vec![3.0, 0.0]]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_export_writes_three_files() {
        let dir = temp_dir("dwell_features_test_export");
        let output = PipelineOutput {
            one_hot: OneHotEncoded {
                features: df!("Miles" => [10.0, 20.0]).unwrap(),
                target: df!("DwellTime" => [1.5, 2.0]).unwrap(),
            },
            numeric: df!("Miles" => [10.0, 20.0]).unwrap(),
            ..Default::default()
        };

        let paths = export(&dir, &output).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.exists()));

        let target = fs::read_to_string(dir.join(TARGET_FILE)).unwrap();
        assert_eq!(target.lines().next(), Some("DwellTime"));
        assert_eq!(parse_rows(&target), vec![vec![1.5], vec![2.0]]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
