//! Missingness report generation.
//!
//! [`MissingnessReport`] bundles the dataset overview, per-column counts and
//! the pattern table into one serializable document, used for `--json`
//! output and for report files.

use crate::analyzer::MissingnessAnalyzer;
use crate::config::{CountsOptions, PatternOptions};
use crate::error::Result;
use crate::types::{ColumnCounts, PatternTable};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Summary report of a dataset's missingness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingnessReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file, if the data came from one
    pub input_file: Option<String>,
    pub rows: usize,
    pub columns: usize,
    /// Missing codes applied on top of native nulls
    pub missing_codes: Vec<String>,
    pub total_missing_cells: usize,
    /// Missing cells as a percentage of all cells (0-100)
    pub missing_percentage: f64,
    /// Rows without any missing value
    pub complete_rows: usize,
    pub counts: ColumnCounts,
    pub patterns: PatternTable,
}

/// Builds and writes [`MissingnessReport`]s.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Build a report using `patterns` for the pattern section.
    pub fn build(
        analyzer: &MissingnessAnalyzer,
        input_file: Option<&str>,
        patterns: &PatternOptions,
    ) -> Result<MissingnessReport> {
        let (rows, columns) = analyzer.data().shape();
        let total_missing_cells = analyzer.total_missing()?;
        let cells = rows * columns;
        let missing_percentage = if cells == 0 {
            0.0
        } else {
            total_missing_cells as f64 / cells as f64 * 100.0
        };

        Ok(MissingnessReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.map(str::to_string),
            rows,
            columns,
            missing_codes: analyzer
                .missing_codes()
                .iter()
                .map(|code| code.to_string())
                .collect(),
            total_missing_cells,
            missing_percentage,
            complete_rows: analyzer.complete_rows()?,
            counts: analyzer.counts(&CountsOptions::default())?,
            patterns: analyzer.pattern(patterns)?,
        })
    }

    /// Write the report as pretty JSON to `<output_dir>/<base_name>_missingness.json`.
    pub fn write_report_to_file(&self, report: &MissingnessReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_missingness.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
