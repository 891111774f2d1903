//! The missingness analyzer.
//!
//! [`MissingnessAnalyzer`] owns the raw data and the mask derived from it.
//! Both are fixed at construction; every analysis takes `&self` and
//! recomputes its subset from scratch.

use crate::cohort;
use crate::config::{AnalysisConfig, CohortOptions, CountsOptions, ItemsetOptions, PatternOptions};
use crate::error::{Result, ResultExt};
use crate::itemsets;
use crate::mask::{MaskBuilder, MissingCode};
use crate::patterns;
use crate::plot::{self, Plot, PlotKind, PlotOptions};
use crate::subset::{SubsetQuery, SubsetSelector};
use crate::summary;
use crate::types::{ColumnCounts, CohortTable, CorrelationMatrix, ItemsetMining, PatternTable};
use crate::utils::bool_columns;
use polars::prelude::*;
use tracing::info;

/// Analyzer over one dataset and its missingness mask.
///
/// # Example
///
/// ```rust,ignore
/// use lex_missingness::{MissingnessAnalyzer, MissingCode, CountsOptions, PatternOptions};
///
/// let analyzer = MissingnessAnalyzer::new(df, vec![MissingCode::from("N/A")])?;
///
/// let counts = analyzer.counts(&CountsOptions::default())?;
/// let patterns = analyzer.pattern(&PatternOptions::default().anchors(["income"]))?;
/// ```
#[derive(Debug, Clone)]
pub struct MissingnessAnalyzer {
    data: DataFrame,
    mask: DataFrame,
    missing_codes: Vec<MissingCode>,
}

// analyses only read; sharing one analyzer across threads is supported
static_assertions::assert_impl_all!(MissingnessAnalyzer: Send, Sync);

impl MissingnessAnalyzer {
    /// Build the analyzer, deriving the mask from `data` and `missing_codes`.
    pub fn new(data: DataFrame, missing_codes: Vec<MissingCode>) -> Result<Self> {
        let mask = MaskBuilder::build(&data, &missing_codes).context("Building missingness mask")?;

        info!(
            rows = data.height(),
            columns = data.width(),
            codes = missing_codes.len(),
            "Missingness analyzer ready"
        );

        Ok(Self {
            data,
            mask,
            missing_codes,
        })
    }

    /// Build the analyzer with the missing codes of `config`.
    pub fn from_config(data: DataFrame, config: &AnalysisConfig) -> Result<Self> {
        Self::new(data, config.missing_codes.clone())
    }

    /// The original data, untouched.
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// The boolean missingness table.
    pub fn mask(&self) -> &DataFrame {
        &self.mask
    }

    /// Codes treated as missing on top of native nulls.
    pub fn missing_codes(&self) -> &[MissingCode] {
        &self.missing_codes
    }

    /// Subset view of the mask.
    pub fn select(&self, query: &SubsetQuery) -> Result<DataFrame> {
        SubsetSelector::select(&self.mask, query)
    }

    /// Missing cells per column.
    pub fn counts(&self, options: &CountsOptions) -> Result<ColumnCounts> {
        summary::counts(&self.mask, options)
    }

    /// Correlation of missingness between columns.
    pub fn corr(&self, query: &SubsetQuery) -> Result<CorrelationMatrix> {
        summary::corr(&self.mask, query)
    }

    /// Frequencies of missingness patterns.
    pub fn pattern(&self, options: &PatternOptions) -> Result<PatternTable> {
        patterns::pattern(&self.mask, options)
    }

    /// Compare numeric columns between the cohorts defined by `options.group`.
    pub fn cohort(&self, options: &CohortOptions) -> Result<CohortTable> {
        cohort::cohort(&self.data, &self.mask, options)
    }

    /// Frequent itemsets (and optionally rules) of co-missing columns.
    pub fn frequency_item_set(&self, options: &ItemsetOptions) -> Result<ItemsetMining> {
        itemsets::frequency_item_set(&self.mask, options)
    }

    /// Build a plot of the requested kind.
    pub fn plot(&self, kind: PlotKind, options: &PlotOptions) -> Result<Plot> {
        plot::plot(&self.mask, kind, options)
    }

    /// Total number of missing cells.
    pub fn total_missing(&self) -> Result<usize> {
        Ok(bool_columns(&self.mask)?
            .iter()
            .map(|(_, flags)| flags.iter().filter(|m| **m).count())
            .sum())
    }

    /// Number of rows without any missing cell.
    pub fn complete_rows(&self) -> Result<usize> {
        let columns: Vec<Vec<bool>> = bool_columns(&self.mask)?
            .into_iter()
            .map(|(_, flags)| flags)
            .collect();
        Ok((0..self.mask.height())
            .filter(|&row| columns.iter().all(|flags| !flags[row]))
            .count())
    }
}
