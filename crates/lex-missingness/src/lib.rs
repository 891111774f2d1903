//! Missing-data analysis over Polars DataFrames.
//!
//! # Overview
//!
//! A [`MissingnessAnalyzer`] wraps a dataset and derives a boolean mask of
//! the same shape, where a cell is missing when it is null or equals one of
//! the user-supplied missing codes (`"N/A"`, `-1`, ...). Every analysis then
//! runs on a subset of that mask:
//!
//! - **Counts**: missing cells per column, optionally normalized
//! - **Correlation**: Pearson correlation of missingness between columns
//! - **Patterns**: frequency of each distinct row-wise missingness pattern
//! - **Cohorts**: t-tests comparing numeric columns between rows where an
//!   anchor group is missing and rows where it is not
//! - **Itemsets**: frequent co-missing column sets and association rules
//! - **Plots**: a pattern grid that renders to text or serializes for a UI
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_missingness::{MissingnessAnalyzer, MissingCode, CountsOptions, ItemsetOptions};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("survey.csv".into()))?
//!     .finish()?;
//!
//! let analyzer = MissingnessAnalyzer::new(df, vec![MissingCode::from("N/A")])?;
//!
//! let counts = analyzer.counts(&CountsOptions::default().normalize(true))?;
//! let mined = analyzer.frequency_item_set(&ItemsetOptions::default().support(0.2).rules(true))?;
//! ```
//!
//! # Subsets
//!
//! Analyses accept a [`SubsetQuery`]: `anchors` keeps only rows where the
//! anchor columns are missing (all of them, or any of them, per
//! [`Combinator`]), and `columns` projects the result. Unknown column names
//! fail with [`MissingnessError::ColumnNotFound`].

pub mod analyzer;
pub mod cohort;
pub mod config;
pub mod error;
pub mod itemsets;
pub mod mask;
pub mod patterns;
pub mod plot;
pub mod report;
pub mod stats;
pub mod subset;
pub mod summary;
pub mod types;
pub mod utils;

pub use analyzer::MissingnessAnalyzer;
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, CohortOptions, ConfigValidationError, CountsOptions,
    ItemsetOptions, PatternOptions,
};
pub use error::{MissingnessError, Result, ResultExt};
pub use mask::{MaskBuilder, MissingCode};
pub use plot::{Cell, PatternGrid, Plot, PlotKind, PlotOptions};
pub use report::{MissingnessReport, ReportGenerator};
pub use subset::{Combinator, SubsetQuery, SubsetSelector};
pub use types::{
    AssociationRule, CohortRow, CohortTable, ColumnCount, ColumnCounts, CorrelationMatrix,
    Itemset, ItemsetMining, PatternRow, PatternTable,
};
