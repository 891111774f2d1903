//! Per-column missing counts and missingness correlation.

use crate::config::CountsOptions;
use crate::error::Result;
use crate::stats::pearson;
use crate::subset::{SubsetQuery, SubsetSelector};
use crate::types::{ColumnCount, ColumnCounts, CorrelationMatrix};
use crate::utils::bool_columns;
use polars::prelude::*;
use tracing::debug;

/// Count missing cells per column of the selected subset.
///
/// With `normalize`, each count is divided by the number of subset rows in
/// which that column is present. Entries are sorted by value; equal values
/// keep column order.
pub fn counts(mask: &DataFrame, options: &CountsOptions) -> Result<ColumnCounts> {
    let subset = SubsetSelector::select(mask, &options.subset)?;
    let height = subset.height();

    let mut entries: Vec<ColumnCount> = bool_columns(&subset)?
        .into_iter()
        .map(|(column, flags)| {
            let missing = flags.iter().filter(|m| **m).count();
            let value = if options.normalize {
                missing as f64 / (height - missing) as f64
            } else {
                missing as f64
            };
            ColumnCount { column, value }
        })
        .collect();

    if options.ascending {
        entries.sort_by(|a, b| a.value.total_cmp(&b.value));
    } else {
        entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    debug!(rows = height, columns = entries.len(), "Computed missing counts");
    Ok(ColumnCounts {
        entries,
        normalized: options.normalize,
    })
}

/// Pearson correlation between the missingness indicators of the subset.
///
/// Columns that are constant over the subset (never or always missing)
/// correlate with nothing and are dropped from both axes.
pub fn corr(mask: &DataFrame, query: &SubsetQuery) -> Result<CorrelationMatrix> {
    let subset = SubsetSelector::select(mask, query)?;

    let indicators: Vec<(String, Vec<f64>)> = bool_columns(&subset)?
        .into_iter()
        .map(|(name, flags)| {
            let values = flags.into_iter().map(|m| if m { 1.0 } else { 0.0 }).collect();
            (name, values)
        })
        .collect();

    let size = indicators.len();
    let mut full = vec![vec![f64::NAN; size]; size];
    for i in 0..size {
        for j in i..size {
            let r = pearson(&indicators[i].1, &indicators[j].1);
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            full[i][j] = r;
            full[j][i] = r;
        }
    }

    let kept: Vec<usize> = (0..size)
        .filter(|&i| full[i].iter().any(|r| !r.is_nan()))
        .collect();

    if kept.len() < size {
        debug!(
            dropped = size - kept.len(),
            "Dropped columns with undefined missingness correlation"
        );
    }

    Ok(CorrelationMatrix {
        columns: kept.iter().map(|&i| indicators[i].0.clone()).collect(),
        values: kept
            .iter()
            .map(|&i| kept.iter().map(|&j| full[i][j]).collect())
            .collect(),
    })
}
