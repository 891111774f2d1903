//! Frequencies of missingness patterns.
//!
//! A pattern is the tuple of missing/present flags of one row across the
//! retained columns. Rows sharing a tuple are counted together.

use crate::config::PatternOptions;
use crate::error::{MissingnessError, Result};
use crate::subset::SubsetSelector;
use crate::types::{PatternRow, PatternTable};
use crate::utils::bool_columns;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Count the distinct missingness patterns of the selected subset.
///
/// Patterns are ordered by count (descending unless `ascending`); equal
/// counts keep pattern order, present sorting before missing.
///
/// Threshold handling depends on both `normalize` and whether the
/// threshold is a fraction (`< 1`) or a row count (`>= 1`):
///
/// | normalize | threshold | result |
/// |---|---|---|
/// | yes | `< 1` | fractions of all rows, keep fraction `> t` |
/// | yes | `>= 1` | keep count `> t`, then fractions of the kept rows |
/// | no | `< 1` | keep fraction of all rows `> t`, report counts |
/// | no | `>= 1` | keep count `> t`, report counts |
pub fn pattern(mask: &DataFrame, options: &PatternOptions) -> Result<PatternTable> {
    let threshold = options.threshold;
    if threshold.is_nan() || threshold < 0.0 {
        return Err(MissingnessError::invalid_parameter(
            "threshold",
            threshold,
            "must be a non-negative number",
        ));
    }

    let subset = SubsetSelector::select(mask, &options.subset)?;
    let columns = bool_columns(&subset)?;
    let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();

    let mut groups: Vec<(Vec<bool>, f64)> = group_rows(&columns, subset.height())
        .into_iter()
        .map(|(pattern, count)| (pattern, count as f64))
        .collect();

    if options.ascending {
        groups.sort_by(|a, b| a.1.total_cmp(&b.1));
    } else {
        groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    }

    let total: f64 = groups.iter().map(|(_, count)| count).sum();
    let distinct = groups.len();

    let kept: Vec<(Vec<bool>, f64)> = match (options.normalize, threshold < 1.0) {
        (true, true) => {
            let fractions = groups.into_iter().map(|(p, c)| (p, c / total));
            fractions.filter(|(_, f)| *f > threshold).collect()
        }
        (true, false) => {
            let survivors: Vec<_> = groups.into_iter().filter(|(_, c)| *c > threshold).collect();
            let kept_total: f64 = survivors.iter().map(|(_, c)| c).sum();
            survivors
                .into_iter()
                .map(|(p, c)| (p, c / kept_total))
                .collect()
        }
        (false, true) => groups
            .into_iter()
            .filter(|(_, c)| c / total > threshold)
            .collect(),
        (false, false) => groups.into_iter().filter(|(_, c)| *c > threshold).collect(),
    };

    let rows: Vec<PatternRow> = kept
        .into_iter()
        .map(|(pattern, frequency)| PatternRow { pattern, frequency })
        .collect();

    debug!(
        rows = subset.height(),
        distinct,
        kept = rows.len(),
        threshold,
        normalize = options.normalize,
        "Mined missingness patterns"
    );

    Ok(PatternTable {
        columns: names,
        rows,
        normalized: options.normalize,
    })
}

/// Count rows per distinct flag tuple, in pattern order.
fn group_rows(columns: &[(String, Vec<bool>)], height: usize) -> BTreeMap<Vec<bool>, usize> {
    let mut groups = BTreeMap::new();
    for row in 0..height {
        let key: Vec<bool> = columns.iter().map(|(_, flags)| flags[row]).collect();
        *groups.entry(key).or_insert(0) += 1;
    }
    groups
}
