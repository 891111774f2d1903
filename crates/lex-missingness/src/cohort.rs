//! Group comparisons driven by missingness.
//!
//! Rows are split into two cohorts by whether a set of group columns is
//! missing. Every numeric column is then compared across the cohorts with
//! Student and Welch t-tests.

use crate::config::CohortOptions;
use crate::error::Result;
use crate::stats::{TTestKind, mean, t_test};
use crate::subset::SubsetSelector;
use crate::types::{CohortRow, CohortTable};
use crate::utils::{column_names, f64_values, is_numeric_dtype, require_columns};
use polars::prelude::*;
use tracing::debug;

/// Compare numeric columns between the "missing" and "non-missing" cohorts.
///
/// `raw` is the original data and `mask` its missingness table. The mask
/// only decides cohort membership; statistics run on the raw values, so a
/// sentinel-coded cell counts as an ordinary value. Nulls and NaN are
/// omitted. Non-numeric columns are skipped.
pub fn cohort(raw: &DataFrame, mask: &DataFrame, options: &CohortOptions) -> Result<CohortTable> {
    let in_group = SubsetSelector::row_filter(mask, &options.group, options.how)?;

    let columns = match &options.columns {
        Some(columns) => {
            require_columns(raw, columns)?;
            columns.clone()
        }
        None => column_names(raw),
    };

    let mut rows = Vec::with_capacity(columns.len());
    for name in &columns {
        let series = raw.column(name)?.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            debug!(column = %name, dtype = %series.dtype(), "Skipping non-numeric column");
            continue;
        }

        let values = f64_values(series)?;

        let mut group_missing = Vec::new();
        let mut group_present = Vec::new();
        for (value, grouped) in values.iter().zip(&in_group) {
            let Some(value) = value else { continue };
            if value.is_nan() {
                continue;
            }
            if *grouped {
                group_missing.push(*value);
            } else {
                group_present.push(*value);
            }
        }

        let student = t_test(&group_missing, &group_present, TTestKind::Student);
        let welch = t_test(&group_missing, &group_present, TTestKind::Welch);

        rows.push(CohortRow {
            column: name.clone(),
            non_null_missing: group_missing.len(),
            non_null_present: group_present.len(),
            mean_missing: mean(&group_missing),
            mean_present: mean(&group_present),
            t_equal_var: student.statistic,
            p_equal_var: student.p_value,
            t_unequal_var: welch.statistic,
            p_unequal_var: welch.p_value,
        });
    }

    let missing_rows = in_group.iter().filter(|g| **g).count();
    debug!(
        group = ?options.group,
        how = %options.how,
        missing_rows,
        compared = rows.len(),
        "Compared cohorts"
    );

    Ok(CohortTable {
        group: options.group.clone(),
        how: options.how,
        missing_rows,
        present_rows: in_group.len() - missing_rows,
        rows,
    })
}
