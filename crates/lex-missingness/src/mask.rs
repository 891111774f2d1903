//! Missingness mask construction.
//!
//! Turns a raw [`DataFrame`] into a boolean frame of the same shape where a
//! cell is `true` iff the raw value is null, a float NaN, or equals one of
//! the configured missing codes.

use crate::error::Result;
use crate::utils::{DtypeCategory, get_dtype_category};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A sentinel value that stands for "missing" in the raw data.
///
/// Number codes match numeric columns, text codes match string and
/// categorical columns. A code applies to every column of a matching type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MissingCode {
    Number(f64),
    Text(String),
}

impl MissingCode {
    fn matches_number(&self, value: f64) -> bool {
        matches!(self, MissingCode::Number(code) if *code == value)
    }

    fn matches_text(&self, value: &str) -> bool {
        matches!(self, MissingCode::Text(code) if code == value)
    }
}

impl From<f64> for MissingCode {
    fn from(value: f64) -> Self {
        MissingCode::Number(value)
    }
}

impl From<i64> for MissingCode {
    fn from(value: i64) -> Self {
        MissingCode::Number(value as f64)
    }
}

impl From<&str> for MissingCode {
    fn from(value: &str) -> Self {
        MissingCode::Text(value.to_string())
    }
}

impl From<String> for MissingCode {
    fn from(value: String) -> Self {
        MissingCode::Text(value)
    }
}

/// Parses anything that reads as a finite number into a number code, the
/// rest into a text code.
impl FromStr for MissingCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => MissingCode::Number(value),
            _ => MissingCode::Text(s.to_string()),
        })
    }
}

impl fmt::Display for MissingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingCode::Number(value) => write!(f, "{}", value),
            MissingCode::Text(value) => write!(f, "{:?}", value),
        }
    }
}

/// Builds the boolean missingness table.
pub struct MaskBuilder;

impl MaskBuilder {
    /// Build the missingness mask for `df`.
    ///
    /// The result has the same height, column names and column order as the
    /// input. The input is not modified.
    pub fn build(df: &DataFrame, codes: &[MissingCode]) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let mask = Self::column_mask(series, codes)?;
            columns.push(Series::new(series.name().clone(), mask).into_column());
        }

        let mask = frame_with_height(columns, df.height())?;
        debug!(
            rows = mask.height(),
            columns = mask.width(),
            codes = codes.len(),
            "Built missingness mask"
        );
        Ok(mask)
    }

    /// Missing flags for a single column.
    pub fn column_mask(series: &Series, codes: &[MissingCode]) -> Result<Vec<bool>> {
        let nulls = series.is_null();
        let mut mask: Vec<bool> = nulls.into_iter().map(|v| v.unwrap_or(false)).collect();

        if matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
            let floats = series.cast(&DataType::Float64)?;
            for (flag, value) in mask.iter_mut().zip(floats.f64()?.into_iter()) {
                if value.is_some_and(f64::is_nan) {
                    *flag = true;
                }
            }
        }

        if codes.is_empty() {
            return Ok(mask);
        }

        match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric => {
                let has_number = codes.iter().any(|c| matches!(c, MissingCode::Number(_)));
                if has_number {
                    let floats = series.cast(&DataType::Float64)?;
                    for (flag, value) in mask.iter_mut().zip(floats.f64()?.into_iter()) {
                        if let Some(value) = value
                            && codes.iter().any(|c| c.matches_number(value))
                        {
                            *flag = true;
                        }
                    }
                }
            }
            DtypeCategory::String => {
                let has_text = codes.iter().any(|c| matches!(c, MissingCode::Text(_)));
                if has_text {
                    let strings = series.cast(&DataType::String)?;
                    for (flag, value) in mask.iter_mut().zip(strings.str()?.into_iter()) {
                        if let Some(value) = value
                            && codes.iter().any(|c| c.matches_text(value))
                        {
                            *flag = true;
                        }
                    }
                }
            }
            DtypeCategory::Datetime | DtypeCategory::Boolean | DtypeCategory::Other => {}
        }

        Ok(mask)
    }

    /// Return a copy of `df` where every cell matching a code is null.
    ///
    /// Building a mask from the returned frame with the same codes yields
    /// the same mask as building it from `df`.
    pub fn null_out_codes(df: &DataFrame, codes: &[MissingCode]) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let mask = Self::column_mask(series, codes)?;
            let keep = BooleanChunked::from_iter_values(
                PlSmallStr::from_static("keep"),
                mask.iter().map(|missing| !missing),
            );
            let nulls = Series::full_null(series.name().clone(), series.len(), series.dtype());
            columns.push(series.zip_with(&keep, &nulls)?.into_column());
        }

        frame_with_height(columns, df.height())
    }
}

/// A frame without columns still keeps the input's row count.
fn frame_with_height(columns: Vec<Column>, height: usize) -> Result<DataFrame> {
    if columns.is_empty() {
        return Ok(DataFrame::empty_with_height(height));
    }
    Ok(DataFrame::new(columns)?)
}
