//! Shared utilities for the missingness analyzer.
//!
//! This module contains the small polars helpers used across the analysis
//! modules: dtype classification and column extraction.

use crate::error::{MissingnessError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for analysis purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Extraction
// =============================================================================

/// Fail with [`MissingnessError::ColumnNotFound`] for the first name not in `df`.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        if df.column(name).is_err() {
            return Err(MissingnessError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}

/// Read a boolean column as plain flags (nulls read as `false`).
pub fn bool_values(df: &DataFrame, name: &str) -> Result<Vec<bool>> {
    let column = df
        .column(name)
        .map_err(|_| MissingnessError::ColumnNotFound(name.to_string()))?;
    let flags = column
        .as_materialized_series()
        .bool()?
        .into_iter()
        .map(|v| v.unwrap_or(false))
        .collect();
    Ok(flags)
}

/// Read every column of a boolean frame, in column order.
pub fn bool_columns(df: &DataFrame) -> Result<Vec<(String, Vec<bool>)>> {
    df.get_column_names()
        .into_iter()
        .map(|name| Ok((name.to_string(), bool_values(df, name.as_str())?)))
        .collect()
}

/// Read a numeric series as `f64`, keeping nulls.
pub fn f64_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Column names of `df` as owned strings.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
