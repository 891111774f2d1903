//! Numeric routines: means, Pearson correlation and two-sample t-tests.
//!
//! Correlation and t-tests come from `anofox_statistics`. Inputs it rejects
//! (too few values, zero variance) yield `NaN` rather than an error so
//! callers can report which columns were untestable.

use anofox_statistics::correlation::pearson as pearson_test;
use anofox_statistics::parametric::ttest::{Alternative, t_test as t_test_impl};

pub use anofox_statistics::parametric::ttest::TTestKind;

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation coefficient, `NaN` where it is undefined.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    match pearson_test(x, y, None) {
        Ok(result) if result.estimate.is_finite() => result.estimate.clamp(-1.0, 1.0),
        _ => f64::NAN,
    }
}

/// Outcome of a two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub statistic: f64,
    pub p_value: f64,
    pub df: f64,
}

impl TTest {
    fn undefined() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            df: f64::NAN,
        }
    }
}

/// Two-sided independent two-sample t-test of `a` against `b`.
pub fn t_test(a: &[f64], b: &[f64], kind: TTestKind) -> TTest {
    if a.is_empty() || b.is_empty() {
        return TTest::undefined();
    }

    match t_test_impl(a, b, kind, Alternative::TwoSided, 0.0, None) {
        Ok(result) => TTest {
            statistic: result.statistic,
            p_value: result.p_value,
            df: result.df,
        },
        Err(_) => TTest::undefined(),
    }
}
