//! Row filtering and column projection over the missingness mask.
//!
//! Every analysis entry point selects its working rows and columns through
//! [`SubsetSelector::select`], so the `where`/`how`/`columns` semantics are
//! identical everywhere.

use crate::error::{MissingnessError, Result};
use crate::utils::{bool_values, require_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// How the missingness of several anchor columns combines into a row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every anchor column must be missing.
    #[default]
    All,
    /// At least one anchor column must be missing.
    Any,
}

impl Combinator {
    /// Combine per-column missing flags for one row.
    pub fn combine<I: IntoIterator<Item = bool>>(self, flags: I) -> bool {
        let mut flags = flags.into_iter();
        match self {
            Combinator::All => flags.all(|f| f),
            Combinator::Any => flags.any(|f| f),
        }
    }

    /// Row-wise combination over whole mask columns.
    ///
    /// Returns one flag per row. `height` is used when `columns` is empty.
    pub fn combine_rows(self, columns: &[Vec<bool>], height: usize) -> Vec<bool> {
        (0..height)
            .map(|row| self.combine(columns.iter().map(|col| col[row])))
            .collect()
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::All => write!(f, "all"),
            Combinator::Any => write!(f, "any"),
        }
    }
}

/// Which rows and columns of the mask an analysis works on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubsetQuery {
    /// Keep only rows where these columns are missing (per `how`).
    /// `None` keeps every row.
    pub anchors: Option<Vec<String>>,

    /// How the anchors combine.
    pub how: Combinator,

    /// Columns to retain, in output order. `None` keeps all mask columns.
    pub columns: Option<Vec<String>>,
}

impl SubsetQuery {
    /// Query over all rows and columns combining anchors with `how`.
    pub fn new(how: Combinator) -> Self {
        Self {
            anchors: None,
            how,
            columns: None,
        }
    }

    /// Restrict to rows where the given columns are missing.
    pub fn anchors<I, S>(mut self, anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.anchors = Some(anchors.into_iter().map(Into::into).collect());
        self
    }

    /// Set the anchor combinator.
    pub fn how(mut self, how: Combinator) -> Self {
        self.how = how;
        self
    }

    /// Retain only the given columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Produces subset views of a missingness mask.
pub struct SubsetSelector;

impl SubsetSelector {
    /// Select the rows and columns of `mask` described by `query`.
    ///
    /// Row order and (absent an explicit projection) column order follow
    /// the mask. Unknown anchor or retained columns fail with
    /// [`MissingnessError::ColumnNotFound`].
    pub fn select(mask: &DataFrame, query: &SubsetQuery) -> Result<DataFrame> {
        let projected = Self::project(mask, query.columns.as_deref())?;

        let anchors = match query.anchors.as_deref() {
            Some(anchors) if !anchors.is_empty() => anchors,
            _ => return Ok(projected),
        };

        let keep = Self::row_filter(mask, anchors, query.how)?;
        if projected.width() == 0 {
            return Ok(projected);
        }
        let keep = BooleanChunked::from_slice(PlSmallStr::from_static("row_filter"), &keep);
        let subset = projected.filter(&keep)?;

        debug!(
            anchors = ?anchors,
            how = %query.how,
            rows = subset.height(),
            of = mask.height(),
            "Selected mask subset"
        );
        Ok(subset)
    }

    /// Per-row flag telling whether the row passes the anchor filter.
    pub fn row_filter(mask: &DataFrame, anchors: &[String], how: Combinator) -> Result<Vec<bool>> {
        require_columns(mask, anchors)?;
        let columns = anchors
            .iter()
            .map(|name| bool_values(mask, name))
            .collect::<Result<Vec<_>>>()?;
        Ok(how.combine_rows(&columns, mask.height()))
    }

    fn project(mask: &DataFrame, columns: Option<&[String]>) -> Result<DataFrame> {
        let Some(columns) = columns else {
            return Ok(mask.clone());
        };

        let selected = columns
            .iter()
            .map(|name| {
                mask.column(name)
                    .cloned()
                    .map_err(|_| MissingnessError::ColumnNotFound(name.clone()))
            })
            .collect::<Result<Vec<Column>>>()?;

        Ok(DataFrame::new(selected)?)
    }
}
