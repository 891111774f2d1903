//! Visualization of missingness analyses.
//!
//! Plots are built as render models first and drawn second, so a front end
//! can paint the same [`PatternGrid`] that the terminal renderer prints.
//! Each [`PlotKind`] maps to one builder in [`plot`].

use crate::config::PatternOptions;
use crate::error::Result;
use crate::patterns::pattern;
use crate::types::PatternTable;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available plot kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    /// One band per missingness pattern, one column per retained column.
    #[default]
    Pattern,
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(PlotKind::Pattern),
            other => Err(format!("unknown plot kind '{}'", other)),
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotKind::Pattern => write!(f, "pattern"),
        }
    }
}

/// Options shared by plot kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    /// Subset, normalization and threshold of the underlying pattern table.
    pub pattern: PatternOptions,
    /// Whether to label columns with their names.
    pub labels: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            pattern: PatternOptions::default(),
            labels: true,
        }
    }
}

impl PlotOptions {
    pub fn pattern(mut self, pattern: PatternOptions) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }
}

/// State of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Missing,
    Present,
}

impl Cell {
    fn glyph(self) -> char {
        match self {
            Cell::Missing => '#',
            Cell::Present => '.',
        }
    }
}

/// Render model of a pattern plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternGrid {
    /// Column names, when labels are enabled.
    pub column_labels: Option<Vec<String>>,
    /// Frequency of each pattern, rounded to three decimals.
    pub row_labels: Vec<String>,
    /// `cells[row][column]`.
    pub cells: Vec<Vec<Cell>>,
}

impl PatternGrid {
    pub fn from_table(table: &PatternTable, labels: bool) -> Self {
        Self {
            column_labels: labels.then(|| table.columns.clone()),
            row_labels: table
                .rows
                .iter()
                .map(|row| format_frequency(row.frequency))
                .collect(),
            cells: table
                .rows
                .iter()
                .map(|row| {
                    row.pattern
                        .iter()
                        .map(|&missing| if missing { Cell::Missing } else { Cell::Present })
                        .collect()
                })
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or_else(
            || self.column_labels.as_ref().map_or(0, Vec::len),
            Vec::len,
        )
    }

    /// Draw the grid with separators between every row and column.
    pub fn render_text(&self) -> String {
        let width = self.width();
        let cell_widths: Vec<usize> = (0..width)
            .map(|j| {
                self.column_labels
                    .as_ref()
                    .and_then(|labels| labels.get(j))
                    .map_or(1, |label| label.chars().count().max(1))
            })
            .collect();
        let label_width = self
            .row_labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);

        let rule = {
            let mut line = "-".repeat(label_width + 1);
            for w in &cell_widths {
                line.push('+');
                line.push_str(&"-".repeat(w + 2));
            }
            line.push('+');
            line
        };

        let mut out = String::new();
        if let Some(labels) = &self.column_labels {
            out.push_str(&" ".repeat(label_width + 1));
            for (label, w) in labels.iter().zip(&cell_widths) {
                out.push_str(&format!("| {:<w$} ", label, w = w));
            }
            out.push_str("|\n");
        }
        out.push_str(&rule);
        out.push('\n');

        for (label, row) in self.row_labels.iter().zip(&self.cells) {
            out.push_str(&format!("{:<w$} ", label, w = label_width));
            for (cell, w) in row.iter().zip(&cell_widths) {
                out.push_str(&format!("| {:<w$} ", cell.glyph(), w = w));
            }
            out.push_str("|\n");
            out.push_str(&rule);
            out.push('\n');
        }

        out
    }
}

fn format_frequency(frequency: f64) -> String {
    let rounded = (frequency * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

/// A built plot, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Plot {
    Pattern(PatternGrid),
}

impl Plot {
    pub fn kind(&self) -> PlotKind {
        match self {
            Plot::Pattern(_) => PlotKind::Pattern,
        }
    }

    pub fn render_text(&self) -> String {
        match self {
            Plot::Pattern(grid) => grid.render_text(),
        }
    }
}

/// Build a plot of the given kind from a missingness mask.
pub fn plot(mask: &DataFrame, kind: PlotKind, options: &PlotOptions) -> Result<Plot> {
    match kind {
        PlotKind::Pattern => {
            let table = pattern(mask, &options.pattern)?;
            Ok(Plot::Pattern(PatternGrid::from_table(&table, options.labels)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternRow;
    use pretty_assertions::assert_eq;

    fn sample_table() -> PatternTable {
        PatternTable {
            columns: vec!["age".to_string(), "b".to_string()],
            rows: vec![
                PatternRow {
                    pattern: vec![false, false],
                    frequency: 2.0 / 3.0,
                },
                PatternRow {
                    pattern: vec![true, false],
                    frequency: 1.0 / 3.0,
                },
            ],
            normalized: true,
        }
    }

    #[test]
    fn test_grid_from_table() {
        let grid = PatternGrid::from_table(&sample_table(), true);

        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.row_labels, vec!["0.667", "0.333"]);
        assert_eq!(grid.cells[1], vec![Cell::Missing, Cell::Present]);
        assert_eq!(
            grid.column_labels,
            Some(vec!["age".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_render_text() {
        let grid = PatternGrid::from_table(&sample_table(), true);
        let expected = "\
      | age | b |
------+-----+---+
0.667 | .   | . |
------+-----+---+
0.333 | #   | . |
------+-----+---+
";
        assert_eq!(grid.render_text(), expected);
    }

    #[test]
    fn test_render_without_labels() {
        let grid = PatternGrid::from_table(&sample_table(), false);
        let text = grid.render_text();
        assert!(!text.contains("age"));
        assert!(text.starts_with("------+---+---+"));
    }

    #[test]
    fn test_plot_kind_parse() {
        assert_eq!("Pattern".parse::<PlotKind>().unwrap(), PlotKind::Pattern);
        assert!("heatmap".parse::<PlotKind>().is_err());
    }

    #[test]
    fn test_plot_dispatch() {
        let mask = df![
            "a" => [true, false, false],
            "b" => [false, false, true],
        ]
        .unwrap();
        let options = PlotOptions::default().pattern(PatternOptions::default().threshold(0.0));
        let plot = plot(&mask, PlotKind::Pattern, &options).unwrap();

        assert_eq!(plot.kind(), PlotKind::Pattern);
        let Plot::Pattern(grid) = &plot;
        assert_eq!(grid.height(), 3);
    }
}
