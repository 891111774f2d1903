use crate::subset::Combinator;
use serde::{Deserialize, Serialize};

// ============================================================================
// Summary Statistics
// ============================================================================

/// Missing count (or normalized ratio) for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCount {
    pub column: String,
    pub value: f64,
}

/// Per-column missing counts, ordered by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCounts {
    pub entries: Vec<ColumnCount>,
    /// Whether values are ratios rather than raw counts.
    pub normalized: bool,
}

impl ColumnCounts {
    /// Value for a column, if it was retained.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| entry.value)
    }

    /// Column names in result order.
    pub fn columns(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.column.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Square, symmetric correlation matrix of missingness indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient between two retained columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// One distinct combination of missing (`true`) and present (`false`) cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRow {
    pub pattern: Vec<bool>,
    /// Raw count, or fraction when the table is normalized.
    pub frequency: f64,
}

impl PatternRow {
    /// Number of missing cells in the pattern.
    pub fn missing_cells(&self) -> usize {
        self.pattern.iter().filter(|m| **m).count()
    }
}

/// Frequencies of missingness patterns over a set of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternTable {
    pub columns: Vec<String>,
    pub rows: Vec<PatternRow>,
    pub normalized: bool,
}

impl PatternTable {
    pub fn total_frequency(&self) -> f64 {
        self.rows.iter().map(|r| r.frequency).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Cohorts
// ============================================================================

/// Group comparison for one numeric column.
///
/// Undefined statistics (empty groups, zero variance) are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    pub column: String,
    /// Non-null values in the group where the group columns are missing.
    pub non_null_missing: usize,
    /// Non-null values in the complementary group.
    pub non_null_present: usize,
    pub mean_missing: f64,
    pub mean_present: f64,
    pub t_equal_var: f64,
    pub p_equal_var: f64,
    pub t_unequal_var: f64,
    pub p_unequal_var: f64,
}

/// Result of a cohort comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortTable {
    pub group: Vec<String>,
    pub how: Combinator,
    /// Rows falling in the "missing" cohort.
    pub missing_rows: usize,
    /// Rows falling in the "non-missing" cohort.
    pub present_rows: usize,
    pub rows: Vec<CohortRow>,
}

impl CohortTable {
    pub fn get(&self, column: &str) -> Option<&CohortRow> {
        self.rows.iter().find(|row| row.column == column)
    }
}

// ============================================================================
// Itemsets and Rules
// ============================================================================

/// A set of columns that go missing together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itemset {
    pub items: Vec<String>,
    /// Number of rows where every item is missing.
    pub support: usize,
}

/// `antecedent => consequent` over missing columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub support: usize,
    pub confidence: f64,
}

/// Frequent itemsets and (optionally) association rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsetMining {
    pub itemsets: Vec<Itemset>,
    pub rules: Vec<AssociationRule>,
    /// Absolute support threshold the mining ran with.
    pub min_support: usize,
    /// Number of rows turned into transactions.
    pub transactions: usize,
}

impl ItemsetMining {
    /// Support of an exact itemset, order-insensitive.
    pub fn support_of(&self, items: &[&str]) -> Option<usize> {
        self.itemsets
            .iter()
            .find(|set| {
                set.items.len() == items.len()
                    && items.iter().all(|item| set.items.iter().any(|i| i == item))
            })
            .map(|set| set.support)
    }
}
