//! Configuration types for the missingness analyzer.
//!
//! [`AnalysisConfig`] holds analyzer-wide settings (missing codes and the
//! defaults the CLI applies). The per-call option structs carry the
//! parameters of one analysis, each with the defaults of its call site.

use crate::mask::MissingCode;
use crate::subset::{Combinator, SubsetQuery};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default pattern threshold.
pub const DEFAULT_PATTERN_THRESHOLD: f64 = 0.10;
/// Default minimum support for itemset mining.
pub const DEFAULT_SUPPORT: f64 = 0.1;
/// Default minimum confidence for association rules.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Configuration for a missingness analysis session.
///
/// Use [`AnalysisConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_missingness::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .missing_code("N/A")
///     .missing_code(-1.0)
///     .support(0.2)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Values treated as missing wherever they occur.
    /// Default: empty
    pub missing_codes: Vec<MissingCode>,

    /// Threshold applied by `pattern`.
    /// Values below 1 are fractions, values of 1 or more are row counts.
    /// Default: 0.10
    pub pattern_threshold: f64,

    /// Whether `pattern` reports fractions instead of counts.
    /// Default: true
    pub pattern_normalize: bool,

    /// Minimum itemset support as a fraction of rows, in (0, 1].
    /// Default: 0.1
    pub support: f64,

    /// Minimum rule confidence, in [0, 1].
    /// Default: 0.8
    pub confidence: f64,

    /// Whether itemset mining also derives association rules.
    /// Default: false
    pub mine_rules: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            missing_codes: Vec::new(),
            pattern_threshold: DEFAULT_PATTERN_THRESHOLD,
            pattern_normalize: true,
            support: DEFAULT_SUPPORT,
            confidence: DEFAULT_CONFIDENCE,
            mine_rules: false,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.support.is_nan() || self.support <= 0.0 || self.support > 1.0 {
            return Err(ConfigValidationError::InvalidRange {
                field: "support".to_string(),
                value: self.support,
                range: "(0, 1]".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigValidationError::InvalidRange {
                field: "confidence".to_string(),
                value: self.confidence,
                range: "[0, 1]".to_string(),
            });
        }

        if self.pattern_threshold.is_nan() || self.pattern_threshold < 0.0 {
            return Err(ConfigValidationError::InvalidRange {
                field: "pattern_threshold".to_string(),
                value: self.pattern_threshold,
                range: "[0, inf)".to_string(),
            });
        }

        Ok(())
    }

    /// Pattern options seeded from this configuration.
    pub fn pattern_options(&self) -> PatternOptions {
        PatternOptions::default()
            .normalize(self.pattern_normalize)
            .threshold(self.pattern_threshold)
    }

    /// Itemset options seeded from this configuration.
    pub fn itemset_options(&self) -> ItemsetOptions {
        ItemsetOptions::default()
            .support(self.support)
            .confidence(self.confidence)
            .rules(self.mine_rules)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be in {range})")]
    InvalidRange {
        field: String,
        value: f64,
        range: String,
    },
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    missing_codes: Vec<MissingCode>,
    pattern_threshold: Option<f64>,
    pattern_normalize: Option<bool>,
    support: Option<f64>,
    confidence: Option<f64>,
    mine_rules: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Add a value to treat as missing.
    pub fn missing_code(mut self, code: impl Into<MissingCode>) -> Self {
        self.missing_codes.push(code.into());
        self
    }

    /// Add several values to treat as missing.
    pub fn missing_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<MissingCode>,
    {
        self.missing_codes.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Set the default pattern threshold.
    pub fn pattern_threshold(mut self, threshold: f64) -> Self {
        self.pattern_threshold = Some(threshold);
        self
    }

    /// Set whether patterns are normalized by default.
    pub fn pattern_normalize(mut self, normalize: bool) -> Self {
        self.pattern_normalize = Some(normalize);
        self
    }

    /// Set the default minimum itemset support.
    pub fn support(mut self, support: f64) -> Self {
        self.support = Some(support);
        self
    }

    /// Set the default minimum rule confidence.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Enable or disable association rule mining by default.
    pub fn mine_rules(mut self, mine: bool) -> Self {
        self.mine_rules = Some(mine);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let config = AnalysisConfig {
            missing_codes: self.missing_codes,
            pattern_threshold: self.pattern_threshold.unwrap_or(DEFAULT_PATTERN_THRESHOLD),
            pattern_normalize: self.pattern_normalize.unwrap_or(true),
            support: self.support.unwrap_or(DEFAULT_SUPPORT),
            confidence: self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            mine_rules: self.mine_rules.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Per-call options
// ============================================================================

macro_rules! subset_setters {
    () => {
        /// Restrict to rows where the given columns are missing.
        pub fn anchors<I, S>(mut self, anchors: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.subset = self.subset.anchors(anchors);
            self
        }

        /// Set how the anchor columns combine.
        pub fn how(mut self, how: Combinator) -> Self {
            self.subset = self.subset.how(how);
            self
        }

        /// Retain only the given columns.
        pub fn columns<I, S>(mut self, columns: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.subset = self.subset.columns(columns);
            self
        }
    };
}

/// Options for per-column missing counts. Anchors combine with `All`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountsOptions {
    pub subset: SubsetQuery,
    /// Divide each count by the column's present-row count.
    pub normalize: bool,
    pub ascending: bool,
}

impl Default for CountsOptions {
    fn default() -> Self {
        Self {
            subset: SubsetQuery::new(Combinator::All),
            normalize: false,
            ascending: false,
        }
    }
}

impl CountsOptions {
    subset_setters!();

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }
}

/// Options for missingness patterns. Anchors combine with `Any`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOptions {
    pub subset: SubsetQuery,
    pub normalize: bool,
    /// Below 1: fraction of rows. 1 or more: row count. Patterns must
    /// exceed it to be kept.
    pub threshold: f64,
    pub ascending: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            subset: SubsetQuery::new(Combinator::Any),
            normalize: true,
            threshold: DEFAULT_PATTERN_THRESHOLD,
            ascending: false,
        }
    }
}

impl PatternOptions {
    subset_setters!();

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }
}

/// Options for a cohort comparison. Group columns combine with `Any`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortOptions {
    /// Columns whose missingness defines the "missing" cohort.
    pub group: Vec<String>,
    pub how: Combinator,
    /// Raw-table columns to compare. `None` compares every column.
    pub columns: Option<Vec<String>>,
}

impl CohortOptions {
    pub fn new<I, S>(group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group: group.into_iter().map(Into::into).collect(),
            how: Combinator::Any,
            columns: None,
        }
    }

    pub fn how(mut self, how: Combinator) -> Self {
        self.how = how;
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Options for frequent itemset and association rule mining.
///
/// Mining always runs over every row; only the column projection applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsetOptions {
    pub columns: Option<Vec<String>>,
    /// Minimum support as a fraction of rows, in (0, 1].
    pub support: f64,
    /// Whether to derive association rules.
    pub rules: bool,
    /// Minimum rule confidence, in [0, 1].
    pub confidence: f64,
}

impl Default for ItemsetOptions {
    fn default() -> Self {
        Self {
            columns: None,
            support: DEFAULT_SUPPORT,
            rules: false,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl ItemsetOptions {
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn support(mut self, support: f64) -> Self {
        self.support = support;
        self
    }

    pub fn rules(mut self, rules: bool) -> Self {
        self.rules = rules;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert!(config.missing_codes.is_empty());
        assert_eq!(config.pattern_threshold, 0.10);
        assert!(config.pattern_normalize);
        assert_eq!(config.support, 0.1);
        assert_eq!(config.confidence, 0.8);
        assert!(!config.mine_rules);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .missing_codes(["N/A", "MISSING"])
            .missing_code(-1i64)
            .support(0.25)
            .confidence(0.5)
            .mine_rules(true)
            .build()
            .unwrap();

        assert_eq!(
            config.missing_codes,
            vec![
                MissingCode::from("N/A"),
                MissingCode::from("MISSING"),
                MissingCode::Number(-1.0),
            ]
        );
        assert_eq!(config.support, 0.25);
        assert_eq!(config.confidence, 0.5);
        assert!(config.mine_rules);
    }

    #[test]
    fn test_validation_invalid_support() {
        for support in [0.0, -0.1, 1.01] {
            let result = AnalysisConfig::builder().support(support).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidRange { ref field, .. } if field == "support"
            ));
        }
    }

    #[test]
    fn test_validation_invalid_confidence() {
        let result = AnalysisConfig::builder().confidence(1.5).build();
        assert!(result.is_err());
        assert!(AnalysisConfig::builder().confidence(0.0).build().is_ok());
    }

    #[test]
    fn test_call_site_defaults() {
        assert_eq!(CountsOptions::default().subset.how, Combinator::All);
        assert_eq!(PatternOptions::default().subset.how, Combinator::Any);
        assert_eq!(CohortOptions::new(["a"]).how, Combinator::Any);
        assert!(PatternOptions::default().normalize);
        assert!(!CountsOptions::default().ascending);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "missing_codes": ["N/A", -1],
            "pattern_threshold": 2,
            "mine_rules": true
        }"#;

        let config: AnalysisConfig = serde_json::from_str(json).expect("Should deserialize");

        assert_eq!(config.missing_codes.len(), 2);
        assert_eq!(config.pattern_threshold, 2.0);
        assert!(config.pattern_normalize);
        assert!(config.mine_rules);
        assert_eq!(config.support, 0.1);
    }

    #[test]
    fn test_options_from_config() {
        let config = AnalysisConfig::builder()
            .pattern_threshold(3.0)
            .pattern_normalize(false)
            .support(0.5)
            .build()
            .unwrap();

        let pattern = config.pattern_options();
        assert_eq!(pattern.threshold, 3.0);
        assert!(!pattern.normalize);
        assert_eq!(pattern.subset.how, Combinator::Any);

        let itemsets = config.itemset_options();
        assert_eq!(itemsets.support, 0.5);
        assert!(!itemsets.rules);
    }
}
