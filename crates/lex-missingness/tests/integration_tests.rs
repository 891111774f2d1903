//! Integration tests for missingness analysis.
//!
//! These tests run every analysis end to end on small survey datasets with
//! native nulls and sentinel codes.

use lex_missingness::{
    AnalysisConfig, CohortOptions, Combinator, CountsOptions, ItemsetOptions, MaskBuilder,
    MissingCode, MissingnessAnalyzer, MissingnessError, PatternOptions, Plot, PlotKind,
    PlotOptions, ReportGenerator, SubsetQuery,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn survey() -> MissingnessAnalyzer {
    MissingnessAnalyzer::new(load_csv("survey.csv"), Vec::new()).unwrap()
}

fn sentinel_codes() -> Vec<MissingCode> {
    vec![
        MissingCode::from("N/A"),
        MissingCode::from("MISSING"),
        MissingCode::from(-1i64),
    ]
}

fn count_pairs(counts: &lex_missingness::ColumnCounts) -> Vec<(String, f64)> {
    counts
        .entries
        .iter()
        .map(|e| (e.column.clone(), e.value))
        .collect()
}

// ============================================================================
// Counts
// ============================================================================

#[test]
fn test_counts_sorted_descending() {
    let counts = survey().counts(&CountsOptions::default()).unwrap();

    assert_eq!(
        count_pairs(&counts),
        vec![
            ("income".to_string(), 5.0),
            ("region".to_string(), 5.0),
            ("age".to_string(), 2.0),
            ("score".to_string(), 0.0),
        ]
    );
}

#[test]
fn test_counts_match_true_cells_of_subset() {
    let analyzer = survey();
    let options = CountsOptions::default()
        .anchors(["region"])
        .columns(["age", "income"]);

    let subset = analyzer.select(&options.subset).unwrap();
    let counts = analyzer.counts(&options).unwrap();

    for name in ["age", "income"] {
        let expected = subset
            .column(name)
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .filter(|v| *v == Some(true))
            .count();
        assert_eq!(counts.get(name), Some(expected as f64));
    }
    // rows 2, 4, 7, 9 and 10 lack a region; of those, 2 lacks age, 4 and 10 lack income
    assert_eq!(counts.get("age"), Some(1.0));
    assert_eq!(counts.get("income"), Some(2.0));
}

#[test]
fn test_counts_normalized_by_present_rows() {
    let counts = survey()
        .counts(&CountsOptions::default().normalize(true).ascending(true))
        .unwrap();

    assert_eq!(counts.get("income"), Some(1.0));
    assert_eq!(counts.get("age"), Some(0.25));
    assert_eq!(counts.get("score"), Some(0.0));
    assert_eq!(counts.columns()[0], "score");
}

#[test]
fn test_sentinel_codes_add_one_per_occurrence() {
    let plain = MissingnessAnalyzer::new(load_csv("survey_sentinels.csv"), Vec::new())
        .unwrap()
        .counts(&CountsOptions::default())
        .unwrap();
    let coded = MissingnessAnalyzer::new(load_csv("survey_sentinels.csv"), sentinel_codes())
        .unwrap()
        .counts(&CountsOptions::default())
        .unwrap();

    assert_eq!(coded.get("age"), plain.get("age").map(|v| v + 1.0));
    assert_eq!(coded.get("income"), plain.get("income").map(|v| v + 1.0));
    assert_eq!(coded.get("region"), plain.get("region").map(|v| v + 2.0));
    assert_eq!(coded.get("score"), Some(0.0));

    assert_eq!(
        count_pairs(&coded),
        vec![
            ("region".to_string(), 7.0),
            ("income".to_string(), 6.0),
            ("age".to_string(), 3.0),
            ("score".to_string(), 0.0),
        ]
    );
}

#[test]
fn test_code_rewrite_is_idempotent() {
    let df = load_csv("survey_sentinels.csv");
    let codes = sentinel_codes();

    let once = MaskBuilder::null_out_codes(&df, &codes).unwrap();
    let twice = MaskBuilder::null_out_codes(&once, &codes).unwrap();
    assert!(once.equals_missing(&twice));

    let mask = MaskBuilder::build(&df, &codes).unwrap();
    let mask_of_rewrite = MaskBuilder::build(&once, &codes).unwrap();
    assert!(mask.equals(&mask_of_rewrite));
}

// ============================================================================
// Correlation
// ============================================================================

#[test]
fn test_corr_symmetric_with_unit_diagonal() {
    let matrix = survey().corr(&SubsetQuery::default()).unwrap();

    // score is never missing and is dropped
    assert_eq!(matrix.columns, vec!["age", "income", "region"]);
    for (i, row) in matrix.values.iter().enumerate() {
        assert_eq!(row[i], 1.0);
        for (j, value) in row.iter().enumerate() {
            assert!((value - matrix.values[j][i]).abs() < 1e-12);
        }
    }
}

#[test]
fn test_corr_unknown_column() {
    let err = survey()
        .corr(&SubsetQuery::default().columns(["age", "zip"]))
        .unwrap_err();
    assert!(matches!(err, MissingnessError::ColumnNotFound(ref name) if name == "zip"));
}

// ============================================================================
// Patterns
// ============================================================================

#[test]
fn test_pattern_counts_sum_to_rows() {
    let options = PatternOptions::default().normalize(false).threshold(0.0);
    let table = survey().pattern(&options).unwrap();

    assert_eq!(table.len(), 6);
    assert_eq!(table.total_frequency(), 10.0);
    // income alone is missing in rows 3, 6 and 8
    assert_eq!(table.rows[0].pattern, vec![false, true, false, false]);
    assert_eq!(table.rows[0].frequency, 3.0);
}

#[test]
fn test_pattern_default_threshold() {
    let table = survey().pattern(&PatternOptions::default()).unwrap();

    // patterns seen once are at the 10% threshold and dropped
    assert_eq!(table.len(), 3);
    assert!(table.total_frequency() <= 1.0);
    assert_eq!(table.rows[0].frequency, 0.3);
}

#[test]
fn test_pattern_anchored() {
    let options = PatternOptions::default()
        .anchors(["age", "region"])
        .how(Combinator::All)
        .normalize(false)
        .threshold(0.0);
    let table = survey().pattern(&options).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0].pattern, vec![true, false, true, false]);
    assert_eq!(table.rows[0].frequency, 1.0);
}

#[test]
fn test_pattern_negative_threshold() {
    let err = survey()
        .pattern(&PatternOptions::default().threshold(-0.5))
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PARAMETER");
}

// ============================================================================
// Cohorts
// ============================================================================

#[test]
fn test_cohort_partitions_non_null_counts() {
    let analyzer = survey();
    let table = analyzer.cohort(&CohortOptions::new(["age"])).unwrap();

    assert_eq!(table.missing_rows, 2);
    assert_eq!(table.present_rows, 8);

    // region is text and skipped
    let columns: Vec<&str> = table.rows.iter().map(|r| r.column.as_str()).collect();
    assert_eq!(columns, vec!["age", "income", "score"]);

    for row in &table.rows {
        let non_null = analyzer.data().height()
            - analyzer.data().column(&row.column).unwrap().null_count();
        assert_eq!(row.non_null_missing + row.non_null_present, non_null);
    }

    let income = table.get("income").unwrap();
    assert_eq!(income.non_null_missing, 2);
    assert_eq!(income.non_null_present, 3);
    assert_eq!(income.mean_missing, 54500.0);
    assert!(income.p_equal_var > 0.0 && income.p_equal_var <= 1.0);
    assert!(income.p_unequal_var > 0.0 && income.p_unequal_var <= 1.0);

    let age = table.get("age").unwrap();
    assert_eq!(age.non_null_missing, 0);
    assert!(age.t_equal_var.is_nan());
}

#[test]
fn test_cohort_keeps_sentinel_values() {
    let analyzer =
        MissingnessAnalyzer::new(load_csv("survey_sentinels.csv"), sentinel_codes()).unwrap();
    let table = analyzer
        .cohort(&CohortOptions::new(["region"]).columns(["income"]))
        .unwrap();

    // row 1 lacks a region (N/A), so it joins the missing cohort, and its
    // -1 income is tested as a raw value
    assert_eq!(table.missing_rows, 7);
    let income = table.get("income").unwrap();
    let raw_non_null = analyzer.data().height() - analyzer.data().column("income").unwrap().null_count();
    assert_eq!(raw_non_null, 5);
    assert_eq!(income.non_null_missing + income.non_null_present, raw_non_null);
    assert_eq!(income.non_null_missing, 4);
    assert_eq!(income.mean_missing, (-1.0 + 48000.0 + 45000.0 + 58000.0) / 4.0);
}

#[test]
fn test_cohort_unknown_group() {
    let err = survey().cohort(&CohortOptions::new(["zip"])).unwrap_err();
    assert!(err.is_caller_error());
}

// ============================================================================
// Itemsets
// ============================================================================

#[test]
fn test_itemsets_and_rules() {
    let options = ItemsetOptions::default()
        .support(0.2)
        .rules(true)
        .confidence(0.4);
    let mined = survey().frequency_item_set(&options).unwrap();

    assert_eq!(mined.min_support, 2);
    assert_eq!(mined.transactions, 10);
    assert_eq!(mined.itemsets.len(), 4);
    assert_eq!(mined.support_of(&["income"]), Some(5));
    assert_eq!(mined.support_of(&["age"]), Some(2));
    assert_eq!(mined.support_of(&["income", "region"]), Some(2));
    assert_eq!(mined.support_of(&["age", "region"]), None);

    assert_eq!(mined.rules.len(), 2);
    for rule in &mined.rules {
        assert_eq!(rule.support, 2);
        assert_eq!(rule.confidence, 0.4);
    }
}

#[test]
fn test_full_support_itemsets() {
    let df = df![
        "a" => [None::<i32>, None, None, None],
        "b" => [None, Some(1), None, None],
        "c" => [Some(1), Some(2), Some(3), None],
    ]
    .unwrap();
    let analyzer = MissingnessAnalyzer::new(df, Vec::new()).unwrap();
    let mined = analyzer
        .frequency_item_set(&ItemsetOptions::default().support(1.0))
        .unwrap();

    assert_eq!(mined.itemsets.len(), 1);
    assert!(mined.itemsets.iter().all(|s| s.support == mined.transactions));
    assert_eq!(mined.itemsets[0].items, vec!["a"]);
}

#[test]
fn test_itemsets_invalid_support() {
    let err = survey()
        .frequency_item_set(&ItemsetOptions::default().support(0.0))
        .unwrap_err();
    assert!(matches!(err, MissingnessError::InvalidParameter { .. }));
}

// ============================================================================
// Configuration, plots and reports
// ============================================================================

#[test]
fn test_config_file_drives_analysis() {
    let config = AnalysisConfig::from_json_file(fixtures_path().join("config.json")).unwrap();
    assert_eq!(config.missing_codes, sentinel_codes());

    let analyzer =
        MissingnessAnalyzer::from_config(load_csv("survey_sentinels.csv"), &config).unwrap();
    assert_eq!(analyzer.total_missing().unwrap(), 16);

    let table = analyzer.pattern(&config.pattern_options()).unwrap();
    assert!((table.total_frequency() - 1.0).abs() < 1e-12);

    let mined = analyzer
        .frequency_item_set(&config.itemset_options())
        .unwrap();
    assert_eq!(mined.min_support, 2);
    assert!(!mined.rules.is_empty());
}

#[test]
fn test_pattern_plot() {
    let options = PlotOptions::default().pattern(PatternOptions::default().threshold(0.0));
    let plot = survey().plot(PlotKind::Pattern, &options).unwrap();

    let Plot::Pattern(grid) = &plot;
    assert_eq!(grid.height(), 6);
    assert_eq!(grid.width(), 4);

    let text = plot.render_text();
    assert!(text.contains("| age | income | region | score |"));
    assert_eq!(text.lines().count(), 2 + 2 * 6);
}

#[test]
fn test_report() {
    let analyzer = survey();
    let report =
        ReportGenerator::build(&analyzer, Some("survey.csv"), &PatternOptions::default()).unwrap();

    assert_eq!(report.rows, 10);
    assert_eq!(report.columns, 4);
    assert_eq!(report.total_missing_cells, 12);
    assert_eq!(report.missing_percentage, 30.0);
    assert_eq!(report.complete_rows, 1);
    assert_eq!(report.counts.get("income"), Some(5.0));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["patterns"]["rows"].as_array().map(Vec::len), Some(3));
}
