//! CLI entry point for missing-data analysis.

use anyhow::{Result, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use lex_missingness::{
    AnalysisConfig, CohortOptions, CohortTable, ColumnCounts, Combinator, CorrelationMatrix,
    CountsOptions, ItemsetMining, MissingCode, MissingnessAnalyzer, PatternOptions, PatternTable,
    PlotKind, PlotOptions, ReportGenerator, SubsetQuery,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLI-compatible combinator enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCombinator {
    /// Every anchor column must be missing
    All,
    /// At least one anchor column must be missing
    Any,
}

impl From<CliCombinator> for Combinator {
    fn from(cli: CliCombinator) -> Self {
        match cli {
            CliCombinator::All => Combinator::All,
            CliCombinator::Any => Combinator::Any,
        }
    }
}

/// CLI-compatible plot kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPlotKind {
    /// Missingness pattern grid
    Pattern,
}

impl From<CliPlotKind> for PlotKind {
    fn from(cli: CliPlotKind) -> Self {
        match cli {
            CliPlotKind::Pattern => PlotKind::Pattern,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Missing-data analysis for tabular datasets",
    long_about = "Explore where, how often and together with what values go missing.\n\n\
                  A cell is missing when it is empty, NaN, or equals one of the --missing-code values.\n\n\
                  EXAMPLES:\n  \
                  # Missing cells per column\n  \
                  lex-missingness -i data.csv counts\n\n  \
                  # Treat sentinels as missing\n  \
                  lex-missingness -i data.csv -m N/A -m -1 pattern --threshold 0\n\n  \
                  # Compare income between rows missing age and the rest\n  \
                  lex-missingness -i data.csv cohort --group age --columns income\n\n  \
                  # Co-missing column sets with rules\n  \
                  lex-missingness -i data.csv itemsets --support 0.2 --rules"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Value to treat as missing (repeatable)
    ///
    /// Values that parse as numbers match numeric columns, anything else
    /// matches text columns.
    #[arg(short = 'm', long = "missing-code", allow_hyphen_values = true, global = true)]
    missing_codes: Vec<String>,

    /// JSON configuration file with analysis defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable text
    ///
    /// Disables all logs; useful for piping: `... --json counts | jq .entries`
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Row filter and column projection shared by subcommands.
#[derive(ClapArgs, Debug, Clone)]
struct SubsetArgs {
    /// Keep only rows where these columns are missing
    #[arg(short, long, value_delimiter = ',')]
    anchors: Vec<String>,

    /// How anchor columns combine (defaults per subcommand)
    #[arg(long, value_enum)]
    how: Option<CliCombinator>,

    /// Columns to retain
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,
}

impl SubsetArgs {
    fn query(&self, default_how: Combinator) -> SubsetQuery {
        let mut query = SubsetQuery::new(self.how.map_or(default_how, Into::into));
        if !self.anchors.is_empty() {
            query = query.anchors(self.anchors.iter().cloned());
        }
        if !self.columns.is_empty() {
            query = query.columns(self.columns.iter().cloned());
        }
        query
    }
}

/// Pattern table options shared by `pattern` and `plot`.
#[derive(ClapArgs, Debug, Clone)]
struct PatternArgs {
    #[command(flatten)]
    subset: SubsetArgs,

    /// Report fractions of rows, even if the config file turns them off
    #[arg(long, conflicts_with = "counts")]
    normalize: bool,

    /// Report raw row counts instead of fractions
    #[arg(long)]
    counts: bool,

    /// Drop patterns at or below this frequency (fraction below 1, row count from 1)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Sort from least to most frequent
    #[arg(long)]
    ascending: bool,
}

impl PatternArgs {
    /// `None` when neither flag is given and the config decides.
    fn normalize(&self) -> Option<bool> {
        match (self.normalize, self.counts) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn options(&self, config: &AnalysisConfig) -> PatternOptions {
        let base = config.pattern_options();
        PatternOptions {
            subset: self.subset.query(Combinator::Any),
            normalize: self.normalize().unwrap_or(base.normalize),
            threshold: self.threshold.unwrap_or(base.threshold),
            ascending: self.ascending,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Missing cells per column
    Counts {
        #[command(flatten)]
        subset: SubsetArgs,

        /// Divide each count by the column's present-row count
        #[arg(long)]
        normalize: bool,

        /// Sort from fewest to most missing
        #[arg(long)]
        ascending: bool,
    },

    /// Correlation of missingness between columns
    Corr {
        #[command(flatten)]
        subset: SubsetArgs,
    },

    /// Frequency of each missingness pattern
    Pattern {
        #[command(flatten)]
        pattern: PatternArgs,
    },

    /// Compare numeric columns between rows missing a group and the rest
    Cohort {
        /// Columns whose missingness defines the missing cohort
        #[arg(short, long, value_delimiter = ',', required = true)]
        group: Vec<String>,

        /// How group columns combine
        #[arg(long, value_enum, default_value = "any")]
        how: CliCombinator,

        /// Raw columns to compare
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Frequent co-missing column sets and association rules
    Itemsets {
        /// Columns to mine
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Minimum support as a fraction of rows, in (0, 1]
        #[arg(short, long)]
        support: Option<f64>,

        /// Also derive association rules
        #[arg(short, long)]
        rules: bool,

        /// Minimum rule confidence, in [0, 1]
        #[arg(long)]
        confidence: Option<f64>,
    },

    /// Draw a missingness plot
    Plot {
        #[arg(short, long, value_enum, default_value = "pattern")]
        kind: CliPlotKind,

        /// Hide column labels
        #[arg(long)]
        no_labels: bool,

        #[command(flatten)]
        pattern: PatternArgs,
    },

    /// Summarize missingness and optionally save a JSON report
    Report {
        /// Directory to write `<input_name>_missingness.json` into
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("No input file given; pass --input <CSV>"))?;
    if !Path::new(input).exists() {
        return Err(anyhow!("Input file not found: {}", input));
    }

    let config = load_config(&args)?;

    info!("Loading dataset from: {}", input);
    let data = load_csv(input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let analyzer = MissingnessAnalyzer::from_config(data, &config)?;

    run_command(&args, &config, &analyzer, input)
}

/// Merge the optional config file with `--missing-code` flags.
fn load_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            debug!("Reading configuration from {}", path.display());
            AnalysisConfig::from_json_file(path)?
        }
        None => AnalysisConfig::default(),
    };

    config.missing_codes.extend(
        args.missing_codes
            .iter()
            .map(|raw| raw.parse::<MissingCode>().unwrap_or_else(|never| match never {})),
    );

    Ok(config)
}

fn run_command(
    args: &Args,
    config: &AnalysisConfig,
    analyzer: &MissingnessAnalyzer,
    input: &str,
) -> Result<()> {
    match &args.command {
        Command::Counts {
            subset,
            normalize,
            ascending,
        } => {
            let options = CountsOptions {
                subset: subset.query(Combinator::All),
                normalize: *normalize,
                ascending: *ascending,
            };
            let counts = analyzer.counts(&options)?;
            emit(args.json, &counts, || print_counts(&counts))
        }
        Command::Corr { subset } => {
            let matrix = analyzer.corr(&subset.query(Combinator::All))?;
            emit(args.json, &matrix, || print_corr(&matrix))
        }
        Command::Pattern { pattern } => {
            let table = analyzer.pattern(&pattern.options(config))?;
            emit(args.json, &table, || print_patterns(&table))
        }
        Command::Cohort {
            group,
            how,
            columns,
        } => {
            let mut options = CohortOptions::new(group.iter().cloned()).how((*how).into());
            if !columns.is_empty() {
                options = options.columns(columns.iter().cloned());
            }
            let table = analyzer.cohort(&options)?;
            emit(args.json, &table, || print_cohort(&table))
        }
        Command::Itemsets {
            columns,
            support,
            rules,
            confidence,
        } => {
            let mut options = config.itemset_options();
            if !columns.is_empty() {
                options = options.columns(columns.iter().cloned());
            }
            if let Some(support) = support {
                options = options.support(*support);
            }
            if let Some(confidence) = confidence {
                options = options.confidence(*confidence);
            }
            if *rules {
                options = options.rules(true);
            }
            let mined = analyzer.frequency_item_set(&options)?;
            emit(args.json, &mined, || print_itemsets(&mined))
        }
        Command::Plot {
            kind,
            no_labels,
            pattern,
        } => {
            let options = PlotOptions::default()
                .pattern(pattern.options(config))
                .labels(!no_labels);
            let plot = analyzer.plot((*kind).into(), &options)?;
            emit(args.json, &plot, || print!("{}", plot.render_text()))
        }
        Command::Report { output } => {
            let report = ReportGenerator::build(analyzer, Some(input), &config.pattern_options())?;
            if let Some(dir) = output {
                let path = ReportGenerator::new(dir)
                    .write_report_to_file(&report, &extract_file_stem(input))?;
                info!("Report written to {}", path.display());
            }
            emit(args.json, &report, || {
                println!();
                println!("{}", "=".repeat(60));
                println!("MISSINGNESS REPORT");
                println!("{}", "=".repeat(60));
                println!("Input:  {} ({} rows x {} columns)", input, report.rows, report.columns);
                println!(
                    "Missing cells: {} ({:.1}%)",
                    report.total_missing_cells, report.missing_percentage
                );
                println!("Complete rows: {}", report.complete_rows);
                println!();
                print_counts(&report.counts);
                println!();
                print_patterns(&report.patterns);
            })
        }
    }
}

/// Print JSON when requested, otherwise run the human-readable printer.
///
/// Human output goes through `println!` on purpose: it is the result, not a
/// log line, and stays visible whatever the log level.
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}

fn print_counts(counts: &ColumnCounts) {
    let width = counts
        .entries
        .iter()
        .map(|e| e.column.chars().count())
        .max()
        .unwrap_or(0);
    println!("Missing per column{}:", if counts.normalized { " (normalized)" } else { "" });
    for entry in &counts.entries {
        if counts.normalized {
            println!("  {:<width$}  {:.4}", entry.column, entry.value, width = width);
        } else {
            println!("  {:<width$}  {}", entry.column, entry.value, width = width);
        }
    }
}

fn print_corr(matrix: &CorrelationMatrix) {
    if matrix.is_empty() {
        println!("No columns with varying missingness.");
        return;
    }
    let width = matrix
        .columns
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    print!("{:<width$}", "", width = width);
    for column in &matrix.columns {
        print!("  {:>width$}", truncate_str(column, width), width = width);
    }
    println!();
    for (column, row) in matrix.columns.iter().zip(&matrix.values) {
        print!("{:<width$}", column, width = width);
        for value in row {
            print!("  {:>width$.3}", value, width = width);
        }
        println!();
    }
}

fn print_patterns(table: &PatternTable) {
    println!(
        "{} pattern(s) over {} column(s){}",
        table.len(),
        table.columns.len(),
        if table.normalized { ", frequencies as fractions" } else { "" }
    );
    for row in &table.rows {
        let missing: Vec<&str> = table
            .columns
            .iter()
            .zip(&row.pattern)
            .filter(|(_, missing)| **missing)
            .map(|(name, _)| name.as_str())
            .collect();
        let label = if missing.is_empty() {
            "(complete)".to_string()
        } else {
            missing.join(", ")
        };
        println!("  {:>8.3}  {}", row.frequency, label);
    }
}

fn print_cohort(table: &CohortTable) {
    println!(
        "Cohorts by {} missing ({}): {} missing rows, {} present rows",
        table.group.join(", "),
        table.how,
        table.missing_rows,
        table.present_rows
    );
    println!(
        "  {:<20} {:>8} {:>8} {:>12} {:>12} {:>10} {:>10}",
        "column", "n_miss", "n_pres", "mean_miss", "mean_pres", "p_equal", "p_welch"
    );
    for row in &table.rows {
        println!(
            "  {:<20} {:>8} {:>8} {:>12.4} {:>12.4} {:>10.4} {:>10.4}",
            truncate_str(&row.column, 20),
            row.non_null_missing,
            row.non_null_present,
            row.mean_missing,
            row.mean_present,
            row.p_equal_var,
            row.p_unequal_var
        );
    }
}

fn print_itemsets(mined: &ItemsetMining) {
    println!(
        "{} itemset(s) with support >= {} of {} rows",
        mined.itemsets.len(),
        mined.min_support,
        mined.transactions
    );
    for itemset in &mined.itemsets {
        println!("  {:>6}  {{{}}}", itemset.support, itemset.items.join(", "));
    }
    if !mined.rules.is_empty() {
        println!();
        println!("{} rule(s):", mined.rules.len());
        for rule in &mined.rules {
            println!(
                "  {{{}}} => {{{}}}  support {}  confidence {:.3}",
                rule.antecedent.join(", "),
                rule.consequent.join(", "),
                rule.support,
                rule.confidence
            );
        }
    }
}

/// Truncate a string for column display.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn load_csv(path: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| anyhow!("Failed to read {}: {}", path, e))
}
