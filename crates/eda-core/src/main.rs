//! CLI entry point for the exploratory data analysis engine.

use anyhow::{Result, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use eda_core::{
    CleaningAction, CleaningReport, ColumnSummary, CorrelationMatrix, EdaConfig, EdaError,
    OutlierDetector, PlotData, Session, StatisticsEngine, SummaryStats,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CLI-compatible plot kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPlotKind {
    /// Equal-width bins of a numeric column
    Histogram,
    /// Value counts of a categorical column
    Countplot,
    /// Points of two numeric columns
    Scatter,
    /// Quartiles, whiskers and fliers of a numeric column
    Boxplot,
    /// Histograms and scatter plots over every numeric pair
    Pairplot,
    /// Correlation matrix of numeric columns
    Heatmap,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory data analysis for CSV files",
    long_about = "Inspect, summarize and clean CSV datasets.\n\n\
                  EXAMPLES:\n  \
                  # Preview rows, column kinds and missing counts\n  \
                  eda inspect -i data.csv\n\n  \
                  # Descriptive statistics as JSON\n  \
                  eda --json describe -i data.csv\n\n  \
                  # IQR outliers of one column\n  \
                  eda outliers -i data.csv -c price\n\n  \
                  # Impute, drop outliers and save\n  \
                  eda clean -i data.csv -s impute-mean -s remove-outliers=price"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Minimum log level; `RUST_LOG` takes precedence when set
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and results)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable text
    ///
    /// Disables all logs so stdout can be piped: `... --json | jq .`
    #[arg(long, global = true)]
    json: bool,

    /// JSON configuration file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Input file shared by every subcommand.
#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// Path to the CSV file
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show shape, column kinds, missing counts and the first rows
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        /// Number of rows to preview
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },

    /// Descriptive statistics for every column
    Describe {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Pearson correlation matrix of numeric columns
    Correlate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// IQR outlier bounds and outlier rows of a numeric column
    Outliers {
        #[command(flatten)]
        input: InputArgs,

        /// Numeric column to check
        #[arg(short, long)]
        column: String,

        /// Fence multiplier k in Q1 - k*IQR, Q3 + k*IQR
        #[arg(short = 'k', long)]
        multiplier: Option<f64>,
    },

    /// Plot-ready data as JSON
    Plot {
        #[command(flatten)]
        input: InputArgs,

        /// Kind of plot
        #[arg(long, value_enum)]
        kind: CliPlotKind,

        /// Column to plot (x axis for scatter)
        #[arg(short, long)]
        column: Option<String>,

        /// Y axis column for scatter
        #[arg(short, long)]
        y: Option<String>,

        /// Number of histogram bins
        #[arg(long)]
        bins: Option<usize>,
    },

    /// Apply cleaning steps in order and write the result as CSV
    Clean {
        #[command(flatten)]
        input: InputArgs,

        /// Cleaning step: drop-missing, impute-mean or remove-outliers=COLUMN
        #[arg(short, long = "step", required = true)]
        steps: Vec<CleaningAction>,

        /// Output CSV path (defaults to the configured output file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Install the stderr tracing subscriber.
///
/// JSON mode turns logging off so stdout carries
/// nothing but the JSON document.
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
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = match &args.config {
        Some(path) => {
            debug!("Reading configuration from {}", path.display());
            EdaConfig::from_json_file(path)?
        }
        None => EdaConfig::default(),
    };

    match &args.command {
        Command::Inspect { input, rows } => {
            let mut config = config;
            if let Some(rows) = rows {
                config.preview_rows = *rows;
            }
            let session = open_session(&input.input, config)?;
            run_inspect(&session, args.json)
        }
        Command::Describe { input } => {
            let session = open_session(&input.input, config)?;
            run_describe(&session, args.json)
        }
        Command::Correlate { input } => {
            let session = open_session(&input.input, config)?;
            run_correlate(&session, args.json)
        }
        Command::Outliers {
            input,
            column,
            multiplier,
        } => {
            let mut config = config;
            if let Some(k) = multiplier {
                config.iqr_multiplier = *k;
            }
            let session = open_session(&input.input, config)?;
            run_outliers(&session, column, args.json)
        }
        Command::Plot {
            input,
            kind,
            column,
            y,
            bins,
        } => {
            let mut config = config;
            if let Some(bins) = bins {
                config.histogram_bins = *bins;
            }
            let session = open_session(&input.input, config)?;
            run_plot(&session, *kind, column.as_deref(), y.as_deref())
        }
        Command::Clean {
            input,
            steps,
            output,
        } => {
            let mut session = open_session(&input.input, config)?;
            run_clean(&mut session, steps, output.clone(), args.json)
        }
    }
}

/// Validate the input path and load it into a session.
fn open_session(path: &Path, config: EdaConfig) -> Result<Session> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    info!("Loading dataset from: {}", path.display());
    Ok(Session::open(path, config)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a notice for an operation that has nothing to work on, or fail.
fn skip_if_recoverable(err: EdaError, json: bool) -> Result<()> {
    if !err.is_recoverable() {
        return Err(err.into());
    }
    warn!("{}", err);
    if json {
        print_json(&err)
    } else {
        println!("{err}");
        Ok(())
    }
}

/// Format an optional statistic; undefined values print as `-`.
fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

/// Shorten `s` to `max_len` characters, ending in "..." when cut.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn run_inspect(session: &Session, json: bool) -> Result<()> {
    let info = session.info();
    if json {
        return print_json(&info);
    }

    println!("\n{}", "=".repeat(80));
    println!("DATASET OVERVIEW");
    println!("{}\n", "=".repeat(80));
    println!("  File: {}", info.source_name);
    println!("  Rows: {}", info.rows);
    println!("  Columns: {}", info.columns);
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!("{:<24} {:<12} {:<10} {:<10}", "Column", "Kind", "Missing", "Missing %");
    println!("{}", "-".repeat(60));
    for (missing, kind) in info.missing.iter().zip(&info.preview.kinds) {
        println!(
            "{:<24} {:<12} {:<10} {:<10.1}",
            truncate_str(&missing.name, 23),
            kind.to_string(),
            missing.count,
            missing.percentage
        );
    }
    println!();

    println!("FIRST {} ROWS", info.preview.rows.len());
    println!("{}", "-".repeat(40));
    let header: Vec<String> = info
        .preview
        .columns
        .iter()
        .map(|c| format!("{:<14}", truncate_str(c, 13)))
        .collect();
    println!("{}", header.join(" "));
    for row in &info.preview.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|c| format!("{:<14}", truncate_str(c, 13)))
            .collect();
        println!("{}", cells.join(" "));
    }
    println!("{}", "=".repeat(80));
    Ok(())
}

fn run_describe(session: &Session, json: bool) -> Result<()> {
    let summaries = StatisticsEngine::describe(session.dataset());
    if json {
        return print_json(&summaries);
    }

    print_numeric_summaries(&summaries);
    print_categorical_summaries(&summaries);
    Ok(())
}

fn print_numeric_summaries(summaries: &[ColumnSummary]) {
    let numeric: Vec<_> = summaries
        .iter()
        .filter_map(|s| s.numeric().map(|n| (&s.name, n)))
        .collect();
    if numeric.is_empty() {
        return;
    }

    println!("NUMERIC COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<16} {:>6} {:>11} {:>11} {:>11} {:>11} {:>11} {:>11} {:>11}",
        "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for (name, n) in numeric {
        println!(
            "{:<16} {:>6} {:>11} {:>11} {:>11} {:>11} {:>11} {:>11} {:>11}",
            truncate_str(name, 15),
            n.count,
            fmt_stat(n.mean),
            fmt_stat(n.std),
            fmt_stat(n.min),
            fmt_stat(n.p25),
            fmt_stat(n.p50),
            fmt_stat(n.p75),
            fmt_stat(n.max)
        );
    }
    println!();
}

fn print_categorical_summaries(summaries: &[ColumnSummary]) {
    let categorical: Vec<_> = summaries
        .iter()
        .filter_map(|s| match &s.stats {
            SummaryStats::Categorical(c) => Some((&s.name, c)),
            SummaryStats::Numeric(_) => None,
        })
        .collect();
    if categorical.is_empty() {
        return;
    }

    println!("CATEGORICAL COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<16} {:>6} {:>7} {:<20} {:>6}",
        "Column", "count", "unique", "top", "freq"
    );
    for (name, c) in categorical {
        println!(
            "{:<16} {:>6} {:>7} {:<20} {:>6}",
            truncate_str(name, 15),
            c.count,
            c.unique,
            truncate_str(c.top.as_deref().unwrap_or("-"), 19),
            c.freq.map_or_else(|| "-".to_string(), |f| f.to_string())
        );
    }
    println!();
}

fn run_correlate(session: &Session, json: bool) -> Result<()> {
    let matrix = match StatisticsEngine::correlation_matrix(session.dataset()) {
        Ok(matrix) => matrix,
        Err(e) => return skip_if_recoverable(e, json),
    };
    if json {
        return print_json(&matrix);
    }
    print_matrix(&matrix);
    Ok(())
}

fn print_matrix(matrix: &CorrelationMatrix) {
    let mut header = format!("{:<14}", "");
    for name in &matrix.columns {
        header.push_str(&format!(" {:>10}", truncate_str(name, 10)));
    }
    println!("{header}");
    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        let mut line = format!("{:<14}", truncate_str(name, 13));
        for value in row {
            let cell = value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
            line.push_str(&format!(" {cell:>10}"));
        }
        println!("{line}");
    }
}

#[derive(Serialize)]
struct OutlierOutput {
    column: String,
    bounds: Option<eda_core::OutlierBounds>,
    outlier_count: usize,
    inlier_count: usize,
    missing: usize,
    preview: eda_core::DatasetPreview,
}

fn run_outliers(session: &Session, column: &str, json: bool) -> Result<()> {
    let dataset = session.dataset();
    let detector: OutlierDetector = session.outlier_detector()?;

    let bounds = match detector.compute_bounds(dataset, column) {
        Ok(bounds) => bounds,
        Err(e) => return skip_if_recoverable(e, json),
    };
    let classification = match &bounds {
        Some(b) => OutlierDetector::classify(dataset, column, b)?,
        None => Default::default(),
    };
    let rows = dataset.take_rows(&classification.outliers);

    let output = OutlierOutput {
        column: column.to_string(),
        bounds,
        outlier_count: classification.outliers.len(),
        inlier_count: classification.inliers.len(),
        missing: classification.missing,
        preview: rows.preview(session.config().preview_rows),
    };
    if json {
        return print_json(&output);
    }

    println!("OUTLIERS IN '{column}'");
    println!("{}", "-".repeat(40));
    match &output.bounds {
        Some(b) => {
            println!("  Q1: {:.4}  Q3: {:.4}  IQR: {:.4}", b.q1, b.q3, b.iqr);
            println!(
                "  Bounds: [{:.4}, {:.4}] (k = {})",
                b.lower_bound,
                b.upper_bound,
                detector.multiplier()
            );
        }
        None => println!("  Bounds are undefined: the column has no values"),
    }
    println!(
        "  Outliers: {}  Inliers: {}  Missing: {}",
        output.outlier_count, output.inlier_count, output.missing
    );
    if !output.preview.rows.is_empty() {
        println!();
        println!("{}", output.preview.columns.join(", "));
        for row in &output.preview.rows {
            println!("{}", row.join(", "));
        }
    }
    Ok(())
}

fn require_column<'a>(name: Option<&'a str>, flag: &str, kind: CliPlotKind) -> Result<&'a str> {
    name.ok_or_else(|| anyhow!("--kind {kind:?} needs {flag}"))
}

fn to_json<T: Serialize>(plot: eda_core::Result<T>) -> eda_core::Result<serde_json::Value> {
    Ok(serde_json::to_value(plot?)?)
}

fn run_plot(
    session: &Session,
    kind: CliPlotKind,
    column: Option<&str>,
    y: Option<&str>,
) -> Result<()> {
    let dataset = session.dataset();
    let bins = session.config().histogram_bins;

    let result = match kind {
        CliPlotKind::Histogram => {
            let column = require_column(column, "-c", kind)?;
            to_json(PlotData::histogram(dataset, column, bins))
        }
        CliPlotKind::Countplot => {
            let column = require_column(column, "-c", kind)?;
            to_json(PlotData::countplot(dataset, column))
        }
        CliPlotKind::Scatter => {
            let x = require_column(column, "-c", kind)?;
            let y = require_column(y, "-y", kind)?;
            to_json(PlotData::scatter(dataset, x, y))
        }
        CliPlotKind::Boxplot => {
            let column = require_column(column, "-c", kind)?;
            let detector = session.outlier_detector()?;
            to_json(PlotData::box_plot(dataset, column, &detector))
        }
        CliPlotKind::Pairplot => to_json(PlotData::pair_plot(dataset, bins)),
        CliPlotKind::Heatmap => to_json(PlotData::heatmap(dataset)),
    };

    match result {
        Ok(value) => print_json(&value),
        // plot data is always JSON
        Err(e) => skip_if_recoverable(e, true),
    }
}

#[derive(Serialize)]
struct CleanOutput<'a> {
    input: &'a str,
    output: String,
    rows: usize,
    columns: usize,
    steps: &'a [CleaningReport],
}

fn run_clean(
    session: &mut Session,
    steps: &[CleaningAction],
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let original_shape = session.dataset().shape();

    let mut reports = Vec::with_capacity(steps.len());
    for step in steps {
        match session.apply(step.clone()) {
            Ok(report) => reports.push(report),
            Err(e) if e.is_recoverable() => warn!("Skipping step '{}': {}", step, e),
            Err(e) => return Err(e.into()),
        }
    }

    let output = output.unwrap_or_else(|| PathBuf::from(session.output_file_name()));
    session.export_to(&output)?;

    let (rows, columns) = session.dataset().shape();
    if json {
        return print_json(&CleanOutput {
            input: session.source_name(),
            output: output.display().to_string(),
            rows,
            columns,
            steps: &reports,
        });
    }

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        session.source_name(),
        original_shape.0,
        original_shape.1
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output.display(),
        rows,
        columns
    );
    println!();
    println!("Actions Taken:");
    for report in &reports {
        println!("  - {}", report.summary());
    }
    println!("{}", "=".repeat(80));
    Ok(())
}
