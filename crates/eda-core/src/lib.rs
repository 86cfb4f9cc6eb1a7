//! Exploratory Data Analysis Engine
//!
//! A small, synchronous library for exploring and cleaning CSV data, with
//! Polars handling the CSV encoding.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Loading**: CSV bytes into a [`TabularDataset`] whose columns are
//!   either numeric or categorical, with missing cells kept as `None`
//! - **Statistics**: Shape, missing counts, describe-style summaries and a
//!   pairwise-complete Pearson correlation matrix ([`StatisticsEngine`])
//! - **Outliers**: IQR fences and row classification ([`OutlierDetector`])
//! - **Cleaning**: Dropping incomplete rows, mean imputation and range filters
//! - **Plot data**: Histograms, count plots, scatter, box, pair and heatmap
//!   data for a rendering front end ([`PlotData`])
//! - **Sessions**: A single-owner [`Session`] that applies cleaning actions
//!   cumulatively and exports the result as CSV
//!
//! Undefined statistics (for example the mean of an entirely missing column)
//! are reported as `None`, never as zero.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eda_core::{CleaningAction, EdaConfig, OutlierDetector, Session, StatisticsEngine};
//!
//! let mut session = Session::open("data.csv", EdaConfig::default())?;
//!
//! for summary in StatisticsEngine::describe(session.dataset()) {
//!     println!("{}: {:?}", summary.name, summary.stats);
//! }
//!
//! let detector = OutlierDetector::default();
//! if let Some(bounds) = detector.compute_bounds(session.dataset(), "price")? {
//!     let split = OutlierDetector::classify(session.dataset(), "price", &bounds)?;
//!     println!("{} outliers", split.outliers.len());
//! }
//!
//! session.apply(CleaningAction::ImputeNumericMeans)?;
//! session.apply(CleaningAction::RemoveOutliers { column: "price".into() })?;
//! session.export_to(session.output_file_name())?;
//! ```
//!
//! # Configuration
//!
//! Use [`EdaConfig`] to customize behavior:
//!
//! ```rust,ignore
//! use eda_core::config::EdaConfig;
//!
//! let config = EdaConfig::builder()
//!     .iqr_multiplier(3.0)             // Wider outlier fences
//!     .histogram_bins(20)
//!     .missing_markers(["", "?", "-"]) // Custom missing markers
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod imputers;
pub mod outliers;
pub mod plots;
pub mod profiler;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, DEFAULT_MISSING_MARKERS, EdaConfig, EdaConfigBuilder};
pub use dataset::{Column, ColumnValues, DatasetPreview, TabularDataset};
pub use error::{EdaError, Result, ResultExt};
pub use imputers::{ImputedColumn, StatisticalImputer};
pub use outliers::{DEFAULT_IQR_MULTIPLIER, OutlierDetector};
pub use plots::{
    BoxPlotSummary, CountPlot, Histogram, HistogramBin, PairPanel, PairPlot, PanelData, PlotData,
    ScatterPlot,
};
pub use profiler::{StatisticsEngine, correlation_matrix};
pub use session::{
    CleaningAction, CleaningReport, DatasetInfo, MAX_HISTORY_ENTRIES, Session,
};
pub use types::{
    CategoricalSummary, ColumnKind, ColumnMissing, ColumnSummary, CorrelationMatrix,
    NumericSummary, OutlierBounds, OutlierClassification, SummaryStats, ValueCount,
};
