//! Dataset profiling.
//!
//! This module provides pure functions over a [`TabularDataset`]:
//! - Shape and column partitioning by kind
//! - Missing-value counts
//! - Describe-style summaries
//! - Pearson correlation matrix

mod correlation;
pub(crate) mod statistics;

use tracing::warn;

use crate::dataset::{Column, ColumnValues, TabularDataset};
use crate::error::Result;
use crate::types::{
    CategoricalSummary, ColumnMissing, ColumnSummary, CorrelationMatrix, NumericSummary,
    SummaryStats,
};
use crate::utils::sorted_present;

pub use correlation::correlation_matrix;

/// Statistics over a dataset. Nothing is cached; every call recomputes.
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// `(rows, columns)`.
    pub fn shape(dataset: &TabularDataset) -> (usize, usize) {
        dataset.shape()
    }

    /// Names of numeric and categorical columns, each in column order.
    pub fn columns_by_kind(dataset: &TabularDataset) -> (Vec<String>, Vec<String>) {
        dataset.columns_by_kind()
    }

    /// Missing-value count and percentage for every column, in column order.
    pub fn missing_counts(dataset: &TabularDataset) -> Vec<ColumnMissing> {
        let rows = dataset.height();
        dataset
            .columns()
            .iter()
            .map(|column| {
                let count = column.missing_count();
                let percentage = if rows > 0 {
                    (count as f64 / rows as f64) * 100.0
                } else {
                    0.0
                };
                ColumnMissing {
                    name: column.name().to_string(),
                    count,
                    percentage,
                }
            })
            .collect()
    }

    /// Describe every column, in column order.
    pub fn describe(dataset: &TabularDataset) -> Vec<ColumnSummary> {
        dataset.columns().iter().map(summarize_column).collect()
    }

    /// Summary of a single column.
    pub fn describe_column(dataset: &TabularDataset, name: &str) -> Result<ColumnSummary> {
        Ok(summarize_column(dataset.column(name)?))
    }

    /// Pearson correlation over numeric columns, pairwise-complete.
    pub fn correlation_matrix(dataset: &TabularDataset) -> Result<CorrelationMatrix> {
        correlation_matrix(dataset)
    }
}

fn summarize_column(column: &Column) -> ColumnSummary {
    let stats = match column.values() {
        ColumnValues::Numeric(values) => {
            let summary = describe_numeric(values);
            if summary.count == 0 {
                warn!(
                    "Column '{}' has no values; numeric statistics are undefined",
                    column.name()
                );
            }
            SummaryStats::Numeric(summary)
        }
        ColumnValues::Categorical(values) => SummaryStats::Categorical(describe_categorical(values)),
    };
    ColumnSummary {
        name: column.name().to_string(),
        missing: column.missing_count(),
        stats,
    }
}

fn describe_numeric(values: &[Option<f64>]) -> NumericSummary {
    let sorted = sorted_present(values);
    let (min, max) = match statistics::min_max_sorted(&sorted) {
        Some((min, max)) => (Some(min), Some(max)),
        None => (None, None),
    };

    NumericSummary {
        count: sorted.len(),
        mean: statistics::mean(values),
        std: statistics::sample_std(&sorted),
        min,
        p25: statistics::quantile_sorted(&sorted, 0.25),
        p50: statistics::quantile_sorted(&sorted, 0.5),
        p75: statistics::quantile_sorted(&sorted, 0.75),
        max,
    }
}

fn describe_categorical(values: &[Option<String>]) -> CategoricalSummary {
    let value_counts = statistics::value_counts(values);
    let count = value_counts.iter().map(|vc| vc.count).sum();
    let (top, freq) = match value_counts.first() {
        Some(vc) => (Some(vc.value.clone()), Some(vc.count)),
        None => (None, None),
    };

    CategoricalSummary {
        count,
        unique: value_counts.len(),
        top,
        freq,
        value_counts,
    }
}
