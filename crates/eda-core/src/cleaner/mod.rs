//! Data cleaning operations on a [`TabularDataset`].
//!
//! Every operation consumes the dataset and returns the cleaned one, so a
//! caller chains them without sharing mutable state:
//! - Removing rows with any missing value
//! - Mean imputation of numeric columns
//! - Keeping rows inside a numeric range

use tracing::{debug, info};

use crate::dataset::TabularDataset;
use crate::error::Result;
use crate::imputers::StatisticalImputer;

impl TabularDataset {
    /// Remove every row that has a missing value in any column.
    ///
    /// The result has no missing values and may be empty.
    pub fn drop_rows_with_missing(self) -> Self {
        let before = self.height();
        let complete: Vec<bool> = (0..before)
            .map(|row| self.columns().iter().all(|c| !c.is_missing(row)))
            .collect();
        let cleaned = self.retain_rows(|row| complete[row]);

        let removed = before - cleaned.height();
        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            info!("Removed {} rows with missing values ({:.1}%)", removed, pct);
        } else {
            debug!("No rows with missing values found");
        }
        cleaned
    }

    /// Replace missing numeric cells with their column's mean.
    ///
    /// See [`StatisticalImputer::impute_numeric_means`] for the per-column
    /// report.
    pub fn impute_numeric_means(self) -> Self {
        StatisticalImputer::impute_numeric_means(self).0
    }

    /// Keep rows where `lower <= value <= upper` in `column`.
    ///
    /// Rows missing in `column` are dropped.
    pub fn filter_by_range(self, column: &str, lower: f64, upper: f64) -> Result<Self> {
        let values = self.numeric_values(column)?.to_vec();
        let before = self.height();

        let filtered =
            self.retain_rows(|row| values[row].is_some_and(|v| lower <= v && v <= upper));

        debug!(
            "Range filter on '{}' [{}, {}] kept {} of {} rows",
            column,
            lower,
            upper,
            filtered.height(),
            before
        );
        Ok(filtered)
    }
}
