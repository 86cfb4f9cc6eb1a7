//! Outlier detection with the interquartile-range rule.
//!
//! Fences are `Q1 - k*IQR` and `Q3 + k*IQR`, with quartiles computed by
//! linear interpolation over the column's present values.

use tracing::{debug, info, warn};

use crate::dataset::TabularDataset;
use crate::error::{EdaError, Result};
use crate::profiler::statistics::quantile_sorted;
use crate::types::{OutlierBounds, OutlierClassification};
use crate::utils::sorted_present;

/// Default fence multiplier.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Detects and removes outliers in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierDetector {
    multiplier: f64,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

impl OutlierDetector {
    /// Detector with a custom fence multiplier.
    ///
    /// The multiplier must be finite and greater than zero.
    pub fn new(multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(EdaError::InvalidConfig(format!(
                "IQR multiplier must be a finite number greater than 0, got {multiplier}"
            )));
        }
        Ok(Self { multiplier })
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// IQR fences for `column`.
    ///
    /// Returns `Ok(None)` when the column has no present values, since its
    /// quartiles are undefined.
    pub fn compute_bounds(
        &self,
        dataset: &TabularDataset,
        column: &str,
    ) -> Result<Option<OutlierBounds>> {
        dataset.require_numeric("outlier detection")?;
        let sorted = sorted_present(dataset.numeric_values(column)?);

        let (Some(q1), Some(q3)) = (
            quantile_sorted(&sorted, 0.25),
            quantile_sorted(&sorted, 0.75),
        ) else {
            warn!(
                "Column '{}' has no values; outlier bounds are undefined",
                column
            );
            return Ok(None);
        };

        let iqr = q3 - q1;
        let bounds = OutlierBounds {
            column: column.to_string(),
            q1,
            q3,
            iqr,
            lower_bound: q1 - self.multiplier * iqr,
            upper_bound: q3 + self.multiplier * iqr,
        };
        debug!(
            "Bounds for '{}': Q1={}, Q3={}, IQR={}, [{}, {}]",
            column, q1, q3, iqr, bounds.lower_bound, bounds.upper_bound
        );
        Ok(Some(bounds))
    }

    /// Split the rows of `column` into outliers and inliers.
    ///
    /// Rows missing in `column` belong to neither set and are only counted.
    pub fn classify(
        dataset: &TabularDataset,
        column: &str,
        bounds: &OutlierBounds,
    ) -> Result<OutlierClassification> {
        let values = dataset.numeric_values(column)?;

        let mut classification = OutlierClassification {
            column: column.to_string(),
            ..Default::default()
        };
        for (row, value) in values.iter().enumerate() {
            match value {
                Some(v) if bounds.is_outlier(*v) => classification.outliers.push(row),
                Some(_) => classification.inliers.push(row),
                None => classification.missing += 1,
            }
        }
        Ok(classification)
    }

    /// Rows of `dataset` holding outliers in `column`.
    pub fn outlier_rows(&self, dataset: &TabularDataset, column: &str) -> Result<TabularDataset> {
        let Some(bounds) = self.compute_bounds(dataset, column)? else {
            return Ok(dataset.head(0));
        };
        let classification = Self::classify(dataset, column, &bounds)?;
        Ok(dataset.take_rows(&classification.outliers))
    }

    /// Keep only rows whose value in `column` lies within the fences.
    ///
    /// Rows missing in `column` are dropped along with the outliers. When the
    /// bounds are undefined the dataset is returned unchanged.
    pub fn remove_outliers(
        &self,
        dataset: TabularDataset,
        column: &str,
    ) -> Result<(TabularDataset, Option<OutlierBounds>)> {
        let Some(bounds) = self.compute_bounds(&dataset, column)? else {
            warn!("Skipping outlier removal on '{}': no values", column);
            return Ok((dataset, None));
        };
        let filtered = Self::remove_outside(dataset, column, &bounds)?;
        Ok((filtered, Some(bounds)))
    }

    /// Keep only rows whose value in `column` lies within `bounds`.
    ///
    /// Rows missing in `column` are dropped too. Fails only when `column` is
    /// absent or not numeric, which [`compute_bounds`](Self::compute_bounds)
    /// has already ruled out for bounds it returned.
    pub fn remove_outside(
        dataset: TabularDataset,
        column: &str,
        bounds: &OutlierBounds,
    ) -> Result<TabularDataset> {
        let before = dataset.height();
        let filtered = dataset.filter_by_range(column, bounds.lower_bound, bounds.upper_bound)?;
        let removed = before - filtered.height();
        if removed > 0 {
            info!("Removed {} rows with outliers in '{}'", removed, column);
        } else {
            debug!("No outliers found in '{}'", column);
        }
        Ok(filtered)
    }
}
