//! Statistical imputation methods.
//!
//! Provides mean imputation for numeric columns.

use serde::Serialize;
use tracing::{debug, warn};

use crate::dataset::{ColumnValues, TabularDataset};
use crate::profiler::statistics;

/// What mean imputation did to one numeric column that had missing cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedColumn {
    pub name: String,
    /// `None` when the column was entirely missing and was left as is.
    pub fill_value: Option<f64>,
    pub filled: usize,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace missing cells of every numeric column with the mean of its
    /// present cells.
    ///
    /// Categorical columns are untouched. A numeric column with no present
    /// cells has no mean and stays entirely missing.
    pub fn impute_numeric_means(dataset: TabularDataset) -> (TabularDataset, Vec<ImputedColumn>) {
        let mut imputed = Vec::new();

        let dataset = dataset.map_columns(|column| {
            let Some(values) = column.as_numeric() else {
                return column;
            };
            let missing = values.iter().filter(|v| v.is_none()).count();
            if missing == 0 {
                return column;
            }

            match statistics::mean(values) {
                Some(mean) => {
                    let filled: Vec<Option<f64>> =
                        values.iter().map(|v| Some(v.unwrap_or(mean))).collect();
                    debug!(
                        "Filled {} missing values in '{}' with mean {:.4}",
                        missing,
                        column.name(),
                        mean
                    );
                    imputed.push(ImputedColumn {
                        name: column.name().to_string(),
                        fill_value: Some(mean),
                        filled: missing,
                    });
                    column.with_values(ColumnValues::Numeric(filled))
                }
                None => {
                    warn!(
                        "Column '{}' is entirely missing; mean is undefined, leaving it unchanged",
                        column.name()
                    );
                    imputed.push(ImputedColumn {
                        name: column.name().to_string(),
                        fill_value: None,
                        filled: 0,
                    });
                    column
                }
            }
        });

        (dataset, imputed)
    }
}
