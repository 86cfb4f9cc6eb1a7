//! Pearson correlation matrix over numeric columns.

use tracing::debug;

use super::statistics::{pairwise_complete, pearson};
use crate::dataset::TabularDataset;
use crate::error::Result;
use crate::types::CorrelationMatrix;

/// Compute the correlation matrix of every numeric column.
///
/// Each pair uses only the rows where both columns are present. The
/// diagonal is 1.0 unless the column is constant or has fewer than two
/// values, in which case its whole row and column are undefined.
pub fn correlation_matrix(dataset: &TabularDataset) -> Result<CorrelationMatrix> {
    dataset.require_numeric("correlation")?;
    let (numeric, _) = dataset.columns_by_kind();

    let series = numeric
        .iter()
        .map(|name| dataset.numeric_values(name))
        .collect::<Result<Vec<_>>>()?;

    let size = numeric.len();
    let mut values = vec![vec![None; size]; size];

    for i in 0..size {
        for j in i..size {
            let (x, y) = pairwise_complete(series[i], series[j]);
            let r = pearson(&x, &y).map(|r| if i == j { 1.0 } else { r });
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    let undefined = values.iter().flatten().filter(|v| v.is_none()).count();
    if undefined > 0 {
        debug!(
            "{} of {} correlation entries are undefined",
            undefined,
            size * size
        );
    }

    Ok(CorrelationMatrix {
        columns: numeric,
        values,
    })
}
