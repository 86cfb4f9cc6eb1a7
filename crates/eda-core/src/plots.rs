//! Plot-ready data for a rendering front end.
//!
//! Nothing here draws; each function returns the numbers a chart needs as
//! serializable structures.

use serde::Serialize;
use tracing::debug;

use crate::dataset::TabularDataset;
use crate::error::Result;
use crate::outliers::OutlierDetector;
use crate::profiler::correlation_matrix;
use crate::profiler::statistics::{counts_in_order, pairwise_complete, quantile_sorted};
use crate::types::{CorrelationMatrix, ValueCount};
use crate::utils::sorted_present;

/// Equal-width histogram bin. The last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
    /// Missing cells, which no bin counts.
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountPlot {
    pub column: String,
    /// In order of first appearance.
    pub counts: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlot {
    pub x: String,
    pub y: String,
    pub points: Vec<(f64, f64)>,
}

/// Five-number summary plus whiskers and fliers for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSummary {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values still inside the IQR fences.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    /// Values outside the fences, ascending.
    pub fliers: Vec<f64>,
}

/// Contents of one pair-plot cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum PanelData {
    Histogram(Vec<HistogramBin>),
    Scatter(Vec<(f64, f64)>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairPanel {
    pub x: String,
    pub y: String,
    pub data: PanelData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairPlot {
    pub columns: Vec<String>,
    /// Row-major: the panel for `(columns[i], columns[j])` is at
    /// `i * columns.len() + j`.
    pub panels: Vec<PairPanel>,
}

/// Builds plot data from a dataset.
pub struct PlotData;

impl PlotData {
    /// Histogram of a numeric column.
    ///
    /// A column with no values has no bins; a constant column has one.
    pub fn histogram(dataset: &TabularDataset, column: &str, bins: usize) -> Result<Histogram> {
        dataset.require_numeric("histogram")?;
        let values = dataset.numeric_values(column)?;
        let sorted = sorted_present(values);
        Ok(Histogram {
            column: column.to_string(),
            bins: build_histogram(&sorted, bins),
            missing: values.len() - sorted.len(),
        })
    }

    /// Value counts of a categorical column in order of first appearance.
    pub fn countplot(dataset: &TabularDataset, column: &str) -> Result<CountPlot> {
        let values = dataset.categorical_values(column)?;
        Ok(CountPlot {
            column: column.to_string(),
            counts: counts_in_order(values),
        })
    }

    /// Points of two numeric columns, skipping rows missing in either.
    pub fn scatter(dataset: &TabularDataset, x: &str, y: &str) -> Result<ScatterPlot> {
        dataset.require_numeric("scatter plot")?;
        let (xs, ys) = pairwise_complete(dataset.numeric_values(x)?, dataset.numeric_values(y)?);
        Ok(ScatterPlot {
            x: x.to_string(),
            y: y.to_string(),
            points: xs.into_iter().zip(ys).collect(),
        })
    }

    /// Box plot of a numeric column, with fences from `detector`.
    ///
    /// `Ok(None)` when the column has no values.
    pub fn box_plot(
        dataset: &TabularDataset,
        column: &str,
        detector: &OutlierDetector,
    ) -> Result<Option<BoxPlotSummary>> {
        dataset.require_numeric("box plot")?;
        let Some(bounds) = detector.compute_bounds(dataset, column)? else {
            return Ok(None);
        };
        let sorted = sorted_present(dataset.numeric_values(column)?);
        let (Some(&min), Some(&max), Some(median)) =
            (sorted.first(), sorted.last(), quantile_sorted(&sorted, 0.5))
        else {
            return Ok(None);
        };

        let inside = || sorted.iter().copied().filter(|v| !bounds.is_outlier(*v));
        let lower_whisker = inside().next().unwrap_or(bounds.q1);
        let upper_whisker = inside().last().unwrap_or(bounds.q3);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| bounds.is_outlier(*v))
            .collect();

        Ok(Some(BoxPlotSummary {
            column: column.to_string(),
            min,
            q1: bounds.q1,
            median,
            q3: bounds.q3,
            max,
            lower_whisker,
            upper_whisker,
            fliers,
        }))
    }

    /// Grid over every ordered pair of numeric columns: histograms on the
    /// diagonal, scatter plots elsewhere.
    pub fn pair_plot(dataset: &TabularDataset, bins: usize) -> Result<PairPlot> {
        dataset.require_numeric("pair plot")?;
        let (numeric, _) = dataset.columns_by_kind();

        let mut panels = Vec::with_capacity(numeric.len() * numeric.len());
        for y in &numeric {
            for x in &numeric {
                let data = if x == y {
                    PanelData::Histogram(Self::histogram(dataset, x, bins)?.bins)
                } else {
                    PanelData::Scatter(Self::scatter(dataset, x, y)?.points)
                };
                panels.push(PairPanel {
                    x: x.clone(),
                    y: y.clone(),
                    data,
                });
            }
        }
        debug!("Built pair plot with {} panels", panels.len());

        Ok(PairPlot {
            columns: numeric,
            panels,
        })
    }

    /// Correlation heatmap over numeric columns.
    pub fn heatmap(dataset: &TabularDataset) -> Result<CorrelationMatrix> {
        correlation_matrix(dataset)
    }
}

/// Equal-width bins over sorted values.
fn build_histogram(sorted: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let bin_count = bins.max(1);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for value in sorted {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: if idx + 1 == bin_count {
                max
            } else {
                min + (idx as f64 + 1.0) * width
            },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::error::EdaError;
    use pretty_assertions::assert_eq;

    fn sample() -> TabularDataset {
        TabularDataset::new(vec![
            Column::numeric(
                "x",
                vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(100.0), None],
            ),
            Column::numeric(
                "y",
                vec![Some(2.0), None, Some(6.0), Some(8.0), Some(9.0), Some(1.0)],
            ),
            Column::categorical(
                "c",
                ["b", "a", "b", "c", "a", "b"]
                    .iter()
                    .map(|s| Some(s.to_string()))
                    .collect(),
            ),
        ])
        .unwrap()
    }

    // ==================== histogram tests ====================

    #[test]
    fn test_histogram_bins() {
        let ds = TabularDataset::new(vec![Column::numeric(
            "v",
            vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0), None],
        )])
        .unwrap();
        let hist = PlotData::histogram(&ds, "v", 2).unwrap();

        assert_eq!(
            hist.bins,
            vec![
                HistogramBin {
                    start: 0.0,
                    end: 2.0,
                    count: 2,
                },
                HistogramBin {
                    start: 2.0,
                    end: 4.0,
                    count: 3,
                },
            ]
        );
        assert_eq!(hist.missing, 1);
    }

    #[test]
    fn test_histogram_constant_column_single_bin() {
        let ds = TabularDataset::new(vec![Column::numeric("k", vec![Some(7.0); 4])]).unwrap();
        let hist = PlotData::histogram(&ds, "k", 10).unwrap();
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 4);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let hist = PlotData::histogram(&sample(), "x", 10).unwrap();
        let total: usize = hist.bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 5);
        assert_eq!(hist.bins.len(), 10);
    }

    #[test]
    fn test_histogram_rejects_categorical() {
        assert!(matches!(
            PlotData::histogram(&sample(), "c", 10).unwrap_err(),
            EdaError::NotNumeric(_)
        ));
    }

    // ==================== countplot tests ====================

    #[test]
    fn test_countplot_first_appearance_order() {
        let plot = PlotData::countplot(&sample(), "c").unwrap();
        let labels: Vec<&str> = plot.counts.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
        assert_eq!(plot.counts[0].count, 3);
    }

    #[test]
    fn test_countplot_rejects_numeric() {
        assert!(matches!(
            PlotData::countplot(&sample(), "x").unwrap_err(),
            EdaError::NotCategorical(_)
        ));
    }

    // ==================== scatter tests ====================

    #[test]
    fn test_scatter_skips_incomplete_rows() {
        let plot = PlotData::scatter(&sample(), "x", "y").unwrap();
        assert_eq!(
            plot.points,
            vec![(1.0, 2.0), (3.0, 6.0), (4.0, 8.0), (100.0, 9.0)]
        );
    }

    // ==================== box_plot tests ====================

    #[test]
    fn test_box_plot_whiskers_and_fliers() {
        let summary = PlotData::box_plot(&sample(), "x", &OutlierDetector::default())
            .unwrap()
            .unwrap();

        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 4.0);
        assert_eq!(summary.fliers, vec![100.0]);
    }

    #[test]
    fn test_box_plot_all_missing() {
        let ds = TabularDataset::new(vec![Column::numeric("x", vec![None, None])]).unwrap();
        assert_eq!(
            PlotData::box_plot(&ds, "x", &OutlierDetector::default()).unwrap(),
            None
        );
    }

    // ==================== pair_plot / heatmap tests ====================

    #[test]
    fn test_pair_plot_layout() {
        let plot = PlotData::pair_plot(&sample(), 5).unwrap();
        assert_eq!(plot.columns, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(plot.panels.len(), 4);
        assert!(matches!(plot.panels[0].data, PanelData::Histogram(_)));
        assert!(matches!(plot.panels[1].data, PanelData::Scatter(_)));
        assert_eq!(plot.panels[1].x, "y");
        assert_eq!(plot.panels[1].y, "x");
    }

    #[test]
    fn test_numeric_only_plots_need_numeric_columns() {
        let ds = TabularDataset::new(vec![Column::categorical(
            "c",
            vec![Some("a".to_string())],
        )])
        .unwrap();
        assert!(PlotData::pair_plot(&ds, 5).unwrap_err().is_recoverable());
        assert!(PlotData::heatmap(&ds).unwrap_err().is_recoverable());
    }
}
