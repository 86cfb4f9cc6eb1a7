//! Single-owner analysis session.
//!
//! A [`Session`] holds the loaded dataset and applies cleaning actions to it
//! one at a time. Each action is cumulative: it runs against the result of
//! the previous one. A short in-memory history of reports is kept, newest
//! first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::config::EdaConfig;
use crate::dataset::{DatasetPreview, TabularDataset};
use crate::error::{EdaError, Result, ResultExt};
use crate::imputers::{ImputedColumn, StatisticalImputer};
use crate::outliers::OutlierDetector;
use crate::profiler::StatisticsEngine;
use crate::types::{ColumnMissing, OutlierBounds};

/// Maximum number of cleaning reports to keep.
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// A cleaning step requested by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CleaningAction {
    DropMissingRows,
    ImputeNumericMeans,
    RemoveOutliers { column: String },
}

impl fmt::Display for CleaningAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropMissingRows => write!(f, "drop-missing"),
            Self::ImputeNumericMeans => write!(f, "impute-mean"),
            Self::RemoveOutliers { column } => write!(f, "remove-outliers={column}"),
        }
    }
}

impl FromStr for CleaningAction {
    type Err = EdaError;

    /// Parses `drop-missing`, `impute-mean` or `remove-outliers=COLUMN`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "drop-missing" => Ok(Self::DropMissingRows),
            "impute-mean" => Ok(Self::ImputeNumericMeans),
            other => match other.split_once('=') {
                Some(("remove-outliers", column)) if !column.trim().is_empty() => {
                    Ok(Self::RemoveOutliers {
                        column: column.trim().to_string(),
                    })
                }
                _ => Err(EdaError::InvalidConfig(format!(
                    "unknown cleaning step '{s}' (expected drop-missing, impute-mean or remove-outliers=COLUMN)"
                ))),
            },
        }
    }
}

/// Outcome of one applied cleaning action.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub action: CleaningAction,
    pub rows_before: usize,
    pub rows_after: usize,
    pub cells_filled: usize,
    /// Per-column detail for mean imputation.
    pub imputed: Vec<ImputedColumn>,
    /// Fences used for outlier removal; `None` when they were undefined.
    pub bounds: Option<OutlierBounds>,
    pub applied_at: DateTime<Utc>,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    /// One-line human-readable description.
    pub fn summary(&self) -> String {
        match &self.action {
            CleaningAction::DropMissingRows => format!(
                "Removed {} rows with missing values ({} -> {} rows)",
                self.rows_removed(),
                self.rows_before,
                self.rows_after
            ),
            CleaningAction::ImputeNumericMeans => format!(
                "Filled {} missing values across {} numeric columns",
                self.cells_filled,
                self.imputed.iter().filter(|c| c.filled > 0).count()
            ),
            CleaningAction::RemoveOutliers { column } => match &self.bounds {
                Some(b) => format!(
                    "Removed {} rows outside [{}, {}] in '{}'",
                    self.rows_removed(),
                    b.lower_bound,
                    b.upper_bound,
                    column
                ),
                None => format!("Outlier bounds for '{column}' are undefined; nothing removed"),
            },
        }
    }
}

/// Shape, preview and missing counts of the current dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub source_name: String,
    pub rows: usize,
    pub columns: usize,
    pub preview: DatasetPreview,
    pub missing: Vec<ColumnMissing>,
}

/// Owns the dataset being explored.
#[derive(Debug)]
pub struct Session {
    source_name: String,
    config: EdaConfig,
    dataset: TabularDataset,
    history: Vec<CleaningReport>,
}

impl Session {
    /// Parse CSV bytes into a new session.
    ///
    /// The configuration is validated first. On a parse error no session is
    /// created.
    pub fn load(bytes: &[u8], source_name: impl Into<String>, config: EdaConfig) -> Result<Self> {
        config.validate()?;
        let source_name = source_name.into();
        let dataset = TabularDataset::load_with_markers(bytes, &config.missing_markers)
            .context(format!("Loading '{source_name}'"))?;

        Ok(Self {
            source_name,
            config,
            dataset,
            history: Vec::new(),
        })
    }

    /// Read a CSV file into a new session named after the file.
    pub fn open(path: impl AsRef<Path>, config: EdaConfig) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).context(format!("Reading '{}'", path.display()))?;
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::load(&bytes, source_name, config)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    pub fn dataset(&self) -> &TabularDataset {
        &self.dataset
    }

    /// Applied reports, newest first.
    pub fn history(&self) -> &[CleaningReport] {
        &self.history
    }

    /// Fence detector configured from this session.
    pub fn outlier_detector(&self) -> Result<OutlierDetector> {
        OutlierDetector::new(self.config.iqr_multiplier)
    }

    pub fn info(&self) -> DatasetInfo {
        let (rows, columns) = self.dataset.shape();
        DatasetInfo {
            source_name: self.source_name.clone(),
            rows,
            columns,
            preview: self.dataset.preview(self.config.preview_rows),
            missing: StatisticsEngine::missing_counts(&self.dataset),
        }
    }

    /// Apply a cleaning action to the current dataset.
    ///
    /// On error the dataset is left as it was.
    pub fn apply(&mut self, action: CleaningAction) -> Result<CleaningReport> {
        let rows_before = self.dataset.height();

        let (dataset, imputed, bounds) = match &action {
            CleaningAction::DropMissingRows => {
                let dataset = std::mem::take(&mut self.dataset).drop_rows_with_missing();
                (dataset, Vec::new(), None)
            }
            CleaningAction::ImputeNumericMeans => {
                let (dataset, imputed) =
                    StatisticalImputer::impute_numeric_means(std::mem::take(&mut self.dataset));
                (dataset, imputed, None)
            }
            CleaningAction::RemoveOutliers { column } => {
                let detector = self.outlier_detector()?;
                // Bounds come from a borrow; the dataset is only moved once they are known.
                match detector.compute_bounds(&self.dataset, column)? {
                    Some(bounds) => {
                        let dataset = OutlierDetector::remove_outside(
                            std::mem::take(&mut self.dataset),
                            column,
                            &bounds,
                        )?;
                        (dataset, Vec::new(), Some(bounds))
                    }
                    None => (std::mem::take(&mut self.dataset), Vec::new(), None),
                }
            }
        };
        self.dataset = dataset;

        let report = CleaningReport {
            cells_filled: imputed.iter().map(|c| c.filled).sum(),
            action,
            rows_before,
            rows_after: self.dataset.height(),
            imputed,
            bounds,
            applied_at: Utc::now(),
        };
        info!("{}", report.summary());

        self.history.insert(0, report.clone());
        if self.history.len() > MAX_HISTORY_ENTRIES {
            self.history.truncate(MAX_HISTORY_ENTRIES);
        }
        Ok(report)
    }

    /// CSV bytes of the current dataset.
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        self.dataset.to_csv_bytes()
    }

    /// File name suggested for the exported dataset.
    pub fn output_file_name(&self) -> &str {
        &self.config.output_file_name
    }

    /// Write the current dataset to `path` as CSV.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.export_csv()?;
        std::fs::write(path, bytes).context(format!("Writing '{}'", path.display()))?;
        info!("Saved {} rows to {}", self.dataset.height(), path.display());
        Ok(())
    }
}

static_assertions::assert_impl_all!(Session: Send, Sync);
static_assertions::assert_impl_all!(CleaningReport: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CSV: &[u8] =
        b"id,x,city\n1,1,Oslo\n2,,Rome\n3,3,\n4,4,Oslo\n5,2,Rome\n6,3,Oslo\n7,100,Rome\n";

    fn session() -> Session {
        Session::load(CSV, "sample.csv", EdaConfig::default()).unwrap()
    }

    // ==================== CleaningAction parsing tests ====================

    #[test]
    fn test_action_from_str() {
        assert_eq!(
            "drop-missing".parse::<CleaningAction>().unwrap(),
            CleaningAction::DropMissingRows
        );
        assert_eq!(
            "impute-mean".parse::<CleaningAction>().unwrap(),
            CleaningAction::ImputeNumericMeans
        );
        assert_eq!(
            "remove-outliers=x".parse::<CleaningAction>().unwrap(),
            CleaningAction::RemoveOutliers {
                column: "x".to_string()
            }
        );
        assert!("remove-outliers=".parse::<CleaningAction>().is_err());
        assert!("shuffle".parse::<CleaningAction>().is_err());
    }

    #[test]
    fn test_action_display_round_trips() {
        let action = CleaningAction::RemoveOutliers {
            column: "price".to_string(),
        };
        assert_eq!(action.to_string().parse::<CleaningAction>().unwrap(), action);
    }

    // ==================== load tests ====================

    #[test]
    fn test_load_rejects_invalid_config() {
        let config = EdaConfig {
            iqr_multiplier: 0.0,
            ..Default::default()
        };
        let err = Session::load(CSV, "sample.csv", config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_load_parse_error_keeps_code() {
        let err = Session::load(b"", "empty.csv", EdaConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_info() {
        let info = session().info();
        assert_eq!(info.source_name, "sample.csv");
        assert_eq!((info.rows, info.columns), (7, 3));
        assert_eq!(info.preview.rows.len(), 5);
        assert_eq!(info.missing[1].count, 1);
        assert_eq!(info.missing[2].count, 1);
    }

    // ==================== apply tests ====================

    #[test]
    fn test_apply_is_cumulative() {
        let mut session = session();

        let report = session.apply(CleaningAction::ImputeNumericMeans).unwrap();
        assert_eq!(report.cells_filled, 1);
        assert_eq!(report.rows_after, 7);

        // only the row missing `city` is left to drop
        let report = session.apply(CleaningAction::DropMissingRows).unwrap();
        assert_eq!(report.rows_before, 7);
        assert_eq!(report.rows_after, 6);

        let report = session
            .apply(CleaningAction::RemoveOutliers {
                column: "x".to_string(),
            })
            .unwrap();
        assert!(report.bounds.is_some());
        assert_eq!(report.rows_removed(), 1);
        assert_eq!(session.dataset().height(), 5);

        assert_eq!(session.history().len(), 3);
        assert!(matches!(
            session.history()[0].action,
            CleaningAction::RemoveOutliers { .. }
        ));
    }

    #[test]
    fn test_failed_action_keeps_dataset() {
        let mut session = session();
        let before = session.dataset().clone();

        let err = session
            .apply(CleaningAction::RemoveOutliers {
                column: "city".to_string(),
            })
            .unwrap_err();

        assert!(matches!(err, EdaError::NotNumeric(_)));
        assert_eq!(session.dataset(), &before);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_remove_outliers_matches_detector() {
        let mut session = session();
        let report = session
            .apply(CleaningAction::RemoveOutliers {
                column: "x".to_string(),
            })
            .unwrap();

        let (expected, bounds) = OutlierDetector::default()
            .remove_outliers(TabularDataset::load(CSV).unwrap(), "x")
            .unwrap();
        assert_eq!(session.dataset(), &expected);
        assert_eq!(report.bounds, bounds);
    }

    #[test]
    fn test_history_is_capped() {
        let mut session = session();
        for _ in 0..(MAX_HISTORY_ENTRIES + 3) {
            session.apply(CleaningAction::DropMissingRows).unwrap();
        }
        assert_eq!(session.history().len(), MAX_HISTORY_ENTRIES);
    }

    // ==================== export tests ====================

    #[test]
    fn test_export_csv_after_cleaning() {
        let mut session = session();
        session.apply(CleaningAction::DropMissingRows).unwrap();

        let text = String::from_utf8(session.export_csv().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,x,city");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("1,"));
        assert!(lines[1].ends_with(",Oslo"));
        assert_eq!(session.output_file_name(), "cleaned_data.csv");
    }
}
