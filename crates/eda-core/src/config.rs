//! Configuration types for the analysis engine.
//!
//! This module provides configuration options using the builder pattern.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EdaError, Result};
use crate::outliers::DEFAULT_IQR_MULTIPLIER;

/// Markers that are read as a missing cell when loading CSV input.
///
/// The empty field is always missing regardless of this list.
pub const DEFAULT_MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Configuration for the analysis engine.
///
/// Use [`EdaConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use eda_core::config::EdaConfig;
///
/// let config = EdaConfig::builder()
///     .iqr_multiplier(3.0)
///     .histogram_bins(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdaConfig {
    /// Fence multiplier for the IQR rule (`Q1 - k*IQR`, `Q3 + k*IQR`).
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Number of equal-width bins for histograms.
    /// Default: 10
    pub histogram_bins: usize,

    /// Rows shown in dataset and outlier previews.
    /// Default: 5
    pub preview_rows: usize,

    /// Cell values treated as missing on load.
    pub missing_markers: Vec<String>,

    /// File name suggested when exporting the cleaned dataset.
    /// Default: "cleaned_data.csv"
    pub output_file_name: String,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            histogram_bins: 10,
            preview_rows: 5,
            missing_markers: default_missing_markers(),
            output_file_name: "cleaned_data.csv".to_string(),
        }
    }
}

fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

impl EdaConfig {
    /// Start from the defaults.
    pub fn builder() -> EdaConfigBuilder {
        EdaConfigBuilder::default()
    }

    /// Read a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults. The result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: EdaConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| EdaError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Reject out-of-range settings.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidBins(self.histogram_bins));
        }

        if self.output_file_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyOutputName);
        }

        Ok(())
    }
}

/// Reasons a configuration is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a finite number greater than 0)")]
    InvalidMultiplier(f64),

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidBins(usize),

    #[error("Output file name must not be empty")]
    EmptyOutputName,
}

impl From<ConfigValidationError> for EdaError {
    fn from(err: ConfigValidationError) -> Self {
        EdaError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`EdaConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EdaConfigBuilder {
    iqr_multiplier: Option<f64>,
    histogram_bins: Option<usize>,
    preview_rows: Option<usize>,
    missing_markers: Option<Vec<String>>,
    output_file_name: Option<String>,
}

impl EdaConfigBuilder {
    /// Set the IQR fence multiplier.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Replace the list of missing-value markers.
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the suggested export file name.
    pub fn output_file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = Some(name.into());
        self
    }

    /// Validate and return the finished configuration.
    ///
    /// Returns a validated `EdaConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<EdaConfig, ConfigValidationError> {
        let config = EdaConfig {
            iqr_multiplier: self.iqr_multiplier.unwrap_or(DEFAULT_IQR_MULTIPLIER),
            histogram_bins: self.histogram_bins.unwrap_or(10),
            preview_rows: self.preview_rows.unwrap_or(5),
            missing_markers: self.missing_markers.unwrap_or_else(default_missing_markers),
            output_file_name: self
                .output_file_name
                .unwrap_or_else(|| "cleaned_data.csv".to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EdaConfig::default();
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.histogram_bins, 10);
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.output_file_name, "cleaned_data.csv");
        assert!(config.missing_markers.iter().any(|m| m == "NaN"));
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = EdaConfig::builder().build().unwrap();
        assert_eq!(config, EdaConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = EdaConfig::builder()
            .iqr_multiplier(3.0)
            .histogram_bins(25)
            .preview_rows(10)
            .missing_markers(["?"])
            .output_file_name("out.csv")
            .build()
            .unwrap();

        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.histogram_bins, 25);
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.missing_markers, vec!["?".to_string()]);
        assert_eq!(config.output_file_name, "out.csv");
    }

    #[test]
    fn test_validation_invalid_multiplier() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = EdaConfig::builder().iqr_multiplier(bad).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidMultiplier(_)
            ));
        }
    }

    #[test]
    fn test_validation_invalid_bins() {
        let result = EdaConfig::builder().histogram_bins(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidBins(0)
        ));
    }

    #[test]
    fn test_validation_empty_output_name() {
        let result = EdaConfig::builder().output_file_name("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyOutputName
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "iqr_multiplier": 2.0, "histogram_bins": 30 }"#;
        let config: EdaConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.iqr_multiplier, 2.0);
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.output_file_name, "cleaned_data.csv");
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = EdaConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EdaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
