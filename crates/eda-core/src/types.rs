use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a column, decided once when the dataset is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

/// Occurrence count of one categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Describe-style statistics for a numeric column.
///
/// Every statistic that cannot be computed is `None` rather than zero:
/// all of them when `count == 0`, and `std` when `count < 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Describe-style statistics for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
    /// All value counts, most frequent first; ties keep first-seen order.
    pub value_counts: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SummaryStats {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Read-only summary of one column, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub missing: usize,
    pub stats: SummaryStats,
}

impl ColumnSummary {
    pub fn kind(&self) -> ColumnKind {
        match self.stats {
            SummaryStats::Numeric(_) => ColumnKind::Numeric,
            SummaryStats::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn numeric(&self) -> Option<&NumericSummary> {
        match &self.stats {
            SummaryStats::Numeric(s) => Some(s),
            SummaryStats::Categorical(_) => None,
        }
    }

    pub fn categorical(&self) -> Option<&CategoricalSummary> {
        match &self.stats {
            SummaryStats::Categorical(s) => Some(s),
            SummaryStats::Numeric(_) => None,
        }
    }
}

/// IQR fences for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl OutlierBounds {
    /// Whether `value` lies outside the fences.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_bound || value > self.upper_bound
    }
}

/// Row indices split by the IQR rule. Rows missing in the column are in
/// neither set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlierClassification {
    pub column: String,
    pub outliers: Vec<usize>,
    pub inliers: Vec<usize>,
    pub missing: usize,
}

/// Pearson correlation over numeric columns.
///
/// `values[i][j]` is `None` when the coefficient is undefined (zero variance
/// or fewer than two pairwise-complete rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient for a pair of columns.
    ///
    /// `None` when either label is unknown or the coefficient is undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
