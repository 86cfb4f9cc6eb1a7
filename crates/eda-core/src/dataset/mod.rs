//! In-memory tabular dataset.
//!
//! A [`TabularDataset`] is an ordered list of uniquely named columns. Each
//! column is a tagged union decided once at load time: numeric columns hold
//! `Option<f64>` cells, categorical columns hold `Option<String>` cells.
//! `None` always means "missing"; a numeric column never stores NaN.
//!
//! Every column has the same number of rows, and every operation that
//! removes rows applies the same row selection to all columns.

mod inference;
mod io;

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::DEFAULT_MISSING_MARKERS;
use crate::error::{EdaError, Result};
use crate::types::ColumnKind;
use crate::utils::is_whole_number;

/// Cell storage of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&self, indices: &[usize]) -> ColumnValues {
        match self {
            ColumnValues::Numeric(v) => ColumnValues::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnValues::Categorical(v) => {
                ColumnValues::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
    /// Every cell was an integer literal at load time (and none was missing).
    /// Such columns are written back as integers.
    integral: bool,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
            integral: false,
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Categorical(values),
            integral: false,
        }
    }

    /// Numeric column that is written back as integers while its values stay whole.
    pub fn integer(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let integral = values.iter().all(|v| v.is_some_and(is_whole_number));
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
            integral,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Categorical(v) => Some(v),
            ColumnValues::Numeric(_) => None,
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.values {
            ColumnValues::Numeric(v) => v[row].is_none(),
            ColumnValues::Categorical(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Render one cell for previews. Missing cells render as `NaN`.
    pub fn display_cell(&self, row: usize) -> String {
        match &self.values {
            ColumnValues::Numeric(v) => match v[row] {
                Some(x) if self.integral => format!("{}", x as i64),
                Some(x) if is_whole_number(x) => format!("{x:.1}"),
                Some(x) => format!("{x}"),
                None => "NaN".to_string(),
            },
            ColumnValues::Categorical(v) => v[row].clone().unwrap_or_else(|| "NaN".to_string()),
        }
    }

    pub(crate) fn is_integral(&self) -> bool {
        self.integral
            && self
                .as_numeric()
                .is_some_and(|v| v.iter().all(|c| c.is_some_and(is_whole_number)))
    }

    pub(crate) fn with_values(&self, values: ColumnValues) -> Column {
        Column {
            name: self.name.clone(),
            values,
            integral: self.integral,
        }
    }

    fn take(&self, indices: &[usize]) -> Column {
        self.with_values(self.values.take(indices))
    }
}

/// Ordered, row-aligned collection of columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularDataset {
    columns: Vec<Column>,
    height: usize,
}

/// Shape, column kinds and a preview of the first rows.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    pub columns: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Vec<String>>,
}

impl TabularDataset {
    /// Build a dataset from columns.
    ///
    /// Fails when names repeat or column lengths differ.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(EdaError::Parse(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
            if column.len() != height {
                return Err(EdaError::Parse(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    height
                )));
            }
        }

        Ok(Self { columns, height })
    }

    /// Parse CSV bytes with the default missing-value markers.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let markers: Vec<String> = DEFAULT_MISSING_MARKERS
            .iter()
            .map(|m| m.to_string())
            .collect();
        Self::load_with_markers(bytes, &markers)
    }

    /// Parse CSV bytes, treating `markers` (and the empty field) as missing.
    pub fn load_with_markers(bytes: &[u8], markers: &[String]) -> Result<Self> {
        let raw_columns = io::read_raw_columns(bytes)?;
        let columns = raw_columns
            .iter()
            .map(|(name, cells)| inference::infer_column(name, cells, markers))
            .collect();
        let dataset = Self::new(columns)?;

        let (numeric, categorical) = dataset.columns_by_kind();
        info!(
            "Loaded dataset: {} rows x {} columns ({} numeric, {} categorical)",
            dataset.height(),
            dataset.width(),
            numeric.len(),
            categorical.len()
        );
        Ok(dataset)
    }

    /// Serialize to CSV with a header row and no index column.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        io::write_csv(self)
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.columns.len())
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EdaError::ColumnNotFound(name.to_string()))
    }

    /// Cells of a numeric column.
    pub fn numeric_values(&self, name: &str) -> Result<&[Option<f64>]> {
        self.column(name)?
            .as_numeric()
            .ok_or_else(|| EdaError::NotNumeric(name.to_string()))
    }

    /// Cells of a categorical column.
    pub fn categorical_values(&self, name: &str) -> Result<&[Option<String>]> {
        self.column(name)?
            .as_categorical()
            .ok_or_else(|| EdaError::NotCategorical(name.to_string()))
    }

    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.column(name)?.missing_count())
    }

    /// Names of numeric and categorical columns, each in column order.
    pub fn columns_by_kind(&self) -> (Vec<String>, Vec<String>) {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for column in &self.columns {
            match column.kind() {
                ColumnKind::Numeric => numeric.push(column.name.clone()),
                ColumnKind::Categorical => categorical.push(column.name.clone()),
            }
        }
        (numeric, categorical)
    }

    /// `EmptySelection` naming `operation` when no column is numeric.
    ///
    /// Numeric-only operations call this before looking up their column so
    /// that a categorical-only dataset is skipped rather than failed.
    pub fn require_numeric(&self, operation: &str) -> Result<()> {
        if self
            .columns
            .iter()
            .any(|column| matches!(column.kind(), ColumnKind::Numeric))
        {
            Ok(())
        } else {
            Err(EdaError::EmptySelection(operation.to_string()))
        }
    }

    /// Keep the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            height: indices.len(),
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let indices: Vec<usize> = (0..n.min(self.height)).collect();
        self.take_rows(&indices)
    }

    /// Render the first `n` rows as strings.
    pub fn preview(&self, n: usize) -> DatasetPreview {
        let rows = (0..n.min(self.height))
            .map(|row| self.columns.iter().map(|c| c.display_cell(row)).collect())
            .collect();
        DatasetPreview {
            columns: self.column_names(),
            kinds: self.columns.iter().map(Column::kind).collect(),
            rows,
        }
    }

    /// Replace the dataset's columns, keeping the height.
    pub(crate) fn map_columns(self, f: impl FnMut(Column) -> Column) -> Self {
        let height = self.height;
        let columns: Vec<Column> = self.columns.into_iter().map(f).collect();
        debug_assert!(columns.iter().all(|c| c.len() == height));
        Self { columns, height }
    }

    /// Keep only the rows whose index satisfies `keep`.
    pub(crate) fn retain_rows(self, mut keep: impl FnMut(usize) -> bool) -> Self {
        let indices: Vec<usize> = (0..self.height).filter(|&i| keep(i)).collect();
        if indices.len() == self.height {
            return self;
        }
        debug!("Keeping {} of {} rows", indices.len(), self.height);
        self.take_rows(&indices)
    }
}

static_assertions::assert_impl_all!(TabularDataset: Send, Sync);
