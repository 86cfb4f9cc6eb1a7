//! Error type shared by every engine operation.
//!
//! Errors serialize as `{ "code": ..., "message": ... }` so a front end can
//! branch on the stable code and show the message as is.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Everything that can go wrong while loading, analysing or exporting data.
#[derive(Error, Debug)]
pub enum EdaError {
    /// The input was not readable as CSV. No dataset is created.
    #[error("CSV input rejected: {0}")]
    Parse(String),

    /// An operation that needs numeric columns was invoked on a dataset
    /// without any.
    #[error("No numeric columns available for {0}")]
    EmptySelection(String),

    #[error("Unknown column '{0}'")]
    ColumnNotFound(String),

    /// The column holds categories where numbers were required.
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Column '{0}' is not categorical")]
    NotCategorical(String),

    /// A setting failed validation, or a cleaning step could not be parsed.
    #[error("Bad configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by Polars while decoding or encoding CSV.
    #[error("CSV engine failure: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Wraps another error with a description of what was being attempted.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Wrap this error, keeping its code and recoverability.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code, unaffected by any added context.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::EmptySelection(_) => "EMPTY_SELECTION",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NotNumeric(_) => "NOT_NUMERIC",
            Self::NotCategorical(_) => "NOT_CATEGORICAL",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True when the caller should skip the step rather than abort.
    ///
    /// An empty selection means "nothing to show", not a failure.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::EmptySelection(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

impl Serialize for EdaError {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("EdaError", 2)?;
        out.serialize_field("code", self.error_code())?;
        out.serialize_field("message", &self.to_string())?;
        out.end()
    }
}

pub type Result<T> = std::result::Result<T, EdaError>;

/// `.context("...")` for results whose error converts into [`EdaError`].
pub trait ResultExt<T> {
    fn context(self, what: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<EdaError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, what: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(what))
    }
}
