//! Column kind inference.
//!
//! A column is numeric iff every non-missing cell parses as an integer or
//! floating-point number; otherwise it is categorical. The decision is made
//! once, when the raw cells are turned into a [`Column`].

use super::Column;
use crate::utils::{is_integer_literal, is_missing_cell, parse_numeric_cell};

/// Build a typed column from raw string cells.
pub(super) fn infer_column(name: &str, raw: &[Option<String>], markers: &[String]) -> Column {
    let cells: Vec<Option<&str>> = raw
        .iter()
        .map(|c| c.as_deref().filter(|s| !is_missing_cell(s, markers)))
        .collect();

    let numeric: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => parse_numeric_cell(s).map(Some),
        })
        .collect();

    match numeric {
        Some(values) => {
            let integral =
                !values.is_empty() && cells.iter().all(|c| c.is_some_and(is_integer_literal));
            let mut column = Column::numeric(name, values);
            column.integral = integral;
            column
        }
        None => Column::categorical(
            name,
            cells.iter().map(|c| c.map(str::to_string)).collect(),
        ),
    }
}
