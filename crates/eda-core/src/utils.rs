//! Shared utilities for cell parsing and numeric helpers.
//!
//! This module contains common helper functions used across multiple modules
//! to keep parsing and floating-point conventions consistent.

use std::cmp::Ordering;

// =============================================================================
// Cell Parsing Utilities
// =============================================================================

/// Check if a raw cell is missing: the empty field or one of `markers`.
///
/// Markers are matched exactly (case-sensitive) after trimming whitespace.
pub fn is_missing_cell(raw: &str, markers: &[String]) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || markers.iter().any(|m| m == trimmed)
}

/// Try to parse a raw cell as a finite-or-infinite number.
///
/// A parse that yields NaN is rejected so that a numeric column never holds
/// NaN as a present value.
///
/// # Example
///
/// ```rust,ignore
/// use eda_core::utils::parse_numeric_cell;
///
/// assert_eq!(parse_numeric_cell(" 42 "), Some(42.0));
/// assert_eq!(parse_numeric_cell("1e-3"), Some(0.001));
/// assert_eq!(parse_numeric_cell("abc"), None);
/// ```
pub fn parse_numeric_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Check if a raw cell is an integer literal (no decimal point or exponent).
pub fn is_integer_literal(raw: &str) -> bool {
    raw.trim().parse::<i64>().is_ok()
}

// =============================================================================
// Floating-Point Utilities
// =============================================================================

/// Total order for `f64` that treats incomparable values as equal.
#[inline]
pub fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Collect the present values of a column and sort them ascending.
pub fn sorted_present(values: &[Option<f64>]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    sorted.sort_by(cmp_f64);
    sorted
}

/// Whether a value can be written back as an integer without loss.
#[inline]
pub fn is_whole_number(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15
}
