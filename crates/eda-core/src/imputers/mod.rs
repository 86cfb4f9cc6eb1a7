//! Imputation module for handling missing values.
//!
//! Only statistical imputation (column mean) is provided.

mod statistical;

pub use statistical::{ImputedColumn, StatisticalImputer};
