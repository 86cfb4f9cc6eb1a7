//! Statistical primitives shared by profiling, outlier detection and plots.
//!
//! All functions work on present values only; callers strip missing cells
//! first. Undefined results are `None`, never zero.

use std::collections::HashMap;

use crate::types::ValueCount;

/// Arithmetic mean of present values.
pub(crate) fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation (`n - 1` denominator); needs two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    use statrs::statistics::Statistics;

    if values.len() < 2 {
        return None;
    }
    if is_constant(values) {
        return Some(0.0);
    }
    Some(values.iter().std_dev())
}

/// Quantile of sorted values using linear interpolation between closest ranks.
pub(crate) fn quantile_sorted(sorted: &[f64], quantile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = quantile.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Pearson correlation over paired present values.
///
/// Undefined with fewer than two pairs or when either side is constant.
/// Constancy is read off the values themselves: a floating-point variance
/// of a constant column can come out a hair above zero.
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    use statrs::statistics::Statistics;

    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    if n < 2 || is_constant(x) || is_constant(y) {
        return None;
    }

    let r = x.iter().covariance(y.iter()) / (x.iter().std_dev() * y.iter().std_dev());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// True when every value equals the first one.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Rows where both columns are present, as two aligned vectors.
pub(crate) fn pairwise_complete(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

/// Occurrences of each present value in order of first appearance.
pub(crate) fn counts_in_order(values: &[Option<String>]) -> Vec<ValueCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();
    for value in values.iter().flatten() {
        match index.get(value.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value.as_str(), counts.len());
                counts.push(ValueCount {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }
    counts
}

/// Value counts, most frequent first; ties keep first-appearance order.
pub(crate) fn value_counts(values: &[Option<String>]) -> Vec<ValueCount> {
    let mut counts = counts_in_order(values);
    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Minimum and maximum of sorted values.
pub(crate) fn min_max_sorted(sorted: &[f64]) -> Option<(f64, f64)> {
    Some((*sorted.first()?, *sorted.last()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ==================== mean tests ====================

    #[test]
    fn test_mean_skips_missing() {
        let values = vec![Some(20.0), None, Some(30.0), Some(40.0)];
        assert_eq!(mean(&values), Some(30.0));
    }

    #[test]
    fn test_mean_all_missing_is_undefined() {
        assert_eq!(mean(&[None, None]), None);
        assert_eq!(mean(&[]), None);
    }

    // ==================== sample_std tests ====================

    #[test]
    fn test_sample_std_basic() {
        // Variance = 10 / 4 = 2.5
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(approx(std, 2.5f64.sqrt()));
    }

    #[test]
    fn test_sample_std_needs_two_values() {
        assert_eq!(sample_std(&[5.0]), None);
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn test_sample_std_identical_values() {
        assert_eq!(sample_std(&[5.0, 5.0, 5.0]), Some(0.0));
    }

    // ==================== quantile_sorted tests ====================

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(2.0));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(3.0));
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(4.0));

        // pos = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        let four = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&four, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&four, 0.75), Some(3.25));
    }

    #[test]
    fn test_quantile_edges() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile_sorted(&[1.0, 9.0], 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&[1.0, 9.0], 1.0), Some(9.0));
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_identical_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(pearson(&x, &x).unwrap(), 1.0));
    }

    #[test]
    fn test_pearson_negative() {
        let x = [1.0, 2.0, 3.0];
        let y = [6.0, 4.0, 2.0];
        assert!(approx(pearson(&x, &y).unwrap(), -1.0));
    }

    #[test]
    fn test_pearson_constant_is_undefined() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
    }

    #[test]
    fn test_pearson_constant_inexact_float_is_undefined() {
        // the naive two-pass variance of three 0.1s is not exactly zero
        let k = [0.1, 0.1, 0.1];
        assert_eq!(pearson(&k, &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&k, &k), None);
        assert_eq!(sample_std(&k), Some(0.0));
    }

    #[test]
    fn test_pearson_partial_correlation() {
        // deviations: x = [-1.5, -0.5, 0.5, 1.5], y = [-1.25, 0.75, -0.25, 0.75]
        // sum(dx * dy) = 2.5, sum(dx^2) = 5, sum(dy^2) = 2.75
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 3.0]).unwrap();
        assert!(approx(r, 2.5 / 13.75f64.sqrt()));
    }

    #[test]
    fn test_pearson_too_few_pairs() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    #[test]
    fn test_pairwise_complete_drops_incomplete_rows() {
        let x = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let y = vec![Some(2.0), Some(5.0), None, Some(8.0)];
        let (a, b) = pairwise_complete(&x, &y);
        assert_eq!(a, vec![1.0, 4.0]);
        assert_eq!(b, vec![2.0, 8.0]);
    }

    // ==================== value_counts tests ====================

    #[test]
    fn test_value_counts_order() {
        let values: Vec<Option<String>> = ["b", "a", "a", "c", "b", "a"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect();

        let counts = value_counts(&values);
        assert_eq!(counts[0].value, "a");
        assert_eq!(counts[0].count, 3);
        assert_eq!(counts[1].value, "b");
        assert_eq!(counts[2].value, "c");

        let in_order = counts_in_order(&values);
        assert_eq!(in_order[0].value, "b");
        assert_eq!(in_order[1].value, "a");
    }

    #[test]
    fn test_value_counts_ties_keep_first_seen() {
        let values: Vec<Option<String>> = ["y", "x", "x", "y"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        let counts = value_counts(&values);
        assert_eq!(counts[0].value, "y");
        assert_eq!(counts[1].value, "x");
    }
}
