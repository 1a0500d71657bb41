//! Summary statistics shared by the metric functions.
//!
//! Variance and covariance use Welford updates: a constant input never moves
//! the running mean, so its variance is exactly zero rather than rounding
//! noise.

use std::cmp::Ordering;

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N − 1 denominator). NaN with fewer than 2 values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mut n = 0.0;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for &x in values {
        n += 1.0;
        let delta = x - mean;
        mean += delta / n;
        m2 += delta * (x - mean);
    }
    (m2 / (n - 1.0)).sqrt()
}

/// Pearson correlation of paired observations.
///
/// NaN with fewer than 2 pairs or when either side has zero variance.
pub fn pearson(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut n = 0.0;
    let (mut mean_x, mut mean_y) = (0.0, 0.0);
    let (mut m2x, mut m2y, mut cxy) = (0.0, 0.0, 0.0);

    for (x, y) in pairs {
        n += 1.0;
        let dx = x - mean_x;
        mean_x += dx / n;
        let dy = y - mean_y;
        mean_y += dy / n;
        m2x += dx * (x - mean_x);
        m2y += dy * (y - mean_y);
        cxy += dx * (y - mean_y);
    }

    if n < 2.0 || m2x == 0.0 || m2y == 0.0 {
        return f64::NAN;
    }
    (cxy / (m2x * m2y).sqrt()).clamp(-1.0, 1.0)
}

/// Order `a` before `b` by value, NaN last regardless of direction.
pub fn cmp_nan_last(a: f64, b: f64, descending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// Stable sort by `key` (NaN last), truncated to `n` items.
pub fn top_n<T: Clone>(items: &[T], n: usize, descending: bool, key: impl Fn(&T) -> f64) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| cmp_nan_last(key(a), key(b), descending));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_matches_textbook() {
        // var = ((1-2.5)^2 + (2-2.5)^2 + (3-2.5)^2 + (4-2.5)^2) / 3 = 5/3
        let s = sample_std(&[1.0, 2.0, 3.0, 4.0]);
        assert!((s - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sample_std_of_constant_is_exactly_zero() {
        assert_eq!(sample_std(&[0.1, 0.1, 0.1, 0.1, 0.1]), 0.0);
        assert_eq!(sample_std(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn sample_std_needs_two_values() {
        assert!(sample_std(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn pearson_perfect_correlation() {
        let up = pearson([(1.0, 2.0), (2.0, 4.0), (3.0, 6.5)]);
        assert!(up > 0.99);
        let down = pearson([(1.0, -1.0), (2.0, -2.0), (3.0, -3.0)]);
        assert!((down + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_degenerate_inputs_are_nan() {
        assert!(pearson([(1.0, 1.0)]).is_nan());
        assert!(pearson([(1.0, 1.0), (1.0, 2.0)]).is_nan());
        assert!(pearson(std::iter::empty()).is_nan());
    }

    #[test]
    fn top_n_puts_nan_last_both_ways() {
        let values = [3.0, f64::NAN, 1.0, 2.0];
        let desc = top_n(&values, 10, true, |v| *v);
        assert_eq!(&desc[..3], &[3.0, 2.0, 1.0]);
        assert!(desc[3].is_nan());

        let asc = top_n(&values, 10, false, |v| *v);
        assert_eq!(&asc[..3], &[1.0, 2.0, 3.0]);
        assert!(asc[3].is_nan());
    }

    #[test]
    fn top_n_is_stable_and_truncates() {
        let items = [("a", 1.0), ("b", 2.0), ("c", 1.0), ("d", 2.0)];
        let top = top_n(&items, 3, true, |t| t.1);
        let names: Vec<_> = top.iter().map(|t| t.0).collect();
        assert_eq!(names, vec!["b", "d", "a"]);
    }
}
