//! Statistical utility functions.

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Whether every value lies within `tolerance` of the first one.
pub fn is_constant(values: &[f64], tolerance: f64) -> bool {
    match values.first() {
        None => true,
        Some(&first) => values.iter().all(|v| (v - first).abs() <= tolerance),
    }
}

/// Least-squares line through `values` against positions `0..n`.
///
/// Returns `(intercept, slope)`. A single point yields a zero slope.
pub fn linear_fit(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    if n == 1 {
        return (values[0], 0.0);
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    (y_mean - slope * x_mean, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_calculates_correctly() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn variance_calculates_correctly() {
        // Sample variance of [1, 2, 3, 4, 5] = 2.5
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-10);
        assert!(variance(&[1.0]).is_nan());
    }

    #[test]
    fn constant_detection() {
        assert!(is_constant(&[4.0; 10], 1e-12));
        assert!(is_constant(&[], 1e-12));
        assert!(!is_constant(&[4.0, 4.0, 4.1], 1e-12));
    }

    #[test]
    fn linear_fit_recovers_line() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 + 0.5 * i as f64).collect();
        let (intercept, slope) = linear_fit(&values);
        assert_relative_eq!(intercept, 3.0, epsilon = 1e-10);
        assert_relative_eq!(slope, 0.5, epsilon = 1e-10);

        assert_eq!(linear_fit(&[7.0]), (7.0, 0.0));
    }
}
