//! Differencing utilities for ARIMA-type models.

use crate::utils::stats::variance;

/// Apply `d` rounds of first differencing.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    seasonal_difference(series, d, 1)
}

/// Apply `d` rounds of differencing at lag `period`.
///
/// Each round shortens the series by `period`; rounds that would leave
/// nothing are skipped.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    if period == 0 {
        return result;
    }
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Undo one round of lag-`lag` differencing for values following `history`.
///
/// `forecast` holds differenced values for the steps after the end of
/// `history`; the result is on the scale of `history`.
pub fn integrate(forecast: &[f64], history: &[f64], lag: usize) -> Vec<f64> {
    let n = history.len();
    if lag == 0 || n < lag {
        return forecast.to_vec();
    }

    let mut extended = history.to_vec();
    extended.reserve(forecast.len());
    for (h, &delta) in forecast.iter().enumerate() {
        let base = extended[n + h - lag];
        extended.push(base + delta);
    }
    extended.split_off(n)
}

/// Suggest a first-differencing order (0, 1 or 2) with a variance ratio test.
pub fn suggest_differencing(series: &[f64]) -> usize {
    if series.len() < 4 {
        return 0;
    }

    let var_0 = variance(series);
    if var_0.is_nan() || var_0 <= 0.0 {
        return 0;
    }

    let diff_1 = difference(series, 1);
    let var_1 = variance(&diff_1);
    if var_1 / var_0 >= 0.9 {
        return 0;
    }

    let diff_2 = difference(&diff_1, 1);
    if diff_2.len() >= 2 && var_1 > 0.0 {
        let var_2 = variance(&diff_2);
        if var_2 / var_1 < 0.9 {
            return 2;
        }
    }
    1
}

/// Suggest a seasonal differencing order (0 or 1).
///
/// Seasonal differencing is suggested when it removes at least 30% of the
/// variance and two full cycles are available.
pub fn suggest_seasonal_differencing(series: &[f64], period: usize) -> usize {
    if period < 2 || series.len() < 2 * period {
        return 0;
    }

    let var_0 = variance(series);
    if var_0.is_nan() || var_0 <= 0.0 {
        return 0;
    }

    let seasonal = seasonal_difference(series, 1, period);
    if variance(&seasonal) < 0.7 * var_0 {
        1
    } else {
        0
    }
}
