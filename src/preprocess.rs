//! Series cleaning and train/validation splitting.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Value substituted for exact zeros so percentage errors stay defined.
pub const ZERO_SUBSTITUTE: f64 = 1.0;

/// Chronological partition of a series into a training prefix and a
/// validation suffix.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: TimeSeries,
    pub valid: TimeSeries,
}

/// Replace every value equal to exactly zero with [`ZERO_SUBSTITUTE`].
///
/// Interest values are never negative; a negative observation is rejected.
/// Returns a new series; the input is left untouched.
pub fn sanitize(series: &TimeSeries) -> Result<TimeSeries> {
    let observed = series.primary_values();
    if let Some(i) = observed.iter().position(|v| *v < 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "negative interest value {} at {}",
            observed[i],
            series.timestamps()[i]
        )));
    }

    let values = series
        .primary_values()
        .iter()
        .map(|&v| if v == 0.0 { ZERO_SUBSTITUTE } else { v })
        .collect();
    series.with_values(values)
}

/// Split off the last `n_valid` points as the validation window.
pub fn split(series: &TimeSeries, n_valid: usize) -> Result<Split> {
    let n = series.len();
    if n <= n_valid {
        return Err(ForecastError::InsufficientData {
            needed: n_valid + 1,
            got: n,
        });
    }

    let cut = n - n_valid;
    Ok(Split {
        train: series.slice(0, cut)?,
        valid: series.slice(cut, n)?,
    })
}
