//! Moving average forecasters with flat-line extrapolation.
//!
//! Two variants are provided:
//! - `Trailing`: mean of the `order` observations ending at each point
//! - `Centered`: symmetric moving average around each point; even orders
//!   use the 2x`order` weighting so the window stays centered

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Placement of the averaging window relative to each point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovingAverageKind {
    Trailing,
    Centered,
}

/// Moving average forecaster.
///
/// The moving average is computed over the whole fitted series and the
/// last defined value is repeated across the horizon.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    order: usize,
    kind: MovingAverageKind,
    last_average: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl MovingAverage {
    /// Create a moving average of the given order and kind.
    pub fn new(order: usize, kind: MovingAverageKind) -> Self {
        Self {
            order,
            kind,
            last_average: None,
            fitted: None,
            residuals: None,
        }
    }

    /// Trailing moving average of `order` observations.
    pub fn trailing(order: usize) -> Self {
        Self::new(order, MovingAverageKind::Trailing)
    }

    /// Centered moving average of `order` observations.
    pub fn centered(order: usize) -> Self {
        Self::new(order, MovingAverageKind::Centered)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn kind(&self) -> MovingAverageKind {
        self.kind
    }

    /// Last defined moving-average value.
    pub fn last_average(&self) -> Option<f64> {
        self.last_average
    }

    /// Number of observations the series must have for one defined value.
    fn min_length(&self) -> usize {
        match self.kind {
            MovingAverageKind::Trailing => self.order,
            MovingAverageKind::Centered if self.order % 2 == 0 => self.order + 1,
            MovingAverageKind::Centered => self.order,
        }
    }

    /// Moving-average series aligned with the input; undefined edges are NaN.
    pub fn smooth(&self, values: &[f64]) -> Vec<f64> {
        match self.kind {
            MovingAverageKind::Trailing => trailing_average(values, self.order),
            MovingAverageKind::Centered => centered_average(values, self.order),
        }
    }
}

fn trailing_average(values: &[f64], order: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if order == 0 || n < order {
        return result;
    }

    let mut sum: f64 = values[..order].iter().sum();
    result[order - 1] = sum / order as f64;
    for i in order..n {
        sum += values[i] - values[i - order];
        result[i] = sum / order as f64;
    }
    result
}

fn centered_average(values: &[f64], order: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if order == 0 {
        return result;
    }

    let half = order / 2;
    if order % 2 == 1 {
        for i in half..n.saturating_sub(half) {
            let sum: f64 = values[i - half..=i + half].iter().sum();
            result[i] = sum / order as f64;
        }
    } else {
        // 2xMA: end points weighted by one half
        for i in half..n.saturating_sub(half) {
            let inner: f64 = values[i + 1 - half..i + half].iter().sum();
            let edges = 0.5 * (values[i - half] + values[i + half]);
            result[i] = (inner + edges) / order as f64;
        }
    }
    result
}

impl Forecaster for MovingAverage {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();

        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if self.order == 0 {
            return Err(ForecastError::InvalidParameter(
                "moving average order must be positive".to_string(),
            ));
        }
        if values.len() < self.min_length() {
            return Err(ForecastError::InsufficientData {
                needed: self.min_length(),
                got: values.len(),
            });
        }

        let fitted = self.smooth(values);
        let last_average = fitted
            .iter()
            .rev()
            .find(|v| !v.is_nan())
            .copied()
            .ok_or_else(|| {
                ForecastError::ComputationError("no defined moving-average value".to_string())
            })?;

        let residuals = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        self.last_average = Some(last_average);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.last_average.ok_or(ForecastError::FitRequired)?;
        Ok(Forecast::from_values(vec![level; horizon]))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        match self.kind {
            MovingAverageKind::Trailing => "MovingAverage",
            MovingAverageKind::Centered => "CenteredMovingAverage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2021, 1, 3, 0, 0, 0).unwrap();
        TimeSeries::weekly(start, values).unwrap()
    }

    #[test]
    fn trailing_average_uses_last_window() {
        let ts = make_series((1..=20).map(|i| i as f64).collect());
        let mut model = MovingAverage::trailing(12);
        model.fit(&ts).unwrap();

        // mean of 9..=20
        assert_relative_eq!(model.last_average().unwrap(), 14.5, epsilon = 1e-12);
        let forecast = model.predict(5).unwrap();
        assert!(forecast.primary().iter().all(|&v| (v - 14.5).abs() < 1e-12));

        let fitted = model.fitted_values().unwrap();
        assert!(fitted[10].is_nan());
        assert_relative_eq!(fitted[11], 6.5, epsilon = 1e-12);
    }

    #[test]
    fn centered_even_order_uses_two_by_ma() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let ts = make_series(values);
        let mut model = MovingAverage::centered(12);
        model.fit(&ts).unwrap();

        let fitted = model.fitted_values().unwrap();
        // Linear input: centered average reproduces the midpoint
        assert!(fitted[5].is_nan());
        assert_relative_eq!(fitted[6], 6.0, epsilon = 1e-12);
        assert_relative_eq!(fitted[23], 23.0, epsilon = 1e-12);
        assert!(fitted[24].is_nan());
        assert_relative_eq!(model.last_average().unwrap(), 23.0, epsilon = 1e-12);
    }

    #[test]
    fn centered_odd_order() {
        let ts = make_series(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut model = MovingAverage::centered(3);
        model.fit(&ts).unwrap();
        assert_relative_eq!(model.last_average().unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_series_forecasts_constant() {
        let ts = make_series(vec![10.0; 60]);
        for mut model in [MovingAverage::trailing(12), MovingAverage::centered(12)] {
            model.fit(&ts).unwrap();
            let forecast = model.predict(52).unwrap();
            assert_eq!(forecast.horizon(), 52);
            assert!(forecast.primary().iter().all(|&v| (v - 10.0).abs() < 1e-12));
        }
    }

    #[test]
    fn insufficient_data_for_window() {
        let ts = make_series(vec![1.0; 12]);
        let mut model = MovingAverage::centered(12);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { needed: 13, got: 12 })
        ));
    }

    #[test]
    fn names_distinguish_variants() {
        assert_eq!(MovingAverage::trailing(12).name(), "MovingAverage");
        assert_eq!(MovingAverage::centered(12).name(), "CenteredMovingAverage");
    }
}
