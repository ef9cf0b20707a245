//! Simple Exponential Smoothing (SES) forecasting model.
//!
//! SES is suitable for forecasting data with no clear trend or seasonality.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Simple Exponential Smoothing forecaster with a fixed smoothing parameter.
///
/// The model equation is:
/// `level_t = α × y_t + (1-α) × level_{t-1}`
///
/// where α (alpha) is the smoothing parameter (0 < α < 1).
#[derive(Debug, Clone)]
pub struct SimpleExponentialSmoothing {
    alpha: f64,
    level: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SimpleExponentialSmoothing {
    /// Create a new SES model.
    ///
    /// # Arguments
    /// * `alpha` - Smoothing parameter (0 < alpha < 1)
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            level: None,
            fitted: None,
            residuals: None,
        }
    }

    /// Get the smoothing parameter.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the final level.
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// Run the level recursion over `values`.
    ///
    /// Returns the final level and the one-step-ahead fitted values.
    pub(crate) fn smooth(values: &[f64], alpha: f64) -> (f64, Vec<f64>) {
        let mut level = values[0];
        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(level);

        for &y in &values[1..] {
            fitted.push(level);
            level = alpha * y + (1.0 - alpha) * level;
        }

        (level, fitted)
    }

    /// Fit directly on raw values.
    pub(crate) fn fit_values(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }

        let (level, fitted) = Self::smooth(values, self.alpha);
        let residuals = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        self.level = Some(level);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }
}

impl Default for SimpleExponentialSmoothing {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Forecaster for SimpleExponentialSmoothing {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.fit_values(series.primary_values())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;

        // SES produces flat forecasts at the final level
        Ok(Forecast::from_values(vec![level; horizon]))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SimpleExponentialSmoothing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        TimeSeries::weekly(start, values).unwrap()
    }

    #[test]
    fn ses_level_recursion() {
        let ts = make_series(vec![10.0, 12.0, 8.0]);
        let mut model = SimpleExponentialSmoothing::new(0.5);
        model.fit(&ts).unwrap();

        // 10 -> 11 -> 9.5
        assert_relative_eq!(model.level().unwrap(), 9.5, epsilon = 1e-12);
        assert_eq!(model.fitted_values().unwrap(), &[10.0, 10.0, 11.0]);
    }

    #[test]
    fn ses_forecast_is_flat() {
        let ts = make_series(vec![10.0, 12.0, 11.0, 13.0, 12.0, 14.0, 13.0, 15.0]);
        let mut model = SimpleExponentialSmoothing::new(0.3);
        model.fit(&ts).unwrap();

        let forecast = model.predict(4).unwrap();
        let preds = forecast.primary();
        assert_eq!(preds.len(), 4);
        assert!(preds.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn ses_rejects_alpha_outside_unit_interval() {
        let ts = make_series(vec![1.0, 2.0]);
        let mut model = SimpleExponentialSmoothing::new(1.5);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn ses_requires_fit() {
        let model = SimpleExponentialSmoothing::default();
        assert!(matches!(model.predict(1), Err(ForecastError::FitRequired)));
    }
}
