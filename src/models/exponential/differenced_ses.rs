//! Simple exponential smoothing on a seasonally and first-differenced series.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, integrate, seasonal_difference};
use crate::models::exponential::SimpleExponentialSmoothing;
use crate::models::Forecaster;

/// SES fitted after removing seasonality (lag `period`) and trend (lag 1).
///
/// By default forecasts stay on the doubly differenced scale: the flat SES
/// level is returned as is. With [`DifferencedSes::reintegrated`] the level
/// is integrated back through both differences so forecasts are on the
/// scale of the input series.
#[derive(Debug, Clone)]
pub struct DifferencedSes {
    period: usize,
    reintegrate: bool,
    ses: SimpleExponentialSmoothing,
    history: Option<Vec<f64>>,
    seasonal_diff: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl DifferencedSes {
    /// Forecasts on the differenced scale.
    pub fn new(alpha: f64, period: usize) -> Self {
        Self {
            period,
            reintegrate: false,
            ses: SimpleExponentialSmoothing::new(alpha),
            history: None,
            seasonal_diff: None,
            residuals: None,
        }
    }

    /// Forecasts integrated back to the original scale.
    pub fn reintegrated(alpha: f64, period: usize) -> Self {
        Self {
            reintegrate: true,
            ..Self::new(alpha, period)
        }
    }

    pub fn alpha(&self) -> f64 {
        self.ses.alpha()
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn is_reintegrated(&self) -> bool {
        self.reintegrate
    }

    /// Undo first then seasonal differencing for a flat differenced forecast.
    fn undifference(&self, level: f64, horizon: usize) -> Result<Vec<f64>> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        let seasonal_diff = self
            .seasonal_diff
            .as_ref()
            .ok_or(ForecastError::FitRequired)?;

        let seasonal = integrate(&vec![level; horizon], seasonal_diff, 1);
        Ok(integrate(&seasonal, history, self.period))
    }
}

impl Forecaster for DifferencedSes {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        let needed = self.period + 2;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let seasonal = seasonal_difference(values, 1, self.period);
        let doubly = difference(&seasonal, 1);

        self.ses.fit_values(&doubly)?;
        self.residuals = self.ses.residuals().map(|r| r.to_vec());
        self.history = Some(values.to_vec());
        self.seasonal_diff = Some(seasonal);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.ses.level().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let predictions = if self.reintegrate {
            self.undifference(level, horizon)?
        } else {
            vec![level; horizon]
        };

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.ses.fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "DifferencedSES"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>, period: usize) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2020, 1, 5, 0, 0, 0).unwrap();
        TimeSeries::weekly(start, values)
            .unwrap()
            .with_period(period)
            .unwrap()
    }

    #[test]
    fn forecasts_stay_on_differenced_scale() {
        // Seasonal pattern plus linear trend: doubly differenced series is zero
        let values: Vec<f64> = (0..40)
            .map(|i| 50.0 + 0.5 * i as f64 + [3.0, -1.0, 2.0, -4.0][i % 4])
            .collect();
        let ts = make_series(values, 4);

        let mut model = DifferencedSes::new(0.5, 4);
        model.fit(&ts).unwrap();

        let forecast = model.predict(6).unwrap();
        assert_eq!(forecast.horizon(), 6);
        for &v in forecast.primary() {
            assert_relative_eq!(v, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn reintegrated_forecast_continues_pattern() {
        let pattern = [3.0, -1.0, 2.0, -4.0];
        let values: Vec<f64> = (0..40)
            .map(|i| 50.0 + 0.5 * i as f64 + pattern[i % 4])
            .collect();
        let ts = make_series(values, 4);

        let mut model = DifferencedSes::reintegrated(0.5, 4);
        model.fit(&ts).unwrap();

        let forecast = model.predict(8).unwrap();
        for (h, &v) in forecast.primary().iter().enumerate() {
            let i = 40 + h;
            let expected = 50.0 + 0.5 * i as f64 + pattern[i % 4];
            assert_relative_eq!(v, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn requires_more_than_one_season() {
        let ts = make_series(vec![1.0; 5], 4);
        let mut model = DifferencedSes::new(0.5, 4);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { needed: 6, got: 5 })
        ));
    }
}
