//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value from the same season in the previous cycle.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Seasonal Naive forecaster.
///
/// Each forecast is equal to the observation from the same season
/// in the last complete cycle of the training data.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    history: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SeasonalNaive {
    /// Create a new SeasonalNaive model with the given seasonal period.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            history: None,
            fitted: None,
            residuals: None,
        }
    }

    /// Get the seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Forecaster for SeasonalNaive {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if self.period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        if values.len() < self.period {
            return Err(ForecastError::InsufficientData {
                needed: self.period,
                got: values.len(),
            });
        }

        self.history = Some(values.to_vec());

        // Fitted values: y_hat[t] = y[t - period]
        let fitted: Vec<f64> = (0..values.len())
            .map(|i| {
                if i < self.period {
                    f64::NAN
                } else {
                    values[i - self.period]
                }
            })
            .collect();

        let residuals = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let n = history.len();
        let predictions = (0..horizon)
            .map(|h| history[n - self.period + (h % self.period)])
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SeasonalNaive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>, period: usize) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        TimeSeries::weekly(start, values)
            .unwrap()
            .with_period(period)
            .unwrap()
    }

    #[test]
    fn seasonal_naive_repeats_last_cycle() {
        let ts = make_series(vec![10.0, 20.0, 30.0, 40.0, 11.0, 21.0, 31.0, 41.0], 4);

        let mut model = SeasonalNaive::new(4);
        model.fit(&ts).unwrap();

        let forecast = model.predict(4).unwrap();
        assert_eq!(forecast.primary(), &[11.0, 21.0, 31.0, 41.0]);
    }

    #[test]
    fn seasonal_naive_forecast_beyond_one_season() {
        let ts = make_series(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 4);

        let mut model = SeasonalNaive::new(4);
        model.fit(&ts).unwrap();

        let forecast = model.predict(10).unwrap();
        assert_eq!(
            forecast.primary(),
            &[5.0, 6.0, 7.0, 8.0, 5.0, 6.0, 7.0, 8.0, 5.0, 6.0]
        );
    }

    #[test]
    fn seasonal_naive_weekly_year_offset() {
        let values: Vec<f64> = (0..130).map(|i| (i % 52) as f64 + (i / 52) as f64).collect();
        let ts = make_series(values.clone(), 52);

        let mut model = SeasonalNaive::new(52);
        model.fit(&ts).unwrap();
        let forecast = model.predict(52).unwrap();

        let n = values.len();
        for (k, &pred) in forecast.primary().iter().enumerate() {
            assert_eq!(pred, values[n - 52 + (k % 52)]);
        }
    }

    #[test]
    fn seasonal_naive_requires_full_season() {
        let ts = make_series(vec![1.0, 2.0, 3.0], 4);

        let mut model = SeasonalNaive::new(4);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { needed: 4, got: 3 })
        ));
    }

    #[test]
    fn seasonal_naive_fitted_values_and_residuals() {
        let ts = make_series(vec![1.0, 2.0, 3.0, 4.0, 2.0, 3.0, 4.0, 5.0], 4);

        let mut model = SeasonalNaive::new(4);
        model.fit(&ts).unwrap();

        let fitted = model.fitted_values().unwrap();
        assert!(fitted[..4].iter().all(|f| f.is_nan()));
        assert_eq!(&fitted[4..], &[1.0, 2.0, 3.0, 4.0]);

        let residuals = model.residuals().unwrap();
        assert_relative_eq!(residuals[4], 1.0, epsilon = 1e-10);
        assert_relative_eq!(residuals[7], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn seasonal_naive_requires_fit() {
        let model = SeasonalNaive::new(52);
        assert!(matches!(model.predict(3), Err(ForecastError::FitRequired)));
    }
}
