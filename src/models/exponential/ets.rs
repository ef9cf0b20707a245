//! Non-seasonal ETS models with additive errors.
//!
//! Covers the ETS(A,N,N), ETS(A,A,N) and ETS(A,Ad,N) specifications used to
//! forecast deseasonalized components. Smoothing parameters are estimated
//! by minimizing the sum of squared one-step errors.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// Trend component of a non-seasonal ETS model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendType {
    None,
    Additive,
    AdditiveDamped,
}

impl TrendType {
    /// Number of estimated smoothing parameters.
    ///
    /// Initial states come from the first observations and are not counted.
    pub fn num_params(&self) -> usize {
        match self {
            TrendType::None => 1,           // alpha
            TrendType::Additive => 2,       // alpha, beta
            TrendType::AdditiveDamped => 3, // alpha, beta, phi
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendType::None => "ETS(A,N,N)",
            TrendType::Additive => "ETS(A,A,N)",
            TrendType::AdditiveDamped => "ETS(A,Ad,N)",
        }
    }
}

/// Smoothing parameters of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtsParams {
    pub alpha: f64,
    pub beta: f64,
    pub phi: f64,
}

/// Non-seasonal additive-error ETS model.
#[derive(Debug, Clone)]
pub struct ETS {
    trend: TrendType,
    params: Option<EtsParams>,
    level: Option<f64>,
    slope: f64,
    sse: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    n: usize,
}

struct Pass {
    level: f64,
    slope: f64,
    fitted: Vec<f64>,
    sse: f64,
}

impl ETS {
    pub fn new(trend: TrendType) -> Self {
        Self {
            trend,
            params: None,
            level: None,
            slope: 0.0,
            sse: None,
            fitted: None,
            residuals: None,
            n: 0,
        }
    }

    pub fn trend_type(&self) -> TrendType {
        self.trend
    }

    pub fn params(&self) -> Option<EtsParams> {
        self.params
    }

    /// Corrected Akaike information criterion under Gaussian errors.
    pub fn aicc(&self) -> Option<f64> {
        let sse = self.sse?;
        let n = self.n as f64;
        let k = (self.trend.num_params() + 1) as f64;
        if n - k - 1.0 <= 0.0 {
            return None;
        }
        // Floor keeps perfect fits comparable instead of -inf
        let sigma2 = (sse / n).max(1e-12);
        let aic = n * sigma2.ln() + 2.0 * k;
        Some(aic + 2.0 * k * (k + 1.0) / (n - k - 1.0))
    }

    fn run(values: &[f64], trend: TrendType, params: EtsParams) -> Pass {
        let mut slope = match trend {
            TrendType::None => 0.0,
            _ if values.len() > 1 => values[1] - values[0],
            _ => 0.0,
        };
        // State one step before the first observation
        let mut level = values[0] - slope;
        let phi = match trend {
            TrendType::AdditiveDamped => params.phi,
            _ => 1.0,
        };

        let mut fitted = Vec::with_capacity(values.len());
        let mut sse = 0.0;

        for &y in values {
            let forecast = level + phi * slope;
            fitted.push(forecast);
            let error = y - forecast;
            sse += error * error;

            let level_prev = level;
            level = forecast + params.alpha * error;
            if trend != TrendType::None {
                slope = phi * slope + params.beta * (level - level_prev - phi * slope);
            }
        }

        Pass {
            level,
            slope,
            fitted,
            sse,
        }
    }

    fn optimize(values: &[f64], trend: TrendType) -> EtsParams {
        let config = NelderMeadConfig {
            max_iter: 500,
            tolerance: 1e-8,
            ..Default::default()
        };

        let to_params = |p: &[f64]| EtsParams {
            alpha: p[0],
            beta: p.get(1).copied().unwrap_or(0.0).min(p[0]),
            phi: p.get(2).copied().unwrap_or(1.0),
        };

        let (initial, bounds): (Vec<f64>, Vec<(f64, f64)>) = match trend {
            TrendType::None => (vec![0.5], vec![(0.0001, 0.9999)]),
            TrendType::Additive => (vec![0.5, 0.1], vec![(0.0001, 0.9999); 2]),
            TrendType::AdditiveDamped => (
                vec![0.5, 0.1, 0.9],
                vec![(0.0001, 0.9999), (0.0001, 0.9999), (0.8, 0.98)],
            ),
        };

        let result = nelder_mead(
            |p| Self::run(values, trend, to_params(p)).sse,
            &initial,
            Some(&bounds),
            config,
        );

        to_params(&result.optimal_point)
    }
}

impl Forecaster for ETS {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        let needed = self.trend.num_params() + 3;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let params = Self::optimize(values, self.trend);
        let pass = Self::run(values, self.trend, params);

        self.residuals = Some(
            values
                .iter()
                .zip(pass.fitted.iter())
                .map(|(y, f)| y - f)
                .collect(),
        );
        self.n = values.len();
        self.params = Some(params);
        self.level = Some(pass.level);
        self.slope = pass.slope;
        self.sse = Some(pass.sse);
        self.fitted = Some(pass.fitted);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;
        let params = self.params.ok_or(ForecastError::FitRequired)?;

        let mut predictions = Vec::with_capacity(horizon);
        let mut damp_sum = 0.0;
        for h in 1..=horizon {
            let trend_term = match self.trend {
                TrendType::None => 0.0,
                TrendType::Additive => h as f64 * self.slope,
                TrendType::AdditiveDamped => {
                    damp_sum += params.phi.powi(h as i32);
                    damp_sum * self.slope
                }
            };
            predictions.push(level + trend_term);
        }

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        self.trend.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        TimeSeries::weekly(start, values).unwrap()
    }

    #[test]
    fn additive_trend_extrapolates_line() {
        let ts = make_series((0..30).map(|i| 5.0 + 2.0 * i as f64).collect());
        let mut model = ETS::new(TrendType::Additive);
        model.fit(&ts).unwrap();

        let forecast = model.predict(3).unwrap();
        assert_relative_eq!(forecast.primary()[0], 65.0, epsilon = 1e-6);
        assert_relative_eq!(forecast.primary()[2], 69.0, epsilon = 1e-6);
    }

    #[test]
    fn level_only_model_is_flat() {
        let ts = make_series(vec![3.0, 5.0, 4.0, 6.0, 5.0, 4.0, 5.0, 6.0]);
        let mut model = ETS::new(TrendType::None);
        model.fit(&ts).unwrap();
        let forecast = model.predict(4).unwrap();
        assert!(forecast.primary().windows(2).all(|w| w[0] == w[1]));
        assert!(model.aicc().unwrap().is_finite());
    }

    #[test]
    fn damped_trend_flattens() {
        let ts = make_series((0..30).map(|i| 5.0 + i as f64).collect());
        let mut model = ETS::new(TrendType::AdditiveDamped);
        model.fit(&ts).unwrap();
        let preds = model.predict(40).unwrap().into_values();
        let early = preds[1] - preds[0];
        let late = preds[39] - preds[38];
        assert!(late < early);
    }

    #[test]
    fn insufficient_data() {
        let ts = make_series(vec![1.0, 2.0, 3.0]);
        let mut model = ETS::new(TrendType::Additive);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn aicc_counts_estimated_parameters_only() {
        let ts = make_series(vec![3.0, 5.0, 4.0, 6.0, 5.0, 4.0, 5.0, 6.0, 7.0, 5.0]);
        let mut model = ETS::new(TrendType::Additive);
        model.fit(&ts).unwrap();

        // alpha, beta and the error variance
        let n = 10.0;
        let k = 3.0;
        let sigma2 = (model.sse.unwrap() / n).max(1e-12);
        let expected = n * sigma2.ln() + 2.0 * k + 2.0 * k * (k + 1.0) / (n - k - 1.0);
        assert_relative_eq!(model.aicc().unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn minimum_length_follows_parameter_count() {
        for (trend, needed) in [
            (TrendType::None, 4),
            (TrendType::Additive, 5),
            (TrendType::AdditiveDamped, 6),
        ] {
            let mut model = ETS::new(trend);
            let short = make_series((0..needed - 1).map(|i| i as f64 + 1.0).collect());
            assert_eq!(
                model.fit(&short).unwrap_err(),
                ForecastError::InsufficientData {
                    needed,
                    got: needed - 1
                }
            );
            let enough = make_series((0..needed).map(|i| (i % 3) as f64 + 1.0).collect());
            assert!(model.fit(&enough).is_ok());
        }
    }
}
