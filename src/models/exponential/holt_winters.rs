//! Additive Holt-Winters forecasting model.
//!
//! Also known as triple exponential smoothing, this model handles
//! data with both trend and seasonality. The exponential-smoothing
//! family used here is only defined for seasonal periods up to
//! [`MAX_SEASONAL_PERIOD`]; longer cycles are rejected as unsupported.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// Largest seasonal period the model accepts.
pub const MAX_SEASONAL_PERIOD: usize = 24;

/// Additive Holt-Winters forecaster with optimized smoothing parameters.
///
/// The model equations:
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h*b_t + s_{t+h-m}`
#[derive(Debug, Clone)]
pub struct HoltWinters {
    seasonal_period: usize,
    params: Option<(f64, f64, f64)>,
    level: Option<f64>,
    trend: Option<f64>,
    seasonals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    n: usize,
}

/// Smoothing state after one pass over the data.
struct Pass {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    fitted: Vec<f64>,
    sse: f64,
}

impl HoltWinters {
    /// Create a Holt-Winters model whose parameters are optimized on fit.
    pub fn new(seasonal_period: usize) -> Self {
        Self {
            seasonal_period,
            params: None,
            level: None,
            trend: None,
            seasonals: None,
            fitted: None,
            residuals: None,
            n: 0,
        }
    }

    /// Whether the model can be fitted for a given seasonal period.
    pub fn supports_period(period: usize) -> bool {
        (2..=MAX_SEASONAL_PERIOD).contains(&period)
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    /// Optimized (alpha, beta, gamma).
    pub fn params(&self) -> Option<(f64, f64, f64)> {
        self.params
    }

    /// Initialize state from the first two seasons.
    fn initialize_state(values: &[f64], period: usize) -> (f64, f64, Vec<f64>) {
        let level = values[..period].iter().sum::<f64>() / period as f64;

        let trend = (0..period)
            .map(|i| (values[period + i] - values[i]) / period as f64)
            .sum::<f64>()
            / period as f64;

        let mut seasonals: Vec<f64> = values[..period].iter().map(|y| y - level).collect();
        let adjustment = seasonals.iter().sum::<f64>() / period as f64;
        for s in seasonals.iter_mut() {
            *s -= adjustment;
        }

        (level, trend, seasonals)
    }

    fn run(values: &[f64], period: usize, alpha: f64, beta: f64, gamma: f64) -> Pass {
        let (mut level, mut trend, mut seasonals) = Self::initialize_state(values, period);
        let mut fitted = Vec::with_capacity(values.len());
        let mut sse = 0.0;

        // First season seeds the state
        fitted.extend(values[..period].iter().map(|_| f64::NAN));

        for (t, &y) in values.iter().enumerate().skip(period) {
            let idx = t % period;
            let s = seasonals[idx];
            let forecast = level + trend + s;
            fitted.push(forecast);
            sse += (y - forecast).powi(2);

            let level_prev = level;
            level = alpha * (y - s) + (1.0 - alpha) * (level_prev + trend);
            trend = beta * (level - level_prev) + (1.0 - beta) * trend;
            seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
        }

        Pass {
            level,
            trend,
            seasonals,
            fitted,
            sse,
        }
    }

    fn optimize_params(values: &[f64], period: usize) -> (f64, f64, f64) {
        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };
        let bounds = [(0.0001, 0.9999); 3];

        let result = nelder_mead(
            |p| Self::run(values, period, p[0], p[1], p[2]).sse,
            &[0.3, 0.1, 0.1],
            Some(&bounds),
            config,
        );

        (
            result.optimal_point[0].clamp(0.0001, 0.9999),
            result.optimal_point[1].clamp(0.0001, 0.9999),
            result.optimal_point[2].clamp(0.0001, 0.9999),
        )
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let period = self.seasonal_period;
        if !Self::supports_period(period) {
            return Err(ForecastError::Unsupported(format!(
                "Holt-Winters requires a seasonal period between 2 and {}, got {}",
                MAX_SEASONAL_PERIOD, period
            )));
        }

        let values = series.primary_values();
        if values.len() < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period,
                got: values.len(),
            });
        }

        let (alpha, beta, gamma) = Self::optimize_params(values, period);
        let pass = Self::run(values, period, alpha, beta, gamma);

        let residuals = values
            .iter()
            .zip(pass.fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        self.n = values.len();
        self.params = Some((alpha, beta, gamma));
        self.level = Some(pass.level);
        self.trend = Some(pass.trend);
        self.seasonals = Some(pass.seasonals);
        self.fitted = Some(pass.fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;
        let trend = self.trend.ok_or(ForecastError::FitRequired)?;
        let seasonals = self.seasonals.as_ref().ok_or(ForecastError::FitRequired)?;
        let period = self.seasonal_period;

        let predictions = (1..=horizon)
            .map(|h| level + h as f64 * trend + seasonals[(self.n + h - 1) % period])
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
        "HoltWinters"
    }
}
