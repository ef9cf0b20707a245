//! Decomposition-based forecasting with STL and ETS.
//!
//! The series is decomposed with a periodic STL into trend, seasonal and
//! remainder. Each component is projected on its own and the projections
//! are summed:
//! - seasonal: the last observed cycle is repeated
//! - trend: a line fitted to the last cycle of the trend is extended
//! - remainder: forecast by [`AutoETS`]

use tracing::debug;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::exponential::AutoETS;
use crate::models::Forecaster;
use crate::seasonality::{STLResult, STL};
use crate::utils::stats::linear_fit;

#[derive(Debug, Clone)]
struct Components {
    decomposition: STLResult,
    last_cycle: Vec<f64>,
    /// Intercept and slope of the trend line, indexed from the start of the last cycle.
    trend_line: (f64, f64),
    remainder_model: AutoETS,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

/// STL decomposition with per-component forecasts.
#[derive(Debug, Clone)]
pub struct StlEts {
    period: usize,
    components: Option<Components>,
}

impl StlEts {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            components: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// The STL decomposition of the training series.
    pub fn decomposition(&self) -> Option<&STLResult> {
        self.components.as_ref().map(|c| &c.decomposition)
    }

    /// Specification chosen for the remainder.
    pub fn remainder_model(&self) -> Option<&AutoETS> {
        self.components.as_ref().map(|c| &c.remainder_model)
    }
}

impl Forecaster for StlEts {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        let period = self.period;
        let needed = 2 * period.max(2);
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let decomposition = STL::new(period).decompose(values).ok_or_else(|| {
            ForecastError::ComputationError("STL decomposition failed".to_string())
        })?;
        debug!(
            period,
            seasonal_strength = decomposition.seasonal_strength(),
            "STL decomposition"
        );

        let n = values.len();
        let last_cycle = decomposition.seasonal[n - period..].to_vec();
        let trend_line = linear_fit(&decomposition.trend[n - period..]);

        let mut remainder_model = AutoETS::new();
        remainder_model.fit(&series.with_values(decomposition.remainder.clone())?)?;

        let remainder_fitted = remainder_model
            .fitted_values()
            .ok_or(ForecastError::FitRequired)?;
        let fitted: Vec<f64> = (0..n)
            .map(|i| decomposition.trend[i] + decomposition.seasonal[i] + remainder_fitted[i])
            .collect();
        let residuals = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        self.components = Some(Components {
            decomposition,
            last_cycle,
            trend_line,
            remainder_model,
            fitted,
            residuals,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let components = self.components.as_ref().ok_or(ForecastError::FitRequired)?;
        let remainder = components.remainder_model.predict(horizon)?;
        let (intercept, slope) = components.trend_line;
        let period = self.period;

        let predictions = remainder
            .primary()
            .iter()
            .enumerate()
            .map(|(h, r)| {
                let trend = intercept + slope * (period + h) as f64;
                trend + components.last_cycle[h % period] + r
            })
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.components.as_ref().map(|c| c.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.components.as_ref().map(|c| c.residuals.as_slice())
    }

    fn name(&self) -> &str {
        "STL+ETS"
    }
}
