//! Linear model with trend and seasonal dummies.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::regression::design::{RegressionFit, SeasonalDesign};
use crate::models::Forecaster;

/// Time series linear model: `y_t = b0 + b1 t + sum_s g_s D_s(t)`.
///
/// One dummy per season except the first; forecasts extrapolate the trend
/// and repeat the seasonal coefficients.
#[derive(Debug, Clone)]
pub struct Tslm {
    period: usize,
    fit: Option<RegressionFit>,
}

impl Tslm {
    pub fn new(period: usize) -> Self {
        Self { period, fit: None }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Fitted `(intercept, slope)`.
    pub fn trend(&self) -> Option<(f64, f64)> {
        let fit = self.fit.as_ref()?;
        Some((fit.ols.coefficients[0]?, fit.ols.coefficients[1]?))
    }
}

impl Forecaster for Tslm {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let design = SeasonalDesign {
            period: self.period,
            dummies: true,
            harmonics: 0,
        };
        self.fit = Some(RegressionFit::fit(design, series)?);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.fit
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict(horizon)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.ols.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.residuals.as_slice())
    }

    fn name(&self) -> &str {
        "TSLM"
    }
}
