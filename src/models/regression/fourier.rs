//! Linear model with trend, seasonal dummies and Fourier terms.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::regression::design::{RegressionFit, SeasonalDesign};
use crate::models::Forecaster;

/// Regression on intercept, trend, seasonal dummies and harmonics of the period.
///
/// With the dummies present the harmonic columns are linear combinations of
/// them; such aliased columns get no coefficient, so the forecast matches
/// the dummy-only model. [`FourierRegression::harmonics`] drops the dummies
/// and keeps `k` sine/cosine pairs instead.
#[derive(Debug, Clone)]
pub struct FourierRegression {
    design: SeasonalDesign,
    fit: Option<RegressionFit>,
}

impl FourierRegression {
    /// Dummies plus the first sine/cosine pair.
    pub fn new(period: usize) -> Self {
        Self {
            design: SeasonalDesign {
                period,
                dummies: true,
                harmonics: 1,
            },
            fit: None,
        }
    }

    /// Trend plus `k` sine/cosine pairs, without dummies.
    pub fn harmonics(period: usize, k: usize) -> Self {
        Self {
            design: SeasonalDesign {
                period,
                dummies: false,
                harmonics: k,
            },
            fit: None,
        }
    }

    pub fn period(&self) -> usize {
        self.design.period
    }

    /// Number of design columns that received a coefficient.
    pub fn rank(&self) -> Option<usize> {
        self.fit.as_ref().map(|f| f.ols.rank())
    }

    /// Number of design columns.
    pub fn width(&self) -> usize {
        self.design.width()
    }
}

impl Forecaster for FourierRegression {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.fit = Some(RegressionFit::fit(self.design, series)?);
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
        "FourierRegression"
    }
}
