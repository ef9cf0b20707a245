//! Deterministic regressors for time series linear models.

use std::f64::consts::PI;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::utils::ols::{ols_fit, OLSResult};

/// Columns of a trend/season design matrix.
///
/// Row `t` (1-based time index) holds, in order: intercept, `t`, one dummy
/// per season except the first, then `sin(2 pi k t / P)` and
/// `cos(2 pi k t / P)` for each harmonic `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeasonalDesign {
    pub period: usize,
    pub dummies: bool,
    pub harmonics: usize,
}

impl SeasonalDesign {
    pub fn width(&self) -> usize {
        let dummies = if self.dummies {
            self.period.saturating_sub(1)
        } else {
            0
        };
        2 + dummies + 2 * self.harmonics
    }

    pub fn row(&self, t: usize) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t as f64);
        if self.dummies {
            let season = (t - 1) % self.period;
            row.extend((1..self.period).map(|s| if s == season { 1.0 } else { 0.0 }));
        }
        for k in 1..=self.harmonics {
            let angle = 2.0 * PI * (k * t) as f64 / self.period as f64;
            row.push(angle.sin());
            row.push(angle.cos());
        }
        row
    }

    fn columns(&self, n: usize) -> Vec<Vec<f64>> {
        let rows: Vec<Vec<f64>> = (1..=n).map(|t| self.row(t)).collect();
        (0..self.width())
            .map(|j| rows.iter().map(|r| r[j]).collect())
            .collect()
    }
}

/// Fitted state shared by the regression strategies.
#[derive(Debug, Clone)]
pub(crate) struct RegressionFit {
    pub design: SeasonalDesign,
    pub ols: OLSResult,
    pub residuals: Vec<f64>,
    pub n: usize,
}

impl RegressionFit {
    pub fn fit(design: SeasonalDesign, series: &TimeSeries) -> Result<Self> {
        if design.period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        let values = series.primary_values();
        if values.len() < 3 {
            return Err(ForecastError::InsufficientData {
                needed: 3,
                got: values.len(),
            });
        }

        let ols = ols_fit(&design.columns(values.len()), values)?;
        let residuals = values
            .iter()
            .zip(ols.fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        Ok(Self {
            design,
            ols,
            residuals,
            n: values.len(),
        })
    }

    pub fn predict(&self, horizon: usize) -> Result<Forecast> {
        let predictions = (1..=horizon)
            .map(|h| self.ols.predict_row(&self.design.row(self.n + h)))
            .collect::<Result<Vec<f64>>>()?;
        Ok(Forecast::from_values(predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dummy_rows_use_first_season_as_baseline() {
        let design = SeasonalDesign {
            period: 4,
            dummies: true,
            harmonics: 0,
        };
        assert_eq!(design.width(), 5);
        assert_eq!(design.row(1), vec![1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(design.row(3), vec![1.0, 3.0, 0.0, 1.0, 0.0]);
        assert_eq!(design.row(5), vec![1.0, 5.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn harmonic_columns() {
        let design = SeasonalDesign {
            period: 4,
            dummies: false,
            harmonics: 1,
        };
        let row = design.row(1);
        assert_eq!(row.len(), 4);
        assert_relative_eq!(row[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(row[3], 0.0, epsilon = 1e-12);
    }
}
