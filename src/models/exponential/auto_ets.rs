//! Automatic ETS model selection.
//!
//! AutoETS fits each candidate non-seasonal specification and keeps the one
//! with the lowest AICc.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::exponential::ets::{TrendType, ETS};
use crate::models::Forecaster;

/// Candidate specifications in preference order (earlier wins ties).
const CANDIDATES: [TrendType; 3] = [
    TrendType::None,
    TrendType::Additive,
    TrendType::AdditiveDamped,
];

/// Automatically selected non-seasonal ETS model.
#[derive(Debug, Clone, Default)]
pub struct AutoETS {
    selected: Option<ETS>,
    scores: Vec<(TrendType, f64)>,
}

impl AutoETS {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected model, once fitted.
    pub fn selected_model(&self) -> Option<&ETS> {
        self.selected.as_ref()
    }

    /// AICc of every candidate that could be fitted.
    pub fn scores(&self) -> &[(TrendType, f64)] {
        &self.scores
    }
}

impl Forecaster for AutoETS {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.scores.clear();
        let mut best: Option<(ETS, f64)> = None;

        for trend in CANDIDATES {
            let mut model = ETS::new(trend);
            if model.fit(series).is_err() {
                continue;
            }
            let Some(score) = model.aicc().filter(|s| s.is_finite()) else {
                continue;
            };
            self.scores.push((trend, score));

            if best.as_ref().map_or(true, |(_, b)| score < *b) {
                best = Some((model, score));
            }
        }

        let (model, _) = best.ok_or_else(|| {
            ForecastError::ComputationError("no ETS specification could be fitted".to_string())
        })?;
        self.selected = Some(model);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.selected
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict(horizon)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.selected.as_ref().and_then(|m| m.fitted_values())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.selected.as_ref().and_then(|m| m.residuals())
    }

    fn name(&self) -> &str {
        "AutoETS"
    }
}
