//! Automatic seasonal ARIMA model selection.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{
    seasonal_difference, suggest_differencing, suggest_seasonal_differencing,
};
use crate::models::arima::model::{ModelOrder, ARIMA};
use crate::models::Forecaster;
use crate::utils::stats::is_constant;

/// Configuration for AutoARIMA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoARIMAConfig {
    /// Maximum non-seasonal AR order to consider.
    pub max_p: usize,
    /// Maximum non-seasonal MA order to consider.
    pub max_q: usize,
    /// Maximum non-seasonal differencing order.
    pub max_d: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    /// Maximum seasonal differencing order.
    pub max_cap_d: usize,
    /// Seasonal period (0 or 1 for non-seasonal).
    pub seasonal_period: usize,
    /// Rank candidates by AICc instead of AIC.
    pub use_aicc: bool,
}

impl Default for AutoARIMAConfig {
    fn default() -> Self {
        Self {
            max_p: 2,
            max_q: 2,
            max_d: 2,
            max_cap_p: 1,
            max_cap_q: 1,
            max_cap_d: 1,
            seasonal_period: 0,
            use_aicc: false,
        }
    }
}

impl AutoARIMAConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_cap_p = max_p;
        self.max_cap_d = max_d;
        self.max_cap_q = max_q;
        self
    }

    /// Set seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }
}

/// Automatic ARIMA(p, d, q)(P, D, Q)\[s\] selection.
///
/// Differencing orders are chosen first (seasonal, then regular, with
/// variance-ratio heuristics). Every ARMA order within the configured
/// bounds is then fitted and the lowest information criterion wins, with
/// simpler models winning ties. A constant input selects ARIMA(0,0,0)
/// without searching.
#[derive(Debug, Clone)]
pub struct AutoARIMA {
    config: AutoARIMAConfig,
    selected: Option<ARIMA>,
    model_scores: Vec<(ModelOrder, f64)>,
}

impl AutoARIMA {
    pub fn new() -> Self {
        Self::with_config(AutoARIMAConfig::default())
    }

    pub fn with_config(config: AutoARIMAConfig) -> Self {
        Self {
            config,
            selected: None,
            model_scores: Vec::new(),
        }
    }

    /// Seasonal search with default bounds.
    pub fn seasonal(period: usize) -> Self {
        Self::with_config(AutoARIMAConfig::default().with_seasonal_period(period))
    }

    pub fn config(&self) -> &AutoARIMAConfig {
        &self.config
    }

    /// Order of the selected model.
    pub fn selected_order(&self) -> Option<ModelOrder> {
        self.selected.as_ref().map(|m| m.order())
    }

    /// Criterion value of every candidate that could be fitted, in search order.
    pub fn model_scores(&self) -> &[(ModelOrder, f64)] {
        &self.model_scores
    }

    fn seasonal_period(&self) -> usize {
        if self.config.seasonal_period > 1 {
            self.config.seasonal_period
        } else {
            0
        }
    }

    fn candidates(&self, d: usize, cap_d: usize) -> Vec<ModelOrder> {
        let s = self.seasonal_period();
        let (max_cap_p, max_cap_q) = if s > 1 {
            (self.config.max_cap_p, self.config.max_cap_q)
        } else {
            (0, 0)
        };

        let mut candidates = Vec::new();
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                for cap_p in 0..=max_cap_p {
                    for cap_q in 0..=max_cap_q {
                        candidates.push(ModelOrder::seasonal(p, d, q, cap_p, cap_d, cap_q, s));
                    }
                }
            }
        }
        candidates.sort_by_key(|o| o.p + o.q + o.cap_p + o.cap_q);
        candidates
    }

    fn criterion(&self, model: &ARIMA) -> Option<f64> {
        if self.config.use_aicc {
            model.aicc()
        } else {
            model.aic()
        }
    }
}

impl Default for AutoARIMA {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for AutoARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.len() < 4 {
            return Err(ForecastError::InsufficientData {
                needed: 4,
                got: values.len(),
            });
        }

        self.model_scores.clear();

        if is_constant(values, 1e-10) {
            let mut model = ARIMA::new(ModelOrder::new(0, 0, 0));
            model.fit(series)?;
            if let Some(score) = self.criterion(&model) {
                self.model_scores.push((model.order(), score));
            }
            self.selected = Some(model);
            return Ok(());
        }

        let s = self.seasonal_period();
        let cap_d = if s > 1 {
            suggest_seasonal_differencing(values, s).min(self.config.max_cap_d)
        } else {
            0
        };
        let seasonally_differenced = seasonal_difference(values, cap_d, s);
        let d = suggest_differencing(&seasonally_differenced).min(self.config.max_d);

        let fitted: Vec<(ARIMA, f64)> = self
            .candidates(d, cap_d)
            .into_par_iter()
            .filter_map(|order| {
                let mut model = ARIMA::new(order);
                model.fit(series).ok()?;
                let score = self.criterion(&model).filter(|v| v.is_finite())?;
                Some((model, score))
            })
            .collect();

        let mut best: Option<(ARIMA, f64)> = None;
        for (model, score) in fitted {
            self.model_scores.push((model.order(), score));
            if best.as_ref().map_or(true, |(_, b)| score < *b) {
                best = Some((model, score));
            }
        }

        let (model, _) = best.ok_or_else(|| {
            ForecastError::ComputationError("no ARIMA candidate could be fitted".to_string())
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
        "AutoARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2019, 1, 6, 0, 0, 0).unwrap();
        TimeSeries::weekly(start, values).unwrap()
    }

    #[test]
    fn constant_series_selects_mean_model() {
        let mut model = AutoARIMA::seasonal(52);
        model.fit(&make_series(vec![7.0; 150])).unwrap();

        assert_eq!(model.selected_order(), Some(ModelOrder::new(0, 0, 0)));
        let forecast = model.predict(52).unwrap();
        assert_eq!(forecast.horizon(), 52);
        for &v in forecast.primary() {
            assert_relative_eq!(v, 7.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn candidate_bounds_respected() {
        let model = AutoARIMA::seasonal(12);
        let candidates = model.candidates(1, 1);
        assert_eq!(candidates.len(), 3 * 3 * 2 * 2);
        assert!(candidates
            .iter()
            .all(|o| o.p <= 2 && o.q <= 2 && o.cap_p <= 1 && o.cap_q <= 1));
        assert_eq!(candidates[0], ModelOrder::seasonal(0, 1, 0, 0, 1, 0, 12));

        let plain = AutoARIMA::new().candidates(0, 0);
        assert_eq!(plain.len(), 9);
        assert!(plain.iter().all(|o| !o.is_seasonal()));
    }

    #[test]
    fn seasonal_series_is_seasonally_differenced() {
        let pattern = [6.0, -3.0, 2.0, -5.0, 1.0, -1.0];
        let values: Vec<f64> = (0..72)
            .map(|i| 30.0 + 0.2 * i as f64 + pattern[i % 6])
            .collect();
        let mut model = AutoARIMA::seasonal(6);
        model.fit(&make_series(values)).unwrap();

        let order = model.selected_order().unwrap();
        assert_eq!(order.cap_d, 1);
        assert!(!model.model_scores().is_empty());

        let forecast = model.predict(6).unwrap();
        for (h, &v) in forecast.primary().iter().enumerate() {
            let i = 72 + h;
            let expected = 30.0 + 0.2 * i as f64 + pattern[i % 6];
            assert!((v - expected).abs() < 1.0, "step {}: {} vs {}", h, v, expected);
        }
    }

    #[test]
    fn requires_fit() {
        let model = AutoARIMA::new();
        assert!(matches!(model.predict(3), Err(ForecastError::FitRequired)));
        assert!(model.selected_order().is_none());
    }

    #[test]
    fn insufficient_data() {
        let mut model = AutoARIMA::new();
        assert!(matches!(
            model.fit(&make_series(vec![1.0, 2.0, 3.0])),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
