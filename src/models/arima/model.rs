//! Seasonal ARIMA model estimated by conditional sum of squares.

use std::fmt;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, integrate, seasonal_difference};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::mean;

/// Bounds on AR and MA coefficients during estimation.
const COEFFICIENT_BOUND: f64 = 0.99;

/// Model order (p, d, q)(P, D, Q)\[s\].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelOrder {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub cap_p: usize,
    /// Seasonal differencing order.
    pub cap_d: usize,
    /// Seasonal MA order.
    pub cap_q: usize,
    /// Seasonal period.
    pub s: usize,
}

impl ModelOrder {
    /// Non-seasonal ARIMA(p, d, q).
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::seasonal(p, d, q, 0, 0, 0, 0)
    }

    /// Seasonal ARIMA(p, d, q)(P, D, Q)\[s\].
    pub fn seasonal(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// Check if this is a seasonal model.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// A constant (mean or drift) is estimated when at most one difference is taken.
    pub fn includes_constant(&self) -> bool {
        self.d + self.cap_d <= 1
    }

    /// Number of estimated coefficients, excluding the innovation variance.
    pub fn num_coefficients(&self) -> usize {
        let seasonal = if self.s > 1 {
            self.cap_p + self.cap_q
        } else {
            0
        };
        self.p + self.q + seasonal + usize::from(self.includes_constant())
    }

    /// Largest lag of the expanded AR polynomial.
    fn max_ar_lag(&self) -> usize {
        self.p + self.seasonal_lag(self.cap_p)
    }

    /// Observations consumed by differencing.
    fn differencing_loss(&self) -> usize {
        self.d + self.seasonal_lag(self.cap_d)
    }

    fn seasonal_lag(&self, order: usize) -> usize {
        if self.s > 1 {
            order * self.s
        } else {
            0
        }
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.is_seasonal() {
            write!(f, "({},{},{})[{}]", self.cap_p, self.cap_d, self.cap_q, self.s)?;
        }
        Ok(())
    }
}

/// Estimated coefficients of a seasonal ARIMA model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coefficients {
    pub constant: f64,
    pub ar: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
}

impl Coefficients {
    fn unpack(order: &ModelOrder, params: &[f64], fallback_constant: f64) -> Self {
        let mut rest = params;
        let mut take = |len: usize| {
            let (head, tail) = rest.split_at(len.min(rest.len()));
            rest = tail;
            head.to_vec()
        };
        let constant = if order.includes_constant() {
            take(1).first().copied().unwrap_or(fallback_constant)
        } else {
            0.0
        };
        let (sp, sq) = if order.s > 1 {
            (order.cap_p, order.cap_q)
        } else {
            (0, 0)
        };
        Self {
            constant,
            ar: take(order.p),
            seasonal_ar: take(sp),
            ma: take(order.q),
            seasonal_ma: take(sq),
        }
    }

    /// Predictive AR lags of `(1 - phi(B))(1 - Phi(B^s))`.
    fn ar_lags(&self, s: usize) -> Vec<(usize, f64)> {
        expand(&self.ar, &self.seasonal_ar, s, -1.0)
    }

    /// MA lags of `(1 + theta(B))(1 + Theta(B^s))`.
    fn ma_lags(&self, s: usize) -> Vec<(usize, f64)> {
        expand(&self.ma, &self.seasonal_ma, s, 1.0)
    }
}

/// Lag/coefficient pairs of a multiplicative polynomial product.
///
/// Repeated lags are left in place; consumers sum over the list.
fn expand(short: &[f64], seasonal: &[f64], s: usize, cross_sign: f64) -> Vec<(usize, f64)> {
    let mut lags: Vec<(usize, f64)> = short.iter().enumerate().map(|(i, &c)| (i + 1, c)).collect();
    for (j, &cs) in seasonal.iter().enumerate() {
        let seasonal_lag = (j + 1) * s;
        lags.push((seasonal_lag, cs));
        for (i, &c) in short.iter().enumerate() {
            lags.push((seasonal_lag + i + 1, cross_sign * c * cs));
        }
    }
    lags
}

/// Conditional residuals of the ARMA recursion on a differenced series.
fn conditional_residuals(
    w: &[f64],
    constant: f64,
    ar: &[(usize, f64)],
    ma: &[(usize, f64)],
    start: usize,
) -> (Vec<f64>, f64) {
    let mut residuals = vec![0.0; w.len()];
    let mut css = 0.0;
    for t in start..w.len() {
        let mut pred = constant;
        for &(lag, c) in ar {
            pred += c * (w[t - lag] - constant);
        }
        for &(lag, c) in ma {
            if t >= lag {
                pred += c * residuals[t - lag];
            }
        }
        let error = w[t] - pred;
        residuals[t] = error;
        css += error * error;
    }
    (residuals, css)
}

/// Seasonal ARIMA forecasting model.
///
/// The series is seasonally differenced `D` times at lag `s`, then
/// differenced `d` times. The ARMA part on the differenced series uses the
/// multiplicative polynomials `phi(B)Phi(B^s)` and `theta(B)Theta(B^s)`;
/// coefficients minimize the conditional sum of squares with Nelder-Mead.
/// Forecasts are integrated back through both differencing steps.
#[derive(Debug, Clone)]
pub struct ARIMA {
    order: ModelOrder,
    coefficients: Option<Coefficients>,
    /// Original series followed by each differencing stage.
    stages: Vec<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    sigma2: Option<f64>,
    n_eff: usize,
}

impl ARIMA {
    /// Create a model with the given order.
    pub fn new(order: ModelOrder) -> Self {
        Self {
            order,
            coefficients: None,
            stages: Vec::new(),
            residuals: None,
            fitted: None,
            sigma2: None,
            n_eff: 0,
        }
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    pub fn coefficients(&self) -> Option<&Coefficients> {
        self.coefficients.as_ref()
    }

    /// Innovation variance estimate.
    pub fn sigma2(&self) -> Option<f64> {
        self.sigma2
    }

    /// Gaussian log-likelihood of the conditional residuals.
    pub fn log_likelihood(&self) -> Option<f64> {
        let sigma2 = self.sigma2?;
        let n = self.n_eff as f64;
        Some(-0.5 * n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0))
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> Option<f64> {
        let k = (self.order.num_coefficients() + 1) as f64;
        self.log_likelihood().map(|ll| -2.0 * ll + 2.0 * k)
    }

    /// Corrected AIC, `None` when too few residuals remain.
    pub fn aicc(&self) -> Option<f64> {
        let k = (self.order.num_coefficients() + 1) as f64;
        let n = self.n_eff as f64;
        if n - k - 1.0 <= 0.0 {
            return None;
        }
        self.aic().map(|aic| aic + 2.0 * k * (k + 1.0) / (n - k - 1.0))
    }

    fn differencing_stages(&self, values: &[f64]) -> Vec<Vec<f64>> {
        let mut stages = vec![values.to_vec()];
        for _ in 0..self.seasonal_rounds() {
            let next = seasonal_difference(&stages[stages.len() - 1], 1, self.order.s);
            stages.push(next);
        }
        for _ in 0..self.order.d {
            let next = difference(&stages[stages.len() - 1], 1);
            stages.push(next);
        }
        stages
    }

    fn seasonal_rounds(&self) -> usize {
        if self.order.s > 1 {
            self.order.cap_d
        } else {
            0
        }
    }

    fn estimate(&self, w: &[f64], start: usize) -> Coefficients {
        let order = self.order;
        let w_mean = mean(w);
        let free = order.num_coefficients() - usize::from(order.includes_constant());

        if free == 0 {
            // Least squares constant is the mean
            return Coefficients::unpack(&order, &[w_mean], w_mean);
        }

        let mut initial = Vec::with_capacity(order.num_coefficients());
        let mut bounds = Vec::with_capacity(order.num_coefficients());
        if order.includes_constant() {
            initial.push(w_mean);
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for i in 0..free {
            initial.push(0.1 / (i % 2 + 1) as f64);
            bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
        }

        let s = order.s;
        let result = nelder_mead(
            |params| {
                let c = Coefficients::unpack(&order, params, 0.0);
                conditional_residuals(w, c.constant, &c.ar_lags(s), &c.ma_lags(s), start).1
            },
            &initial,
            Some(&bounds),
            NelderMeadConfig {
                max_iter: 1000,
                tolerance: 1e-8,
                ..Default::default()
            },
        );

        Coefficients::unpack(&order, &result.optimal_point, 0.0)
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        let order = self.order;
        let start = order.max_ar_lag();
        let loss = order.differencing_loss();
        let needed = loss + start + order.num_coefficients() + 3;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let stages = self.differencing_stages(values);
        let w = stages[stages.len() - 1].as_slice();

        let coefficients = self.estimate(w, start);
        let (residuals, css) = conditional_residuals(
            w,
            coefficients.constant,
            &coefficients.ar_lags(order.s),
            &coefficients.ma_lags(order.s),
            start,
        );
        if !css.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "{} produced a non-finite sum of squares",
                order
            )));
        }

        let n_eff = w.len() - start;
        // Floor keeps exact fits comparable instead of -inf
        let sigma2 = (css / n_eff as f64).max(1e-12);

        let offset = values.len() - w.len();
        let mut fitted = vec![f64::NAN; values.len()];
        for t in start..w.len() {
            fitted[t + offset] = values[t + offset] - residuals[t];
        }

        self.coefficients = Some(coefficients);
        self.residuals = Some(residuals);
        self.fitted = Some(fitted);
        self.sigma2 = Some(sigma2);
        self.n_eff = n_eff;
        self.stages = stages;

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let coefficients = self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;
        let w = self.stages.last().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let s = self.order.s;
        let ar = coefficients.ar_lags(s);
        let ma = coefficients.ma_lags(s);
        let c = coefficients.constant;

        let mut extended = w.clone();
        let mut errors = residuals.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = c;
            for &(lag, coef) in &ar {
                if t >= lag {
                    pred += coef * (extended[t - lag] - c);
                }
            }
            for &(lag, coef) in &ma {
                if t >= lag {
                    pred += coef * errors[t - lag];
                }
            }
            extended.push(pred);
            errors.push(0.0);
        }

        let mut predictions = extended.split_off(w.len());
        let seasonal_rounds = self.seasonal_rounds();
        for stage in (1..self.stages.len()).rev() {
            let lag = if stage <= seasonal_rounds { s } else { 1 };
            predictions = integrate(&predictions, &self.stages[stage - 1], lag);
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
        "ARIMA"
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
    fn order_display_and_counts() {
        let order = ModelOrder::seasonal(1, 0, 1, 1, 1, 0, 52);
        assert_eq!(order.to_string(), "ARIMA(1,0,1)(1,1,0)[52]");
        assert!(order.includes_constant());
        assert_eq!(order.num_coefficients(), 4);
        assert_eq!(ModelOrder::new(0, 2, 1).num_coefficients(), 1);
        assert_eq!(ModelOrder::new(2, 1, 0).to_string(), "ARIMA(2,1,0)");
    }

    #[test]
    fn expand_multiplies_polynomials() {
        let lags = expand(&[0.5], &[0.4], 4, -1.0);
        assert_eq!(lags, vec![(1, 0.5), (4, 0.4), (5, -0.2)]);
    }

    #[test]
    fn mean_model_forecasts_mean() {
        let values: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 9.0 } else { 11.0 }).collect();
        let mut model = ARIMA::new(ModelOrder::new(0, 0, 0));
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict(4).unwrap();
        for &v in forecast.primary() {
            assert_relative_eq!(v, 10.0, epsilon = 1e-10);
        }
        assert!(model.aic().unwrap().is_finite());
    }

    #[test]
    fn ar1_coefficient_recovered() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let mut values = vec![5.0];
        for i in 1..300 {
            let shock: f64 = rng.gen_range(-1.0..1.0);
            values.push(0.7 * values[i - 1] + shock);
        }
        let mut model = ARIMA::new(ModelOrder::new(1, 0, 0));
        model.fit(&make_series(values)).unwrap();

        let phi = model.coefficients().unwrap().ar[0];
        assert!((phi - 0.7).abs() < 0.15, "phi = {}", phi);
    }

    #[test]
    fn drift_model_extends_trend() {
        let values: Vec<f64> = (0..60).map(|i| 3.0 + 2.0 * i as f64).collect();
        let mut model = ARIMA::new(ModelOrder::new(0, 1, 0));
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict(3).unwrap();
        assert_relative_eq!(forecast.primary()[0], 123.0, epsilon = 1e-8);
        assert_relative_eq!(forecast.primary()[2], 127.0, epsilon = 1e-8);
    }

    #[test]
    fn seasonal_differencing_is_reintegrated() {
        let pattern = [4.0, -2.0, 1.0, -3.0];
        let values: Vec<f64> = (0..48).map(|i| 20.0 + 0.5 * i as f64 + pattern[i % 4]).collect();
        let mut model = ARIMA::new(ModelOrder::seasonal(0, 0, 0, 0, 1, 0, 4));
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict(8).unwrap();
        for (h, &v) in forecast.primary().iter().enumerate() {
            let i = 48 + h;
            assert_relative_eq!(v, 20.0 + 0.5 * i as f64 + pattern[i % 4], epsilon = 1e-8);
        }
    }

    #[test]
    fn fitted_values_align_with_input() {
        let values: Vec<f64> = (0..30).map(|i| (i as f64 * 0.4).sin() * 3.0 + 10.0).collect();
        let mut model = ARIMA::new(ModelOrder::new(1, 1, 0));
        model.fit(&make_series(values.clone())).unwrap();

        let fitted = model.fitted_values().unwrap();
        assert_eq!(fitted.len(), values.len());
        assert!(fitted[0].is_nan());
        assert!(fitted[2].is_finite());
    }

    #[test]
    fn insufficient_data_and_fit_required() {
        let mut model = ARIMA::new(ModelOrder::seasonal(1, 0, 0, 1, 1, 0, 52));
        assert!(matches!(model.predict(1), Err(ForecastError::FitRequired)));
        assert!(matches!(
            model.fit(&make_series(vec![1.0; 60])),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn zero_horizon() {
        let mut model = ARIMA::new(ModelOrder::new(0, 0, 0));
        model.fit(&make_series(vec![2.0, 3.0, 4.0, 5.0, 6.0])).unwrap();
        assert!(model.predict(0).unwrap().is_empty());
    }
}
