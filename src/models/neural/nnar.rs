//! Neural network autoregression.
//!
//! A feed-forward network with one hidden layer of logistic units and a
//! linear output, fed with lagged values of the series. Several networks
//! are trained from different seeded starting weights and their outputs are
//! averaged. Multi-step forecasts are produced recursively, feeding each
//! averaged prediction back in as the newest lag.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Settings of the NNAR strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NnarConfig {
    /// Non-seasonal lags `1..=lags`.
    pub lags: usize,
    /// Seasonal lags `P, 2P, ..` up to this count.
    pub seasonal_lags: usize,
    /// Hidden units.
    pub hidden: usize,
    /// Networks averaged.
    pub repeats: usize,
    /// Full-batch gradient steps per network.
    pub epochs: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    /// Seed of the first network; repeat `r` uses `seed + r`.
    pub seed: u64,
}

impl Default for NnarConfig {
    fn default() -> Self {
        Self {
            lags: 12,
            seasonal_lags: 1,
            hidden: 7,
            repeats: 20,
            epochs: 200,
            learning_rate: 0.05,
            momentum: 0.9,
            seed: 42,
        }
    }
}

/// One hidden layer network with a linear output.
#[derive(Debug, Clone)]
struct Network {
    inputs: usize,
    /// Row-major `hidden x inputs`.
    w_hidden: Vec<f64>,
    b_hidden: Vec<f64>,
    w_out: Vec<f64>,
    b_out: f64,
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Network {
    fn random(inputs: usize, hidden: usize, rng: &mut StdRng) -> Self {
        let mut draw = |n: usize| -> Vec<f64> { (0..n).map(|_| rng.gen_range(-0.5..0.5)).collect() };
        let w_hidden = draw(hidden * inputs);
        let b_hidden = draw(hidden);
        let w_out = draw(hidden);
        let b_out = draw(1)[0];
        Self {
            inputs,
            w_hidden,
            b_hidden,
            w_out,
            b_out,
        }
    }

    fn hidden(&self) -> usize {
        self.b_hidden.len()
    }

    fn forward(&self, x: &[f64], activations: &mut [f64]) -> f64 {
        let mut out = self.b_out;
        for (j, a) in activations.iter_mut().enumerate() {
            let weights = &self.w_hidden[j * self.inputs..(j + 1) * self.inputs];
            let z: f64 = self.b_hidden[j] + weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>();
            *a = logistic(z);
            out += self.w_out[j] * *a;
        }
        out
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut activations = vec![0.0; self.hidden()];
        self.forward(x, &mut activations)
    }

    /// Full-batch gradient descent with momentum on the mean squared error.
    fn train(&mut self, rows: &[Vec<f64>], targets: &[f64], config: &NnarConfig) {
        let hidden = self.hidden();
        let inputs = self.inputs;
        let n = rows.len() as f64;

        let mut v_hidden = vec![0.0; hidden * inputs];
        let mut v_b_hidden = vec![0.0; hidden];
        let mut v_out = vec![0.0; hidden];
        let mut v_b_out = 0.0;
        let mut activations = vec![0.0; hidden];

        for _ in 0..config.epochs {
            let mut g_hidden = vec![0.0; hidden * inputs];
            let mut g_b_hidden = vec![0.0; hidden];
            let mut g_out = vec![0.0; hidden];
            let mut g_b_out = 0.0;

            for (x, &y) in rows.iter().zip(targets) {
                let out = self.forward(x, &mut activations);
                let delta = 2.0 * (out - y) / n;
                g_b_out += delta;
                for j in 0..hidden {
                    let a = activations[j];
                    g_out[j] += delta * a;
                    let back = delta * self.w_out[j] * a * (1.0 - a);
                    g_b_hidden[j] += back;
                    let grad_row = &mut g_hidden[j * inputs..(j + 1) * inputs];
                    for (g, v) in grad_row.iter_mut().zip(x) {
                        *g += back * v;
                    }
                }
            }

            let step = |w: &mut [f64], v: &mut [f64], g: &[f64]| {
                for ((wi, vi), gi) in w.iter_mut().zip(v.iter_mut()).zip(g) {
                    *vi = config.momentum * *vi - config.learning_rate * gi;
                    *wi += *vi;
                }
            };
            step(self.w_hidden.as_mut_slice(), v_hidden.as_mut_slice(), &g_hidden);
            step(self.b_hidden.as_mut_slice(), v_b_hidden.as_mut_slice(), &g_b_hidden);
            step(self.w_out.as_mut_slice(), v_out.as_mut_slice(), &g_out);
            v_b_out = config.momentum * v_b_out - config.learning_rate * g_b_out;
            self.b_out += v_b_out;
        }
    }
}

/// Fitted state of an NNAR model.
#[derive(Debug, Clone)]
struct NnarState {
    mean: f64,
    scale: f64,
    /// Scaled history used to seed recursive forecasts.
    history: Vec<f64>,
    /// Empty when the series is constant.
    networks: Vec<Network>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

/// NNAR(p, P, k)\[m\] forecaster.
#[derive(Debug, Clone)]
pub struct Nnar {
    period: usize,
    config: NnarConfig,
    label: String,
    state: Option<NnarState>,
}

impl Nnar {
    pub fn new(period: usize, config: NnarConfig) -> Self {
        let label = format!(
            "NNAR({},{},{})[{}]",
            config.lags, config.seasonal_lags, config.hidden, period
        );
        Self {
            period,
            config,
            label,
            state: None,
        }
    }

    pub fn config(&self) -> &NnarConfig {
        &self.config
    }

    /// Input lags in network order.
    pub fn input_lags(&self) -> Vec<usize> {
        let mut lags: Vec<usize> = (1..=self.config.lags).collect();
        if self.period > 1 {
            for k in 1..=self.config.seasonal_lags {
                let lag = k * self.period;
                if !lags.contains(&lag) {
                    lags.push(lag);
                }
            }
        }
        lags
    }

    fn inputs_at(series: &[f64], t: usize, lags: &[usize]) -> Vec<f64> {
        lags.iter().map(|&lag| series[t - lag]).collect()
    }

    fn ensemble(networks: &[Network], x: &[f64]) -> f64 {
        networks.iter().map(|net| net.predict(x)).sum::<f64>() / networks.len() as f64
    }
}

impl Forecaster for Nnar {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        if self.config.hidden == 0 || self.config.repeats == 0 {
            return Err(ForecastError::InvalidParameter(
                "NNAR needs at least one hidden unit and one repeat".to_string(),
            ));
        }
        let lags = self.input_lags();
        let max_lag = lags.iter().copied().max().ok_or_else(|| {
            ForecastError::InvalidParameter("NNAR needs at least one input lag".to_string())
        })?;

        let values = series.primary_values();
        let needed = max_lag + 2;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let mean = values.mean();
        let sd = values.std_dev();
        let constant = !(sd.is_finite() && sd > 1e-12);
        let scale = if constant { 1.0 } else { sd };
        let scaled: Vec<f64> = values.iter().map(|v| (v - mean) / scale).collect();

        let rows: Vec<Vec<f64>> = (max_lag..scaled.len())
            .map(|t| Self::inputs_at(&scaled, t, &lags))
            .collect();
        let targets = &scaled[max_lag..];

        let networks: Vec<Network> = if constant {
            Vec::new()
        } else {
            let config = &self.config;
            (0..config.repeats)
                .into_par_iter()
                .map(|r| {
                    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(r as u64));
                    let mut net = Network::random(lags.len(), config.hidden, &mut rng);
                    net.train(&rows, targets, config);
                    net
                })
                .collect()
        };

        let mut fitted = vec![f64::NAN; values.len()];
        for (row, t) in rows.iter().zip(max_lag..) {
            fitted[t] = if constant {
                mean
            } else {
                mean + scale * Self::ensemble(&networks, row)
            };
        }
        let residuals = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        self.state = Some(NnarState {
            mean,
            scale,
            history: scaled,
            networks,
            fitted,
            residuals,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        if state.networks.is_empty() {
            return Ok(Forecast::from_values(vec![state.mean; horizon]));
        }

        let lags = self.input_lags();
        let mut extended = state.history.clone();
        let mut predictions = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let x = Self::inputs_at(&extended, extended.len(), &lags);
            let next = Self::ensemble(&state.networks, &x);
            extended.push(next);
            predictions.push(state.mean + state.scale * next);
        }

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::PI;

    fn make_series(values: Vec<f64>, period: usize) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2020, 1, 5, 0, 0, 0).unwrap();
        TimeSeries::weekly(start, values)
            .unwrap()
            .with_period(period)
            .unwrap()
    }

    fn small_config() -> NnarConfig {
        NnarConfig {
            lags: 3,
            repeats: 4,
            epochs: 150,
            ..Default::default()
        }
    }

    fn seasonal_values(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 20.0 + 5.0 * (2.0 * PI * i as f64 / 8.0).sin())
            .collect()
    }

    #[test]
    fn input_lags_include_seasonal_lag() {
        let model = Nnar::new(52, NnarConfig::default());
        let lags = model.input_lags();
        assert_eq!(lags.len(), 13);
        assert_eq!(lags[11], 12);
        assert_eq!(lags[12], 52);
        assert_eq!(model.name(), "NNAR(12,1,7)[52]");
    }

    #[test]
    fn seeded_training_is_deterministic() {
        let ts = make_series(seasonal_values(80), 8);
        let mut a = Nnar::new(8, small_config());
        let mut b = Nnar::new(8, small_config());
        a.fit(&ts).unwrap();
        b.fit(&ts).unwrap();

        assert_eq!(a.predict(10).unwrap(), b.predict(10).unwrap());
    }

    #[test]
    fn forecasts_stay_in_series_range() {
        let ts = make_series(seasonal_values(80), 8);
        let mut model = Nnar::new(8, small_config());
        model.fit(&ts).unwrap();

        let forecast = model.predict(16).unwrap();
        assert_eq!(forecast.horizon(), 16);
        assert!(forecast
            .primary()
            .iter()
            .all(|v| v.is_finite() && *v > 5.0 && *v < 35.0));
    }

    #[test]
    fn constant_series_forecasts_constant() {
        let mut model = Nnar::new(4, small_config());
        model.fit(&make_series(vec![3.0; 30], 4)).unwrap();
        assert!(model.predict(5).unwrap().primary().iter().all(|&v| v == 3.0));
    }

    #[test]
    fn insufficient_data() {
        let mut model = Nnar::new(52, NnarConfig::default());
        assert!(matches!(
            model.fit(&make_series(vec![1.0; 50], 52)),
            Err(ForecastError::InsufficientData { needed: 54, got: 50 })
        ));
    }
}
