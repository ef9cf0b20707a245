//! STL (Seasonal-Trend decomposition using LOESS) implementation.
//!
//! STL decomposes a time series into three additive components:
//! - Trend: The underlying long-term pattern
//! - Seasonal: The repeating seasonal pattern
//! - Remainder: The residual after removing trend and seasonal

use crate::utils::stats::{mean, variance};

/// Result of STL decomposition.
#[derive(Debug, Clone)]
pub struct STLResult {
    /// Trend component.
    pub trend: Vec<f64>,
    /// Seasonal component.
    pub seasonal: Vec<f64>,
    /// Remainder component.
    pub remainder: Vec<f64>,
}

impl STLResult {
    /// Seasonal strength in `[0, 1]`; values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        let seasonal_plus_remainder: Vec<f64> = self
            .seasonal
            .iter()
            .zip(self.remainder.iter())
            .map(|(s, r)| s + r)
            .collect();
        let var_sr = variance(&seasonal_plus_remainder);
        if !var_sr.is_finite() || var_sr < 1e-10 {
            return 0.0;
        }
        (1.0 - variance(&self.remainder) / var_sr).clamp(0.0, 1.0)
    }
}

/// How the cycle-subseries are smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalWindow {
    /// Each cycle position gets the mean of its subseries; the seasonal
    /// component repeats exactly every period.
    Periodic,
    /// LOESS over each subseries with the given (odd) span.
    Span(usize),
}

/// STL decomposition configuration and algorithm.
#[derive(Debug, Clone)]
pub struct STL {
    period: usize,
    seasonal_window: SeasonalWindow,
    trend_span: usize,
    low_pass_span: usize,
    inner_iterations: usize,
    outer_iterations: usize,
}

fn odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

impl STL {
    /// Periodic decomposition with the default spans of Cleveland et al. (1990).
    pub fn new(period: usize) -> Self {
        let p = period.max(2) as f64;
        let trend_span = odd((1.5 * p / (1.0 - 1.5 / p)).ceil() as usize);
        Self {
            period,
            seasonal_window: SeasonalWindow::Periodic,
            trend_span: trend_span.max(3),
            low_pass_span: odd(period),
            inner_iterations: 2,
            outer_iterations: 0,
        }
    }

    /// Smooth the cycle-subseries with LOESS instead of taking their mean.
    pub fn with_seasonal_span(mut self, span: usize) -> Self {
        self.seasonal_window = SeasonalWindow::Span(odd(span.max(3)));
        self
    }

    pub fn with_trend_span(mut self, span: usize) -> Self {
        self.trend_span = odd(span.max(3));
        self
    }

    /// Robustness iterations downweighting large remainders.
    pub fn with_outer_iterations(mut self, n: usize) -> Self {
        self.outer_iterations = n;
        self
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn seasonal_window(&self) -> SeasonalWindow {
        self.seasonal_window
    }

    /// Decompose the series; `None` when fewer than two full periods are available.
    pub fn decompose(&self, series: &[f64]) -> Option<STLResult> {
        let n = series.len();
        if self.period < 2 || n < 2 * self.period {
            return None;
        }

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        for outer in 0..=self.outer_iterations {
            for _ in 0..self.inner_iterations {
                let detrended: Vec<f64> =
                    series.iter().zip(trend.iter()).map(|(y, t)| y - t).collect();
                let cycle = self.smooth_cycle_subseries(&detrended, &weights);
                let low_pass = self.low_pass(&cycle);
                for i in 0..n {
                    seasonal[i] = cycle[i] - low_pass[i];
                }

                let deseasonalized: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .map(|(y, s)| y - s)
                    .collect();
                trend = loess(&deseasonalized, self.trend_span, &weights);
            }

            if outer < self.outer_iterations {
                let remainder: Vec<f64> = (0..n).map(|i| series[i] - seasonal[i] - trend[i]).collect();
                weights = robustness_weights(&remainder);
            }
        }

        if self.seasonal_window == SeasonalWindow::Periodic {
            seasonal = self.periodic_means(&seasonal);
        }

        let remainder = (0..n).map(|i| series[i] - seasonal[i] - trend[i]).collect();
        Some(STLResult {
            trend,
            seasonal,
            remainder,
        })
    }

    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let mut result = vec![0.0; detrended.len()];
        for pos in 0..self.period {
            let indices: Vec<usize> = (pos..detrended.len()).step_by(self.period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let w: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

            let smoothed = match self.seasonal_window {
                SeasonalWindow::Periodic => {
                    let total: f64 = w.iter().sum();
                    let level = if total > 0.0 {
                        values.iter().zip(w.iter()).map(|(v, wi)| v * wi).sum::<f64>() / total
                    } else {
                        mean(&values)
                    };
                    vec![level; values.len()]
                }
                SeasonalWindow::Span(span) => loess(&values, span, &w),
            };

            for (&i, v) in indices.iter().zip(smoothed) {
                result[i] = v;
            }
        }
        result
    }

    /// Moving averages of length period, period and 3, followed by LOESS.
    fn low_pass(&self, series: &[f64]) -> Vec<f64> {
        let ma = centered_mean(&centered_mean(&centered_mean(series, self.period), self.period), 3);
        loess(&ma, self.low_pass_span, &vec![1.0; ma.len()])
    }

    fn periodic_means(&self, seasonal: &[f64]) -> Vec<f64> {
        let means: Vec<f64> = (0..self.period)
            .map(|pos| {
                let values: Vec<f64> = seasonal.iter().skip(pos).step_by(self.period).copied().collect();
                mean(&values)
            })
            .collect();
        (0..seasonal.len()).map(|i| means[i % self.period]).collect()
    }
}

/// Centered moving mean with windows truncated at the edges.
fn centered_mean(series: &[f64], window: usize) -> Vec<f64> {
    let n = series.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            series[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

/// Locally linear LOESS with tricube weights over the `span` nearest points.
fn loess(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let q = span.clamp(1, n);

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(q / 2).min(n - q);
            let end = start + q;
            let max_dist = (i - start).max(end - 1 - i) as f64 + 1.0;

            let (mut sw, mut sx, mut sy) = (0.0, 0.0, 0.0);
            let local: Vec<(f64, f64, f64)> = (start..end)
                .map(|j| {
                    let u = (i as f64 - j as f64).abs() / max_dist;
                    let w = (1.0 - u.powi(3)).powi(3) * weights[j];
                    sw += w;
                    sx += w * j as f64;
                    sy += w * values[j];
                    (w, j as f64, values[j])
                })
                .collect();

            if sw <= 0.0 {
                return values[i];
            }
            let (x_bar, y_bar) = (sx / sw, sy / sw);
            let (mut sxy, mut sxx) = (0.0, 0.0);
            for &(w, x, y) in &local {
                sxy += w * (x - x_bar) * (y - y_bar);
                sxx += w * (x - x_bar).powi(2);
            }
            let slope = if sxx > 1e-12 { sxy / sxx } else { 0.0 };
            y_bar + slope * (i as f64 - x_bar)
        })
        .collect()
}

/// Bisquare weights from the remainder scaled by six median absolute values.
fn robustness_weights(remainder: &[f64]) -> Vec<f64> {
    let mut abs: Vec<f64> = remainder.iter().map(|r| r.abs()).collect();
    abs.sort_by(|a, b| a.total_cmp(b));
    let n = abs.len();
    let median = if n % 2 == 0 {
        (abs[n / 2 - 1] + abs[n / 2]) / 2.0
    } else {
        abs[n / 2]
    };
    let h = 6.0 * median;
    if h < 1e-10 {
        return vec![1.0; n];
    }
    remainder
        .iter()
        .map(|r| {
            let u = r.abs() / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}
