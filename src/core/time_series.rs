//! TimeSeries data structure for weekly interest data.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};

/// Seasonal period of weekly data with a yearly cycle.
pub const WEEKS_PER_YEAR: usize = 52;

/// A univariate time series with strictly increasing timestamps and finite values.
///
/// The series carries its seasonal period so every model fitted on it
/// agrees on the season length. Values are read-only once constructed;
/// transformations return new series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    period: usize,
    frequency: Duration,
}

fn check_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(ForecastError::InvalidParameter(format!(
            "value at position {} is not finite ({})",
            i, values[i]
        ))),
        None => Ok(()),
    }
}

impl TimeSeries {
    /// Create a new series with an explicit seasonal period and step.
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
        period: usize,
        frequency: Duration,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        check_finite(&values)?;

        // Strictly increasing also rules out duplicate timestamps
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(format!(
                    "timestamps must be strictly increasing (position {})",
                    i
                )));
            }
        }

        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }

        if frequency <= Duration::zero() {
            return Err(ForecastError::InvalidParameter(
                "frequency must be positive".to_string(),
            ));
        }

        Ok(Self {
            timestamps,
            values,
            period,
            frequency,
        })
    }

    /// Create a weekly series with a yearly (52) seasonal period.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::new(timestamps, values, WEEKS_PER_YEAR, Duration::weeks(1))
    }

    /// Create a weekly series starting at `start`, one value per week.
    pub fn weekly(start: DateTime<Utc>, values: Vec<f64>) -> Result<Self> {
        let timestamps = (0..values.len())
            .map(|i| start + Duration::weeks(i as i64))
            .collect();
        Self::univariate(timestamps, values)
    }

    /// Return a copy of this series with a different seasonal period.
    pub fn with_period(mut self, period: usize) -> Result<Self> {
        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        self.period = period;
        Ok(self)
    }

    /// Build a new series on the same time index with replaced values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        check_finite(&values)?;
        Ok(Self {
            timestamps: self.timestamps.clone(),
            values,
            period: self.period,
            frequency: self.frequency,
        })
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get the observed values.
    pub fn primary_values(&self) -> &[f64] {
        &self.values
    }

    /// Seasonal period in observations.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Spacing between consecutive observations.
    pub fn frequency(&self) -> Duration {
        self.frequency
    }

    /// Timestamp of the last observation.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Timestamps for `horizon` steps after the last observation.
    pub fn future_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let last = self.last_timestamp().ok_or(ForecastError::EmptyData)?;
        Ok((1..=horizon)
            .map(|h| last + self.frequency * h as i32)
            .collect())
    }

    /// Extract the half-open slice `[start, end)` of the series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end || end > self.len() {
            return Err(ForecastError::Range {
                start,
                end,
                len: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            period: self.period,
            frequency: self.frequency,
        })
    }

    /// Pairs of (timestamp, value) in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}
