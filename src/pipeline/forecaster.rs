//! Refit of the selected strategy and the forward forecast.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::pipeline::catalog::Strategy;

/// Future forecast of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub entity: String,
    pub strategy: Strategy,
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }
}

/// Fit `strategy` on the whole of `series` and forecast `horizon` weeks ahead.
///
/// Timestamps continue one series step after the last observation.
pub fn refit_and_forecast(
    entity: &str,
    strategy: Strategy,
    series: &TimeSeries,
    horizon: usize,
    config: &PipelineConfig,
) -> Result<ForecastResult> {
    let mut model = strategy.build(config, entity);
    model
        .fit(series)
        .map_err(|e| ForecastError::model_fit(strategy.name(), &e))?;
    let forecast = model
        .predict(horizon)
        .map_err(|e| ForecastError::model_fit(strategy.name(), &e))?;

    if forecast.horizon() != horizon {
        return Err(ForecastError::DimensionMismatch {
            expected: horizon,
            got: forecast.horizon(),
        });
    }

    let timestamps = series.future_timestamps(horizon)?;
    debug!(entity, strategy = strategy.name(), horizon, "refit forecast");

    Ok(ForecastResult {
        entity: entity.to_string(),
        strategy,
        timestamps,
        values: forecast.into_values(),
    })
}
