//! End-to-end runs over one entity or a whole store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::core::{SeriesStore, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::pipeline::change::{compute_change, ChangeSeries};
use crate::pipeline::evaluator::{evaluate, BestModelChoice, ScoreTable};
use crate::pipeline::forecaster::{refit_and_forecast, ForecastResult};
use crate::preprocess::{sanitize, split};

/// One observation of a reported series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Everything the pipeline produced for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReport {
    pub entity: String,
    pub sanitized: Vec<SeriesPoint>,
    pub scores: ScoreTable,
    pub best: BestModelChoice,
    pub forecast: ForecastResult,
    pub change: ChangeSeries,
}

impl EntityReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::Serialization(e.to_string()))
    }
}

/// Serialize successful reports keyed by entity.
pub fn to_json(reports: &BTreeMap<String, EntityReport>) -> Result<String> {
    serde_json::to_string_pretty(reports).map_err(|e| ForecastError::Serialization(e.to_string()))
}

/// Model selection, forecasting and change analysis with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage for one series.
    ///
    /// Zeros are replaced before anything else; the validation window,
    /// the refit and the prior-year comparison all use the cleaned series.
    pub fn run_series(&self, entity: &str, series: &TimeSeries) -> Result<EntityReport> {
        let config = &self.config;
        let sanitized = sanitize(series)?.with_period(config.period)?;
        let parts = split(&sanitized, config.n_valid)?;

        let scores = evaluate(entity, &parts, config);
        let best = scores.best()?;
        info!(
            entity,
            strategy = best.strategy.name(),
            mape = best.mape,
            "selected strategy"
        );

        let forecast = refit_and_forecast(entity, best.strategy, &sanitized, config.horizon, config)?;
        let change = compute_change(entity, &forecast, &sanitized, &config.change.window)?
            .with_deadlines(&config.change.deadlines)?;

        let sanitized = sanitized
            .iter()
            .map(|(timestamp, value)| SeriesPoint { timestamp, value })
            .collect();

        Ok(EntityReport {
            entity: entity.to_string(),
            sanitized,
            scores,
            best,
            forecast,
            change,
        })
    }

    /// Run the entity's series from `store`.
    pub fn run_entity(&self, store: &SeriesStore, entity: &str) -> Result<EntityReport> {
        let series = store.load(entity)?;
        self.run_series(entity, series)
    }

    /// Run every entity of `store`; failures are reported per entity.
    pub fn run_batch(&self, store: &SeriesStore) -> BTreeMap<String, Result<EntityReport>> {
        let entities: Vec<&str> = store.entities().collect();
        let run = |entity: &&str| {
            let result = self.run_entity(store, entity);
            if let Err(e) = &result {
                warn!(entity = *entity, error = %e, "entity failed");
            }
            (entity.to_string(), result)
        };

        if self.config.parallel {
            entities.par_iter().map(run).collect()
        } else {
            entities.iter().map(run).collect()
        }
    }
}
