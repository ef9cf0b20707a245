//! Validation scoring and model selection.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{ForecastError, Result};
use crate::pipeline::catalog::Strategy;
use crate::preprocess::Split;
use crate::utils::metrics::{calculate_metrics, mape, AccuracyMetrics};

/// What happened to one strategy on the validation window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyOutcome {
    Scored { mape: f64, metrics: AccuracyMetrics },
    Failed { reason: String },
    /// The strategy is not defined for this series, e.g. Holt-Winters on a long period.
    Skipped { reason: String },
}

impl StrategyOutcome {
    pub fn mape(&self) -> Option<f64> {
        match self {
            StrategyOutcome::Scored { mape, .. } => Some(*mape),
            _ => None,
        }
    }
}

/// Validation MAPE of one strategy for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub entity: String,
    pub strategy: Strategy,
    pub mape: f64,
}

/// The selected strategy of an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestModelChoice {
    pub entity: String,
    pub strategy: Strategy,
    pub mape: f64,
}

/// Outcome of a strategy, with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRecord {
    pub strategy: Strategy,
    pub outcome: StrategyOutcome,
}

/// All strategy outcomes of one entity, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTable {
    pub entity: String,
    pub records: Vec<StrategyRecord>,
}

impl ScoreTable {
    /// Records of the strategies that produced a score.
    pub fn scores(&self) -> Vec<ScoreRecord> {
        self.records
            .iter()
            .filter_map(|r| {
                r.outcome.mape().map(|mape| ScoreRecord {
                    entity: self.entity.clone(),
                    strategy: r.strategy,
                    mape,
                })
            })
            .collect()
    }

    pub fn outcome(&self, strategy: Strategy) -> Option<&StrategyOutcome> {
        self.records
            .iter()
            .find(|r| r.strategy == strategy)
            .map(|r| &r.outcome)
    }

    pub fn best(&self) -> Result<BestModelChoice> {
        rank(&self.entity, &self.scores())
    }
}

/// MAPE of `forecast` against `actual`, in percent.
pub fn score(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    mape(actual, forecast)
}

/// Strategy with the lowest finite score.
///
/// Equal scores go to the strategy earlier in the catalog, wherever it sits
/// in `scores`.
pub fn rank(entity: &str, scores: &[ScoreRecord]) -> Result<BestModelChoice> {
    let mut best: Option<&ScoreRecord> = None;
    for record in scores.iter().filter(|r| r.mape.is_finite()) {
        best = match best {
            Some(current)
                if current.mape < record.mape
                    || (current.mape == record.mape && current.strategy < record.strategy) =>
            {
                Some(current)
            }
            _ => Some(record),
        };
    }

    best.map(|r| BestModelChoice {
        entity: entity.to_string(),
        strategy: r.strategy,
        mape: r.mape,
    })
    .ok_or_else(|| ForecastError::ModelFit {
        strategy: "all".to_string(),
        reason: format!("no strategy produced a finite score for '{}'", entity),
    })
}

/// Fit `strategy` on the training window and score it on the validation window.
pub fn evaluate_strategy(
    entity: &str,
    strategy: Strategy,
    split: &Split,
    config: &PipelineConfig,
) -> StrategyOutcome {
    let actual = split.valid.primary_values();
    let mut model = strategy.build(config, entity);

    let forecast = model
        .fit(&split.train)
        .and_then(|_| model.predict(actual.len()));
    let forecast = match forecast {
        Ok(forecast) => forecast,
        Err(ForecastError::Unsupported(reason)) => {
            debug!(entity, strategy = strategy.name(), %reason, "strategy skipped");
            return StrategyOutcome::Skipped { reason };
        }
        Err(e) => {
            warn!(entity, strategy = strategy.name(), error = %e, "strategy failed");
            return StrategyOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let scored = score(forecast.primary(), actual)
        .and_then(|mape| Ok((mape, calculate_metrics(actual, forecast.primary())?)));
    match scored {
        Ok((mape, metrics)) if mape.is_finite() => {
            debug!(entity, strategy = strategy.name(), mape, "strategy scored");
            StrategyOutcome::Scored { mape, metrics }
        }
        Ok((mape, _)) => {
            warn!(entity, strategy = strategy.name(), mape, "non-finite score");
            StrategyOutcome::Failed {
                reason: format!("non-finite MAPE {}", mape),
            }
        }
        Err(e) => {
            warn!(entity, strategy = strategy.name(), error = %e, "scoring failed");
            StrategyOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Evaluate every catalog strategy for one entity.
pub fn evaluate(entity: &str, split: &Split, config: &PipelineConfig) -> ScoreTable {
    let run = |strategy: Strategy| StrategyRecord {
        strategy,
        outcome: evaluate_strategy(entity, strategy, split, config),
    };

    let records = if config.parallel {
        Strategy::ALL.par_iter().map(|&s| run(s)).collect()
    } else {
        Strategy::ALL.iter().map(|&s| run(s)).collect()
    };

    ScoreTable {
        entity: entity.to_string(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use crate::preprocess::split;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn record(strategy: Strategy, mape: f64) -> ScoreRecord {
        ScoreRecord {
            entity: "harvard".to_string(),
            strategy,
            mape,
        }
    }

    fn make_split(values: Vec<f64>, n_valid: usize) -> Split {
        let start = Utc.with_ymd_and_hms(2018, 1, 7, 0, 0, 0).unwrap();
        split(&TimeSeries::weekly(start, values).unwrap(), n_valid).unwrap()
    }

    fn fast_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.nnar.repeats = 2;
        config.nnar.epochs = 20;
        config
    }

    #[test]
    fn score_is_mape() {
        let value = score(&[110.0, 90.0], &[100.0, 100.0]).unwrap();
        assert_relative_eq!(value, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn score_rejects_bad_input() {
        assert!(matches!(
            score(&[1.0], &[1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
        assert!(matches!(score(&[], &[]), Err(ForecastError::EmptyData)));
        assert!(matches!(
            score(&[1.0], &[0.0]),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rank_takes_minimum() {
        let scores = vec![
            record(Strategy::SeasonalNaive, 12.0),
            record(Strategy::Tslm, 8.5),
            record(Strategy::AutoArima, 9.0),
        ];
        let best = rank("harvard", &scores).unwrap();
        assert_eq!(best.strategy, Strategy::Tslm);
        assert_relative_eq!(best.mape, 8.5);
        assert_eq!(best.entity, "harvard");
    }

    #[test]
    fn rank_ties_go_to_catalog_order() {
        let scores = vec![
            record(Strategy::FourierRegression, 5.0),
            record(Strategy::Tslm, 5.0),
            record(Strategy::MovingAverage, 5.0),
        ];
        assert_eq!(rank("yale", &scores).unwrap().strategy, Strategy::Tslm);
    }

    #[test]
    fn rank_ignores_non_finite() {
        let scores = vec![
            record(Strategy::SeasonalNaive, f64::NAN),
            record(Strategy::Tslm, f64::INFINITY),
            record(Strategy::Nnar, 30.0),
        ];
        assert_eq!(rank("mit", &scores).unwrap().strategy, Strategy::Nnar);
    }

    #[test]
    fn rank_without_scores_fails() {
        let scores = vec![record(Strategy::SeasonalNaive, f64::NAN)];
        assert!(matches!(
            rank("mit", &scores),
            Err(ForecastError::ModelFit { .. })
        ));
        assert!(rank("mit", &[]).is_err());
    }

    #[test]
    fn evaluate_covers_catalog() {
        let values: Vec<f64> = (0..156)
            .map(|i| 30.0 + 10.0 * ((i % 52) as f64 / 52.0))
            .collect();
        let table = evaluate("harvard", &make_split(values, 52), &fast_config());

        assert_eq!(table.records.len(), Strategy::ALL.len());
        for (record, strategy) in table.records.iter().zip(Strategy::ALL) {
            assert_eq!(record.strategy, strategy);
        }
        assert!(matches!(
            table.outcome(Strategy::HoltWinters),
            Some(StrategyOutcome::Skipped { .. })
        ));
        // Seasonal naive reproduces an exactly repeating year
        let naive = table.outcome(Strategy::SeasonalNaive).unwrap().mape().unwrap();
        assert!(naive < 1e-9);
        assert!(table.best().unwrap().mape < 1e-9);
    }

    #[test]
    fn too_short_training_marks_failures() {
        // 60 training points cannot support two yearly cycles
        let values: Vec<f64> = (0..112).map(|i| 10.0 + (i % 7) as f64).collect();
        let table = evaluate("yale", &make_split(values, 52), &fast_config());
        assert!(matches!(
            table.outcome(Strategy::StlEts),
            Some(StrategyOutcome::Failed { .. })
        ));
        assert!(table.outcome(Strategy::SeasonalNaive).unwrap().mape().is_some());
    }

    #[test]
    fn sequential_matches_parallel() {
        let values: Vec<f64> = (0..156)
            .map(|i| 50.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let split = make_split(values, 52);
        let mut config = fast_config();
        let parallel = evaluate("mit", &split, &config);
        config.parallel = false;
        let sequential = evaluate("mit", &split, &config);
        assert_eq!(parallel, sequential);
    }
}
